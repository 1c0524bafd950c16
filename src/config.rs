use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::core::InvalidCursorPolicy;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub database: Option<DatabaseSettings>,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub pagination: PaginationSettings,
    #[serde(default)]
    pub nearby: NearbySettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

/// Where catalog records come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    #[serde(default)]
    pub backend: CatalogBackend,
    /// JSON seed file for the in-memory backend
    #[serde(default = "default_seed_path")]
    pub seed_path: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            backend: CatalogBackend::default(),
            seed_path: default_seed_path(),
        }
    }
}

fn default_seed_path() -> String { "data/seed.json".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// How long a location snapshot is reused for nearby searches
    #[serde(default = "default_location_ttl")]
    pub location_ttl_secs: u64,
    #[serde(default = "default_cache_capacity")]
    pub max_capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            location_ttl_secs: default_location_ttl(),
            max_capacity: default_cache_capacity(),
        }
    }
}

fn default_location_ttl() -> u64 { 60 }
fn default_cache_capacity() -> u64 { 16 }

#[derive(Debug, Clone, Deserialize)]
pub struct PaginationSettings {
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    #[serde(default)]
    pub invalid_cursor: InvalidCursorPolicy,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            invalid_cursor: InvalidCursorPolicy::default(),
        }
    }
}

fn default_page_size() -> u32 { 20 }
fn default_max_page_size() -> u32 { 100 }

#[derive(Debug, Clone, Deserialize)]
pub struct NearbySettings {
    /// Largest search radius accepted from clients, in meters
    #[serde(default = "default_max_radius")]
    pub max_radius_m: f64,
    pub max_results: Option<usize>,
}

impl Default for NearbySettings {
    fn default() -> Self {
        Self {
            max_radius_m: default_max_radius(),
            max_results: None,
        }
    }
}

fn default_max_radius() -> f64 { 100_000.0 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "full".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with ATLAS__)
    /// 5. DATABASE_URL, if set
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., ATLAS__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        apply_database_url(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        apply_database_url(settings)?.try_deserialize()
    }

    /// Clamp a requested page size into the configured bounds
    pub fn page_size(&self, requested: Option<u32>) -> usize {
        let max = self.pagination.max_page_size.max(1);
        requested
            .unwrap_or(self.pagination.default_page_size)
            .clamp(1, max) as usize
    }
}

fn environment() -> Environment {
    Environment::with_prefix("ATLAS")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Let the conventional DATABASE_URL variable override database.url
fn apply_database_url(settings: Config) -> Result<Config, ConfigError> {
    match std::env::var("DATABASE_URL") {
        Ok(url) => Config::builder()
            .add_source(settings)
            .set_override("database.url", url)?
            .build(),
        Err(_) => Ok(settings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.catalog.backend, CatalogBackend::Memory);
        assert_eq!(settings.pagination.default_page_size, 20);
        assert_eq!(settings.pagination.invalid_cursor, InvalidCursorPolicy::Restart);
        assert!(settings.database.is_none());
        assert!(settings.nearby.max_results.is_none());
    }

    #[test]
    fn test_default_logging() {
        let level = default_log_level();
        let format = default_log_format();
        assert_eq!(level, "info");
        assert_eq!(format, "full");
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
            [catalog]
            backend = "postgres"

            [database]
            url = "postgres://atlas@localhost/atlas"

            [pagination]
            max_page_size = 50
            invalid_cursor = "reject"
        "#;

        let settings: Settings = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .and_then(Config::try_deserialize)
            .unwrap();

        assert_eq!(settings.catalog.backend, CatalogBackend::Postgres);
        assert_eq!(settings.database.unwrap().url, "postgres://atlas@localhost/atlas");
        assert_eq!(settings.pagination.max_page_size, 50);
        assert_eq!(settings.pagination.default_page_size, 20);
        assert_eq!(settings.pagination.invalid_cursor, InvalidCursorPolicy::Reject);
        assert_eq!(settings.server.host, "0.0.0.0");
    }

    #[test]
    fn test_page_size_clamping() {
        let settings = Settings::default();
        assert_eq!(settings.page_size(None), 20);
        assert_eq!(settings.page_size(Some(5)), 5);
        assert_eq!(settings.page_size(Some(1000)), 100);
    }
}
