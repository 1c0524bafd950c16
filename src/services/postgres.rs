use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;
use thiserror::Error;

use crate::config::DatabaseSettings;
use crate::models::{LocationRecord, Municipality, Species};

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
}

/// PostgreSQL-backed catalog
///
/// Listing queries are keyset queries on the primary key, so a page never
/// scans rows before the cursor.
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    /// Create a new catalog from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new catalog from settings
    pub async fn from_settings(settings: &DatabaseSettings) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL catalog");

        Self::new(
            &settings.url,
            settings.max_connections.unwrap_or(10),
            settings.min_connections.unwrap_or(1),
            Duration::from_secs(settings.acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(settings.idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Species with id > `after` whose name, scientific name or any
    /// translation contains `search`, ascending by id
    pub async fn species_page(
        &self,
        search: Option<&str>,
        after: Option<i64>,
        limit: usize,
    ) -> Result<Vec<Species>, PostgresError> {
        let query = r#"
            SELECT id, name, scientific_name, translations
            FROM species
            WHERE ($1::BIGINT IS NULL OR id > $1)
              AND (
                $2::TEXT IS NULL
                OR name ILIKE $2
                OR scientific_name ILIKE $2
                OR EXISTS (
                    SELECT 1 FROM jsonb_each_text(translations) t
                    WHERE t.value ILIKE $2
                )
              )
            ORDER BY id
            LIMIT $3
        "#;

        let rows = sqlx::query(query)
            .bind(after)
            .bind(search.map(like_pattern))
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(species_from_row).collect()
    }

    /// Municipalities with id > `after` whose name, region or any
    /// translation contains `search`, ascending by id
    pub async fn municipalities_page(
        &self,
        search: Option<&str>,
        after: Option<i64>,
        limit: usize,
    ) -> Result<Vec<Municipality>, PostgresError> {
        let query = r#"
            SELECT id, name, region, translations
            FROM municipalities
            WHERE ($1::BIGINT IS NULL OR id > $1)
              AND (
                $2::TEXT IS NULL
                OR name ILIKE $2
                OR region ILIKE $2
                OR EXISTS (
                    SELECT 1 FROM jsonb_each_text(translations) t
                    WHERE t.value ILIKE $2
                )
              )
            ORDER BY id
            LIMIT $3
        "#;

        let rows = sqlx::query(query)
            .bind(after)
            .bind(search.map(like_pattern))
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(municipality_from_row).collect()
    }

    pub async fn species(&self, id: i64) -> Result<Option<Species>, PostgresError> {
        let query = r#"
            SELECT id, name, scientific_name, translations
            FROM species
            WHERE id = $1
        "#;

        let row = sqlx::query(query).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(species_from_row).transpose()
    }

    pub async fn species_by_ids(&self, ids: &HashSet<i64>) -> Result<HashMap<i64, Species>, PostgresError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let query = r#"
            SELECT id, name, scientific_name, translations
            FROM species
            WHERE id = ANY($1)
        "#;

        let ids: Vec<i64> = ids.iter().copied().collect();
        let rows = sqlx::query(query).bind(ids).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| species_from_row(row).map(|s| (s.id, s)))
            .collect()
    }

    pub async fn species_locations(&self, species_id: i64) -> Result<Vec<LocationRecord>, PostgresError> {
        let query = r#"
            SELECT species_id, latitude, longitude, radius_m, description
            FROM species_locations
            WHERE species_id = $1
            ORDER BY id
        "#;

        let rows = sqlx::query(query).bind(species_id).fetch_all(&self.pool).await?;
        rows.iter().map(location_from_row).collect()
    }

    /// Every species location; the candidate set for nearby searches
    pub async fn all_species_locations(&self) -> Result<Vec<LocationRecord>, PostgresError> {
        let query = r#"
            SELECT species_id, latitude, longitude, radius_m, description
            FROM species_locations
            ORDER BY species_id, id
        "#;

        let rows = sqlx::query(query).fetch_all(&self.pool).await?;

        tracing::debug!("Loaded {} species locations", rows.len());

        rows.iter().map(location_from_row).collect()
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn species_from_row(row: &PgRow) -> Result<Species, PostgresError> {
    let translations: Json<BTreeMap<String, String>> = row.try_get("translations")?;
    Ok(Species {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        scientific_name: row.try_get("scientific_name")?,
        translations: translations.0,
    })
}

fn municipality_from_row(row: &PgRow) -> Result<Municipality, PostgresError> {
    let translations: Json<BTreeMap<String, String>> = row.try_get("translations")?;
    Ok(Municipality {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        region: row.try_get("region")?,
        translations: translations.0,
    })
}

fn location_from_row(row: &PgRow) -> Result<LocationRecord, PostgresError> {
    Ok(LocationRecord {
        entity_id: row.try_get("species_id")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        radius_m: row.try_get("radius_m")?,
        description: row.try_get("description")?,
    })
}

/// Build an ILIKE substring pattern with wildcards in the term escaped
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
