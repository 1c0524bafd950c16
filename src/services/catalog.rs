use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::config::{CatalogBackend, Settings};
use crate::models::{LocationRecord, Municipality, Species};
use crate::services::{MemoryCatalog, PostgresCatalog, PostgresError};

/// Errors raised while fetching catalog records
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Seed file error: {0}")]
    Seed(#[from] serde_json::Error),

    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] PostgresError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Source of species, municipality and location records
///
/// Every listing is ordered ascending by id and restricted to ids greater
/// than `after`, which is what the pager expects.
pub enum Catalog {
    Memory(MemoryCatalog),
    Postgres(PostgresCatalog),
}

impl Catalog {
    /// Build the catalog backend selected in settings
    pub async fn from_settings(settings: &Settings) -> Result<Self, CatalogError> {
        match settings.catalog.backend {
            CatalogBackend::Memory => {
                MemoryCatalog::from_path(&settings.catalog.seed_path).map(Catalog::Memory)
            }
            CatalogBackend::Postgres => {
                let database = settings.database.as_ref().ok_or_else(|| {
                    CatalogError::Config("postgres backend requires [database] settings".to_string())
                })?;
                let catalog = PostgresCatalog::from_settings(database).await?;
                Ok(Catalog::Postgres(catalog))
            }
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Catalog::Memory(_) => "memory",
            Catalog::Postgres(_) => "postgres",
        }
    }

    pub async fn species_page(
        &self,
        search: Option<&str>,
        after: Option<i64>,
        limit: usize,
    ) -> Result<Vec<Species>, CatalogError> {
        match self {
            Catalog::Memory(m) => Ok(m.species_page(search, after, limit)),
            Catalog::Postgres(p) => Ok(p.species_page(search, after, limit).await?),
        }
    }

    pub async fn municipalities_page(
        &self,
        search: Option<&str>,
        after: Option<i64>,
        limit: usize,
    ) -> Result<Vec<Municipality>, CatalogError> {
        match self {
            Catalog::Memory(m) => Ok(m.municipalities_page(search, after, limit)),
            Catalog::Postgres(p) => Ok(p.municipalities_page(search, after, limit).await?),
        }
    }

    pub async fn species(&self, id: i64) -> Result<Option<Species>, CatalogError> {
        match self {
            Catalog::Memory(m) => Ok(m.species(id)),
            Catalog::Postgres(p) => Ok(p.species(id).await?),
        }
    }

    pub async fn species_by_ids(&self, ids: &HashSet<i64>) -> Result<HashMap<i64, Species>, CatalogError> {
        match self {
            Catalog::Memory(m) => Ok(m.species_by_ids(ids)),
            Catalog::Postgres(p) => Ok(p.species_by_ids(ids).await?),
        }
    }

    pub async fn species_locations(&self, species_id: i64) -> Result<Vec<LocationRecord>, CatalogError> {
        match self {
            Catalog::Memory(m) => Ok(m.species_locations(species_id)),
            Catalog::Postgres(p) => Ok(p.species_locations(species_id).await?),
        }
    }

    pub async fn all_species_locations(&self) -> Result<Vec<LocationRecord>, CatalogError> {
        match self {
            Catalog::Memory(m) => Ok(m.all_species_locations()),
            Catalog::Postgres(p) => Ok(p.all_species_locations().await?),
        }
    }

    pub async fn health_check(&self) -> Result<bool, CatalogError> {
        match self {
            Catalog::Memory(_) => Ok(true),
            Catalog::Postgres(p) => Ok(p.health_check().await?),
        }
    }
}
