// Service exports
pub mod cache;
pub mod catalog;
pub mod memory;
pub mod postgres;

pub use cache::{CacheManager, CacheKey, LocationSnapshot};
pub use catalog::{Catalog, CatalogError};
pub use memory::{MemoryCatalog, SeedData};
pub use postgres::{PostgresCatalog, PostgresError};
