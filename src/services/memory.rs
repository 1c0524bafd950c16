use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::models::{LocationRecord, Municipality, Species};
use crate::services::catalog::CatalogError;

/// Seed file layout for the in-memory catalog
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub species: Vec<Species>,
    #[serde(default)]
    pub municipalities: Vec<Municipality>,
    #[serde(default)]
    pub locations: Vec<LocationRecord>,
}

/// Read-only catalog held entirely in memory
///
/// Listings are kept sorted by id so keyset pages can be cut directly.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    species: Vec<Species>,
    municipalities: Vec<Municipality>,
    locations: Vec<LocationRecord>,
}

impl MemoryCatalog {
    pub fn new(seed: SeedData) -> Self {
        let SeedData {
            mut species,
            mut municipalities,
            mut locations,
        } = seed;

        species.sort_by_key(|s| s.id);
        species.dedup_by_key(|s| s.id);
        municipalities.sort_by_key(|m| m.id);
        municipalities.dedup_by_key(|m| m.id);
        locations.sort_by_key(|l| l.entity_id);

        Self {
            species,
            municipalities,
            locations,
        }
    }

    /// Load the catalog from a JSON seed file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let seed: SeedData = serde_json::from_str(&raw)?;

        tracing::info!(
            "Loaded seed catalog from {}: {} species, {} municipalities, {} locations",
            path.as_ref().display(),
            seed.species.len(),
            seed.municipalities.len(),
            seed.locations.len()
        );

        Ok(Self::new(seed))
    }

    /// Species with id > `after` matching `search`, ascending by id
    pub fn species_page(&self, search: Option<&str>, after: Option<i64>, limit: usize) -> Vec<Species> {
        let needle = search.map(str::to_lowercase);
        self.species
            .iter()
            .filter(|s| after.map_or(true, |after| s.id > after))
            .filter(|s| {
                needle.as_deref().map_or(true, |n| {
                    contains_folded(&s.name, n)
                        || s.scientific_name.as_deref().is_some_and(|sci| contains_folded(sci, n))
                        || s.translations.values().any(|t| contains_folded(t, n))
                })
            })
            .take(limit)
            .cloned()
            .collect()
    }

    /// Municipalities with id > `after` matching `search`, ascending by id
    pub fn municipalities_page(&self, search: Option<&str>, after: Option<i64>, limit: usize) -> Vec<Municipality> {
        let needle = search.map(str::to_lowercase);
        self.municipalities
            .iter()
            .filter(|m| after.map_or(true, |after| m.id > after))
            .filter(|m| {
                needle.as_deref().map_or(true, |n| {
                    contains_folded(&m.name, n)
                        || m.region.as_deref().is_some_and(|r| contains_folded(r, n))
                        || m.translations.values().any(|t| contains_folded(t, n))
                })
            })
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn species(&self, id: i64) -> Option<Species> {
        self.species
            .binary_search_by_key(&id, |s| s.id)
            .ok()
            .map(|idx| self.species[idx].clone())
    }

    pub fn species_by_ids(&self, ids: &HashSet<i64>) -> HashMap<i64, Species> {
        self.species
            .iter()
            .filter(|s| ids.contains(&s.id))
            .map(|s| (s.id, s.clone()))
            .collect()
    }

    pub fn species_locations(&self, species_id: i64) -> Vec<LocationRecord> {
        self.locations
            .iter()
            .filter(|l| l.entity_id == species_id)
            .cloned()
            .collect()
    }

    pub fn all_species_locations(&self) -> Vec<LocationRecord> {
        self.locations.clone()
    }
}

/// Case-insensitive substring test; `needle` must already be lowercase
fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
