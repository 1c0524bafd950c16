use std::collections::hash_map::{Entry, HashMap};

use crate::models::{LocationRecord, NearbyMatch, NearbyResult, SearchArea};
use crate::core::distance::haversine_distance;
use crate::core::proximity::{effective_from_raw, within_tolerance};

/// Find every entity with at least one range overlapping the search area
///
/// Single pass over the candidates, keeping the running minimum per entity.
/// Output is ordered by distance to the search center, ties broken by
/// entity id. On an exact distance tie within one entity the first
/// candidate wins.
pub fn find_nearby(area: &SearchArea, candidates: &[LocationRecord]) -> Vec<NearbyMatch> {
    let mut closest: HashMap<i64, (f64, &LocationRecord)> = HashMap::new();

    for location in candidates {
        let distance_m = haversine_distance(area.center, location.coordinate());
        // NaN would otherwise clamp to an effective distance of zero
        if !distance_m.is_finite() {
            continue;
        }
        if !within_tolerance(effective_from_raw(distance_m, location.radius_m), area.radius_m) {
            continue;
        }

        match closest.entry(location.entity_id) {
            Entry::Occupied(mut slot) => {
                if distance_m < slot.get().0 {
                    slot.insert((distance_m, location));
                }
            }
            Entry::Vacant(slot) => {
                slot.insert((distance_m, location));
            }
        }
    }

    let mut matches: Vec<NearbyMatch> = closest
        .into_iter()
        .map(|(entity_id, (distance_m, location))| NearbyMatch {
            entity_id,
            distance_m,
            location: location.clone(),
        })
        .collect();
    matches.sort_by(|a, b| {
        a.distance_m
            .total_cmp(&b.distance_m)
            .then_with(|| a.entity_id.cmp(&b.entity_id))
    });
    matches
}

/// Result of a nearby search
#[derive(Debug)]
pub struct NearbyOutcome<M> {
    pub results: Vec<NearbyResult<M>>,
    pub total_candidates: usize,
}

/// Nearby search orchestrator
///
/// # Pipeline Stages
/// 1. Proximity test per location range
/// 2. Per-entity reduction to the closest range
/// 3. Distance ordering
/// 4. Metadata join and optional result cap
#[derive(Debug, Clone, Default)]
pub struct NearbyAggregator {
    max_results: Option<usize>,
}

impl NearbyAggregator {
    pub fn new(max_results: Option<usize>) -> Self {
        Self { max_results }
    }

    /// Run the search and attach metadata to each surviving entity
    pub fn search<M, F>(&self, area: &SearchArea, candidates: &[LocationRecord], lookup: F) -> NearbyOutcome<M>
    where
        F: FnMut(i64) -> Option<M>,
    {
        self.attach(find_nearby(area, candidates), candidates.len(), lookup)
    }

    /// Join ordered matches with their metadata
    ///
    /// Entities the lookup cannot resolve are dropped rather than emitted
    /// without metadata. The cap, if any, applies after ordering.
    pub fn attach<M, F>(&self, matches: Vec<NearbyMatch>, total_candidates: usize, mut lookup: F) -> NearbyOutcome<M>
    where
        F: FnMut(i64) -> Option<M>,
    {
        let limit = self.max_results.unwrap_or(usize::MAX);

        let results: Vec<NearbyResult<M>> = matches
            .into_iter()
            .filter_map(|m| {
                let entity = lookup(m.entity_id);
                if entity.is_none() {
                    tracing::debug!("Dropping nearby entity {} with no metadata", m.entity_id);
                }
                entity.map(|e| m.with_entity(e))
            })
            .take(limit)
            .collect();

        NearbyOutcome {
            results,
            total_candidates,
        }
    }
}
