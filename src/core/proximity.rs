use crate::models::{LocationRecord, SearchArea};
use crate::core::distance::haversine_distance;

/// Gap between the search center and the edge of a location's range
///
/// Only the location's own radius is subtracted; the search radius is the
/// tolerance this gap is compared against. Clamped at zero when the search
/// center falls inside the range.
#[inline]
pub fn effective_distance(area: &SearchArea, location: &LocationRecord) -> f64 {
    let distance = haversine_distance(area.center, location.coordinate());
    effective_from_raw(distance, location.radius_m)
}

#[inline]
pub(crate) fn effective_from_raw(distance_m: f64, location_radius_m: f64) -> f64 {
    (distance_m - location_radius_m).max(0.0)
}

/// Check whether any part of a location's range lies within the search circle
#[inline]
pub fn overlaps(area: &SearchArea, location: &LocationRecord) -> bool {
    within_tolerance(effective_distance(area, location), area.radius_m)
}

/// False whenever either side is NaN
#[inline]
pub(crate) fn within_tolerance(effective_m: f64, search_radius_m: f64) -> bool {
    effective_m <= search_radius_m
}
