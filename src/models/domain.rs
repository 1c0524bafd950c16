use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Geographic coordinate in decimal degrees
///
/// Range checks happen in the request layer; the core takes values as given.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Center and tolerance of a proximity query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchArea {
    pub center: Coordinate,
    pub radius_m: f64,
}

impl SearchArea {
    pub fn new(center: Coordinate, radius_m: f64) -> Self {
        Self { center, radius_m }
    }
}

/// A circular range owned by an entity (e.g. a species habitat)
///
/// One entity may own several disjoint ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    #[serde(rename = "entityId")]
    pub entity_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "radiusMeters")]
    pub radius_m: f64,
    #[serde(default)]
    pub description: Option<String>,
}

impl LocationRecord {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Species catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub id: i64,
    pub name: String,
    #[serde(rename = "scientificName", default)]
    pub scientific_name: Option<String>,
    /// Display names keyed by locale
    #[serde(default)]
    pub translations: BTreeMap<String, String>,
}

/// Municipality catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Municipality {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub translations: BTreeMap<String, String>,
}

/// Anything addressable by an integer surrogate key
pub trait Keyed {
    fn key(&self) -> i64;
}

impl Keyed for Species {
    fn key(&self) -> i64 {
        self.id
    }
}

impl Keyed for Municipality {
    fn key(&self) -> i64 {
        self.id
    }
}

impl Keyed for i64 {
    fn key(&self) -> i64 {
        *self
    }
}

/// Closest overlapping range of one entity, before metadata is attached
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyMatch {
    pub entity_id: i64,
    pub distance_m: f64,
    pub location: LocationRecord,
}

impl NearbyMatch {
    /// Attach caller-supplied metadata for the JSON response
    pub fn with_entity<M>(self, entity: M) -> NearbyResult<M> {
        NearbyResult {
            entity_id: self.entity_id,
            distance_m: self.distance_m,
            latitude: self.location.latitude,
            longitude: self.location.longitude,
            radius_m: self.location.radius_m,
            description: self.location.description,
            entity,
        }
    }
}

/// Nearby search result as returned to clients
///
/// `entity` is echoed unchanged and flattened into the same JSON object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyResult<M> {
    #[serde(rename = "entityId")]
    pub entity_id: i64,
    #[serde(rename = "distanceMeters")]
    pub distance_m: f64,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "radiusMeters")]
    pub radius_m: f64,
    pub description: Option<String>,
    #[serde(flatten)]
    pub entity: M,
}

/// One page of a cursor-paginated listing
///
/// `next_cursor` is set exactly when `has_more` is true.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(rename = "nextCursor")]
    pub next_cursor: Option<String>,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Convert the items while keeping cursor state intact
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
            has_more: self.has_more,
        }
    }
}
