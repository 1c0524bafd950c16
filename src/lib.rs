//! Species Atlas - species and municipality reference service
//!
//! This library provides the proximity search over species ranges and the
//! cursor pagination used by the listing endpoints.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    effective_distance, find_nearby, haversine_distance, overlaps, paginate, NearbyAggregator,
};
pub use crate::models::{
    Coordinate, LocationRecord, Municipality, NearbyResult, Page, SearchArea, Species,
};
