// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Coordinate, SearchArea, LocationRecord, Species, Municipality, Keyed, NearbyMatch, NearbyResult, Page};
pub use requests::{NearbyQuery, PageQuery};
pub use responses::{HealthResponse, ErrorResponse};
