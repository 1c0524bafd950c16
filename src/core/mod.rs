// Core algorithm exports
pub mod cursor;
pub mod distance;
pub mod nearby;
pub mod pager;
pub mod proximity;

pub use cursor::{CursorError, InvalidCursorPolicy};
pub use distance::haversine_distance;
pub use nearby::{find_nearby, NearbyAggregator, NearbyOutcome};
pub use pager::paginate;
pub use proximity::{effective_distance, overlaps};
