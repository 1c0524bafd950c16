use serde::{Deserialize, Serialize};
use validator::Validate;

/// Query parameters for the nearby species search
///
/// GET /api/v1/species/nearby?latitude=..&longitude=..&radius=..
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NearbyQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    /// Search radius in meters
    #[validate(range(min = 0.0))]
    #[serde(alias = "radiusMeters")]
    pub radius: f64,
}

impl NearbyQuery {
    /// First field that is NaN or infinite
    ///
    /// Range validation compares false against NaN, so it lets these through.
    pub fn non_finite_field(&self) -> Option<&'static str> {
        [
            ("latitude", self.latitude),
            ("longitude", self.longitude),
            ("radius", self.radius),
        ]
        .into_iter()
        .find(|(_, value)| !value.is_finite())
        .map(|(name, _)| name)
    }
}

/// Query parameters shared by cursor-paginated listings
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PageQuery {
    #[serde(default)]
    pub cursor: Option<String>,
    #[validate(range(min = 1))]
    #[serde(rename = "pageSize", alias = "page_size", default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub search: Option<String>,
}

impl PageQuery {
    /// Trimmed search term, `None` when blank
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
