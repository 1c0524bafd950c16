// Route exports
pub mod municipalities;
pub mod species;

use actix_web::{error, http::StatusCode, web, HttpResponse, Responder};
use std::sync::Arc;
use validator::ValidationErrors;

use crate::config::Settings;
use crate::core::{cursor, CursorError, NearbyAggregator};
use crate::models::{ErrorResponse, HealthResponse, PageQuery};
use crate::services::{CacheManager, Catalog, CatalogError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub cache: Arc<CacheManager>,
    pub aggregator: NearbyAggregator,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(catalog: Catalog, settings: Settings) -> Self {
        let cache = CacheManager::new(settings.cache.max_capacity, settings.cache.location_ttl_secs);
        let aggregator = NearbyAggregator::new(settings.nearby.max_results);

        Self {
            catalog: Arc::new(catalog),
            cache: Arc::new(cache),
            aggregator,
            settings: Arc::new(settings),
        }
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
        .service(
            web::scope("/api/v1")
                .route("/health", web::get().to(health_check))
                .configure(species::configure)
                .configure(municipalities::configure),
        );
}

/// JSON error body for extractor failures
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

/// Handle query string errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("Query payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let healthy = match state.catalog.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            tracing::warn!("Catalog health check failed: {}", e);
            false
        }
    };

    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

pub(crate) fn validation_failed(errors: ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse::new("Validation failed", errors.to_string(), 400))
}

pub(crate) fn catalog_failed(context: &str, e: &CatalogError) -> HttpResponse {
    tracing::error!("{}: {}", context, e);
    HttpResponse::InternalServerError().json(ErrorResponse::new(context, e.to_string(), 500))
}

fn invalid_cursor(e: CursorError) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse::new("Invalid cursor", e.to_string(), 400))
}

/// Page size and resume key for a listing request, or the error response
pub(crate) fn page_window(state: &AppState, query: &PageQuery) -> Result<(usize, Option<i64>), HttpResponse> {
    use validator::Validate;

    query.validate().map_err(validation_failed)?;

    let page_size = state.settings.page_size(query.page_size);
    let after = cursor::resolve(query.cursor.as_deref(), state.settings.pagination.invalid_cursor)
        .map_err(invalid_cursor)?;

    Ok((page_size, after))
}
