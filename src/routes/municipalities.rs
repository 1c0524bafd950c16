use actix_web::{web, HttpResponse, Responder};

use super::{catalog_failed, page_window, AppState};
use crate::core::paginate;
use crate::models::PageQuery;

/// Configure all municipality routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/municipalities", web::get().to(list_municipalities));
}

/// List municipalities
///
/// GET /api/v1/municipalities?cursor={cursor}&pageSize={n}&search={text}
async fn list_municipalities(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> impl Responder {
    let (page_size, after) = match page_window(&state, &query) {
        Ok(window) => window,
        Err(response) => return response,
    };

    match state
        .catalog
        .municipalities_page(query.search_term(), after, page_size + 1)
        .await
    {
        Ok(rows) => HttpResponse::Ok().json(paginate(rows, after, page_size)),
        Err(e) => catalog_failed("Failed to list municipalities", &e),
    }
}
