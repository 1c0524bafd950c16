use actix_web::{web, HttpResponse, Responder};
use std::collections::HashSet;
use validator::Validate;

use super::{catalog_failed, page_window, validation_failed, AppState};
use crate::core::{find_nearby, paginate};
use crate::models::{Coordinate, ErrorResponse, NearbyQuery, PageQuery, SearchArea};
use crate::services::CacheKey;

/// Configure all species routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/species", web::get().to(list_species))
        .route("/species/nearby", web::get().to(nearby_species))
        .route("/species/{id}", web::get().to(get_species))
        .route("/species/{id}/locations", web::get().to(get_species_locations));
}

/// List species
///
/// GET /api/v1/species?cursor={cursor}&pageSize={n}&search={text}
///
/// Response body:
/// ```json
/// { "items": [...], "nextCursor": "string|null", "hasMore": false }
/// ```
async fn list_species(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> impl Responder {
    let (page_size, after) = match page_window(&state, &query) {
        Ok(window) => window,
        Err(response) => return response,
    };

    let rows = match state
        .catalog
        .species_page(query.search_term(), after, page_size + 1)
        .await
    {
        Ok(rows) => rows,
        Err(e) => return catalog_failed("Failed to list species", &e),
    };

    let page = paginate(rows, after, page_size);

    tracing::debug!(
        "Species page: {} items, has_more={}, search={:?}",
        page.items.len(),
        page.has_more,
        query.search_term()
    );

    HttpResponse::Ok().json(page)
}

/// Species whose ranges reach into a search circle
///
/// GET /api/v1/species/nearby?latitude={lat}&longitude={lon}&radius={meters}
///
/// Returns one entry per species, the closest of its ranges, ordered by
/// distance from the search center.
async fn nearby_species(
    state: web::Data<AppState>,
    query: web::Query<NearbyQuery>,
) -> impl Responder {
    if let Some(field) = query.non_finite_field() {
        tracing::info!("Rejected nearby request with non-finite {}", field);
        return HttpResponse::BadRequest().json(ErrorResponse::new(
            "Validation failed",
            format!("{} must be a finite number", field),
            400,
        ));
    }

    if let Err(errors) = query.validate() {
        tracing::info!("Validation failed for nearby request: {:?}", errors);
        return validation_failed(errors);
    }

    let max_radius = state.settings.nearby.max_radius_m;
    if query.radius > max_radius {
        return HttpResponse::BadRequest().json(ErrorResponse::new(
            "Validation failed",
            format!("radius must not exceed {} meters", max_radius),
            400,
        ));
    }

    let area = SearchArea::new(Coordinate::new(query.latitude, query.longitude), query.radius);

    let catalog = state.catalog.clone();
    let snapshot = match state
        .cache
        .get_or_load(&CacheKey::species_locations(), || async move {
            catalog.all_species_locations().await
        })
        .await
    {
        Ok(snapshot) => snapshot,
        Err(e) => return catalog_failed("Failed to load species locations", &e),
    };

    let matches = find_nearby(&area, &snapshot);

    let ids: HashSet<i64> = matches.iter().map(|m| m.entity_id).collect();
    let mut species = match state.catalog.species_by_ids(&ids).await {
        Ok(species) => species,
        Err(e) => return catalog_failed("Failed to fetch species", &e),
    };

    let outcome = state
        .aggregator
        .attach(matches, snapshot.len(), |id| species.remove(&id));

    tracing::info!(
        "Nearby search at ({}, {}) r={}m: {} species from {} locations",
        query.latitude,
        query.longitude,
        query.radius,
        outcome.results.len(),
        outcome.total_candidates
    );

    HttpResponse::Ok().json(outcome.results)
}

/// GET /api/v1/species/{id}
async fn get_species(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> impl Responder {
    let id = path.into_inner();

    match state.catalog.species(id).await {
        Ok(Some(species)) => HttpResponse::Ok().json(species),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse::new(
            "Not found",
            format!("species {} does not exist", id),
            404,
        )),
        Err(e) => catalog_failed("Failed to fetch species", &e),
    }
}

/// GET /api/v1/species/{id}/locations
async fn get_species_locations(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> impl Responder {
    let id = path.into_inner();

    match state.catalog.species_locations(id).await {
        Ok(locations) => HttpResponse::Ok().json(locations),
        Err(e) => catalog_failed("Failed to fetch species locations", &e),
    }
}
