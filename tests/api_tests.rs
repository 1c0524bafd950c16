// HTTP tests for Species Atlas against the in-memory catalog

use actix_web::{http::StatusCode, test, web, App};
use serde_json::Value;
use std::collections::BTreeMap;

use species_atlas::config::Settings;
use species_atlas::core::{cursor, InvalidCursorPolicy};
use species_atlas::models::{LocationRecord, Municipality, Species};
use species_atlas::routes::{configure_routes, AppState};
use species_atlas::services::{Catalog, MemoryCatalog, SeedData};

fn species(id: i64, name: &str) -> Species {
    Species {
        id,
        name: name.to_string(),
        scientific_name: Some(format!("Genus {}", id)),
        translations: BTreeMap::new(),
    }
}

fn municipality(id: i64, name: &str) -> Municipality {
    Municipality {
        id,
        name: name.to_string(),
        region: None,
        translations: BTreeMap::new(),
    }
}

fn location(entity_id: i64, lat: f64, lon: f64, radius_m: f64) -> LocationRecord {
    LocationRecord {
        entity_id,
        latitude: lat,
        longitude: lon,
        radius_m,
        description: None,
    }
}

fn seed() -> SeedData {
    SeedData {
        species: vec![
            species(1, "Common Coqui"),
            species(3, "Puerto Rican Parrot"),
            species(7, "Golden Coqui"),
            species(9, "Puerto Rican Boa"),
        ],
        municipalities: vec![
            municipality(1, "Adjuntas"),
            municipality(2, "Cayey"),
            municipality(3, "Utuado"),
        ],
        locations: vec![
            location(1, 18.16, -66.49, 2000.0),
            location(1, 18.40, -66.00, 2000.0),
            location(3, 18.17, -66.50, 100.0),
            location(9, 18.60, -67.10, 100.0),
            // No species 42 in the catalog
            location(42, 18.15, -66.50, 100.0),
        ],
    }
}

fn state_with(settings: Settings) -> AppState {
    AppState::new(Catalog::Memory(MemoryCatalog::new(seed())), settings)
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .configure(configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_health() {
    let app = app!(state_with(Settings::default()));

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn test_species_pages_chain() {
    let app = app!(state_with(Settings::default()));

    let req = test::TestRequest::get().uri("/api/v1/species?pageSize=2").to_request();
    let first: Value = test::call_and_read_body_json(&app, req).await;

    let ids: Vec<i64> = first["items"].as_array().unwrap().iter().map(|s| s["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(first["hasMore"], true);
    assert_eq!(first["nextCursor"], cursor::encode(3));

    let uri = format!("/api/v1/species?pageSize=2&cursor={}", first["nextCursor"].as_str().unwrap());
    let req = test::TestRequest::get().uri(&uri).to_request();
    let second: Value = test::call_and_read_body_json(&app, req).await;

    let ids: Vec<i64> = second["items"].as_array().unwrap().iter().map(|s| s["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![7, 9]);
    assert_eq!(second["hasMore"], false);
    assert!(second["nextCursor"].is_null());
}

#[actix_web::test]
async fn test_species_search() {
    let app = app!(state_with(Settings::default()));

    let req = test::TestRequest::get().uri("/api/v1/species?search=coqui").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let names: Vec<&str> = body["items"].as_array().unwrap().iter().map(|s| s["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Common Coqui", "Golden Coqui"]);
    assert_eq!(body["hasMore"], false);
}

#[actix_web::test]
async fn test_malformed_cursor_restarts_by_default() {
    let app = app!(state_with(Settings::default()));

    let req = test::TestRequest::get().uri("/api/v1/municipalities?cursor=%25%25bad").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["items"][0]["name"], "Adjuntas");
    assert_eq!(body["items"].as_array().unwrap().len(), 3);
}

#[actix_web::test]
async fn test_malformed_cursor_rejected_when_configured() {
    let mut settings = Settings::default();
    settings.pagination.invalid_cursor = InvalidCursorPolicy::Reject;
    let app = app!(state_with(settings));

    let req = test::TestRequest::get().uri("/api/v1/municipalities?cursor=%25%25bad").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_zero_page_size_rejected() {
    let app = app!(state_with(Settings::default()));

    let req = test::TestRequest::get().uri("/api/v1/species?pageSize=0").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_nearby_species() {
    let app = app!(state_with(Settings::default()));

    let req = test::TestRequest::get()
        .uri("/api/v1/species/nearby?latitude=18.15&longitude=-66.50&radius=5000")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let results = body.as_array().unwrap();
    let ids: Vec<i64> = results.iter().map(|r| r["entityId"].as_i64().unwrap()).collect();
    // Species 1 once despite two ranges; unknown species 42 dropped; 9 out of range
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(results[0]["name"], "Common Coqui");
    assert_eq!(results[0]["latitude"], 18.16);
    assert!(results[0]["distanceMeters"].as_f64().unwrap() < results[1]["distanceMeters"].as_f64().unwrap());
}

#[actix_web::test]
async fn test_nearby_zero_radius_inside_range() {
    let app = app!(state_with(Settings::default()));

    let req = test::TestRequest::get()
        .uri("/api/v1/species/nearby?latitude=18.16&longitude=-66.49&radius=0")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let results = body.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["entityId"], 1);
    assert_eq!(results[0]["distanceMeters"], 0.0);
}

#[actix_web::test]
async fn test_nearby_validation() {
    let app = app!(state_with(Settings::default()));

    for uri in [
        "/api/v1/species/nearby?latitude=91&longitude=-66.50&radius=5000",
        "/api/v1/species/nearby?latitude=18.15&longitude=-66.50&radius=-1",
        "/api/v1/species/nearby?latitude=18.15&longitude=-66.50&radius=1000000",
        "/api/v1/species/nearby?latitude=abc&longitude=-66.50&radius=5000",
        "/api/v1/species/nearby?latitude=18.15",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[actix_web::test]
async fn test_nearby_rejects_non_finite_values() {
    let app = app!(state_with(Settings::default()));

    for uri in [
        "/api/v1/species/nearby?latitude=18.15&longitude=-66.50&radius=NaN",
        "/api/v1/species/nearby?latitude=18.15&longitude=-66.50&radius=inf",
        "/api/v1/species/nearby?latitude=NaN&longitude=-66.50&radius=5000",
        "/api/v1/species/nearby?latitude=18.15&longitude=NaN&radius=5000",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[actix_web::test]
async fn test_species_detail_and_locations() {
    let app = app!(state_with(Settings::default()));

    let req = test::TestRequest::get().uri("/api/v1/species/7").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["name"], "Golden Coqui");
    assert_eq!(body["scientificName"], "Genus 7");

    let req = test::TestRequest::get().uri("/api/v1/species/8").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get().uri("/api/v1/species/1/locations").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[0]["radiusMeters"], 2000.0);
}
