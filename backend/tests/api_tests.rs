//! HTTP boundary tests
//!
//! Drives the router directly with `tower::ServiceExt::oneshot`; no socket
//! is opened.

mod common;

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use crop_lifecycle_backend::{
    config::{Config, DatabaseConfig, SecurityConfig, SeedConfig, ServerConfig},
    create_app, AppState,
};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn test_app() -> Router {
    let config = Config {
        environment: "test".to_string(),
        server: ServerConfig::default(),
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
        },
        seed: SeedConfig::default(),
        security: SecurityConfig {
            bcrypt_cost: common::BCRYPT_MIN_COST,
        },
    };

    create_app(AppState {
        db: common::seeded_pool().await,
        config: Arc::new(config),
    })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(body) => Body::from(body.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

#[tokio::test]
async fn test_health() {
    let app = test_app().await;

    let (status, body) = send(&app, "GET", "/api/v1/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_register_plot_over_http() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/plots",
        Some(json!({
            "crop_type_name": "Maize",
            "sown_on": "2024-01-10",
            "temperature": 21.5
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["number"], 1);
    assert_eq!(body["first_harvest_on"], "2024-04-09");
    assert_eq!(body["routine_harvest_on"], "2024-05-09");
    assert_eq!(body["temperature"], "21.5");

    let (status, body) = send(&app, "GET", "/api/v1/plots", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["plots"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_invalid_date_is_bad_request() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/plots",
        Some(json!({ "crop_type_name": "Maize", "sown_on": "ayer" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_DATE_FORMAT");
    assert_eq!(body["error"]["field"], "sown_on");
    assert!(body["error"]["message_es"].is_string());
}

#[tokio::test]
async fn test_preview_endpoint() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/lifecycle/preview",
        Some(json!({ "crop_type_name": "limones", "sown_on": "2020-03-01" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["known_crop_type"], true);
    assert_eq!(body["policy"]["kind"], "PERENNIAL_FIXED_YEARS");
    assert_eq!(body["first_harvest_on"], "2025-03-01");
    assert_eq!(body["routine_harvest_on"], "2025-08-28");
}

#[tokio::test]
async fn test_catalog_routes() {
    let app = test_app().await;

    let (status, body) = send(&app, "GET", "/api/v1/crop-types/MAIZE", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Maize");

    let (status, body) = send(
        &app,
        "PUT",
        "/api/v1/soil-types",
        Some(json!({ "name": "Peat", "description": "Organic, acidic" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let code = body["code"].as_i64().unwrap();

    let (status, _) = send(&app, "DELETE", &format!("/api/v1/soil-types/{}", code), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", "/api/v1/soil-types/peat", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_ledger_conflicts_over_http() {
    let app = test_app().await;

    let (_, maize) = send(&app, "GET", "/api/v1/crop-types/Maize", None).await;
    let (_, clay) = send(&app, "GET", "/api/v1/soil-types/Clay", None).await;
    let (_, arid) = send(&app, "GET", "/api/v1/climates/Arid", None).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/cultivation",
        Some(json!({
            "person_id": 1,
            "crop_type_code": maize["code"],
            "soil_type_code": clay["code"],
            "climate_code": 12345
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "DANGLING_REFERENCE");

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/cultivation",
        Some(json!({
            "person_id": 1,
            "crop_type_code": maize["code"],
            "soil_type_code": clay["code"],
            "climate_code": arid["code"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/v1/climates/{}", arid["code"]),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "REFERENCED_BY_LEDGER");

    let (status, body) = send(&app, "GET", "/api/v1/cultivation", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["records"][0]["climate_name"], "Arid");
}

#[tokio::test]
async fn test_person_update_over_http() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/persons",
        Some(json!({ "username": "luis", "password": "secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/v1/persons/{}", id),
        Some(json!({ "username": "luis.p", "email": "luis@farm.test", "password": "nuevo" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "luis.p");
    assert_eq!(body["email"], "luis@farm.test");

    let (status, body) = send(
        &app,
        "PUT",
        "/api/v1/persons/1",
        Some(json!({ "username": "root", "password": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_plot_update_half_pair_over_http() {
    let app = test_app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/plots",
        Some(json!({ "crop_type_name": "Maize", "sown_on": "2024-01-10" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "PUT",
        "/api/v1/plots/1",
        Some(json!({
            "crop_type_name": "Maize",
            "sown_on": "2024-01-10",
            "first_harvest_on": "2024-06-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "routine_harvest_on");

    let (_, body) = send(&app, "GET", "/api/v1/plots/1", None).await;
    assert_eq!(body["first_harvest_on"], "2024-04-09");
}
