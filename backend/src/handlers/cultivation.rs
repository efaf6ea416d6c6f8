//! Cultivation management ledger HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::CultivationInput;

use crate::services::CultivationService;
use crate::AppState;

/// List ledger records with the names of what they reference
pub async fn list_cultivation_records(State(state): State<AppState>) -> impl IntoResponse {
    let service = CultivationService::new(state.db.clone());

    match service.list_joined().await {
        Ok(records) => {
            (StatusCode::OK, Json(serde_json::json!({ "records": records }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Get a ledger record by code
pub async fn get_cultivation_record(
    State(state): State<AppState>,
    Path(code): Path<i64>,
) -> impl IntoResponse {
    let service = CultivationService::new(state.db.clone());

    match service.get(code).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a ledger record
pub async fn create_cultivation_record(
    State(state): State<AppState>,
    Json(input): Json<CultivationInput>,
) -> impl IntoResponse {
    let service = CultivationService::new(state.db.clone());

    match service.create(input).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a ledger record
pub async fn update_cultivation_record(
    State(state): State<AppState>,
    Path(code): Path<i64>,
    Json(input): Json<CultivationInput>,
) -> impl IntoResponse {
    let service = CultivationService::new(state.db.clone());

    match service.update(code, input).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a ledger record
pub async fn delete_cultivation_record(
    State(state): State<AppState>,
    Path(code): Path<i64>,
) -> impl IntoResponse {
    let service = CultivationService::new(state.db.clone());

    match service.delete(code).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
