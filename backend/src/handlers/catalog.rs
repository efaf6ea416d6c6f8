//! Catalog HTTP handlers for crop types, soil types and climates

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::{ClimateInput, CropTypeInput, SoilTypeInput};

use crate::services::CatalogService;
use crate::AppState;

// ============================================================================
// Crop types
// ============================================================================

/// List all crop types
pub async fn list_crop_types(State(state): State<AppState>) -> impl IntoResponse {
    let service = CatalogService::new(state.db.clone());

    match service.list_crop_types().await {
        Ok(crop_types) => {
            (StatusCode::OK, Json(serde_json::json!({ "crop_types": crop_types }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Get a crop type by name (case-insensitive)
pub async fn get_crop_type(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    let service = CatalogService::new(state.db.clone());

    match service.get_crop_type_by_name(&name).await {
        Ok(crop_type) => (StatusCode::OK, Json(crop_type)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a crop type, or update the one with the same name
pub async fn upsert_crop_type(
    State(state): State<AppState>,
    Json(input): Json<CropTypeInput>,
) -> impl IntoResponse {
    let service = CatalogService::new(state.db.clone());

    match service.upsert_crop_type(input).await {
        Ok(crop_type) => (StatusCode::OK, Json(crop_type)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a crop type by code
pub async fn delete_crop_type(
    State(state): State<AppState>,
    Path(code): Path<i64>,
) -> impl IntoResponse {
    let service = CatalogService::new(state.db.clone());

    match service.delete_crop_type(code).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

// ============================================================================
// Soil types
// ============================================================================

/// List all soil types
pub async fn list_soil_types(State(state): State<AppState>) -> impl IntoResponse {
    let service = CatalogService::new(state.db.clone());

    match service.list_soil_types().await {
        Ok(soil_types) => {
            (StatusCode::OK, Json(serde_json::json!({ "soil_types": soil_types }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Get a soil type by name (case-insensitive)
pub async fn get_soil_type(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    let service = CatalogService::new(state.db.clone());

    match service.get_soil_type_by_name(&name).await {
        Ok(soil_type) => (StatusCode::OK, Json(soil_type)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a soil type, or update the one with the same name
pub async fn upsert_soil_type(
    State(state): State<AppState>,
    Json(input): Json<SoilTypeInput>,
) -> impl IntoResponse {
    let service = CatalogService::new(state.db.clone());

    match service.upsert_soil_type(input).await {
        Ok(soil_type) => (StatusCode::OK, Json(soil_type)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a soil type by code
pub async fn delete_soil_type(
    State(state): State<AppState>,
    Path(code): Path<i64>,
) -> impl IntoResponse {
    let service = CatalogService::new(state.db.clone());

    match service.delete_soil_type(code).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

// ============================================================================
// Climates
// ============================================================================

/// List all climates
pub async fn list_climates(State(state): State<AppState>) -> impl IntoResponse {
    let service = CatalogService::new(state.db.clone());

    match service.list_climates().await {
        Ok(climates) => {
            (StatusCode::OK, Json(serde_json::json!({ "climates": climates }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Get a climate by name (case-insensitive)
pub async fn get_climate(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    let service = CatalogService::new(state.db.clone());

    match service.get_climate_by_name(&name).await {
        Ok(climate) => (StatusCode::OK, Json(climate)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a climate, or update the one with the same name
pub async fn upsert_climate(
    State(state): State<AppState>,
    Json(input): Json<ClimateInput>,
) -> impl IntoResponse {
    let service = CatalogService::new(state.db.clone());

    match service.upsert_climate(input).await {
        Ok(climate) => (StatusCode::OK, Json(climate)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a climate by code
pub async fn delete_climate(
    State(state): State<AppState>,
    Path(code): Path<i64>,
) -> impl IntoResponse {
    let service = CatalogService::new(state.db.clone());

    match service.delete_climate(code).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
