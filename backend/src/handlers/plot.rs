//! Plot management HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::PlotInput;

use crate::services::PlotService;
use crate::AppState;

/// List all plots in registration order
pub async fn list_plots(State(state): State<AppState>) -> impl IntoResponse {
    let service = PlotService::new(state.db.clone());

    match service.list().await {
        Ok(plots) => (StatusCode::OK, Json(serde_json::json!({ "plots": plots }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a plot by number
pub async fn get_plot(
    State(state): State<AppState>,
    Path(number): Path<i64>,
) -> impl IntoResponse {
    let service = PlotService::new(state.db.clone());

    match service.get(number).await {
        Ok(plot) => (StatusCode::OK, Json(plot)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Register a new plot
pub async fn register_plot(
    State(state): State<AppState>,
    Json(input): Json<PlotInput>,
) -> impl IntoResponse {
    let service = PlotService::new(state.db.clone());

    match service.register(input).await {
        Ok(plot) => (StatusCode::CREATED, Json(plot)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a plot
pub async fn update_plot(
    State(state): State<AppState>,
    Path(number): Path<i64>,
    Json(input): Json<PlotInput>,
) -> impl IntoResponse {
    let service = PlotService::new(state.db.clone());

    match service.update(number, input).await {
        Ok(plot) => (StatusCode::OK, Json(plot)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a plot
pub async fn delete_plot(
    State(state): State<AppState>,
    Path(number): Path<i64>,
) -> impl IntoResponse {
    let service = PlotService::new(state.db.clone());

    match service.delete(number).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
