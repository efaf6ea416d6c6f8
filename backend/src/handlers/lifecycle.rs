//! Harvest date preview handler

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use shared::PlotInput;

use crate::services::PlotService;
use crate::AppState;

/// Compute the harvest dates a plot registration would store, without
/// writing anything
pub async fn preview_schedule(
    State(state): State<AppState>,
    Json(input): Json<PlotInput>,
) -> impl IntoResponse {
    let service = PlotService::new(state.db.clone());

    match service.preview(input).await {
        Ok(preview) => (StatusCode::OK, Json(preview)).into_response(),
        Err(e) => e.into_response(),
    }
}
