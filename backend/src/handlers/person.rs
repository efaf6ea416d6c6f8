//! Person directory HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::PersonInput;

use crate::services::PersonService;
use crate::AppState;

fn person_service(state: &AppState) -> PersonService {
    PersonService::new(state.db.clone(), state.config.security.bcrypt_cost)
}

/// List all persons
pub async fn list_persons(State(state): State<AppState>) -> impl IntoResponse {
    match person_service(&state).list().await {
        Ok(persons) => {
            (StatusCode::OK, Json(serde_json::json!({ "persons": persons }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Get a person by id
pub async fn get_person(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    match person_service(&state).get(id).await {
        Ok(person) => (StatusCode::OK, Json(person)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a person
pub async fn create_person(
    State(state): State<AppState>,
    Json(input): Json<PersonInput>,
) -> impl IntoResponse {
    match person_service(&state).create(input).await {
        Ok(person) => (StatusCode::CREATED, Json(person)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a person
pub async fn update_person(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<PersonInput>,
) -> impl IntoResponse {
    match person_service(&state).update(id, input).await {
        Ok(person) => (StatusCode::OK, Json(person)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a person
pub async fn delete_person(State(state): State<AppState>, Path(id): Path<i64>) -> impl IntoResponse {
    match person_service(&state).delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
