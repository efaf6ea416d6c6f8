//! Route definitions for the Crop Lifecycle Platform

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Catalogs
        .nest("/crop-types", crop_type_routes())
        .nest("/soil-types", soil_type_routes())
        .nest("/climates", climate_routes())
        // Plot registry
        .nest("/plots", plot_routes())
        .route("/lifecycle/preview", post(handlers::preview_schedule))
        // Cultivation management ledger
        .nest("/cultivation", cultivation_routes())
        .nest("/persons", person_routes())
}

/// Crop type catalog routes
///
/// `/:key` is a name for GET and a code for DELETE.
fn crop_type_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_crop_types).put(handlers::upsert_crop_type),
        )
        .route(
            "/:key",
            get(handlers::get_crop_type).delete(handlers::delete_crop_type),
        )
}

/// Soil type catalog routes
fn soil_type_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_soil_types).put(handlers::upsert_soil_type),
        )
        .route(
            "/:key",
            get(handlers::get_soil_type).delete(handlers::delete_soil_type),
        )
}

/// Climate catalog routes
fn climate_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_climates).put(handlers::upsert_climate))
        .route(
            "/:key",
            get(handlers::get_climate).delete(handlers::delete_climate),
        )
}

/// Plot registry routes
fn plot_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_plots).post(handlers::register_plot))
        .route(
            "/:number",
            get(handlers::get_plot)
                .put(handlers::update_plot)
                .delete(handlers::delete_plot),
        )
}

/// Cultivation management ledger routes
fn cultivation_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_cultivation_records).post(handlers::create_cultivation_record),
        )
        .route(
            "/:code",
            get(handlers::get_cultivation_record)
                .put(handlers::update_cultivation_record)
                .delete(handlers::delete_cultivation_record),
        )
}

/// Person directory routes
fn person_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_persons).post(handlers::create_person))
        .route(
            "/:id",
            get(handlers::get_person)
                .put(handlers::update_person)
                .delete(handlers::delete_person),
        )
}
