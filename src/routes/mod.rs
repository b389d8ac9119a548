//! Routers de la API
//!
//! Un router por entidad, anidados bajo `/api`, más `/health`.

pub mod driver_routes;
pub mod infraction_type_routes;
pub mod officer_routes;
pub mod ticket_routes;
pub mod vehicle_routes;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": env!("CARGO_PKG_NAME"), "version": env!("CARGO_PKG_VERSION") }))
}

/// Router completo de la aplicación
pub fn create_app_router(state: AppState, cors: CorsLayer) -> Router {
    let api = Router::new()
        .nest("/vehicles", vehicle_routes::create_vehicle_router())
        .nest("/drivers", driver_routes::create_driver_router())
        .nest("/infraction-types", infraction_type_routes::create_infraction_type_router())
        .nest("/officers", officer_routes::create_officer_router())
        .nest("/tickets", ticket_routes::create_ticket_router());

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
