use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::router::appointment_routes;
use auth_cell::router::auth_routes;
use hospital_cell::router::hospital_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "LifeBoon API is running!" }))
        .nest("/api/auth", auth_routes(state.clone()))
        .nest("/api/hospitals", hospital_routes(state.clone()))
        .nest("/api/appointments", appointment_routes(state.clone()))
}
