// libs/hospital-cell/src/router.rs
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn hospital_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(handlers::list_hospitals))
        .route("/", post(handlers::create_hospital))
        .route("/search", get(handlers::search_hospitals))
        .route("/{hospital_id}", get(handlers::get_hospital))
        .with_state(state)
}
