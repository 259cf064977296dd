// libs/auth-cell/src/router.rs
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use shared_config::AppConfig;

use crate::handlers;

pub fn auth_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/profile/{user_id}", get(handlers::get_profile))
        .route("/profile/{user_id}", put(handlers::update_profile))
        .route("/check-username/{username}", get(handlers::check_username))
        .with_state(state)
}
