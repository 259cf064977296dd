// libs/auth-cell/src/handlers.rs
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::AppError;

use crate::models::{AuthError, LoginRequest, RegisterRequest, UpdateProfileRequest};
use crate::services::directory::UserDirectoryService;

fn map_auth_error(operation: &str, e: AuthError) -> AppError {
    match e {
        AuthError::Validation(msg) => AppError::BadRequest(msg),
        AuthError::UsernameTaken => AppError::BadRequest(e.to_string()),
        AuthError::InvalidCredentials => AppError::Auth(e.to_string()),
        AuthError::NotFound => AppError::NotFound(e.to_string()),
        AuthError::Database(detail) => {
            error!("Database error during {}: {}", operation, detail);
            AppError::Internal(format!("Failed to {}", operation))
        }
    }
}

fn parse_user_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("Invalid user ID format".to_string()))
}

#[axum::debug_handler]
pub async fn register(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let directory = UserDirectoryService::new(&config);

    let user = directory
        .register(request)
        .await
        .map_err(|e| map_auth_error("register user", e))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "user": user,
        })),
    ))
}

#[axum::debug_handler]
pub async fn login(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let directory = UserDirectoryService::new(&config);

    let session = directory
        .authenticate(request)
        .await
        .map_err(|e| map_auth_error("log in", e))?;

    Ok(Json(json!({
        "message": "Login successful",
        "session": session,
    })))
}

#[axum::debug_handler]
pub async fn get_profile(
    State(config): State<Arc<AppConfig>>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let user_id = parse_user_id(&user_id)?;
    let directory = UserDirectoryService::new(&config);

    let profile = directory
        .get_profile(user_id)
        .await
        .map_err(|e| map_auth_error("fetch profile", e))?;

    Ok(Json(profile))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(config): State<Arc<AppConfig>>,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<Value>, AppError> {
    let user_id = parse_user_id(&user_id)?;
    let directory = UserDirectoryService::new(&config);

    let profile = directory
        .update_profile(user_id, request)
        .await
        .map_err(|e| map_auth_error("update profile", e))?;

    Ok(Json(json!({
        "message": "Profile updated successfully",
        "user": profile,
    })))
}

#[axum::debug_handler]
pub async fn check_username(
    State(config): State<Arc<AppConfig>>,
    Path(username): Path<String>,
) -> Result<Json<Value>, AppError> {
    let directory = UserDirectoryService::new(&config);

    let exists = directory
        .username_exists(&username)
        .await
        .map_err(|e| map_auth_error("check username", e))?;

    Ok(Json(json!({ "exists": exists })))
}
