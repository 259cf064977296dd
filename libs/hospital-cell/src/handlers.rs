// libs/hospital-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{CreateHospitalRequest, HospitalSearchQuery};
use crate::services::directory::HospitalDirectoryService;

#[axum::debug_handler]
pub async fn list_hospitals(State(state): State<Arc<AppConfig>>) -> Result<Json<Value>, AppError> {
    let directory = HospitalDirectoryService::new(&state);

    let hospitals = directory
        .list_hospitals()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!(hospitals)))
}

#[axum::debug_handler]
pub async fn search_hospitals(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<HospitalSearchQuery>,
) -> Result<Json<Value>, AppError> {
    if query.max_distance.is_some() && (query.lat.is_none() || query.lon.is_none()) {
        return Err(AppError::BadRequest(
            "maxDistance requires lat and lon".to_string(),
        ));
    }

    let directory = HospitalDirectoryService::new(&state);

    let results = directory
        .search_hospitals(&query)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!(results)))
}

#[axum::debug_handler]
pub async fn get_hospital(
    State(state): State<Arc<AppConfig>>,
    Path(hospital_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let hospital_id = Uuid::parse_str(&hospital_id)
        .map_err(|_| AppError::BadRequest("Invalid hospital ID format".to_string()))?;

    let directory = HospitalDirectoryService::new(&state);

    let hospital = directory
        .get_hospital(hospital_id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Hospital not found".to_string()))?;

    Ok(Json(json!(hospital)))
}

#[axum::debug_handler]
pub async fn create_hospital(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<CreateHospitalRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let directory = HospitalDirectoryService::new(&state);

    let hospital = directory
        .create_hospital(request)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok((StatusCode::CREATED, Json(json!(hospital))))
}
