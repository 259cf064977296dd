// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{AppointmentError, CreateAppointmentRequest};
use crate::services::booking::AppointmentBookingService;

fn map_booking_error(operation: &str, e: AppointmentError) -> AppError {
    match e {
        AppointmentError::InvalidReference
        | AppointmentError::InvalidDate
        | AppointmentError::PastDate
        | AppointmentError::InvalidTimeFormat(_)
        | AppointmentError::InvalidServiceType(_) => AppError::BadRequest(e.to_string()),
        AppointmentError::Validation(msg) => AppError::BadRequest(msg),
        AppointmentError::SlotConflict => AppError::Conflict("Time slot already booked".to_string()),
        AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        AppointmentError::Database(detail) => {
            AppError::Internal(format!("Failed to {}: {}", operation, detail))
        }
    }
}

fn parse_user_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("Invalid user ID format".to_string()))
}

fn parse_appointment_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw)
        .map_err(|_| AppError::BadRequest("Invalid appointment ID format".to_string()))
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if !request.has_required_fields() {
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    }

    let booking_service = AppointmentBookingService::new(&state);

    let appointment = booking_service
        .create_appointment(request)
        .await
        .map_err(|e| map_booking_error("create appointment", e))?;

    Ok((StatusCode::CREATED, Json(json!(appointment))))
}

#[axum::debug_handler]
pub async fn get_user_appointments(
    State(state): State<Arc<AppConfig>>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let user_id = parse_user_id(&user_id)?;
    let booking_service = AppointmentBookingService::new(&state);

    let appointments = booking_service
        .list_for_user(user_id)
        .await
        .map_err(|e| map_booking_error("fetch appointments", e))?;

    Ok(Json(json!(appointments)))
}

#[axum::debug_handler]
pub async fn get_upcoming_appointments(
    State(state): State<Arc<AppConfig>>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let user_id = parse_user_id(&user_id)?;
    let booking_service = AppointmentBookingService::new(&state);

    let appointments = booking_service
        .list_upcoming_for_user(user_id)
        .await
        .map_err(|e| map_booking_error("fetch upcoming appointments", e))?;

    Ok(Json(json!(appointments)))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let appointment_id = parse_appointment_id(&appointment_id)?;
    let booking_service = AppointmentBookingService::new(&state);

    let appointment = booking_service
        .cancel_appointment(appointment_id)
        .await
        .map_err(|e| map_booking_error("cancel appointment", e))?;

    Ok(Json(json!({
        "message": "Appointment cancelled successfully",
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<AppConfig>>,
    Path((hospital_id, date)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    let hospital_id = Uuid::parse_str(&hospital_id)
        .map_err(|_| AppError::BadRequest("Invalid hospital ID format".to_string()))?;

    let booking_service = AppointmentBookingService::new(&state);

    let availability = booking_service
        .slot_availability(hospital_id, &date)
        .await
        .map_err(|e| map_booking_error("fetch available slots", e))?;

    Ok(Json(json!(availability)))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let appointment_id = parse_appointment_id(&appointment_id)?;
    let booking_service = AppointmentBookingService::new(&state);

    let appointment = booking_service
        .get_appointment(appointment_id)
        .await
        .map_err(|e| map_booking_error("fetch appointment", e))?;

    Ok(Json(json!(appointment)))
}
