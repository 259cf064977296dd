// libs/appointment-cell/src/services/booking.rs
use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{DataApiClient, StoreError};

use crate::models::{
    is_valid_time_label, parse_appointment_date, Appointment, AppointmentError,
    AppointmentStatus, CreateAppointmentRequest, EnrichedAppointment, ServiceType,
    SlotAvailability,
};
use crate::services::conflict::ConflictCheckService;

const MAX_NOTES_LEN: usize = 500;

/// Orchestrates the appointment lifecycle: validate, check the slot, persist,
/// enrich. Appointments are never deleted; cancellation is a status
/// transition.
pub struct AppointmentBookingService {
    store: Arc<DataApiClient>,
    conflict_service: ConflictCheckService,
}

impl AppointmentBookingService {
    pub fn new(config: &AppConfig) -> Self {
        let store = Arc::new(DataApiClient::new(config));
        let conflict_service = ConflictCheckService::new(Arc::clone(&store));

        Self {
            store,
            conflict_service,
        }
    }

    /// Book a slot. Preconditions are checked in a fixed order so every
    /// failure mode is distinct; the slot itself is guarded twice: a friendly
    /// pre-check for the common case, and the partial unique index on
    /// (hospitalId, appointmentDate, appointmentTime, status=scheduled) whose
    /// duplicate-key rejection closes the remaining check-then-insert window.
    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<EnrichedAppointment, AppointmentError> {
        let user_id = request
            .user_id
            .as_deref()
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .ok_or(AppointmentError::InvalidReference)?;
        let hospital_id = request
            .hospital_id
            .as_deref()
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .ok_or(AppointmentError::InvalidReference)?;

        let raw_date = request.appointment_date.as_deref().unwrap_or_default();
        let appointment_date =
            parse_appointment_date(raw_date).ok_or(AppointmentError::InvalidDate)?;

        // Day-granularity comparison; booking for later today is allowed.
        if appointment_date.date_naive() < Utc::now().date_naive() {
            return Err(AppointmentError::PastDate);
        }

        let appointment_time = request.appointment_time.clone().unwrap_or_default();
        if !is_valid_time_label(&appointment_time) {
            return Err(AppointmentError::InvalidTimeFormat(appointment_time));
        }

        let raw_service = request.service_type.as_deref().unwrap_or_default();
        let service_type: ServiceType = raw_service
            .parse()
            .map_err(|_| AppointmentError::InvalidServiceType(raw_service.to_string()))?;

        let notes = request.notes.clone().unwrap_or_default();
        if notes.chars().count() > MAX_NOTES_LEN {
            return Err(AppointmentError::Validation(
                "Notes cannot exceed 500 characters".to_string(),
            ));
        }

        if self
            .conflict_service
            .has_conflict(hospital_id, appointment_date, &appointment_time)
            .await?
        {
            return Err(AppointmentError::SlotConflict);
        }

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            user_id,
            hospital_id,
            patient_name: request
                .patient_name
                .clone()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| "Patient".to_string()),
            appointment_date,
            appointment_time,
            service_type,
            specialty: request
                .specialty
                .clone()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "general".to_string())
                .to_lowercase(),
            notes,
            status: AppointmentStatus::Scheduled,
            created_at: now,
            updated_at: now,
        };

        let document =
            serde_json::to_value(&appointment).map_err(|e| AppointmentError::Database(e.to_string()))?;

        match self.store.insert_one("appointments", document).await {
            Ok(_) => {}
            Err(StoreError::Duplicate(detail)) => {
                warn!("Concurrent booking lost the slot for hospital {}: {}", hospital_id, detail);
                return Err(AppointmentError::SlotConflict);
            }
            Err(e) => return Err(AppointmentError::Database(e.to_string())),
        }

        info!(
            "Appointment {} booked at hospital {} for {} {}",
            appointment.id,
            hospital_id,
            appointment.appointment_date.date_naive(),
            appointment.appointment_time
        );

        self.enrich(appointment, true).await
    }

    /// Fetch one appointment, enriched with hospital and user data.
    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<EnrichedAppointment, AppointmentError> {
        debug!("Fetching appointment: {}", appointment_id);

        let appointment = self.fetch_appointment(appointment_id).await?;
        self.enrich(appointment, true).await
    }

    /// All appointments for a patient, ordered by (date asc, time asc).
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<EnrichedAppointment>, AppointmentError> {
        self.list_with_filter(json!({ "userId": user_id })).await
    }

    /// Scheduled appointments for a patient from today onward, same ordering.
    pub async fn list_upcoming_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<EnrichedAppointment>, AppointmentError> {
        let today = Utc::now()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .unwrap_or_default()
            .and_utc();

        self.list_with_filter(json!({
            "userId": user_id,
            "appointmentDate": { "$gte": today },
            "status": "scheduled"
        }))
        .await
    }

    /// Transition an appointment to `cancelled`. Idempotent: cancelling an
    /// already-cancelled appointment succeeds without changing its state.
    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<EnrichedAppointment, AppointmentError> {
        debug!("Cancelling appointment: {}", appointment_id);

        let matched = self
            .store
            .update_one(
                "appointments",
                json!({ "_id": appointment_id }),
                json!({ "$set": { "status": "cancelled", "updatedAt": Utc::now() } }),
            )
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        if matched == 0 {
            return Err(AppointmentError::NotFound);
        }

        let appointment = self.fetch_appointment(appointment_id).await?;
        info!("Appointment {} cancelled", appointment_id);

        self.enrich(appointment, false).await
    }

    /// Available/booked slot labels for a facility-day.
    pub async fn slot_availability(
        &self,
        hospital_id: Uuid,
        date_label: &str,
    ) -> Result<SlotAvailability, AppointmentError> {
        let date = parse_appointment_date(date_label).ok_or(AppointmentError::InvalidDate)?;

        self.conflict_service
            .slot_availability(hospital_id, date, date_label)
            .await
    }

    // ==============================================================================
    // PRIVATE HELPERS
    // ==============================================================================

    async fn fetch_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        let document = self
            .store
            .find_one("appointments", json!({ "_id": appointment_id }), None)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?
            .ok_or(AppointmentError::NotFound)?;

        serde_json::from_value(document)
            .map_err(|e| AppointmentError::Database(format!("Failed to parse appointment: {}", e)))
    }

    async fn list_with_filter(
        &self,
        filter: Value,
    ) -> Result<Vec<EnrichedAppointment>, AppointmentError> {
        let documents = self
            .store
            .find(
                "appointments",
                filter,
                Some(json!({ "appointmentDate": 1, "appointmentTime": 1 })),
            )
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        let appointments: Vec<Appointment> = documents
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<_, _>>()
            .map_err(|e| AppointmentError::Database(format!("Failed to parse appointments: {}", e)))?;

        // Listings reference few distinct hospitals; fetch each once.
        let mut hospitals: HashMap<Uuid, Option<Value>> = HashMap::new();
        let mut enriched = Vec::with_capacity(appointments.len());

        for appointment in appointments {
            let hospital = match hospitals.get(&appointment.hospital_id) {
                Some(cached) => cached.clone(),
                None => {
                    let fetched = self.fetch_hospital(appointment.hospital_id).await?;
                    hospitals.insert(appointment.hospital_id, fetched.clone());
                    fetched
                }
            };

            enriched.push(EnrichedAppointment {
                appointment,
                hospital,
                user: None,
            });
        }

        Ok(enriched)
    }

    async fn enrich(
        &self,
        appointment: Appointment,
        include_user: bool,
    ) -> Result<EnrichedAppointment, AppointmentError> {
        let hospital = self.fetch_hospital(appointment.hospital_id).await?;
        let user = if include_user {
            self.fetch_user(appointment.user_id).await?
        } else {
            None
        };

        Ok(EnrichedAppointment {
            appointment,
            hospital,
            user,
        })
    }

    async fn fetch_hospital(&self, hospital_id: Uuid) -> Result<Option<Value>, AppointmentError> {
        self.store
            .find_one("hospitals", json!({ "_id": hospital_id }), None)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))
    }

    // The projection strips the credential hash before it can leave the store.
    async fn fetch_user(&self, user_id: Uuid) -> Result<Option<Value>, AppointmentError> {
        self.store
            .find_one(
                "users",
                json!({ "_id": user_id }),
                Some(json!({ "passwordHash": 0 })),
            )
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))
    }
}
