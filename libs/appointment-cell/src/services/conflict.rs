// libs/appointment-cell/src/services/conflict.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::DataApiClient;

use crate::models::{AppointmentError, SlotAvailability};
use crate::services::slots;

/// Occupancy checks against the `appointments` collection. Only records in
/// status `scheduled` count; cancelled and completed appointments release
/// their slot.
pub struct ConflictCheckService {
    store: Arc<DataApiClient>,
}

impl ConflictCheckService {
    pub fn new(store: Arc<DataApiClient>) -> Self {
        Self { store }
    }

    fn slot_filter(hospital_id: Uuid, date: DateTime<Utc>, time: &str) -> Value {
        json!({
            "hospitalId": hospital_id,
            "appointmentDate": date,
            "appointmentTime": time,
            "status": "scheduled"
        })
    }

    /// True iff a scheduled appointment already occupies the exact
    /// (hospital, normalized date, time) triple.
    pub async fn has_conflict(
        &self,
        hospital_id: Uuid,
        date: DateTime<Utc>,
        time: &str,
    ) -> Result<bool, AppointmentError> {
        debug!("Checking slot occupancy for hospital {} at {} {}", hospital_id, date, time);

        let existing = self
            .store
            .find_one("appointments", Self::slot_filter(hospital_id, date, time), None)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        if existing.is_some() {
            warn!("Slot conflict for hospital {} on {} at {}", hospital_id, date.date_naive(), time);
        }

        Ok(existing.is_some())
    }

    /// Time labels of all scheduled appointments for a facility-day.
    pub async fn booked_times(
        &self,
        hospital_id: Uuid,
        date: DateTime<Utc>,
    ) -> Result<Vec<String>, AppointmentError> {
        let documents = self
            .store
            .find(
                "appointments",
                json!({
                    "hospitalId": hospital_id,
                    "appointmentDate": date,
                    "status": "scheduled"
                }),
                Some(json!({ "appointmentTime": 1 })),
            )
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        Ok(documents
            .iter()
            .filter_map(|doc| doc.get("appointmentTime").and_then(Value::as_str))
            .map(str::to_string)
            .collect())
    }

    /// Full calendar minus the booked set, order preserved. `date_label`
    /// echoes the caller-supplied date string back in the payload.
    pub async fn slot_availability(
        &self,
        hospital_id: Uuid,
        date: DateTime<Utc>,
        date_label: &str,
    ) -> Result<SlotAvailability, AppointmentError> {
        let booked_slots = self.booked_times(hospital_id, date).await?;
        let all_slots = slots::daily_slots();
        let total_slots = all_slots.len();

        let available_slots: Vec<String> = all_slots
            .into_iter()
            .filter(|slot| !booked_slots.contains(slot))
            .collect();

        Ok(SlotAvailability {
            date: date_label.to_string(),
            available_count: available_slots.len(),
            available_slots,
            booked_slots,
            total_slots,
        })
    }
}
