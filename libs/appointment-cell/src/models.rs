// libs/appointment-cell/src/models.rs
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

/// A booked slot at a hospital. Serialized field names follow the wire format
/// the browser client consumes (`_id`, camelCase), which is also the document
/// shape in the `appointments` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: Uuid,
    pub hospital_id: Uuid,
    pub patient_name: String,
    /// Always normalized to UTC midnight so day matching works by equality.
    pub appointment_date: DateTime<Utc>,
    /// Slot label in `HH:MM` 24-hour form.
    pub appointment_time: String,
    pub service_type: ServiceType,
    pub specialty: String,
    #[serde(default)]
    pub notes: String,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Derived, never stored: scheduled and not in the past (day granularity).
    pub fn is_upcoming(&self) -> bool {
        self.status == AppointmentStatus::Scheduled
            && self.appointment_date.date_naive() >= Utc::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
    #[serde(rename = "no-show")]
    NoShow,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoShow => write!(f, "no-show"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Consultation,
    Checkup,
    Emergency,
    Surgery,
    Followup,
    Screening,
    Vaccination,
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceType::Consultation => write!(f, "consultation"),
            ServiceType::Checkup => write!(f, "checkup"),
            ServiceType::Emergency => write!(f, "emergency"),
            ServiceType::Surgery => write!(f, "surgery"),
            ServiceType::Followup => write!(f, "followup"),
            ServiceType::Screening => write!(f, "screening"),
            ServiceType::Vaccination => write!(f, "vaccination"),
        }
    }
}

impl FromStr for ServiceType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "consultation" => Ok(ServiceType::Consultation),
            "checkup" => Ok(ServiceType::Checkup),
            "emergency" => Ok(ServiceType::Emergency),
            "surgery" => Ok(ServiceType::Surgery),
            "followup" => Ok(ServiceType::Followup),
            "screening" => Ok(ServiceType::Screening),
            "vaccination" => Ok(ServiceType::Vaccination),
            _ => Err(()),
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

/// Raw booking request. Fields arrive untyped so each precondition can fail
/// with its own distinct error instead of a generic deserialization rejection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub user_id: Option<String>,
    pub hospital_id: Option<String>,
    pub patient_name: Option<String>,
    pub appointment_date: Option<String>,
    pub appointment_time: Option<String>,
    pub service_type: Option<String>,
    pub specialty: Option<String>,
    pub notes: Option<String>,
}

impl CreateAppointmentRequest {
    pub fn has_required_fields(&self) -> bool {
        self.user_id.is_some()
            && self.hospital_id.is_some()
            && self.appointment_date.is_some()
            && self.appointment_time.is_some()
            && self.service_type.is_some()
    }
}

/// Appointment record enriched with the referenced hospital and user
/// documents for display. The user document never carries the credential
/// field.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedAppointment {
    #[serde(flatten)]
    pub appointment: Appointment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hospital: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotAvailability {
    pub date: String,
    pub available_slots: Vec<String>,
    pub booked_slots: Vec<String>,
    pub total_slots: usize,
    pub available_count: usize,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppointmentError {
    #[error("Invalid user ID or hospital ID")]
    InvalidReference,

    #[error("Invalid date format")]
    InvalidDate,

    #[error("Cannot book appointments in the past")]
    PastDate,

    #[error("{0} is not a valid time format! Use HH:MM")]
    InvalidTimeFormat(String),

    #[error("{0} is not a valid service type")]
    InvalidServiceType(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Time slot already booked")]
    SlotConflict,

    #[error("Appointment not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),
}

// ==============================================================================
// FIELD VALIDATION HELPERS
// ==============================================================================

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([0-1]?[0-9]|2[0-3]):[0-5][0-9]$").expect("valid regex"))
}

/// `HH:MM`, 24-hour. Leading zero on the hour is optional, matching the
/// original schema validator.
pub fn is_valid_time_label(time: &str) -> bool {
    time_pattern().is_match(time)
}

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates and truncates to
/// UTC midnight.
pub fn parse_appointment_date(raw: &str) -> Option<DateTime<Utc>> {
    let date = if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        ts.with_timezone(&Utc).date_naive()
    } else {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?
    };

    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}
