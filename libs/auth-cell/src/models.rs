// libs/auth-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Account entity as exposed over the wire. The stored document additionally
/// carries `passwordHash`, which never appears in this type or any response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub date_of_birth: DateTime<Utc>,
    pub address: Address,
    pub insurance: Insurance,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    #[serde(default = "default_state")]
    pub state: String,
    pub zip_code: String,
    pub lat: f64,
    pub lon: f64,
}

fn default_state() -> String {
    "WA".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insurance {
    pub provider: String,
    pub policy_number: String,
}

/// Explicit session object returned by login. The client owns its lifecycle
/// (load on startup, save after login, discard on logout) instead of keeping
/// ambient global state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: User,
    pub logged_in_at: DateTime<Utc>,
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

/// Registration payload. Coordinates arrive as numbers or numeric strings
/// depending on the client form, so they stay untyped until coercion.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub date_of_birth: Option<String>,
    pub address: Option<AddressRequest>,
    pub insurance: Option<InsuranceRequest>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub lat: Option<Value>,
    pub lon: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceRequest {
    pub provider: Option<String>,
    pub policy_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Profile edit payload. Username and password changes are not accepted on
/// this path; absent fields are left untouched.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub date_of_birth: Option<String>,
    pub address: Option<AddressRequest>,
    pub insurance: Option<InsuranceRequest>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("Username already exists")]
    UsernameTaken,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("User not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),
}

/// Accepts `47.6` or `"47.6"`.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coordinates_coerce_from_numbers_and_strings() {
        assert_eq!(coerce_f64(&json!(47.6)), Some(47.6));
        assert_eq!(coerce_f64(&json!("-122.33")), Some(-122.33));
        assert_eq!(coerce_f64(&json!(" 12.5 ")), Some(12.5));
        assert_eq!(coerce_f64(&json!("north")), None);
        assert_eq!(coerce_f64(&json!(null)), None);
    }

    #[test]
    fn user_serializes_without_credential_field() {
        let user: User = serde_json::from_value(json!({
            "_id": "d3b07384-d9a7-4f0b-8a6b-1a2b3c4d5e6f",
            "username": "adoe",
            "name": "Alex Doe",
            "dateOfBirth": "1990-04-12T00:00:00Z",
            "address": {
                "street": "325 9th Ave",
                "city": "Seattle",
                "zipCode": "98104",
                "lat": 47.6050,
                "lon": -122.3226
            },
            "insurance": { "provider": "Aetna", "policyNumber": "A-1" },
            "createdAt": "2025-01-01T00:00:00Z",
            "updatedAt": "2025-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(user.address.state, "WA");

        let wire = serde_json::to_value(&user).unwrap();
        assert!(wire.get("passwordHash").is_none());
        assert!(wire.get("password").is_none());
        assert_eq!(wire["address"]["zipCode"], json!("98104"));
    }
}
