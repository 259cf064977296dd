// libs/auth-cell/src/services/directory.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{DataApiClient, StoreError};
use shared_utils::password;

use crate::models::{
    coerce_f64, Address, AuthError, Insurance, LoginRequest, RegisterRequest, Session,
    UpdateProfileRequest, User,
};

const PASSWORD_HASH_FIELD: &str = "passwordHash";

pub struct UserDirectoryService {
    store: DataApiClient,
}

impl UserDirectoryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: DataApiClient::new(config),
        }
    }

    /// Create an account. The password is salted and hashed before it
    /// touches the store; the plaintext is dropped here.
    pub async fn register(&self, request: RegisterRequest) -> Result<User, AuthError> {
        let username = request.username.as_deref().map(str::trim).unwrap_or_default();
        let password = request.password.as_deref().unwrap_or_default();
        let name = request.name.as_deref().map(str::trim).unwrap_or_default();
        let raw_dob = request.date_of_birth.as_deref().unwrap_or_default();

        if username.is_empty() || password.is_empty() || name.is_empty() || raw_dob.is_empty() {
            return Err(AuthError::Validation("Missing required fields".to_string()));
        }

        let address = Self::validate_address(request.address.as_ref())?;
        let insurance = Self::validate_insurance(request.insurance.as_ref())?;

        if username.chars().count() < 3 {
            return Err(AuthError::Validation(
                "Username must be at least 3 characters".to_string(),
            ));
        }
        if username.chars().count() > 30 {
            return Err(AuthError::Validation(
                "Username cannot exceed 30 characters".to_string(),
            ));
        }
        if password.chars().count() < 6 {
            return Err(AuthError::Validation(
                "Password must be at least 6 characters".to_string(),
            ));
        }

        let date_of_birth = parse_date(raw_dob)
            .ok_or_else(|| AuthError::Validation("Invalid date of birth".to_string()))?;

        let username = username.to_lowercase();
        if self.username_exists(&username).await? {
            return Err(AuthError::UsernameTaken);
        }

        let password_hash =
            password::hash_password(password).map_err(|e| AuthError::Database(e.to_string()))?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username,
            name: name.to_string(),
            date_of_birth,
            address,
            insurance,
            created_at: now,
            updated_at: now,
        };

        let mut document = serde_json::to_value(&user)
            .map_err(|e| AuthError::Database(e.to_string()))?;
        if let Some(map) = document.as_object_mut() {
            map.insert(PASSWORD_HASH_FIELD.to_string(), json!(password_hash));
        }

        match self.store.insert_one("users", document).await {
            Ok(_) => {}
            // The unique index on username backs up the pre-check.
            Err(StoreError::Duplicate(_)) => return Err(AuthError::UsernameTaken),
            Err(e) => return Err(AuthError::Database(e.to_string())),
        }

        info!("User {} registered", user.id);
        Ok(user)
    }

    /// Verify credentials and mint a session snapshot. Unknown username and
    /// wrong password are indistinguishable to the caller.
    pub async fn authenticate(&self, request: LoginRequest) -> Result<Session, AuthError> {
        let username = request.username.as_deref().map(str::trim).unwrap_or_default();
        let password = request.password.as_deref().unwrap_or_default();

        if username.is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        let document = self
            .store
            .find_one("users", json!({ "username": username.to_lowercase() }), None)
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        let stored_hash = document
            .get(PASSWORD_HASH_FIELD)
            .and_then(Value::as_str)
            .ok_or_else(|| AuthError::Database("stored credential is malformed".to_string()))?;

        let verified = password::verify_password(password, stored_hash)
            .map_err(|e| AuthError::Database(e.to_string()))?;
        if !verified {
            warn!("Failed login attempt for username {}", username.to_lowercase());
            return Err(AuthError::InvalidCredentials);
        }

        let user = user_from_document(document)?;
        debug!("User {} logged in", user.id);

        Ok(Session {
            user,
            logged_in_at: Utc::now(),
        })
    }

    /// Profile lookup with the credential hash projected away in the store.
    pub async fn get_profile(&self, user_id: Uuid) -> Result<Value, AuthError> {
        self.store
            .find_one(
                "users",
                json!({ "_id": user_id }),
                Some(json!({ PASSWORD_HASH_FIELD: 0 })),
            )
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?
            .ok_or(AuthError::NotFound)
    }

    /// Partial profile update. Username and password are not updatable here,
    /// so the `$set` document is assembled field by field rather than taken
    /// from the request wholesale.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<Value, AuthError> {
        let mut set = Map::new();

        if let Some(name) = request.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            set.insert("name".to_string(), json!(name));
        }

        if let Some(raw_dob) = request.date_of_birth.as_deref() {
            let date_of_birth = parse_date(raw_dob)
                .ok_or_else(|| AuthError::Validation("Invalid date of birth".to_string()))?;
            set.insert("dateOfBirth".to_string(), json!(date_of_birth));
        }

        if let Some(address) = &request.address {
            if let Some(street) = &address.street {
                set.insert("address.street".to_string(), json!(street));
            }
            if let Some(city) = &address.city {
                set.insert("address.city".to_string(), json!(city));
            }
            if let Some(state) = &address.state {
                set.insert("address.state".to_string(), json!(state));
            }
            if let Some(zip_code) = &address.zip_code {
                set.insert("address.zipCode".to_string(), json!(zip_code));
            }
            if let Some(raw_lat) = &address.lat {
                let lat = coerce_f64(raw_lat)
                    .ok_or_else(|| AuthError::Validation("Invalid latitude".to_string()))?;
                set.insert("address.lat".to_string(), json!(lat));
            }
            if let Some(raw_lon) = &address.lon {
                let lon = coerce_f64(raw_lon)
                    .ok_or_else(|| AuthError::Validation("Invalid longitude".to_string()))?;
                set.insert("address.lon".to_string(), json!(lon));
            }
        }

        if let Some(insurance) = &request.insurance {
            if let Some(provider) = &insurance.provider {
                set.insert("insurance.provider".to_string(), json!(provider));
            }
            if let Some(policy_number) = &insurance.policy_number {
                set.insert("insurance.policyNumber".to_string(), json!(policy_number));
            }
        }

        set.insert("updatedAt".to_string(), json!(Utc::now()));

        let matched = self
            .store
            .update_one(
                "users",
                json!({ "_id": user_id }),
                json!({ "$set": Value::Object(set) }),
            )
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        if matched == 0 {
            return Err(AuthError::NotFound);
        }

        debug!("Profile {} updated", user_id);
        self.get_profile(user_id).await
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool, AuthError> {
        let existing = self
            .store
            .find_one(
                "users",
                json!({ "username": username.to_lowercase() }),
                Some(json!({ "_id": 1 })),
            )
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;

        Ok(existing.is_some())
    }

    fn validate_address(address: Option<&crate::models::AddressRequest>) -> Result<Address, AuthError> {
        let incomplete = || AuthError::Validation("Complete address is required".to_string());
        let address = address.ok_or_else(incomplete)?;

        let street = address.street.clone().filter(|s| !s.trim().is_empty());
        let city = address.city.clone().filter(|s| !s.trim().is_empty());
        let zip_code = address.zip_code.clone().filter(|s| !s.trim().is_empty());
        let lat = address.lat.as_ref().and_then(coerce_f64);
        let lon = address.lon.as_ref().and_then(coerce_f64);

        match (street, city, zip_code, lat, lon) {
            (Some(street), Some(city), Some(zip_code), Some(lat), Some(lon)) => Ok(Address {
                street,
                city,
                state: address
                    .state
                    .clone()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| "WA".to_string()),
                zip_code,
                lat,
                lon,
            }),
            _ => Err(incomplete()),
        }
    }

    fn validate_insurance(
        insurance: Option<&crate::models::InsuranceRequest>,
    ) -> Result<Insurance, AuthError> {
        let incomplete = || AuthError::Validation("Insurance information is required".to_string());
        let insurance = insurance.ok_or_else(incomplete)?;

        let provider = insurance.provider.clone().filter(|s| !s.trim().is_empty());
        let policy_number = insurance.policy_number.clone().filter(|s| !s.trim().is_empty());

        match (provider, policy_number) {
            (Some(provider), Some(policy_number)) => Ok(Insurance {
                provider,
                policy_number,
            }),
            _ => Err(incomplete()),
        }
    }
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

fn user_from_document(mut document: Value) -> Result<User, AuthError> {
    if let Some(map) = document.as_object_mut() {
        map.remove(PASSWORD_HASH_FIELD);
    }
    serde_json::from_value(document)
        .map_err(|e| AuthError::Database(format!("Failed to parse user: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dates_parse_from_both_accepted_formats() {
        assert!(parse_date("1990-04-12").is_some());
        assert!(parse_date("1990-04-12T08:30:00Z").is_some());
        assert!(parse_date("April 12, 1990").is_none());
    }

    #[test]
    fn user_from_document_strips_credential_hash() {
        let doc = json!({
            "_id": "d3b07384-d9a7-4f0b-8a6b-1a2b3c4d5e6f",
            "username": "adoe",
            "passwordHash": "$argon2id$v=19$...",
            "name": "Alex Doe",
            "dateOfBirth": "1990-04-12T00:00:00Z",
            "address": {
                "street": "325 9th Ave",
                "city": "Seattle",
                "state": "WA",
                "zipCode": "98104",
                "lat": 47.6050,
                "lon": -122.3226
            },
            "insurance": { "provider": "Aetna", "policyNumber": "A-1" },
            "createdAt": "2025-01-01T00:00:00Z",
            "updatedAt": "2025-01-01T00:00:00Z"
        });

        let user = user_from_document(doc).unwrap();
        let wire = serde_json::to_value(&user).unwrap();
        assert!(wire.get("passwordHash").is_none());
    }
}
