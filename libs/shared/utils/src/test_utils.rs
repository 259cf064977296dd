use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;

/// Configuration pointing at a mock Data API server, for router tests.
pub struct TestConfig {
    pub data_api_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            data_api_url: "http://localhost:8765".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            data_api_url: base_url.to_string(),
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            data_api_url: self.data_api_url.clone(),
            data_api_key: "test-api-key".to_string(),
            data_source: "test-cluster".to_string(),
            database: "lifeboon-test".to_string(),
            port: 0,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

/// Canned store documents in the shapes the cells read back.
pub struct MockStoreResponses;

impl MockStoreResponses {
    pub fn user_doc(id: &str, username: &str, password_hash: &str) -> Value {
        json!({
            "_id": id,
            "username": username,
            "passwordHash": password_hash,
            "name": "Test Patient",
            "dateOfBirth": "1990-04-12T00:00:00Z",
            "address": {
                "street": "325 9th Ave",
                "city": "Seattle",
                "state": "WA",
                "zipCode": "98104",
                "lat": 47.6050,
                "lon": -122.3226
            },
            "insurance": {
                "provider": "BlueCross",
                "policyNumber": "BC-12345"
            },
            "createdAt": Utc::now().to_rfc3339(),
            "updatedAt": Utc::now().to_rfc3339()
        })
    }

    /// Same document with the credential field stripped, as projections
    /// return it.
    pub fn user_doc_safe(id: &str, username: &str) -> Value {
        let mut doc = Self::user_doc(id, username, "");
        if let Some(map) = doc.as_object_mut() {
            map.remove("passwordHash");
        }
        doc
    }

    pub fn hospital_doc(id: &str, name: &str, lat: f64, lon: f64) -> Value {
        json!({
            "_id": id,
            "name": name,
            "address": "325 9th Ave, Seattle, WA 98104",
            "phone": "+1-206-744-3000",
            "email": "info@example.org",
            "lat": lat,
            "lon": lon,
            "specialties": ["general", "emergency"],
            "services": {
                "beds": 120,
                "injections": ["flu", "tetanus"],
                "care": {
                    "general": ["checkup", "blood test"],
                    "eye": ["vision test"]
                },
                "other": ["emergency room"]
            },
            "acceptsInsurance": ["Aetna", "BlueCross", "Medicare"],
            "lastUpdated": Utc::now().to_rfc3339()
        })
    }

    pub fn appointment_doc(
        user_id: &str,
        hospital_id: &str,
        date: &str,
        time: &str,
        status: &str,
    ) -> Value {
        json!({
            "_id": Uuid::new_v4().to_string(),
            "userId": user_id,
            "hospitalId": hospital_id,
            "patientName": "Test Patient",
            "appointmentDate": date,
            "appointmentTime": time,
            "serviceType": "checkup",
            "specialty": "general",
            "notes": "",
            "status": status,
            "createdAt": Utc::now().to_rfc3339(),
            "updatedAt": Utc::now().to_rfc3339()
        })
    }
}
