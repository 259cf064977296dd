// libs/hospital-cell/src/models.rs
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A facility in the directory. Read-mostly seeded data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hospital {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub services: ServiceCatalog,
    #[serde(default)]
    pub accepts_insurance: Vec<String>,
    pub last_updated: DateTime<Utc>,
}

/// Schema-light service catalog: a bed count plus free-form categories. The
/// category set varies across seed data, so categories map either straight to
/// tags ("injections": [...]) or to named groups of tags ("surgery":
/// {"eye": [...]}).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceCatalog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beds: Option<i64>,
    #[serde(flatten)]
    pub categories: BTreeMap<String, ServiceCategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServiceCategory {
    Tags(Vec<String>),
    Groups(BTreeMap<String, Vec<String>>),
}

impl ServiceCatalog {
    /// Flattened view of every tag in the catalog, group structure ignored.
    pub fn all_tags(&self) -> impl Iterator<Item = &str> {
        self.categories.values().flat_map(|category| match category {
            ServiceCategory::Tags(tags) => {
                Box::new(tags.iter().map(String::as_str)) as Box<dyn Iterator<Item = &str>>
            }
            ServiceCategory::Groups(groups) => {
                Box::new(groups.values().flatten().map(String::as_str))
            }
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHospitalRequest {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub services: ServiceCatalog,
    #[serde(default)]
    pub accepts_insurance: Vec<String>,
}

/// Server-side expression of the client's insurance/specialty/distance
/// filtering.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalSearchQuery {
    pub insurance: Option<String>,
    pub specialty: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub max_distance: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HospitalSearchResult {
    #[serde(flatten)]
    pub hospital: Hospital,
    #[serde(rename = "distanceMiles", skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn service_catalog_accepts_mixed_category_shapes() {
        let catalog: ServiceCatalog = serde_json::from_value(json!({
            "beds": 413,
            "injections": ["flu", "tetanus"],
            "care": { "general": ["checkup"], "eye": ["vision test"] },
            "surgery": { "leg": ["knee replacement"] },
            "other": ["emergency room"]
        }))
        .unwrap();

        assert_eq!(catalog.beds, Some(413));
        let tags: Vec<&str> = catalog.all_tags().collect();
        assert!(tags.contains(&"flu"));
        assert!(tags.contains(&"vision test"));
        assert!(tags.contains(&"knee replacement"));
        assert!(tags.contains(&"emergency room"));
    }

    #[test]
    fn hospital_round_trips_wire_field_names() {
        let doc = json!({
            "_id": "9c5b94b1-35ad-49bb-b118-8e8fc24abf80",
            "name": "Harborview Medical Center",
            "address": "325 9th Ave, Seattle, WA 98104",
            "phone": "+1-206-744-3000",
            "email": "info@harborview.org",
            "lat": 47.6050,
            "lon": -122.3226,
            "specialties": ["trauma", "emergency"],
            "services": { "beds": 413, "other": ["trauma center"] },
            "acceptsInsurance": ["Aetna", "Medicare"],
            "lastUpdated": "2025-01-01T00:00:00Z"
        });

        let hospital: Hospital = serde_json::from_value(doc.clone()).unwrap();
        assert_eq!(hospital.name, "Harborview Medical Center");
        assert_eq!(hospital.accepts_insurance.len(), 2);

        let back = serde_json::to_value(&hospital).unwrap();
        assert_eq!(back["acceptsInsurance"], doc["acceptsInsurance"]);
        assert_eq!(back["_id"], doc["_id"]);
    }
}
