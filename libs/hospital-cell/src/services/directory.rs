// libs/hospital-cell/src/services/directory.rs
use anyhow::{anyhow, Result};
use chrono::Utc;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::DataApiClient;
use shared_utils::geo;

use crate::models::{
    CreateHospitalRequest, Hospital, HospitalSearchQuery, HospitalSearchResult,
};

pub struct HospitalDirectoryService {
    store: DataApiClient,
}

impl HospitalDirectoryService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: DataApiClient::new(config),
        }
    }

    pub async fn list_hospitals(&self) -> Result<Vec<Hospital>> {
        let documents = self
            .store
            .find("hospitals", json!({}), Some(json!({ "name": 1 })))
            .await?;

        documents
            .into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(|e| anyhow!("Failed to parse hospital: {}", e)))
            .collect()
    }

    pub async fn get_hospital(&self, hospital_id: Uuid) -> Result<Option<Hospital>> {
        debug!("Fetching hospital: {}", hospital_id);

        let document = self
            .store
            .find_one("hospitals", json!({ "_id": hospital_id }), None)
            .await?;

        match document {
            Some(doc) => Ok(Some(
                serde_json::from_value(doc).map_err(|e| anyhow!("Failed to parse hospital: {}", e))?,
            )),
            None => Ok(None),
        }
    }

    pub async fn create_hospital(&self, request: CreateHospitalRequest) -> Result<Hospital> {
        let hospital = Hospital {
            id: Uuid::new_v4(),
            name: request.name,
            address: request.address,
            phone: request.phone,
            email: request.email,
            lat: request.lat,
            lon: request.lon,
            specialties: request.specialties,
            services: request.services,
            accepts_insurance: request.accepts_insurance,
            last_updated: Utc::now(),
        };

        let document = serde_json::to_value(&hospital)?;
        self.store.insert_one("hospitals", document).await?;

        debug!("Hospital {} created", hospital.id);
        Ok(hospital)
    }

    /// Directory search with insurance/specialty/distance filters. Filtering
    /// happens in-process over the full directory; the dataset is a seeded
    /// list of facilities, not an open-ended collection.
    pub async fn search_hospitals(
        &self,
        query: &HospitalSearchQuery,
    ) -> Result<Vec<HospitalSearchResult>> {
        let hospitals = self.list_hospitals().await?;
        Ok(apply_filters(hospitals, query))
    }
}

/// Pure filter/annotate pass over a fetched directory. When an origin is
/// given, results carry a rounded `distanceMiles` and sort nearest-first;
/// otherwise directory order is preserved.
pub fn apply_filters(
    hospitals: Vec<Hospital>,
    query: &HospitalSearchQuery,
) -> Vec<HospitalSearchResult> {
    let origin = match (query.lat, query.lon) {
        (Some(lat), Some(lon)) => Some((lat, lon)),
        _ => None,
    };

    let mut results: Vec<HospitalSearchResult> = hospitals
        .into_iter()
        .filter(|hospital| {
            if let Some(insurance) = &query.insurance {
                let accepted = hospital
                    .accepts_insurance
                    .iter()
                    .any(|accepted| accepted.eq_ignore_ascii_case(insurance));
                if !accepted {
                    return false;
                }
            }

            if let Some(specialty) = &query.specialty {
                let offered = hospital
                    .specialties
                    .iter()
                    .any(|s| s.eq_ignore_ascii_case(specialty));
                if !offered {
                    return false;
                }
            }

            true
        })
        .map(|hospital| {
            let distance_miles = origin.map(|(lat, lon)| {
                geo::round1(geo::distance_miles(lat, lon, hospital.lat, hospital.lon))
            });
            HospitalSearchResult {
                hospital,
                distance_miles,
            }
        })
        .filter(|result| match (result.distance_miles, query.max_distance) {
            (Some(distance), Some(max)) => distance <= max,
            _ => true,
        })
        .collect();

    if origin.is_some() {
        results.sort_by(|a, b| {
            a.distance_miles
                .partial_cmp(&b.distance_miles)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    results
}
