use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client,
};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Duplicate key: {0}")]
    Duplicate(String),

    #[error("Store error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed store response: {0}")]
    Decode(String),
}

/// HTTP client for a MongoDB-style Data API. Every operation is a POST to
/// `{base}/action/{name}` with a JSON body naming the data source, database,
/// and collection alongside the action arguments.
pub struct DataApiClient {
    client: Client,
    base_url: String,
    api_key: String,
    data_source: String,
    database: String,
}

impl DataApiClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.data_api_url.clone(),
            api_key: config.data_api_key.clone(),
            data_source: config.data_source.clone(),
            database: config.database.clone(),
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(key) = HeaderValue::from_str(&self.api_key) {
            headers.insert("api-key", key);
        }
        headers
    }

    async fn action(&self, name: &str, collection: &str, mut args: Value) -> Result<Value, StoreError> {
        let url = format!("{}/action/{}", self.base_url, name);
        debug!("Data API {} on {}", name, collection);

        if let Some(body) = args.as_object_mut() {
            body.insert("dataSource".to_string(), json!(self.data_source));
            body.insert("database".to_string(), json!(self.database));
            body.insert("collection".to_string(), json!(collection));
        }

        let response = self
            .client
            .post(&url)
            .headers(self.headers())
            .json(&args)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Data API error ({}): {}", status, error_text);

            // A violated unique index surfaces as a duplicate-key write error.
            if error_text.contains("E11000") || error_text.contains("duplicate key") {
                return Err(StoreError::Duplicate(error_text));
            }
            return Err(StoreError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        Ok(response.json::<Value>().await?)
    }

    /// Fetch all documents matching `filter`, optionally sorted.
    pub async fn find(
        &self,
        collection: &str,
        filter: Value,
        sort: Option<Value>,
    ) -> Result<Vec<Value>, StoreError> {
        let mut args = json!({ "filter": filter });
        if let (Some(body), Some(sort)) = (args.as_object_mut(), sort) {
            body.insert("sort".to_string(), sort);
        }

        let result = self.action("find", collection, args).await?;
        match result.get("documents").and_then(Value::as_array) {
            Some(documents) => Ok(documents.clone()),
            None => Err(StoreError::Decode("missing documents array".to_string())),
        }
    }

    /// Fetch a single document, with an optional field projection.
    pub async fn find_one(
        &self,
        collection: &str,
        filter: Value,
        projection: Option<Value>,
    ) -> Result<Option<Value>, StoreError> {
        let mut args = json!({ "filter": filter });
        if let (Some(body), Some(projection)) = (args.as_object_mut(), projection) {
            body.insert("projection".to_string(), projection);
        }

        let result = self.action("findOne", collection, args).await?;
        match result.get("document") {
            Some(Value::Null) | None => Ok(None),
            Some(document) => Ok(Some(document.clone())),
        }
    }

    /// Insert one document and return its id as reported by the store.
    pub async fn insert_one(&self, collection: &str, document: Value) -> Result<String, StoreError> {
        let result = self
            .action("insertOne", collection, json!({ "document": document }))
            .await?;

        match result.get("insertedId").and_then(Value::as_str) {
            Some(id) => Ok(id.to_string()),
            None => Err(StoreError::Decode("missing insertedId".to_string())),
        }
    }

    /// Apply `update` to the first document matching `filter`; returns the
    /// matched count so callers can distinguish a missing document.
    pub async fn update_one(
        &self,
        collection: &str,
        filter: Value,
        update: Value,
    ) -> Result<u64, StoreError> {
        let result = self
            .action(
                "updateOne",
                collection,
                json!({ "filter": filter, "update": update }),
            )
            .await?;

        match result.get("matchedCount").and_then(Value::as_u64) {
            Some(matched) => Ok(matched),
            None => Err(StoreError::Decode("missing matchedCount".to_string())),
        }
    }
}
