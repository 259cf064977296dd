use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_api_url: String,
    pub data_api_key: String,
    pub data_source: String,
    pub database: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            data_api_url: env::var("DATA_API_URL")
                .unwrap_or_else(|_| {
                    warn!("DATA_API_URL not set, using empty value");
                    String::new()
                }),
            data_api_key: env::var("DATA_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("DATA_API_KEY not set, using empty value");
                    String::new()
                }),
            data_source: env::var("DATA_API_SOURCE")
                .unwrap_or_else(|_| {
                    warn!("DATA_API_SOURCE not set, using default cluster name");
                    "lifeboon-cluster".to_string()
                }),
            database: env::var("DATA_API_DATABASE")
                .unwrap_or_else(|_| {
                    warn!("DATA_API_DATABASE not set, using default database");
                    "lifeboon".to_string()
                }),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5001),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.data_api_url.is_empty() && !self.data_api_key.is_empty()
    }
}
