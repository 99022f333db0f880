//! Environment-driven configuration for the marketplace service.
//! Every value has a development default so a bare `cargo run` can boot;
//! production deployments set the real endpoints and secrets.

use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    /// Origin used to build checkout success/cancel URLs, e.g. "https://shop.example.com".
    pub public_origin: String,

    // Hosted BaaS (identity provider, document store, file storage)
    pub baas_endpoint: String,
    pub baas_project_id: String,
    pub baas_api_key: String,
    pub baas_database_id: String,
    pub baas_bucket_id: String,

    // Payment gateway
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            http_port: try_load("NURSERYMART_HTTP_PORT", "8080"),
            public_origin: load_or("NURSERYMART_PUBLIC_ORIGIN", "http://localhost:8080"),
            baas_endpoint: load_or("APPWRITE_ENDPOINT", "https://cloud.appwrite.io/v1"),
            baas_project_id: load_or("APPWRITE_PROJECT_ID", ""),
            baas_api_key: load_or("APPWRITE_API_KEY", ""),
            baas_database_id: load_or("APPWRITE_DATABASE_ID", ""),
            baas_bucket_id: load_or("APPWRITE_BUCKET_ID", ""),
            stripe_secret_key: load_or("STRIPE_SECRET_KEY", ""),
            stripe_webhook_secret: load_or("STRIPE_WEBHOOK_SECRET", ""),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn load_or(key: &str, default: &str) -> String {
    var(key).unwrap_or_else(|_| default.to_string())
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
