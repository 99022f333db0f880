use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    // Startup banner at info level so something always prints at default verbosity
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    let http_port = std::env::var("NURSERYMART_HTTP_PORT").unwrap_or_else(|_| "8080".to_string());
    let baas_endpoint =
        std::env::var("APPWRITE_ENDPOINT").unwrap_or_else(|_| "https://cloud.appwrite.io/v1".to_string());
    info!(
        target: "nurserymart",
        "nurserymart starting: RUST_LOG='{}', http_port={}, baas_endpoint='{}'",
        rust_log, http_port, baas_endpoint
    );

    nurserymart::server::run().await
}
