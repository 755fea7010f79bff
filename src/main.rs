use std::sync::Arc;

use property_scout::search::{ElasticClient, GoogleGeocoder, PropertySearchService};
use property_scout::server::ToolServer;
use property_scout::ConnectorConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up a local .env if present; real environment wins
    dotenv::dotenv().ok();

    // Initialize logging on stderr; stdout is the protocol channel
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("🏠 Property Scout - Elasticsearch property search tools");

    let config = ConnectorConfig::from_env()?;
    let timeout = config.request_timeout();

    info!(
        "Using template ID: {} for index: {}",
        config.elastic.template_id, config.elastic.index_name
    );

    let geocoder = GoogleGeocoder::new(config.geocoding.clone(), timeout)?;
    let backend = ElasticClient::new(config.elastic.clone(), timeout)?;
    let service = Arc::new(PropertySearchService::new(geocoder, backend, &config));

    ToolServer::new(service).run_stdio().await
}
