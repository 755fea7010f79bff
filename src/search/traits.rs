use crate::error::Result;
use crate::models::GeoPoint;
use crate::search::format::RawSearchResponse;
use crate::search::render::RenderedQuery;
use async_trait::async_trait;

/// Resolves free-text locations to coordinates.
/// Lets the pipeline run against Google Maps or an in-memory fake.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Best-match coordinates for `location`
    async fn resolve(&self, location: &str) -> Result<GeoPoint>;

    /// Get the name of the geocoding provider
    fn provider_name(&self) -> &'static str;
}

/// Backing document index that executes rendered queries
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run a rendered query and return the engine's raw response
    async fn execute(&self, query: &RenderedQuery) -> Result<RawSearchResponse>;

    /// Source text of a stored search template
    async fn template_source(&self, template_id: &str) -> Result<String>;

    fn backend_name(&self) -> &'static str;
}
