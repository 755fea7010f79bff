use crate::config::ConnectorConfig;
use crate::error::Result;
use crate::models::{GeoPoint, SearchResult};
use crate::search::format::format;
use crate::search::normalize::ParameterNormalizer;
use crate::search::render::{render, RenderOptions, RenderedQuery};
use crate::search::template::TemplateParameters;
use crate::search::traits::{Geocoder, SearchBackend};
use crate::search::types::SearchIntent;
use tracing::{debug, info};

/// Normalize, render, execute, format
pub struct PropertySearchService<G, B> {
    geocoder: G,
    backend: B,
    normalizer: ParameterNormalizer,
    render_options: RenderOptions,
    template_id: String,
}

impl<G, B> PropertySearchService<G, B>
where
    G: Geocoder,
    B: SearchBackend,
{
    pub fn new(geocoder: G, backend: B, config: &ConnectorConfig) -> Self {
        Self {
            geocoder,
            backend,
            normalizer: ParameterNormalizer::new(config.default_radius_miles),
            render_options: RenderOptions::from_config(&config.elastic),
            template_id: config.elastic.template_id.clone(),
        }
    }

    /// Normalize and render without executing
    pub async fn plan(&self, intent: SearchIntent) -> Result<RenderedQuery> {
        let params = self.normalizer.normalize(intent, &self.geocoder).await?;
        let query = render(&params, &self.render_options);
        debug!("Rendered clauses: {:?}", query.clauses());
        Ok(query)
    }

    pub async fn search(&self, intent: SearchIntent) -> Result<SearchResult> {
        info!(
            "User query: {}",
            intent.original_query.as_deref().unwrap_or(&intent.free_text_query)
        );

        let query = self.plan(intent).await?;
        let raw = self.backend.execute(&query).await?;
        let result = format(raw);

        info!(
            "Found {} properties via {}, returning {}",
            result.total,
            self.backend.backend_name(),
            result.properties.len()
        );
        Ok(result)
    }

    pub async fn geocode(&self, location: &str) -> Result<GeoPoint> {
        self.geocoder.resolve(location).await
    }

    pub async fn template_parameters(&self) -> Result<TemplateParameters> {
        let source = self.backend.template_source(&self.template_id).await?;
        let params = TemplateParameters::from_source(&self.template_id, &source);
        info!(
            "Found parameters for template {}: {:?}",
            self.template_id, params.parameters
        );
        Ok(params)
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}
