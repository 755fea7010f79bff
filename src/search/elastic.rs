use crate::config::ElasticConfig;
use crate::error::{ConnectorError, Result};
use crate::search::format::RawSearchResponse;
use crate::search::render::RenderedQuery;
use crate::search::traits::SearchBackend;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Elasticsearch REST client authenticated with an API key
pub struct ElasticClient {
    client: Client,
    config: ElasticConfig,
}

#[derive(Debug, Deserialize)]
struct StoredScriptResponse {
    #[serde(default)]
    found: bool,
    script: Option<StoredScript>,
}

#[derive(Debug, Deserialize)]
struct StoredScript {
    source: String,
}

impl ElasticClient {
    pub fn new(config: ElasticConfig, timeout: Duration) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("ApiKey {}", config.api_key))
            .map_err(|_| ConnectorError::Config("API key contains invalid header characters".to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ConnectorError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ElasticConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.endpoint.trim_end_matches('/'), path)
    }
}

/// Maps a non-success response onto the error taxonomy
async fn status_error(response: Response, context: &str) -> ConnectorError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            warn!("{} rejected credentials: {}", context, status);
            ConnectorError::SearchUnavailable(format!("{} rejected credentials ({})", context, status))
        }
        s if s.is_server_error() => {
            warn!("{} returned {}: {}", context, status, body);
            ConnectorError::SearchUnavailable(format!("{} returned {}", context, status))
        }
        _ => {
            error!("{} rejected request with {}: {}", context, status, body);
            ConnectorError::SearchExecutionError(format!("HTTP {}: {}", status, body))
        }
    }
}

#[async_trait]
impl SearchBackend for ElasticClient {
    async fn execute(&self, query: &RenderedQuery) -> Result<RawSearchResponse> {
        let url = self.url(&format!("{}/_search", self.config.index_name));
        let body = query.to_document();

        info!("Searching index: {}", self.config.index_name);
        debug!("Query body: {}", body);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ConnectorError::SearchUnavailable(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(status_error(response, "search").await);
        }

        let raw: RawSearchResponse = response.json().await.map_err(|e| {
            error!("Undecodable search response: {}", e);
            ConnectorError::SearchExecutionError(format!("unreadable search response: {}", e))
        })?;

        info!(
            "Search returned {} hits in {}ms",
            raw.hits.hits.len(),
            raw.took.unwrap_or_default()
        );
        Ok(raw)
    }

    async fn template_source(&self, template_id: &str) -> Result<String> {
        let url = self.url(&format!("_scripts/{}", template_id));
        debug!("Fetching stored template: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ConnectorError::SearchUnavailable(format!("request failed: {}", e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            error!("Search template '{}' not found", template_id);
            return Err(ConnectorError::SearchExecutionError(format!(
                "search template '{}' not found",
                template_id
            )));
        }
        if !response.status().is_success() {
            return Err(status_error(response, "template lookup").await);
        }

        let stored: StoredScriptResponse = response.json().await.map_err(|e| {
            ConnectorError::SearchExecutionError(format!("unreadable template response: {}", e))
        })?;

        match stored.script {
            Some(script) if stored.found => Ok(script.source),
            _ => Err(ConnectorError::SearchExecutionError(format!(
                "search template '{}' not found",
                template_id
            ))),
        }
    }

    fn backend_name(&self) -> &'static str {
        "Elasticsearch"
    }
}
