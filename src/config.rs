//! Connector configuration
//!
//! Built once at startup and handed to each component. Nothing below `main`
//! reads the process environment.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConnectorError, Result};

/// Elasticsearch connection and query settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticConfig {
    pub endpoint: String,
    pub api_key: String,

    #[serde(default = "default_index_name")]
    pub index_name: String,

    /// Identifier of the stored search template
    #[serde(default = "default_template_id")]
    pub template_id: String,

    /// `semantic_text` field the free-text query runs against
    #[serde(default = "default_semantic_field")]
    pub semantic_field: String,

    /// Maximum number of hits requested per search
    #[serde(default = "default_result_size")]
    pub result_size: usize,
}

/// Google Geocoding API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    #[serde(default = "default_geocode_endpoint")]
    pub endpoint: String,
    pub api_key: String,

    /// Region bias passed with every lookup
    #[serde(default = "default_region")]
    pub region: String,

    /// Appended to the location for a second lookup when the first finds nothing
    #[serde(default)]
    pub fallback_suffix: Option<String>,
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorConfig {
    pub elastic: ElasticConfig,
    pub geocoding: GeocodingConfig,

    /// Radius applied when a location is given without one
    #[serde(default = "default_radius_miles")]
    pub default_radius_miles: f64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl ElasticConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            index_name: default_index_name(),
            template_id: default_template_id(),
            semantic_field: default_semantic_field(),
            result_size: default_result_size(),
        }
    }

    pub fn with_index(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = index_name.into();
        self
    }

    pub fn with_template_id(mut self, template_id: impl Into<String>) -> Self {
        self.template_id = template_id.into();
        self
    }
}

impl GeocodingConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: default_geocode_endpoint(),
            api_key: api_key.into(),
            region: default_region(),
            fallback_suffix: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_fallback_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.fallback_suffix = Some(suffix.into());
        self
    }
}

impl ConnectorConfig {
    pub fn new(elastic: ElasticConfig, geocoding: GeocodingConfig) -> Self {
        Self {
            elastic,
            geocoding,
            default_radius_miles: default_radius_miles(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }

    /// Load from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| {
                ConnectorError::Config(format!("{} environment variable must be set", key))
            })
        };

        let mut elastic = ElasticConfig::new(require("ELASTIC_ENDPOINT")?, require("ELASTIC_API_KEY")?);
        if let Some(index) = get("ES_INDEX") {
            elastic = elastic.with_index(index);
        }
        if let Some(template_id) = get("PROPERTIES_SEARCH_TEMPLATE") {
            elastic = elastic.with_template_id(template_id);
        }
        if let Some(field) = get("SEMANTIC_FIELD") {
            elastic.semantic_field = field;
        }
        if let Some(size) = get("SEARCH_RESULT_SIZE") {
            elastic.result_size = parse_number("SEARCH_RESULT_SIZE", &size)?;
        }

        let mut geocoding = GeocodingConfig::new(require("GOOGLE_MAPS_API_KEY")?);
        if let Some(region) = get("GEOCODE_REGION") {
            geocoding.region = region;
        }
        if let Some(suffix) = get("GEOCODE_FALLBACK_SUFFIX") {
            geocoding = geocoding.with_fallback_suffix(suffix);
        }

        let mut config = Self::new(elastic, geocoding);
        if let Some(radius) = get("DEFAULT_RADIUS_MILES") {
            config = config.with_default_radius_miles(parse_number("DEFAULT_RADIUS_MILES", &radius)?);
        }
        if let Some(timeout) = get("REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = parse_number("REQUEST_TIMEOUT_SECS", &timeout)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_default_radius_miles(mut self, radius: f64) -> Self {
        self.default_radius_miles = radius;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        // Round sub-second timeouts up rather than down to zero
        self.request_timeout_secs = timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0);
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.default_radius_miles.is_finite() && self.default_radius_miles > 0.0) {
            return Err(ConnectorError::Config(format!(
                "default radius must be a positive number of miles, got {}",
                self.default_radius_miles
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConnectorError::Config(
                "request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.elastic.result_size == 0 {
            return Err(ConnectorError::Config("result size must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| ConnectorError::Config(format!("{} is not a valid number: {}", key, raw)))
}

// Default value functions for serde
fn default_index_name() -> String {
    "properties".to_string()
}

fn default_template_id() -> String {
    "properties-search-template".to_string()
}

fn default_semantic_field() -> String {
    "body_content_semantic".to_string()
}

fn default_result_size() -> usize {
    10
}

fn default_geocode_endpoint() -> String {
    "https://maps.googleapis.com/maps/api/geocode/json".to_string()
}

fn default_region() -> String {
    "us".to_string()
}

fn default_radius_miles() -> f64 {
    25.0
}

fn default_request_timeout_secs() -> u64 {
    30
}
