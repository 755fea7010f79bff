#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use property_scout::config::{ConnectorConfig, ElasticConfig, GeocodingConfig};
use property_scout::models::GeoPoint;
use property_scout::search::format::RawSearchResponse;
use property_scout::search::{Geocoder, PropertySearchService, RenderedQuery, SearchBackend};
use property_scout::{ConnectorError, Result};
use serde_json::json;

pub fn test_config() -> ConnectorConfig {
    ConnectorConfig::new(
        ElasticConfig::new("http://localhost:9200", "es-key"),
        GeocodingConfig::new("maps-key"),
    )
}

/// Knows a fixed set of places
pub struct MapGeocoder {
    places: Vec<(&'static str, GeoPoint)>,
    pub calls: AtomicUsize,
}

impl MapGeocoder {
    pub fn new(places: Vec<(&'static str, GeoPoint)>) -> Self {
        Self {
            places,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn miami() -> Self {
        Self::new(vec![("Miami, FL", GeoPoint::new(25.7617, -80.1918))])
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for MapGeocoder {
    async fn resolve(&self, location: &str) -> Result<GeoPoint> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.places
            .iter()
            .find(|(name, _)| *name == location)
            .map(|(_, point)| *point)
            .ok_or_else(|| ConnectorError::GeocodeNotFound {
                location: location.to_string(),
            })
    }

    fn provider_name(&self) -> &'static str {
        "in-memory"
    }
}

/// Records every executed query and answers with a canned response
pub struct RecordingBackend {
    pub executed: Mutex<Vec<RenderedQuery>>,
    response: serde_json::Value,
    template: Option<String>,
    failure: Option<fn() -> ConnectorError>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            executed: Mutex::new(Vec::new()),
            response: json!({
                "hits": {
                    "total": { "value": 2 },
                    "hits": [
                        { "_id": "a", "_score": 3.2, "fields": { "title": ["Canal-front condo"], "home_price": [480000] } },
                        { "_id": "b", "_score": 2.9, "fields": { "title": ["Bay view flat"] } }
                    ]
                }
            }),
            template: None,
            failure: None,
        }
    }

    pub fn with_template(mut self, source: &str) -> Self {
        self.template = Some(source.to_string());
        self
    }

    pub fn failing(mut self, failure: fn() -> ConnectorError) -> Self {
        self.failure = Some(failure);
        self
    }

    pub fn execution_count(&self) -> usize {
        self.executed.lock().unwrap().len()
    }

    pub fn last_query(&self) -> Option<RenderedQuery> {
        self.executed.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl SearchBackend for RecordingBackend {
    async fn execute(&self, query: &RenderedQuery) -> Result<RawSearchResponse> {
        self.executed.lock().unwrap().push(query.clone());
        if let Some(failure) = self.failure {
            return Err(failure());
        }
        Ok(serde_json::from_value(self.response.clone()).unwrap())
    }

    async fn template_source(&self, template_id: &str) -> Result<String> {
        self.template.clone().ok_or_else(|| {
            ConnectorError::SearchExecutionError(format!("search template '{}' not found", template_id))
        })
    }

    fn backend_name(&self) -> &'static str {
        "recording"
    }
}

pub fn service(
    geocoder: MapGeocoder,
    backend: RecordingBackend,
) -> PropertySearchService<MapGeocoder, RecordingBackend> {
    PropertySearchService::new(geocoder, backend, &test_config())
}
