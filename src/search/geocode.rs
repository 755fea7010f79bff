use crate::config::GeocodingConfig;
use crate::error::{ConnectorError, Result};
use crate::models::GeoPoint;
use crate::search::traits::Geocoder;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Google Geocoding API client
pub struct GoogleGeocoder {
    client: Client,
    config: GeocodingConfig,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeCandidate>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeCandidate {
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Option<LatLng>,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl GoogleGeocoder {
    pub fn new(config: GeocodingConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConnectorError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Single lookup. `Ok(None)` means the service answered but found nothing.
    async fn lookup(&self, address: &str) -> Result<Option<GeoPoint>> {
        debug!("Geocoding request for '{}'", address);

        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[
                ("address", address),
                ("region", self.config.region.as_str()),
                ("key", self.config.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ConnectorError::GeocodeServiceError(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            warn!("Geocoding service returned status: {}", response.status());
            return Err(ConnectorError::GeocodeServiceError(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body: GeocodeResponse = response.json().await.map_err(|e| {
            ConnectorError::GeocodeServiceError(format!("unreadable response: {}", e))
        })?;

        info!("Geocoding status: {}", body.status);

        match body.status.as_str() {
            "OK" => Ok(body
                .results
                .into_iter()
                .next()
                .and_then(|candidate| candidate.geometry)
                .and_then(|geometry| geometry.location)
                .map(|location| GeoPoint::new(location.lat, location.lng))),
            "ZERO_RESULTS" => Ok(None),
            status => {
                let detail = body
                    .error_message
                    .unwrap_or_else(|| "No detailed error message".to_string());
                error!("Google API error: {} - {}", status, detail);
                Err(ConnectorError::GeocodeServiceError(format!("{}: {}", status, detail)))
            }
        }
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn resolve(&self, location: &str) -> Result<GeoPoint> {
        let location = location.trim();
        if location.is_empty() {
            return Err(ConnectorError::invalid("location_text", "location must not be empty"));
        }

        info!("Attempting to geocode: '{}'", location);

        let mut point = self.lookup(location).await?;

        if point.is_none() {
            if let Some(suffix) = &self.config.fallback_suffix {
                let fallback = format!("{}, {}", location, suffix);
                info!("No results found, trying fallback: '{}'", fallback);
                point = self.lookup(&fallback).await?;
            }
        }

        match point {
            Some(point) => {
                info!(
                    "Geocoded '{}' to ({}, {})",
                    location, point.latitude, point.longitude
                );
                Ok(point)
            }
            None => {
                warn!("No geocoding results found for '{}'", location);
                Err(ConnectorError::GeocodeNotFound {
                    location: location.to_string(),
                })
            }
        }
    }

    fn provider_name(&self) -> &'static str {
        "Google Maps"
    }
}
