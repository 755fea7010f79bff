//! Turns a [`SearchIntent`] into [`CanonicalParameters`].
//!
//! Local checks run before any geocoding call, so an invalid request never
//! costs an outbound lookup.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::error::{ConnectorError, Result};
use crate::models::GeoPoint;
use crate::search::traits::Geocoder;
use crate::search::types::{Bounds, CanonicalParameters, GeoFilter, SearchIntent};

#[derive(Debug, Clone)]
pub struct ParameterNormalizer {
    default_radius_miles: f64,
}

impl ParameterNormalizer {
    pub fn new(default_radius_miles: f64) -> Self {
        Self {
            default_radius_miles,
        }
    }

    pub fn default_radius_miles(&self) -> f64 {
        self.default_radius_miles
    }

    pub async fn normalize<G>(&self, intent: SearchIntent, geocoder: &G) -> Result<CanonicalParameters>
    where
        G: Geocoder + ?Sized,
    {
        let price = validated_bounds("price", intent.min_price, intent.max_price)?;
        for (field, value) in [("min_price", intent.min_price), ("max_price", intent.max_price)] {
            check_amount(field, value)?;
        }
        check_amount("max_tax", intent.max_tax)?;
        check_amount("max_maintenance", intent.max_maintenance)?;

        let square_footage = validated_bounds(
            "square_footage",
            intent.min_square_footage,
            intent.max_square_footage,
        )?;

        let coordinates = explicit_center(&intent)?;
        let location_text = intent
            .location_text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty());
        let has_location = coordinates.is_some() || location_text.is_some();

        let radius_miles = match (has_location, intent.radius_miles) {
            (false, Some(_)) => {
                return Err(ConnectorError::invalid(
                    "radius_miles",
                    "a search radius requires a location or coordinates",
                ))
            }
            (false, None) => None,
            (true, radius) => {
                let radius = radius.unwrap_or(self.default_radius_miles);
                if !(radius.is_finite() && radius > 0.0) {
                    return Err(ConnectorError::invalid(
                        "radius_miles",
                        format!("radius must be a positive number of miles, got {}", radius),
                    ));
                }
                Some(radius)
            }
        };

        let center = match (coordinates, location_text) {
            (Some(point), _) => {
                if !point.is_valid() {
                    return Err(ConnectorError::invalid(
                        "coordinates",
                        format!(
                            "({}, {}) is outside the valid latitude/longitude range",
                            point.latitude, point.longitude
                        ),
                    ));
                }
                Some(point)
            }
            (None, Some(text)) => {
                debug!("Resolving location via {}", geocoder.provider_name());
                Some(geocoder.resolve(text).await?)
            }
            (None, None) => None,
        };

        let geo = center.zip(radius_miles).map(|(center, radius_miles)| GeoFilter {
            center,
            radius_miles,
        });

        let query = match intent.original_query {
            Some(original) if !original.trim().is_empty() => original,
            _ => intent.free_text_query,
        };

        let params = CanonicalParameters {
            query,
            geo,
            price,
            square_footage,
            min_bedrooms: intent.min_bedrooms,
            min_bathrooms: intent.min_bathrooms,
            max_tax: intent.max_tax,
            max_maintenance: intent.max_maintenance,
            features: normalize_features(&intent.features),
        };

        info!("Normalized parameters with {} filters", params.filter_count());
        Ok(params)
    }
}

/// Center given as a `coordinates` object or as top-level latitude/longitude
fn explicit_center(intent: &SearchIntent) -> Result<Option<GeoPoint>> {
    match (intent.coordinates, intent.latitude, intent.longitude) {
        (None, None, None) => Ok(None),
        (Some(point), None, None) => Ok(Some(point)),
        (None, Some(latitude), Some(longitude)) => Ok(Some(GeoPoint::new(latitude, longitude))),
        (None, Some(_), None) => Err(ConnectorError::invalid(
            "longitude",
            "latitude was given without a longitude",
        )),
        (None, None, Some(_)) => Err(ConnectorError::invalid(
            "latitude",
            "longitude was given without a latitude",
        )),
        (Some(_), _, _) => Err(ConnectorError::invalid(
            "coordinates",
            "give either a coordinates object or latitude/longitude, not both",
        )),
    }
}

/// Splits on commas, trims, lower-cases and dedupes.
/// Applying it to its own output returns the same set.
pub fn normalize_features<S: AsRef<str>>(features: &[S]) -> BTreeSet<String> {
    features
        .iter()
        .flat_map(|feature| feature.as_ref().split(','))
        .map(|feature| feature.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|feature| !feature.is_empty())
        .map(|feature| feature.to_lowercase())
        .collect()
}

fn validated_bounds<T>(field: &str, min: Option<T>, max: Option<T>) -> Result<Option<Bounds<T>>>
where
    T: Copy + PartialOrd + std::fmt::Display,
{
    if let (Some(lo), Some(hi)) = (min, max) {
        if lo > hi {
            return Err(ConnectorError::invalid(
                field,
                format!("minimum {} exceeds maximum {}", lo, hi),
            ));
        }
    }
    Ok(Bounds::new(min, max))
}

fn check_amount(field: &str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(ConnectorError::invalid(
            field,
            format!("must be a non-negative amount, got {}", v),
        )),
        _ => Ok(()),
    }
}
