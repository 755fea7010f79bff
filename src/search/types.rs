use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::models::GeoPoint;

/// Loosely structured search request, as extracted from the user's message.
///
/// Unknown keys are rejected so no argument is lost on the way in.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SearchIntent {
    /// Free-text location, e.g. "Miami, FL"
    #[serde(alias = "locationText", alias = "location")]
    pub location_text: Option<String>,
    /// Explicit coordinates; take precedence over `location_text`
    pub coordinates: Option<GeoPoint>,
    /// Top-level latitude, paired with `longitude` into a center
    #[serde(alias = "lat")]
    pub latitude: Option<f64>,
    #[serde(alias = "lon", alias = "lng")]
    pub longitude: Option<f64>,
    #[serde(alias = "radiusMiles", alias = "distance")]
    pub radius_miles: Option<f64>,
    #[serde(alias = "minPrice", alias = "home_price_min")]
    pub min_price: Option<f64>,
    #[serde(alias = "maxPrice", alias = "home_price_max")]
    pub max_price: Option<f64>,
    #[serde(alias = "minBedrooms", alias = "bedrooms")]
    pub min_bedrooms: Option<u32>,
    #[serde(alias = "minBathrooms", alias = "bathrooms")]
    pub min_bathrooms: Option<u32>,
    #[serde(
        alias = "minSquareFootage",
        alias = "square_footage_min",
        alias = "square_footage"
    )]
    pub min_square_footage: Option<u32>,
    #[serde(alias = "maxSquareFootage", alias = "square_footage_max")]
    pub max_square_footage: Option<u32>,
    #[serde(alias = "maxTax", alias = "tax")]
    pub max_tax: Option<f64>,
    #[serde(alias = "maxMaintenance", alias = "maintenance")]
    pub max_maintenance: Option<f64>,
    /// Feature keywords; accepts a list or a single comma-separated string
    #[serde(alias = "property_features", deserialize_with = "deserialize_features")]
    pub features: Vec<String>,
    /// Phrase handed to the engine's semantic clause
    #[serde(alias = "freeTextQuery", alias = "query")]
    pub free_text_query: String,
    /// Verbatim user request; used as the semantic phrase when present
    #[serde(alias = "originalQuery")]
    pub original_query: Option<String>,
}

impl SearchIntent {
    pub fn new(free_text_query: impl Into<String>) -> Self {
        Self {
            free_text_query: free_text_query.into(),
            ..Default::default()
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location_text = Some(location.into());
        self
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.coordinates = Some(GeoPoint::new(latitude, longitude));
        self
    }

    pub fn with_lat_lon(mut self, latitude: Option<f64>, longitude: Option<f64>) -> Self {
        self.latitude = latitude;
        self.longitude = longitude;
        self
    }

    pub fn with_radius(mut self, miles: f64) -> Self {
        self.radius_miles = Some(miles);
        self
    }

    pub fn with_price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    pub fn with_min_bedrooms(mut self, bedrooms: u32) -> Self {
        self.min_bedrooms = Some(bedrooms);
        self
    }

    pub fn with_min_bathrooms(mut self, bathrooms: u32) -> Self {
        self.min_bathrooms = Some(bathrooms);
        self
    }

    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features = features.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FeatureInput {
    List(Vec<String>),
    Text(String),
}

fn deserialize_features<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let input = Option::<FeatureInput>::deserialize(deserializer)?;
    Ok(match input {
        None => Vec::new(),
        Some(FeatureInput::List(list)) => list,
        Some(FeatureInput::Text(text)) => vec![text],
    })
}

/// Optional lower and upper bound; never both absent
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Bounds<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T: Copy> Bounds<T> {
    pub fn new(min: Option<T>, max: Option<T>) -> Option<Self> {
        if min.is_none() && max.is_none() {
            None
        } else {
            Some(Self { min, max })
        }
    }
}

/// Geo filter: a center and a positive radius
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct GeoFilter {
    pub center: GeoPoint,
    pub radius_miles: f64,
}

/// Normalized search parameters. The renderer reads nothing else.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CanonicalParameters {
    pub query: String,
    pub geo: Option<GeoFilter>,
    pub price: Option<Bounds<f64>>,
    pub square_footage: Option<Bounds<u32>>,
    pub min_bedrooms: Option<u32>,
    pub min_bathrooms: Option<u32>,
    pub max_tax: Option<f64>,
    pub max_maintenance: Option<f64>,
    /// Lower-cased, deduplicated, sorted
    pub features: BTreeSet<String>,
}

impl CanonicalParameters {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Number of optional filters carried
    pub fn filter_count(&self) -> usize {
        [
            self.geo.is_some(),
            self.price.is_some(),
            self.square_footage.is_some(),
            self.min_bedrooms.is_some(),
            self.min_bathrooms.is_some(),
            self.max_tax.is_some(),
            self.max_maintenance.is_some(),
            !self.features.is_empty(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }
}
