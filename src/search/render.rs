//! Builds the engine query from [`CanonicalParameters`].
//!
//! The query is a fixed skeleton: one text clause that is always present and
//! one optional slot per filter. A slot is filled exactly when its parameter
//! is present. Filters serialize in declaration order, whatever the input.

use serde_json::{json, Map, Value};

use crate::config::ElasticConfig;
use crate::models::GeoPoint;
use crate::search::types::{Bounds, CanonicalParameters};

pub const PRICE_FIELD: &str = "home_price";
pub const BEDROOMS_FIELD: &str = "bedrooms";
pub const BATHROOMS_FIELD: &str = "bathrooms";
pub const SQUARE_FOOTAGE_FIELD: &str = "square_footage";
pub const TAX_FIELD: &str = "tax";
pub const MAINTENANCE_FIELD: &str = "maintenance_fee";
pub const FEATURES_FIELD: &str = "property_features";
pub const LOCATION_FIELD: &str = "location";

/// Document fields requested back for every hit
pub const RESULT_FIELDS: &[&str] = &[
    "title",
    PRICE_FIELD,
    BEDROOMS_FIELD,
    BATHROOMS_FIELD,
    SQUARE_FOOTAGE_FIELD,
    TAX_FIELD,
    MAINTENANCE_FIELD,
    FEATURES_FIELD,
    LOCATION_FIELD,
    "agent_name",
    "agent_phone",
    "agent_email",
];

/// Settings that shape the query but do not come from the user
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub semantic_field: String,
    pub size: usize,
}

impl RenderOptions {
    pub fn from_config(config: &ElasticConfig) -> Self {
        Self {
            semantic_field: config.semantic_field.clone(),
            size: config.result_size,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            semantic_field: "body_content_semantic".to_string(),
            size: 10,
        }
    }
}

/// Mandatory relevance clause
#[derive(Debug, Clone, PartialEq)]
pub enum TextClause {
    Semantic { field: String, query: String },
    MatchAll,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeClause<T> {
    pub field: &'static str,
    pub gte: Option<T>,
    pub lte: Option<T>,
}

impl<T> RangeClause<T> {
    fn at_least(field: &'static str, value: T) -> Self {
        Self { field, gte: Some(value), lte: None }
    }

    fn at_most(field: &'static str, value: T) -> Self {
        Self { field, gte: None, lte: Some(value) }
    }

    fn between(field: &'static str, bounds: Bounds<T>) -> Self {
        Self { field, gte: bounds.min, lte: bounds.max }
    }
}

/// Every listed feature must match
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureClause {
    pub field: &'static str,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeoDistanceClause {
    pub field: &'static str,
    pub center: GeoPoint,
    pub radius_miles: f64,
}

/// Identifies a clause independent of its values
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClauseKind {
    Text,
    PriceRange,
    MinBedrooms,
    MinBathrooms,
    SquareFootage,
    MaxTax,
    MaxMaintenance,
    Features,
    GeoDistance,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedQuery {
    pub text: TextClause,
    pub price: Option<RangeClause<f64>>,
    pub min_bedrooms: Option<RangeClause<u32>>,
    pub min_bathrooms: Option<RangeClause<u32>>,
    pub square_footage: Option<RangeClause<u32>>,
    pub max_tax: Option<RangeClause<f64>>,
    pub max_maintenance: Option<RangeClause<f64>>,
    pub features: Option<FeatureClause>,
    pub geo_distance: Option<GeoDistanceClause>,
    pub size: usize,
}

/// Fills the skeleton from `params`. Pure; performs no I/O.
pub fn render(params: &CanonicalParameters, options: &RenderOptions) -> RenderedQuery {
    let text = if params.query.trim().is_empty() {
        TextClause::MatchAll
    } else {
        TextClause::Semantic {
            field: options.semantic_field.clone(),
            query: params.query.clone(),
        }
    };

    RenderedQuery {
        text,
        price: params.price.map(|b| RangeClause::between(PRICE_FIELD, b)),
        min_bedrooms: params
            .min_bedrooms
            .map(|n| RangeClause::at_least(BEDROOMS_FIELD, n)),
        min_bathrooms: params
            .min_bathrooms
            .map(|n| RangeClause::at_least(BATHROOMS_FIELD, n)),
        square_footage: params
            .square_footage
            .map(|b| RangeClause::between(SQUARE_FOOTAGE_FIELD, b)),
        max_tax: params.max_tax.map(|v| RangeClause::at_most(TAX_FIELD, v)),
        max_maintenance: params
            .max_maintenance
            .map(|v| RangeClause::at_most(MAINTENANCE_FIELD, v)),
        features: (!params.features.is_empty()).then(|| FeatureClause {
            field: FEATURES_FIELD,
            features: params.features.iter().cloned().collect(),
        }),
        geo_distance: params.geo.map(|geo| GeoDistanceClause {
            field: LOCATION_FIELD,
            center: geo.center,
            radius_miles: geo.radius_miles,
        }),
        size: options.size,
    }
}

impl RenderedQuery {
    /// Clause kinds present, in serialization order. `Text` is always first.
    pub fn clauses(&self) -> Vec<ClauseKind> {
        let optional = [
            (self.price.is_some(), ClauseKind::PriceRange),
            (self.min_bedrooms.is_some(), ClauseKind::MinBedrooms),
            (self.min_bathrooms.is_some(), ClauseKind::MinBathrooms),
            (self.square_footage.is_some(), ClauseKind::SquareFootage),
            (self.max_tax.is_some(), ClauseKind::MaxTax),
            (self.max_maintenance.is_some(), ClauseKind::MaxMaintenance),
            (self.features.is_some(), ClauseKind::Features),
            (self.geo_distance.is_some(), ClauseKind::GeoDistance),
        ];

        std::iter::once(ClauseKind::Text)
            .chain(optional.into_iter().filter(|(present, _)| *present).map(|(_, kind)| kind))
            .collect()
    }

    pub fn has_clause(&self, kind: ClauseKind) -> bool {
        self.clauses().contains(&kind)
    }

    fn filters(&self) -> Vec<Value> {
        let mut filters = Vec::new();

        if let Some(range) = &self.price {
            filters.push(range.to_json());
        }
        if let Some(range) = &self.min_bedrooms {
            filters.push(range.to_json());
        }
        if let Some(range) = &self.min_bathrooms {
            filters.push(range.to_json());
        }
        if let Some(range) = &self.square_footage {
            filters.push(range.to_json());
        }
        if let Some(range) = &self.max_tax {
            filters.push(range.to_json());
        }
        if let Some(range) = &self.max_maintenance {
            filters.push(range.to_json());
        }
        if let Some(features) = &self.features {
            filters.push(json!({
                "match": {
                    features.field: {
                        "query": features.features.join(" "),
                        "operator": "and"
                    }
                }
            }));
        }
        if let Some(geo) = &self.geo_distance {
            filters.push(json!({
                "geo_distance": {
                    "distance": format!("{}mi", geo.radius_miles),
                    geo.field: {
                        "lat": geo.center.latitude,
                        "lon": geo.center.longitude
                    }
                }
            }));
        }

        filters
    }

    /// Query DSL document sent to the engine
    pub fn to_document(&self) -> Value {
        let text = match &self.text {
            TextClause::Semantic { field, query } => json!({
                "semantic": { "field": field, "query": query }
            }),
            TextClause::MatchAll => json!({ "match_all": {} }),
        };

        let mut bool_query = Map::new();
        bool_query.insert("must".to_string(), json!([text]));
        let filters = self.filters();
        if !filters.is_empty() {
            bool_query.insert("filter".to_string(), Value::Array(filters));
        }

        json!({
            "size": self.size,
            "_source": false,
            "fields": RESULT_FIELDS,
            "query": { "bool": bool_query }
        })
    }

    /// Serialized document; identical parameters give identical bytes
    pub fn to_json_string(&self) -> String {
        self.to_document().to_string()
    }
}

impl<T: serde::Serialize> RangeClause<T> {
    fn to_json(&self) -> Value {
        let mut bounds = Map::new();
        if let Some(gte) = &self.gte {
            bounds.insert("gte".to_string(), json!(gte));
        }
        if let Some(lte) = &self.lte {
            bounds.insert("lte".to_string(), json!(lte));
        }
        json!({ "range": { self.field: bounds } })
    }
}
