//! Tool definitions advertised through `tools/list`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const SEARCH_PROPERTIES: &str = "search_properties";
pub const TEMPLATE_PARAMS: &str = "get_properties_template_params";
pub const GEOCODE_LOCATION: &str = "geocode_location";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            SEARCH_PROPERTIES,
            "Search property listings. Combines a semantic phrase with optional \
             location, price, room, size, tax, maintenance and feature filters.",
            json!({
                "type": "object",
                "properties": {
                    "free_text_query": {
                        "type": "string",
                        "description": "Search phrase used for semantic matching"
                    },
                    "original_query": {
                        "type": "string",
                        "description": "The user's request verbatim; replaces free_text_query for semantic matching"
                    },
                    "location_text": {
                        "type": "string",
                        "description": "City, neighborhood or address to search around"
                    },
                    "coordinates": {
                        "type": "object",
                        "properties": {
                            "latitude": { "type": "number", "minimum": -90, "maximum": 90 },
                            "longitude": { "type": "number", "minimum": -180, "maximum": 180 }
                        },
                        "required": ["latitude", "longitude"],
                        "description": "Search center; overrides location_text"
                    },
                    "latitude": {
                        "type": "number",
                        "minimum": -90,
                        "maximum": 90,
                        "description": "Search center latitude, e.g. from geocode_location; needs longitude"
                    },
                    "longitude": {
                        "type": "number",
                        "minimum": -180,
                        "maximum": 180,
                        "description": "Search center longitude; needs latitude"
                    },
                    "radius_miles": {
                        "type": "number",
                        "exclusiveMinimum": 0,
                        "description": "Search radius in miles; requires a location"
                    },
                    "min_price": { "type": "number", "minimum": 0 },
                    "max_price": { "type": "number", "minimum": 0 },
                    "min_bedrooms": { "type": "integer", "minimum": 0 },
                    "min_bathrooms": { "type": "integer", "minimum": 0 },
                    "min_square_footage": { "type": "integer", "minimum": 0 },
                    "max_square_footage": { "type": "integer", "minimum": 0 },
                    "max_tax": { "type": "number", "minimum": 0 },
                    "max_maintenance": { "type": "number", "minimum": 0 },
                    "features": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Required features such as pool or waterfront; all must match"
                    }
                },
                "required": ["free_text_query"],
                "additionalProperties": false
            }),
        ),
        ToolDefinition::new(
            TEMPLATE_PARAMS,
            "Get the parameters accepted by the properties search template.",
            json!({ "type": "object", "properties": {} }),
        ),
        ToolDefinition::new(
            GEOCODE_LOCATION,
            "Geocode a location string into latitude and longitude.",
            json!({
                "type": "object",
                "properties": {
                    "location": { "type": "string", "description": "Place to look up" }
                },
                "required": ["location"]
            }),
        ),
    ]
}
