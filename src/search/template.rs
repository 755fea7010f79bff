use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// Placeholder names found in a stored template, with usage notes
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TemplateParameters {
    pub template_id: String,
    pub parameters: Vec<String>,
    pub descriptions: Vec<ParameterDescription>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ParameterDescription {
    pub name: String,
    pub description: String,
}

impl TemplateParameters {
    pub fn from_source(template_id: impl Into<String>, source: &str) -> Self {
        let parameters = extract_placeholders(&sanitize(source));
        let descriptions = parameters
            .iter()
            .filter_map(|name| {
                describe(name).map(|description| ParameterDescription {
                    name: name.clone(),
                    description: description.to_string(),
                })
            })
            .collect();

        Self {
            template_id: template_id.into(),
            parameters,
            descriptions,
        }
    }

    /// Human-readable listing for a conversational client
    pub fn summary(&self) -> String {
        let mut text = format!(
            "Required parameters for properties search template: {}\n\nParameter descriptions:",
            self.parameters.join(", ")
        );
        for param in &self.descriptions {
            text.push_str(&format!("\n  - {}: {}", param.name, param.description));
        }
        text
    }
}

/// Drops control characters the engine may keep in stored script sources
pub fn sanitize(source: &str) -> String {
    source
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .collect()
}

/// Unique `{{ name }}` placeholders, sorted
pub fn extract_placeholders(source: &str) -> Vec<String> {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    let pattern = PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{\s*([a-zA-Z0-9_]+)\s*\}\}").expect("placeholder pattern is valid")
    });

    pattern
        .captures_iter(source)
        .map(|caps| caps[1].to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Guidance for a template placeholder, phrased as the `search_properties`
/// argument that fills it
pub fn describe(name: &str) -> Option<&'static str> {
    let description = match name {
        "query" => "Semantic search phrase; send the user's request as free_text_query",
        "latitude" => "Search center latitude; send latitude (from geocode_location) with longitude",
        "longitude" => "Search center longitude; send longitude with latitude",
        "distance" => "Search radius in miles; send radius_miles",
        "bedrooms" => "Minimum number of bedrooms; send min_bedrooms as a whole number",
        "bathrooms" => "Minimum number of bathrooms; send min_bathrooms as a whole number",
        "tax" => "Maximum real estate tax amount; send max_tax",
        "maintenance" => "Maximum maintenance fee amount; send max_maintenance",
        "square_footage" | "square_footage_min" => {
            "Minimum square footage; send min_square_footage and leave it out when no minimum was asked for"
        }
        "square_footage_max" => "Maximum square footage; send max_square_footage",
        "home_price_min" => {
            "Minimum home price; send min_price and leave it out when no minimum was asked for"
        }
        "home_price_max" => "Maximum home price; send max_price",
        "property_features" => {
            "Required home features such as AC, pool or updated kitchen; send features as a list"
        }
        _ => return None,
    };
    Some(description)
}
