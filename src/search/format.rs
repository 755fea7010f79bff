use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::{AgentInfo, GeoPoint, Property, SearchResult};

/// Subset of the engine's `_search` response we read
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSearchResponse {
    #[serde(default)]
    pub took: Option<u64>,
    #[serde(default)]
    pub hits: RawHits,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawHits {
    #[serde(default)]
    pub total: Option<RawTotal>,
    #[serde(default)]
    pub hits: Vec<RawHit>,
}

/// `hits.total` is an object on current engines and a bare number on old ones
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTotal {
    Object { value: u64 },
    Count(u64),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawHit {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub fields: Map<String, Value>,
    #[serde(rename = "_source", default)]
    pub source: Option<Value>,
}

impl RawHit {
    /// Looks in `fields` first (multi-valued, take the first), then `_source`.
    /// Dotted names walk nested `_source` objects.
    fn get(&self, name: &str) -> Option<&Value> {
        let from_fields = self.fields.get(name).and_then(|value| match value {
            Value::Array(items) => items.first(),
            other => Some(other),
        });

        from_fields
            .or_else(|| {
                let source = self.source.as_ref()?;
                name.split('.').try_fold(source, |node, key| node.get(key))
            })
            .filter(|value| !value.is_null())
    }

    fn number(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().replace(',', "").parse().ok(),
            _ => None,
        }
    }

    fn text(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Array(items) => {
                let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
                (!parts.is_empty()).then(|| parts.join(", "))
            }
            _ => None,
        }
    }

    fn features(&self) -> Option<String> {
        // `fields` flattens arrays, so read the whole list when present
        match self.fields.get("property_features") {
            Some(Value::Array(items)) if items.len() > 1 => {
                let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
                (!parts.is_empty()).then(|| parts.join(", "))
            }
            _ => self.text("property_features"),
        }
    }

    fn location(&self) -> Option<GeoPoint> {
        let point = match self.get("location")? {
            Value::Object(obj) => {
                if let (Some(lat), Some(lon)) = (obj.get("lat"), obj.get("lon")) {
                    Some(GeoPoint::new(lat.as_f64()?, lon.as_f64()?))
                } else {
                    // GeoJSON: [lon, lat]
                    let coords = obj.get("coordinates")?.as_array()?;
                    Some(GeoPoint::new(coords.get(1)?.as_f64()?, coords.first()?.as_f64()?))
                }
            }
            Value::String(s) => {
                let (lat, lon) = s.split_once(',')?;
                Some(GeoPoint::new(lat.trim().parse().ok()?, lon.trim().parse().ok()?))
            }
            _ => None,
        }?;
        point.is_valid().then_some(point)
    }

    fn agent(&self) -> Option<AgentInfo> {
        let agent = AgentInfo {
            name: self.text("agent_name").or_else(|| self.text("agent.name")),
            phone: self.text("agent_phone").or_else(|| self.text("agent.phone")),
            email: self.text("agent_email").or_else(|| self.text("agent.email")),
        };
        (!agent.is_empty()).then_some(agent)
    }
}

/// Reshapes engine hits into the client-facing result.
/// Missing or mistyped fields come out as `None`.
pub fn format(raw: RawSearchResponse) -> SearchResult {
    let hit_count = raw.hits.hits.len() as u64;
    let total = match raw.hits.total {
        Some(RawTotal::Object { value }) | Some(RawTotal::Count(value)) => value,
        None => hit_count,
    };

    let properties = raw
        .hits
        .hits
        .iter()
        .map(|hit| Property {
            id: hit.id.clone(),
            title: hit.text("title"),
            home_price: hit.number("home_price"),
            bedrooms: hit.number("bedrooms"),
            bathrooms: hit.number("bathrooms"),
            square_footage: hit.number("square_footage"),
            tax: hit.number("tax"),
            maintenance_fee: hit.number("maintenance_fee"),
            property_features: hit.features(),
            location: hit.location(),
            agent: hit.agent(),
            score: hit.score,
        })
        .collect();

    SearchResult { total, properties }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> RawSearchResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_formats_fields_hits() {
        let raw = parse(json!({
            "took": 4,
            "hits": {
                "total": { "value": 42, "relation": "eq" },
                "hits": [{
                    "_id": "abc",
                    "_score": 7.5,
                    "fields": {
                        "title": ["Bayfront condo"],
                        "home_price": [450000],
                        "bedrooms": [2],
                        "bathrooms": [2.5],
                        "property_features": ["pool", "dock"],
                        "location": [{ "type": "Point", "coordinates": [-80.19, 25.76] }],
                        "agent_name": ["Dana Reyes"]
                    }
                }]
            }
        }));

        let result = format(raw);
        assert_eq!(result.total, 42);
        let property = &result.properties[0];
        assert_eq!(property.id, "abc");
        assert_eq!(property.title.as_deref(), Some("Bayfront condo"));
        assert_eq!(property.home_price, Some(450000.0));
        assert_eq!(property.bathrooms, Some(2.5));
        assert_eq!(property.property_features.as_deref(), Some("pool, dock"));
        assert_eq!(property.location, Some(GeoPoint::new(25.76, -80.19)));
        assert_eq!(property.agent.as_ref().and_then(|a| a.name.as_deref()), Some("Dana Reyes"));
        assert_eq!(property.score, Some(7.5));
    }

    #[test]
    fn test_missing_fields_render_as_absent() {
        let raw = parse(json!({
            "hits": { "hits": [{ "_id": "bare", "_score": null }] }
        }));

        let result = format(raw);
        assert_eq!(result.total, 1);
        let property = &result.properties[0];
        assert_eq!(property.id, "bare");
        assert_eq!(property.title, None);
        assert_eq!(property.home_price, None);
        assert_eq!(property.agent, None);
        assert_eq!(property.score, None);
    }

    #[test]
    fn test_falls_back_to_source() {
        let raw = parse(json!({
            "hits": {
                "total": 3,
                "hits": [{
                    "_id": "src",
                    "_source": {
                        "title": "Ranch home",
                        "home_price": "325,000",
                        "location": { "lat": 27.95, "lon": -82.45 },
                        "agent": { "phone": "555-0100" }
                    }
                }]
            }
        }));

        let result = format(raw);
        assert_eq!(result.total, 3);
        let property = &result.properties[0];
        assert_eq!(property.title.as_deref(), Some("Ranch home"));
        assert_eq!(property.home_price, Some(325000.0));
        assert_eq!(property.location, Some(GeoPoint::new(27.95, -82.45)));
        assert_eq!(property.agent.as_ref().and_then(|a| a.phone.as_deref()), Some("555-0100"));
    }

    #[test]
    fn test_mistyped_values_are_ignored() {
        let raw = parse(json!({
            "hits": { "hits": [{
                "_id": "odd",
                "fields": { "bedrooms": [true], "location": ["not a point"] }
            }] }
        }));

        let property = &format(raw).properties[0];
        assert_eq!(property.bedrooms, None);
        assert_eq!(property.location, None);
    }

    #[test]
    fn test_empty_response() {
        let result = format(RawSearchResponse::default());
        assert_eq!(result.total, 0);
        assert!(result.is_empty());
    }
}
