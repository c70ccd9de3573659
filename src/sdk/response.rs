//! The payload shared by the search client and the renderer.
//!
//! Decoding is lenient: a field with the wrong shape falls back to its default instead of
//! failing the whole response. Only text that is not JSON at all is an error.

use crate::sdk::map::geo::LatLng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// One search result set, as received from the backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResponse {
    pub geo_features: Vec<Feature>,
    /// Only present for geographically scoped searches.
    pub search_center: Option<LatLng>,
    /// Non-negative; `0.0` means no radius overlay.
    pub radius_km: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Option<Geometry>,
    pub name: Option<String>,
}

/// GeoJSON geometry with its coordinates kept raw; they are checked when drawn.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Value),
    MultiPoint(Value),
    Other(String),
}

impl SearchResponse {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from_value(value))
    }

    pub fn from_value(value: Value) -> Self {
        serde_json::from_value::<SearchResponsePayload>(value)
            .unwrap_or_default()
            .into()
    }

    /// The circle to draw, if the search was scoped and has a positive radius.
    pub fn radius_overlay(&self) -> Option<(LatLng, f64)> {
        match self.search_center {
            Some(center) if self.radius_km > 0.0 => Some((center, self.radius_km)),
            _ => None,
        }
    }
}

// --- Wire format ---

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

#[derive(Deserialize, Default)]
struct SearchResponsePayload {
    #[serde(rename = "geoJSON", default, deserialize_with = "lenient")]
    geo_json: FeatureCollectionPayload,
    #[serde(default, deserialize_with = "lenient")]
    search_center: Option<CenterPayload>,
    #[serde(default, deserialize_with = "lenient")]
    radius_km: Option<f64>,
}

#[derive(Deserialize, Default)]
struct FeatureCollectionPayload {
    #[serde(default, deserialize_with = "lenient")]
    features: Vec<Value>,
}

#[derive(Deserialize, Default)]
struct FeaturePayload {
    #[serde(default, deserialize_with = "lenient")]
    geometry: Option<GeometryPayload>,
    #[serde(default, deserialize_with = "lenient")]
    properties: Option<Map<String, Value>>,
}

#[derive(Deserialize, Default)]
struct GeometryPayload {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

#[derive(Deserialize, Default)]
struct CenterPayload {
    #[serde(default, deserialize_with = "lenient")]
    lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    lng: Option<f64>,
}

impl From<SearchResponsePayload> for SearchResponse {
    fn from(payload: SearchResponsePayload) -> Self {
        let geo_features = payload
            .geo_json
            .features
            .into_iter()
            .map(|raw| serde_json::from_value::<FeaturePayload>(raw).unwrap_or_default())
            .map(Feature::from)
            .collect();

        let search_center = payload.search_center.and_then(|c| match (c.lat, c.lng) {
            (Some(lat), Some(lng)) => Some(LatLng::new(lat, lng)).filter(LatLng::is_valid),
            _ => None,
        });

        let radius_km = payload
            .radius_km
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(0.0);

        Self {
            geo_features,
            search_center,
            radius_km,
        }
    }
}

impl From<FeaturePayload> for Feature {
    fn from(payload: FeaturePayload) -> Self {
        let geometry = payload.geometry.map(|g| match g.kind.as_str() {
            "Point" => Geometry::Point(g.coordinates),
            "MultiPoint" => Geometry::MultiPoint(g.coordinates),
            _ => Geometry::Other(g.kind),
        });
        let name = payload
            .properties
            .as_ref()
            .and_then(|props| props.get("name"))
            .and_then(display_name);
        Self { geometry, name }
    }
}

fn display_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_full_payload() {
        let resp = SearchResponse::from_value(json!({
            "geoJSON": {
                "type": "FeatureCollection",
                "features": [
                    {"type": "Feature", "geometry": {"type": "Point", "coordinates": [2.35, 48.85]},
                     "properties": {"name": "Cafe de Flore"}},
                    {"type": "Feature", "geometry": {"type": "Point", "coordinates": [2.36, 48.86]},
                     "properties": {}}
                ]
            },
            "search_center": {"lat": 48.85, "lng": 2.35},
            "radius_km": 5
        }));

        assert_eq!(resp.geo_features.len(), 2);
        assert_eq!(resp.geo_features[0].name.as_deref(), Some("Cafe de Flore"));
        assert_eq!(resp.geo_features[1].name, None);
        assert_eq!(resp.search_center, Some(LatLng::new(48.85, 2.35)));
        assert_eq!(resp.radius_km, 5.0);
        assert_eq!(resp.radius_overlay(), Some((LatLng::new(48.85, 2.35), 5.0)));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let resp = SearchResponse::from_json("{}").unwrap();
        assert_eq!(resp, SearchResponse::default());

        let resp = SearchResponse::from_json("null").unwrap();
        assert_eq!(resp, SearchResponse::default());
    }

    #[test]
    fn wrong_typed_fields_fall_back_to_defaults() {
        let resp = SearchResponse::from_value(json!({
            "geoJSON": null,
            "search_center": "here",
            "radius_km": "five"
        }));
        assert!(resp.geo_features.is_empty());
        assert_eq!(resp.search_center, None);
        assert_eq!(resp.radius_km, 0.0);
    }

    #[test]
    fn null_center_coordinates_mean_no_center() {
        let resp = SearchResponse::from_value(json!({
            "geoJSON": {"features": []},
            "search_center": {"lat": null, "lng": null},
            "radius_km": 0
        }));
        assert_eq!(resp.search_center, None);
        assert_eq!(resp.radius_overlay(), None);
    }

    #[test]
    fn negative_radius_is_zero() {
        let resp = SearchResponse::from_value(json!({
            "search_center": {"lat": 1.0, "lng": 2.0},
            "radius_km": -3
        }));
        assert_eq!(resp.radius_km, 0.0);
        assert_eq!(resp.radius_overlay(), None);
    }

    #[test]
    fn numeric_names_are_displayed_and_empty_names_dropped() {
        let resp = SearchResponse::from_value(json!({
            "geoJSON": {"features": [
                {"geometry": {"type": "Point", "coordinates": [0, 0]}, "properties": {"name": 42}},
                {"geometry": {"type": "Point", "coordinates": [0, 0]}, "properties": {"name": ""}},
                {"geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 1]]}}
            ]}
        }));
        assert_eq!(resp.geo_features[0].name.as_deref(), Some("42"));
        assert_eq!(resp.geo_features[1].name, None);
        assert_eq!(
            resp.geo_features[2].geometry,
            Some(Geometry::Other("LineString".to_string()))
        );
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(SearchResponse::from_json("<html>").is_err());
    }
}
