use super::geo::{LatLng, LatLngBounds, Viewport};
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Handle returned by the mapping capability for every layer it draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LayerId(pub u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub label: String,
}

impl Serialize for Popup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Popup", 2)?;
        state.serialize_field("label", &self.label)?;
        state.serialize_field("html", &self.html())?;
        state.end()
    }
}

impl Popup {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    /// Bold label markup with the name escaped.
    pub fn html(&self) -> String {
        format!("<b>{}</b>", escape_html(&self.label))
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub position: LatLng,
    pub popup: Option<Popup>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CircleStyle {
    pub color: String,
    pub fill_color: String,
    pub fill_opacity: f64,
    pub weight: f64,
}

impl Default for CircleStyle {
    fn default() -> Self {
        Self {
            color: "#3388ff".to_string(),
            fill_color: "#3388ff".to_string(),
            fill_opacity: 0.2,
            weight: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Circle {
    pub center: LatLng,
    pub radius_m: f64,
    pub style: CircleStyle,
}

impl Circle {
    pub fn bounds(&self) -> LatLngBounds {
        LatLngBounds::around_circle(self.center, self.radius_m)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MapError {
    #[error("Map rejected layer: {0}")]
    LayerRejected(String),

    #[error("Cannot fit viewport to bounds: {0}")]
    InvalidBounds(String),

    #[error("Map backend error: {0}")]
    Backend(String),
}

/// The mapping widget the renderer draws on. Tile rendering and projection live behind it.
pub trait MapCanvas {
    /// Adds a group of markers as a single layer.
    fn add_markers(&mut self, markers: &[Marker]) -> Result<LayerId, MapError>;

    /// Adds a circle overlay.
    fn add_circle(&mut self, circle: &Circle) -> Result<LayerId, MapError>;

    /// Removes a layer. Removing an unknown layer is a no-op.
    fn remove_layer(&mut self, id: LayerId) -> Result<(), MapError>;

    /// Moves and zooms so that `bounds` fills the view.
    fn fit_bounds(&mut self, bounds: LatLngBounds) -> Result<(), MapError>;

    /// Changes the zoom while keeping the current center.
    fn set_zoom(&mut self, zoom: f64) -> Result<(), MapError>;

    fn set_view(&mut self, view: Viewport) -> Result<(), MapError>;

    fn view(&self) -> Viewport;
}
