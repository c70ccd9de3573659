use super::canvas::{Circle, CircleStyle, LayerId, MapCanvas, MapError, Marker, Popup};
use super::geo::{LatLng, LatLngBounds, Viewport};
use crate::sdk::response::{Geometry, SearchResponse};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Invalid geometry in feature {index}: {reason}")]
    InvalidGeometry { index: usize, reason: String },

    #[error(transparent)]
    Map(#[from] MapError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    /// View shown when there is nothing to draw.
    pub default_view: Viewport,
    /// Extra margin around fitted bounds, as a fraction of their span.
    pub fit_padding: f64,
    /// Zoom levels to back out after fitting markers, so their surroundings stay visible.
    pub context_zoom_out: f64,
    pub circle_style: CircleStyle,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            default_view: Viewport::new(LatLng::new(39.8283, -98.5795), 4.0),
            fit_padding: 0.1,
            context_zoom_out: 3.5,
            circle_style: CircleStyle::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedMarkers {
    pub id: LayerId,
    pub markers: Vec<Marker>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedCircle {
    pub id: LayerId,
    pub circle: Circle,
}

/// The overlays currently on the map. Only `ResultRenderer::render` changes it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewportState {
    pub marker_layer: Option<PlacedMarkers>,
    pub radius_overlay: Option<PlacedCircle>,
}

/// What a response turns into, computed before the map is touched.
struct RenderPlan {
    markers: Vec<Marker>,
    circle: Option<Circle>,
}

impl RenderPlan {
    fn build(response: Option<&SearchResponse>, config: &RendererConfig) -> Result<Self, RenderError> {
        let Some(response) = response else {
            return Ok(Self {
                markers: Vec::new(),
                circle: None,
            });
        };

        let mut markers = Vec::new();
        for (index, feature) in response.geo_features.iter().enumerate() {
            let positions = match &feature.geometry {
                Some(Geometry::Point(coords)) => vec![parse_position(coords, index)?],
                Some(Geometry::MultiPoint(coords)) => parse_multi_point(coords, index)?,
                Some(Geometry::Other(kind)) => {
                    log::warn!("Skipping feature {} with unsupported geometry {}", index, kind);
                    continue;
                }
                None => {
                    log::warn!("Skipping feature {} without geometry", index);
                    continue;
                }
            };
            let popup = feature.name.as_deref().map(Popup::new);
            markers.extend(positions.into_iter().map(|position| Marker {
                position,
                popup: popup.clone(),
            }));
        }

        let circle = response.radius_overlay().map(|(center, radius_km)| Circle {
            center,
            radius_m: radius_km * 1000.0,
            style: config.circle_style.clone(),
        });

        Ok(Self { markers, circle })
    }
}

/// GeoJSON positions are `[lng, lat, ...]`.
fn parse_position(coords: &Value, index: usize) -> Result<LatLng, RenderError> {
    let invalid = |reason: String| RenderError::InvalidGeometry { index, reason };
    let items = coords
        .as_array()
        .ok_or_else(|| invalid(format!("coordinates are not an array: {}", coords)))?;
    if items.len() < 2 {
        return Err(invalid(format!("expected [lng, lat], got {}", coords)));
    }
    let (Some(lng), Some(lat)) = (items[0].as_f64(), items[1].as_f64()) else {
        return Err(invalid(format!("non-numeric position {}", coords)));
    };
    let position = LatLng::new(lat, lng);
    if !position.is_valid() {
        return Err(invalid(format!("position out of range {}", coords)));
    }
    Ok(position)
}

fn parse_multi_point(coords: &Value, index: usize) -> Result<Vec<LatLng>, RenderError> {
    coords
        .as_array()
        .ok_or_else(|| RenderError::InvalidGeometry {
            index,
            reason: format!("coordinates are not an array: {}", coords),
        })?
        .iter()
        .map(|position| parse_position(position, index))
        .collect()
}

/// Owns the map and the overlays drawn for the latest search response.
pub struct ResultRenderer<C: MapCanvas> {
    canvas: C,
    config: RendererConfig,
    state: ViewportState,
}

impl<C: MapCanvas> ResultRenderer<C> {
    /// Wraps a canvas and shows the default view on it.
    pub fn new(mut canvas: C, config: RendererConfig) -> Self {
        if let Err(e) = canvas.set_view(config.default_view) {
            log::warn!("Could not apply default view: {}", e);
        }
        Self {
            canvas,
            config,
            state: ViewportState::default(),
        }
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Replaces the displayed results with `response`. Never fails: on error the map is put
    /// back the way it was and the error is logged.
    pub fn render(&mut self, response: Option<&SearchResponse>) {
        match self.try_render(response) {
            Ok(()) => log::info!(
                "Rendered {} markers{}",
                self.state
                    .marker_layer
                    .as_ref()
                    .map_or(0, |layer| layer.markers.len()),
                if self.state.radius_overlay.is_some() {
                    " with radius overlay"
                } else {
                    ""
                }
            ),
            Err(e) => log::error!("[RENDER] Failed to render map results: {}", e),
        }
    }

    fn try_render(&mut self, response: Option<&SearchResponse>) -> Result<(), RenderError> {
        let plan = RenderPlan::build(response, &self.config)?;

        let previous_view = self.canvas.view();
        let mut next = ViewportState::default();
        if let Err(e) = self.draw(&plan, &mut next) {
            self.rollback(next, previous_view);
            return Err(e.into());
        }

        // The new overlays are in place; only now take the previous ones down.
        let mut previous = std::mem::take(&mut self.state);
        match self.remove_placed(&mut previous) {
            Ok(()) => {
                self.state = next;
                Ok(())
            }
            Err(e) => {
                self.rollback(next, previous_view);
                self.state = previous;
                Err(e.into())
            }
        }
    }

    /// Adds the planned overlays and fits the viewport, recording each layer in `next` as it
    /// lands.
    fn draw(&mut self, plan: &RenderPlan, next: &mut ViewportState) -> Result<(), MapError> {
        if !plan.markers.is_empty() {
            let id = self.canvas.add_markers(&plan.markers)?;
            next.marker_layer = Some(PlacedMarkers {
                id,
                markers: plan.markers.clone(),
            });
        }

        if let Some(circle) = &plan.circle {
            let id = self.canvas.add_circle(circle)?;
            next.radius_overlay = Some(PlacedCircle {
                id,
                circle: circle.clone(),
            });
        }

        if let Some(layer) = &next.marker_layer {
            let bounds = LatLngBounds::from_points(layer.markers.iter().map(|m| m.position))
                .ok_or_else(|| MapError::InvalidBounds("empty marker layer".to_string()))?;
            self.canvas.fit_bounds(bounds.pad(self.config.fit_padding))?;
            let fitted = self.canvas.view().zoom;
            self.canvas.set_zoom(fitted - self.config.context_zoom_out)?;
        } else if let Some(overlay) = &next.radius_overlay {
            self.canvas
                .fit_bounds(overlay.circle.bounds().pad(self.config.fit_padding))?;
        } else {
            self.canvas.set_view(self.config.default_view)?;
        }
        Ok(())
    }

    /// Removes the layers in `placed`, clearing each slot once its layer is gone.
    fn remove_placed(&mut self, placed: &mut ViewportState) -> Result<(), MapError> {
        if let Some(id) = placed.marker_layer.as_ref().map(|l| l.id) {
            self.canvas.remove_layer(id)?;
            placed.marker_layer = None;
        }
        if let Some(id) = placed.radius_overlay.as_ref().map(|o| o.id) {
            self.canvas.remove_layer(id)?;
            placed.radius_overlay = None;
        }
        Ok(())
    }

    /// Takes down whatever a failed pass drew and puts the view back.
    fn rollback(&mut self, mut partial: ViewportState, view: Viewport) {
        if let Err(e) = self.remove_placed(&mut partial) {
            log::warn!("Could not remove partially drawn layers: {}", e);
        }
        if let Err(e) = self.canvas.set_view(view) {
            log::warn!("Could not restore previous view: {}", e);
        }
    }
}
