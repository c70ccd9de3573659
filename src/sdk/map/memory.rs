use super::canvas::{Circle, LayerId, MapCanvas, MapError, Marker};
use super::geo::{project_unit, unproject_unit, LatLngBounds, Viewport};
use serde::Serialize;
use std::collections::BTreeMap;

const TILE_SIZE: f64 = 256.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Layer {
    Markers { markers: Vec<Marker> },
    Circle { circle: Circle },
}

#[derive(Debug, Clone, Serialize)]
pub struct MapSnapshot {
    pub view: Viewport,
    pub layers: Vec<Layer>,
}

/// In-memory map model: keeps the layers that are drawn and tracks the viewport the way a
/// Web Mercator tile map would (integer zoom snapping on `fit_bounds`).
#[derive(Debug, Clone)]
pub struct MemoryCanvas {
    width_px: f64,
    height_px: f64,
    min_zoom: f64,
    max_zoom: f64,
    view: Viewport,
    layers: BTreeMap<LayerId, Layer>,
    next_id: u64,
}

impl MemoryCanvas {
    pub fn new(width_px: u32, height_px: u32, initial: Viewport) -> Self {
        Self {
            width_px: f64::from(width_px),
            height_px: f64::from(height_px),
            min_zoom: 0.0,
            max_zoom: 18.0,
            view: initial,
            layers: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn layers(&self) -> impl Iterator<Item = (&LayerId, &Layer)> {
        self.layers.iter()
    }

    pub fn marker_layers(&self) -> Vec<&[Marker]> {
        self.layers
            .values()
            .filter_map(|layer| match layer {
                Layer::Markers { markers } => Some(markers.as_slice()),
                _ => None,
            })
            .collect()
    }

    pub fn circles(&self) -> Vec<&Circle> {
        self.layers
            .values()
            .filter_map(|layer| match layer {
                Layer::Circle { circle } => Some(circle),
                _ => None,
            })
            .collect()
    }

    pub fn snapshot(&self) -> MapSnapshot {
        MapSnapshot {
            view: self.view,
            layers: self.layers.values().cloned().collect(),
        }
    }

    fn insert(&mut self, layer: Layer) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        self.layers.insert(id, layer);
        id
    }

    /// Largest integer zoom at which `bounds` fits inside the canvas.
    fn bounds_zoom(&self, bounds: &LatLngBounds) -> f64 {
        let (x0, y0) = project_unit(bounds.south_west);
        let (x1, y1) = project_unit(bounds.north_east);
        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();

        let scale_x = if dx > 0.0 {
            self.width_px / (dx * TILE_SIZE)
        } else {
            f64::INFINITY
        };
        let scale_y = if dy > 0.0 {
            self.height_px / (dy * TILE_SIZE)
        } else {
            f64::INFINITY
        };
        let scale = scale_x.min(scale_y);
        if scale.is_infinite() {
            return self.max_zoom;
        }
        scale.log2().floor().clamp(self.min_zoom, self.max_zoom)
    }
}

impl MapCanvas for MemoryCanvas {
    fn add_markers(&mut self, markers: &[Marker]) -> Result<LayerId, MapError> {
        if let Some(bad) = markers.iter().find(|m| !m.position.is_valid()) {
            return Err(MapError::LayerRejected(format!(
                "invalid marker position {:?}",
                bad.position
            )));
        }
        let id = self.insert(Layer::Markers {
            markers: markers.to_vec(),
        });
        log::debug!("[MAP] Added {} markers as {}", markers.len(), id);
        Ok(id)
    }

    fn add_circle(&mut self, circle: &Circle) -> Result<LayerId, MapError> {
        if !circle.center.is_valid() || !circle.radius_m.is_finite() || circle.radius_m < 0.0 {
            return Err(MapError::LayerRejected(format!(
                "invalid circle at {:?} with radius {}",
                circle.center, circle.radius_m
            )));
        }
        let id = self.insert(Layer::Circle {
            circle: circle.clone(),
        });
        log::debug!("[MAP] Added circle r={}m as {}", circle.radius_m, id);
        Ok(id)
    }

    fn remove_layer(&mut self, id: LayerId) -> Result<(), MapError> {
        if self.layers.remove(&id).is_some() {
            log::debug!("[MAP] Removed {}", id);
        }
        Ok(())
    }

    fn fit_bounds(&mut self, bounds: LatLngBounds) -> Result<(), MapError> {
        if !bounds.south_west.lat.is_finite()
            || !bounds.south_west.lng.is_finite()
            || !bounds.north_east.lat.is_finite()
            || !bounds.north_east.lng.is_finite()
        {
            return Err(MapError::InvalidBounds(format!("{:?}", bounds)));
        }
        let zoom = self.bounds_zoom(&bounds);
        let (x0, y0) = project_unit(bounds.south_west);
        let (x1, y1) = project_unit(bounds.north_east);
        let center = unproject_unit((x0 + x1) / 2.0, (y0 + y1) / 2.0);
        self.view = Viewport::new(center, zoom);
        Ok(())
    }

    fn set_zoom(&mut self, zoom: f64) -> Result<(), MapError> {
        if !zoom.is_finite() {
            return Err(MapError::Backend(format!("zoom {} is not finite", zoom)));
        }
        self.view.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        Ok(())
    }

    fn set_view(&mut self, view: Viewport) -> Result<(), MapError> {
        if !view.center.is_valid() {
            return Err(MapError::Backend(format!("invalid center {:?}", view.center)));
        }
        self.set_zoom(view.zoom)?;
        self.view.center = view.center;
        Ok(())
    }

    fn view(&self) -> Viewport {
        self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::map::geo::LatLng;

    fn canvas() -> MemoryCanvas {
        MemoryCanvas::new(1024, 768, Viewport::new(LatLng::new(0.0, 0.0), 2.0))
    }

    #[test]
    fn removing_unknown_layer_is_noop() {
        let mut map = canvas();
        assert!(map.remove_layer(LayerId(42)).is_ok());
        assert_eq!(map.layers().count(), 0);
    }

    #[test]
    fn fit_bounds_whole_world_gives_low_zoom() {
        let mut map = canvas();
        let world = LatLngBounds {
            south_west: LatLng::new(-80.0, -179.0),
            north_east: LatLng::new(80.0, 179.0),
        };
        map.fit_bounds(world).unwrap();
        assert_eq!(map.view().zoom, 1.0);
    }

    #[test]
    fn fit_bounds_single_point_goes_to_max_zoom() {
        let mut map = canvas();
        let point = LatLng::new(48.85, 2.35);
        map.fit_bounds(LatLngBounds::from_point(point)).unwrap();
        let view = map.view();
        assert_eq!(view.zoom, 18.0);
        assert!((view.center.lat - point.lat).abs() < 1e-9);
        assert!((view.center.lng - point.lng).abs() < 1e-9);
    }

    #[test]
    fn fit_bounds_snaps_to_integer_zoom() {
        let mut map = canvas();
        let city = LatLngBounds {
            south_west: LatLng::new(48.80, 2.25),
            north_east: LatLng::new(48.90, 2.45),
        };
        map.fit_bounds(city).unwrap();
        let zoom = map.view().zoom;
        assert_eq!(zoom, zoom.floor());
        assert!(zoom > 8.0 && zoom < 14.0);
    }

    #[test]
    fn rejects_invalid_marker_positions() {
        let mut map = canvas();
        let markers = [Marker {
            position: LatLng::new(120.0, 0.0),
            popup: None,
        }];
        assert!(matches!(
            map.add_markers(&markers),
            Err(MapError::LayerRejected(_))
        ));
    }
}
