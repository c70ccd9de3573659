use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Equatorial circumference used to convert meters into degrees of latitude.
const EARTH_CIRCUMFERENCE_M: f64 = 40_075_017.0;

/// Latitude limit of the Web Mercator projection.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both components are finite and inside the geographic range.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn from_point(point: LatLng) -> Self {
        Self {
            south_west: point,
            north_east: point,
        }
    }

    /// Smallest bounds covering every point, or `None` for an empty iterator.
    pub fn from_points<I: IntoIterator<Item = LatLng>>(points: I) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::from_point(first), |mut bounds, p| {
            bounds.extend(p);
            bounds
        }))
    }

    /// Bounding box of a circle drawn on the sphere.
    pub fn around_circle(center: LatLng, radius_m: f64) -> Self {
        let lat_r = radius_m / EARTH_CIRCUMFERENCE_M * 360.0;
        let cos_lat = center.lat.to_radians().cos();
        let lng_r = if cos_lat.abs() < f64::EPSILON {
            180.0
        } else {
            (lat_r / cos_lat).min(180.0)
        };
        Self {
            south_west: LatLng::new(center.lat - lat_r, center.lng - lng_r),
            north_east: LatLng::new(center.lat + lat_r, center.lng + lng_r),
        }
    }

    pub fn extend(&mut self, point: LatLng) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    /// Grows each side by `ratio` of the current span, e.g. `0.1` adds 10% on every edge.
    pub fn pad(&self, ratio: f64) -> Self {
        let lat_buffer = (self.north_east.lat - self.south_west.lat).abs() * ratio;
        let lng_buffer = (self.north_east.lng - self.south_west.lng).abs() * ratio;
        Self {
            south_west: LatLng::new(
                self.south_west.lat - lat_buffer,
                self.south_west.lng - lng_buffer,
            ),
            north_east: LatLng::new(
                self.north_east.lat + lat_buffer,
                self.north_east.lng + lng_buffer,
            ),
        }
    }

    pub fn contains(&self, point: LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }
}

/// The visible part of the map: a center point and a zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: f64,
}

impl Viewport {
    pub fn new(center: LatLng, zoom: f64) -> Self {
        Self { center, zoom }
    }
}

/// Projects onto the unit Web Mercator square (`0.0..=1.0` on both axes, y grows southward).
pub fn project_unit(point: LatLng) -> (f64, f64) {
    let lat = point.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    let x = (point.lng + 180.0) / 360.0;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0;
    (x, y)
}

pub fn unproject_unit(x: f64, y: f64) -> LatLng {
    let lng = x * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees();
    LatLng::new(lat, lng)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_grows_each_edge_by_ratio_of_span() {
        let bounds = LatLngBounds {
            south_west: LatLng::new(10.0, 20.0),
            north_east: LatLng::new(20.0, 40.0),
        };
        let padded = bounds.pad(0.1);
        assert_eq!(padded.south_west, LatLng::new(9.0, 18.0));
        assert_eq!(padded.north_east, LatLng::new(21.0, 42.0));
    }

    #[test]
    fn from_points_covers_all_points() {
        let bounds = LatLngBounds::from_points([
            LatLng::new(48.85, 2.35),
            LatLng::new(48.80, 2.40),
            LatLng::new(48.90, 2.30),
        ])
        .unwrap();
        assert_eq!(bounds.south_west, LatLng::new(48.80, 2.30));
        assert_eq!(bounds.north_east, LatLng::new(48.90, 2.40));
        assert!(LatLngBounds::from_points(Vec::new()).is_none());
    }

    #[test]
    fn circle_bounds_contain_center_and_scale_with_radius() {
        let center = LatLng::new(45.0, 7.0);
        let small = LatLngBounds::around_circle(center, 1_000.0);
        let large = LatLngBounds::around_circle(center, 10_000.0);
        assert!(small.contains(center));
        assert!(large.contains(small.south_west));
        assert!(large.contains(small.north_east));
        // At 45° a degree of longitude is shorter, so the box is wider than tall.
        let lat_span = small.north_east.lat - small.south_west.lat;
        let lng_span = small.north_east.lng - small.south_west.lng;
        assert!(lng_span > lat_span);
    }

    #[test]
    fn mercator_projection_round_trips_near_origin() {
        let point = LatLng::new(48.85, 2.35);
        let (x, y) = project_unit(point);
        let back = unproject_unit(x, y);
        assert!((back.lat - point.lat).abs() < 1e-9);
        assert!((back.lng - point.lng).abs() < 1e-9);
    }

    #[test]
    fn validity_rejects_out_of_range_and_nan() {
        assert!(LatLng::new(0.0, 0.0).is_valid());
        assert!(!LatLng::new(91.0, 0.0).is_valid());
        assert!(!LatLng::new(0.0, f64::NAN).is_valid());
    }
}
