//! Viewport fitting: choose the map region that keeps every point of
//! interest visible.
//!
//! The delivery destination is always part of the fitted set, so it can never
//! scroll out of view as the driver or the route move.

use crate::geo::GeoPoint;
use crate::routing::Route;

/// Close-up zoom used when only a single point is known.
pub const SINGLE_POINT_ZOOM: u8 = 15;
/// Padding applied on each side of a fitted bounding box, in pixels.
pub const FIT_PADDING_PX: f32 = 60.0;
/// Never zoom in tighter than this when fitting bounds, even if all points
/// are close together.
pub const FIT_MAX_ZOOM: u8 = 14;

/// Geographic bounding rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lng_min: f64,
    pub lng_max: f64,
}

impl GeoBounds {
    /// Minimal rectangle containing every point; `None` for an empty set.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self {
            lat_min: first.lat(),
            lat_max: first.lat(),
            lng_min: first.lng(),
            lng_max: first.lng(),
        };
        for point in iter {
            bounds.extend(point);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, point: GeoPoint) {
        self.lat_min = self.lat_min.min(point.lat());
        self.lat_max = self.lat_max.max(point.lat());
        self.lng_min = self.lng_min.min(point.lng());
        self.lng_max = self.lng_max.max(point.lng());
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.lat_min..=self.lat_max).contains(&point.lat())
            && (self.lng_min..=self.lng_max).contains(&point.lng())
    }

    pub fn center(&self) -> GeoPoint {
        // Midpoint of a valid rectangle stays within WGS84 ranges.
        GeoPoint::new(
            (self.lat_min + self.lat_max) * 0.5,
            (self.lng_min + self.lng_max) * 0.5,
        )
        .expect("bounds midpoint is a valid coordinate")
    }

    pub fn lat_span(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    pub fn lng_span(&self) -> f64 {
        self.lng_max - self.lng_min
    }
}

/// What the map surface should display: either a tight center or a padded
/// bounding box capped at a maximum zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportSpec {
    Center { point: GeoPoint, zoom: u8 },
    Bounds {
        bounds: GeoBounds,
        padding_px: f32,
        max_zoom: u8,
    },
}

/// Fit a viewport around the destination, any present optional points
/// (driver, restaurant), and the current route.
pub fn fit_viewport(
    destination: GeoPoint,
    optional_points: &[Option<GeoPoint>],
    route: &Route,
) -> ViewportSpec {
    let mut points = vec![destination];
    points.extend(optional_points.iter().flatten().copied());
    points.extend_from_slice(route.points());

    if points.len() == 1 {
        return ViewportSpec::Center {
            point: destination,
            zoom: SINGLE_POINT_ZOOM,
        };
    }

    let bounds = GeoBounds::from_points(points).expect("point set is non-empty");
    ViewportSpec::Bounds {
        bounds,
        padding_px: FIT_PADDING_PX,
        max_zoom: FIT_MAX_ZOOM,
    }
}
