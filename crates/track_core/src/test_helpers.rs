//! Test helpers for common fixture data.
//!
//! Shared points, routes and candidate lists used across test files. The
//! coordinates are in the Rabat / Casablanca area the product operates in.

use crate::dispatch::DriverCandidate;
use crate::geo::GeoPoint;
use crate::routing::Route;

/// Build a point, panicking on invalid input (tests only).
pub fn point(lat: f64, lng: f64) -> GeoPoint {
    GeoPoint::new(lat, lng).expect("fixture coordinates should be valid")
}

/// A delivery destination in Rabat.
pub fn rabat_destination() -> GeoPoint {
    point(34.03, -6.83)
}

/// A driver position near the Rabat destination.
pub fn rabat_driver() -> GeoPoint {
    point(34.02, -6.84)
}

/// A restaurant location in Casablanca.
pub fn casablanca_restaurant() -> GeoPoint {
    point(33.59, -7.61)
}

/// A five-waypoint route from the driver toward the destination.
pub fn sample_route() -> Route {
    Route::from_points(vec![
        point(34.020, -6.840),
        point(34.022, -6.838),
        point(34.025, -6.835),
        point(34.028, -6.832),
        point(34.030, -6.830),
    ])
}

/// Three dispatch candidates: two positioned (near, far) and one unknown.
pub fn sample_candidates() -> Vec<DriverCandidate> {
    vec![
        DriverCandidate::new(
            1,
            "Yassine",
            "+212600000001",
            Some(point(33.59 + 1.2 / 111.19, -7.61)),
        ),
        DriverCandidate::new(
            2,
            "Imane",
            "+212600000002",
            Some(point(33.59 + 3.4 / 111.19, -7.61)),
        ),
        DriverCandidate::new(3, "Omar", "+212600000003", None),
    ]
}
