//! Order tracking state: one instance per mounted tracking view.
//!
//! Owns the delivery destination, the optional driver/restaurant positions,
//! the fetched route and the marker animation. Everything is replaced
//! wholesale: changing an endpoint drops the installed route (and its
//! animation cycle) so a stale polyline can never be drawn or animated while
//! a fresh fetch is in flight.

use crate::animation::{MarkerAnimator, DEFAULT_CYCLE_DURATION_MS};
use crate::geo::GeoPoint;
use crate::routing::Route;
use crate::viewport::{fit_viewport, ViewportSpec};

/// What a map marker represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerRole {
    Driver,
    Restaurant,
    Destination,
}

/// One labeled point of interest handed to the map surface.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedEntity {
    pub point: Option<GeoPoint>,
    pub label: String,
    pub role: MarkerRole,
}

/// View-owned tracking state for a single order.
pub struct OrderTracker {
    destination: GeoPoint,
    driver: Option<GeoPoint>,
    restaurant: Option<GeoPoint>,
    route: Route,
    animator: MarkerAnimator,
    cycle_duration_ms: f64,
}

impl OrderTracker {
    pub fn new(destination: GeoPoint) -> Self {
        Self {
            destination,
            driver: None,
            restaurant: None,
            route: Route::empty(),
            animator: MarkerAnimator::new(),
            cycle_duration_ms: DEFAULT_CYCLE_DURATION_MS,
        }
    }

    pub fn with_cycle_duration(mut self, cycle_duration_ms: f64) -> Self {
        self.cycle_duration_ms = cycle_duration_ms;
        self
    }

    pub fn destination(&self) -> GeoPoint {
        self.destination
    }

    pub fn driver(&self) -> Option<GeoPoint> {
        self.driver
    }

    pub fn restaurant(&self) -> Option<GeoPoint> {
        self.restaurant
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// The endpoints a route fetch should cover, once the driver is known.
    pub fn route_endpoints(&self) -> Option<(GeoPoint, GeoPoint)> {
        self.driver.map(|driver| (driver, self.destination))
    }

    pub fn set_destination(&mut self, destination: GeoPoint) {
        if self.destination != destination {
            self.destination = destination;
            self.invalidate_route();
        }
    }

    pub fn set_driver(&mut self, driver: Option<GeoPoint>) {
        if self.driver != driver {
            self.driver = driver;
            self.invalidate_route();
        }
    }

    pub fn set_restaurant(&mut self, restaurant: Option<GeoPoint>) {
        self.restaurant = restaurant;
    }

    /// Install a freshly fetched route. A usable route restarts the animation
    /// from its first point; an unusable one leaves the view on the direct
    /// fallback, which the next [`OrderTracker::tick`] will animate instead.
    pub fn apply_route(&mut self, route: Route, now_ms: f64) {
        if route.is_usable() {
            self.animator
                .retarget(route.clone(), now_ms, self.cycle_duration_ms);
        } else {
            self.animator.cancel();
        }
        self.route = route;
    }

    fn invalidate_route(&mut self) {
        self.route = Route::empty();
        self.animator.cancel();
    }

    /// The polyline the map should draw: the fetched route when usable,
    /// otherwise the direct [driver, destination] segment, otherwise nothing.
    pub fn displayed_path(&self) -> Option<Route> {
        if self.route.is_usable() {
            return Some(self.route.clone());
        }
        self.driver
            .map(|driver| Route::direct(driver, self.destination))
    }

    /// Per-frame advance: (re)starts the cycle along the displayed path if
    /// none is running and returns the marker position for this frame.
    pub fn tick(&mut self, now_ms: f64) -> Option<GeoPoint> {
        if !self.animator.is_running() {
            if let Some(path) = self.displayed_path() {
                self.animator.retarget(path, now_ms, self.cycle_duration_ms);
            }
        }
        self.animator.position_at(now_ms)
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_running()
    }

    /// Labeled markers for the map surface. The driver marker carries the
    /// animated position when a cycle is running.
    pub fn markers(&self, now_ms: f64) -> Vec<TrackedEntity> {
        vec![
            TrackedEntity {
                point: self.animator.position_at(now_ms).or(self.driver),
                label: "Courier".to_string(),
                role: MarkerRole::Driver,
            },
            TrackedEntity {
                point: self.restaurant,
                label: "Restaurant".to_string(),
                role: MarkerRole::Restaurant,
            },
            TrackedEntity {
                point: Some(self.destination),
                label: "Delivery address".to_string(),
                role: MarkerRole::Destination,
            },
        ]
    }

    /// Viewport that keeps the destination, any present optional points and
    /// the full route visible.
    pub fn viewport(&self) -> ViewportSpec {
        fit_viewport(self.destination, &[self.driver, self.restaurant], &self.route)
    }
}
