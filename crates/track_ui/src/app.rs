//! Application state for the tracking and dispatch UI.

use std::path::PathBuf;
use std::time::Instant;

use track_core::directory::{DriverDirectory, RestDriverDirectory};
use track_core::dispatch::{rank_drivers, DriverCandidate};
use track_core::geo::GeoPoint;
use track_core::routing::RouteProviderKind;
use track_core::tracker::OrderTracker;

use crate::app::route_fetch::RouteFetchState;
use crate::app::settings::{load_settings, save_settings_atomic, settings_file_path, AppSettings};

pub mod route_fetch;
pub mod settings;

/// Main application state for the tracking UI.
pub struct TrackUiApp {
    pub tracker: OrderTracker,
    pub settings: AppSettings,
    pub settings_path: Option<PathBuf>,
    pub settings_status: Option<String>,
    pub route_fetch: RouteFetchState,
    pub ranked_drivers: Vec<DriverCandidate>,
    pub dispatch_error: Option<String>,
    pub assigned_driver_id: Option<i64>,
    started_at: Instant,
}

impl TrackUiApp {
    pub fn new() -> Self {
        let mut settings = AppSettings::default();
        let mut settings_status = None;
        let settings_path = match settings_file_path() {
            Ok(path) => Some(path),
            Err(error) => {
                settings_status = Some(format!("Settings storage disabled: {error}"));
                None
            }
        };
        if let Some(path) = settings_path.as_ref() {
            match load_settings(path) {
                Ok(Some(stored)) => settings = stored,
                Ok(None) => {}
                Err(error) => {
                    settings_status = Some(format!("Settings load warning: {error}"));
                }
            }
        }

        let tracker = build_tracker(&settings);

        Self {
            tracker,
            settings,
            settings_path,
            settings_status,
            route_fetch: RouteFetchState::new(),
            ranked_drivers: Vec::new(),
            dispatch_error: None,
            assigned_driver_id: None,
            started_at: Instant::now(),
        }
    }

    /// Monotonic wall-clock for the animation, in milliseconds.
    pub fn now_ms(&self) -> f64 {
        self.started_at.elapsed().as_secs_f64() * 1000.0
    }

    /// Routing backend selected by the current settings.
    pub fn provider_kind(&self) -> RouteProviderKind {
        #[cfg(feature = "osrm")]
        {
            if self.settings.use_osrm {
                return RouteProviderKind::Osrm {
                    endpoint: self.settings.routing_endpoint.clone(),
                };
            }
        }
        RouteProviderKind::DirectLine
    }

    /// Ranking origin: the restaurant when known, the destination otherwise.
    pub fn dispatch_origin(&self) -> GeoPoint {
        self.settings
            .restaurant()
            .unwrap_or_else(|| self.tracker.destination())
    }

    /// Snapshot available drivers and rank them by distance. Directory
    /// failures block dispatch and are shown to the operator, unlike route
    /// failures which degrade silently on the map.
    pub fn refresh_dispatch(&mut self) {
        let directory = RestDriverDirectory::new(&self.settings.directory_endpoint);
        match directory.available_drivers(&self.settings.city) {
            Ok(candidates) => {
                self.ranked_drivers = rank_drivers(self.dispatch_origin(), &candidates);
                self.dispatch_error = None;
            }
            Err(error) => {
                self.dispatch_error = Some(format!("Driver lookup failed: {error}"));
            }
        }
    }

    /// Assign the given candidate to the tracked order. The tracker drops any
    /// installed route; the next frame requests a fresh one.
    pub fn assign_driver(&mut self, driver_id: i64) {
        let Some(candidate) = self
            .ranked_drivers
            .iter()
            .find(|candidate| candidate.id == driver_id)
        else {
            return;
        };
        self.assigned_driver_id = Some(driver_id);
        self.tracker.set_driver(candidate.last_known_point);
        self.route_fetch.invalidate();
    }

    /// Rebuild the tracking view from the edited settings and persist them.
    pub fn apply_settings(&mut self) {
        let assigned_driver = self.tracker.driver();
        self.tracker = build_tracker(&self.settings);
        self.tracker.set_driver(assigned_driver);
        self.route_fetch.invalidate();
        self.persist_settings();
    }

    pub fn persist_settings(&mut self) {
        let Some(path) = self.settings_path.as_ref() else {
            return;
        };
        match save_settings_atomic(path, &self.settings) {
            Ok(()) => {
                self.settings_status = Some("Settings saved.".to_string());
            }
            Err(error) => {
                self.settings_status = Some(format!("Settings save warning: {error}"));
            }
        }
    }
}

impl Default for TrackUiApp {
    fn default() -> Self {
        Self::new()
    }
}

fn build_tracker(settings: &AppSettings) -> OrderTracker {
    let mut tracker =
        OrderTracker::new(settings.destination()).with_cycle_duration(settings.cycle_duration_ms);
    tracker.set_restaurant(settings.restaurant());
    tracker
}
