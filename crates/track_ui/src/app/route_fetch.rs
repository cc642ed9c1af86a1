//! Background route fetch: one worker thread per request, results delivered
//! through an mpsc channel and drained once per frame on the UI thread.
//!
//! Each request carries a generation stamp; when the tracked endpoints change
//! a new request supersedes the old one and any late result from a previous
//! generation is discarded, so the map never installs a route for endpoints
//! it no longer tracks.

use std::sync::mpsc::{channel, Receiver, Sender};

use track_core::geo::GeoPoint;
use track_core::routing::{build_route_provider, Route, RouteProviderKind};

/// Fetch identity: both endpoints quantized to micro-degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteRequestKey {
    from_lat: i64,
    from_lng: i64,
    to_lat: i64,
    to_lng: i64,
}

impl RouteRequestKey {
    pub fn new(from: GeoPoint, to: GeoPoint) -> Self {
        let quantize = |deg: f64| (deg * 1_000_000.0).round() as i64;
        Self {
            from_lat: quantize(from.lat()),
            from_lng: quantize(from.lng()),
            to_lat: quantize(to.lat()),
            to_lng: quantize(to.lng()),
        }
    }
}

struct FetchedRoute {
    generation: u64,
    route: Route,
}

pub struct RouteFetchState {
    sender: Sender<FetchedRoute>,
    receiver: Receiver<FetchedRoute>,
    generation: u64,
    inflight: bool,
    last_key: Option<RouteRequestKey>,
}

impl RouteFetchState {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self {
            sender,
            receiver,
            generation: 0,
            inflight: false,
            last_key: None,
        }
    }

    /// True when no fetch has been issued for these endpoints yet. A failed
    /// fetch is not retried for the same key; only changed endpoints (or an
    /// explicit [`RouteFetchState::invalidate`]) trigger a new request.
    pub fn needs_fetch(&self, key: &RouteRequestKey) -> bool {
        self.last_key.as_ref() != Some(key)
    }

    /// Forget the last requested endpoints so the next frame re-fetches.
    /// Bumps the generation, so a result from a still-running fetch for the
    /// old endpoints can no longer be installed.
    pub fn invalidate(&mut self) {
        self.last_key = None;
        self.generation += 1;
        self.inflight = false;
    }

    pub fn is_inflight(&self) -> bool {
        self.inflight
    }

    /// Issue a fetch for the given endpoints, superseding any inflight one.
    pub fn request(&mut self, kind: &RouteProviderKind, from: GeoPoint, to: GeoPoint) {
        self.generation += 1;
        self.inflight = true;
        self.last_key = Some(RouteRequestKey::new(from, to));

        let sender = self.sender.clone();
        let generation = self.generation;
        let kind = kind.clone();
        std::thread::spawn(move || {
            let provider = build_route_provider(&kind);
            let route = provider.route(from, to);
            let _ = sender.send(FetchedRoute { generation, route });
        });
    }

    /// Drain completed fetches. Only a result from the current generation is
    /// returned; anything older belongs to superseded endpoints.
    pub fn drain(&mut self) -> Option<Route> {
        let mut latest = None;
        while let Ok(result) = self.receiver.try_recv() {
            if result.generation == self.generation {
                self.inflight = false;
                latest = Some(result.route);
            }
        }
        latest
    }
}

impl Default for RouteFetchState {
    fn default() -> Self {
        Self::new()
    }
}
