//! Pluggable route providers: trait abstraction for road-routing backends.
//!
//! Two implementations, selectable via [`RouteProviderKind`]:
//!
//! - **`DirectLineProvider`**: straight two-point segment. Zero dependencies.
//! - **`OsrmRouteProvider`** (feature `osrm`): calls a local/remote OSRM HTTP
//!   endpoint and returns the full road geometry.
//!
//! A failed lookup yields [`Route::empty`], never an error: the tracking view
//! degrades to a direct line (or no line) and may re-fetch when its endpoints
//! change. Providers make a single attempt per invocation.

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

// ---------------------------------------------------------------------------
// Core types
// ---------------------------------------------------------------------------

/// Ordered polyline of road waypoints between two endpoints, in travel order.
///
/// An empty route means "no route available". Routes with fewer than 2 points
/// are unusable for drawing or animation and are treated exactly like empty
/// ones (see [`Route::is_usable`]).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    points: Vec<GeoPoint>,
}

impl Route {
    pub fn from_points(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }

    /// The "no route available" value.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Straight segment from `from` to `to`, the universal fallback path.
    pub fn direct(from: GeoPoint, to: GeoPoint) -> Self {
        Self {
            points: vec![from, to],
        }
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// A route needs at least 2 points to draw or animate along.
    pub fn is_usable(&self) -> bool {
        self.points.len() >= 2
    }

    pub fn first(&self) -> Option<GeoPoint> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<GeoPoint> {
        self.points.last().copied()
    }
}

/// Which routing backend to use. Serializable so the UI can keep it in its
/// settings file.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub enum RouteProviderKind {
    /// Straight-line behaviour, zero external dependencies.
    #[default]
    DirectLine,
    /// OSRM HTTP endpoint (e.g. `"http://localhost:5000"`).
    #[cfg(feature = "osrm")]
    Osrm { endpoint: String },
}

/// Trait for routing backends. Implementations must be `Send + Sync` so a
/// boxed provider can be handed to the fetch worker thread.
pub trait RouteProvider: Send + Sync {
    /// Compute a road route between two points. Failures of any kind return
    /// [`Route::empty`]; they are never escalated past this boundary.
    fn route(&self, from: GeoPoint, to: GeoPoint) -> Route;
}

// ---------------------------------------------------------------------------
// Direct-line provider (always available)
// ---------------------------------------------------------------------------

/// Returns the two-point segment [from, to]. This is the fallback the map
/// shows as a visibly straighter line when the road network is unavailable.
pub struct DirectLineProvider;

impl RouteProvider for DirectLineProvider {
    fn route(&self, from: GeoPoint, to: GeoPoint) -> Route {
        Route::direct(from, to)
    }
}

// ---------------------------------------------------------------------------
// OSRM provider (behind `osrm` feature)
// ---------------------------------------------------------------------------

#[cfg(feature = "osrm")]
pub mod osrm {
    use super::*;
    use reqwest::blocking::Client;
    use std::time::Duration;

    /// Routes via an OSRM HTTP endpoint.
    pub struct OsrmRouteProvider {
        client: Client,
        endpoint: String,
    }

    impl OsrmRouteProvider {
        pub fn new(endpoint: &str) -> Self {
            let client = Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .expect("failed to build HTTP client");
            Self {
                client,
                endpoint: endpoint.trim_end_matches('/').to_string(),
            }
        }
    }

    /// Minimal OSRM JSON response structures.
    #[derive(Deserialize)]
    pub struct OsrmResponse {
        pub code: String,
        pub routes: Option<Vec<OsrmRoute>>,
    }

    #[derive(Deserialize)]
    pub struct OsrmRoute {
        pub geometry: OsrmGeometry,
    }

    #[derive(Deserialize)]
    pub struct OsrmGeometry {
        pub coordinates: Vec<Vec<f64>>, // [lng, lat]
    }

    /// Convert a parsed OSRM payload into a [`Route`]. Anything off-shape
    /// (wrong discriminator, missing routes, short coordinate pairs, values
    /// outside WGS84 ranges) collapses to the empty route.
    pub fn route_from_response(resp: OsrmResponse) -> Route {
        if resp.code != "Ok" {
            return Route::empty();
        }

        let Some(route) = resp.routes.and_then(|routes| routes.into_iter().next()) else {
            return Route::empty();
        };

        let mut points = Vec::with_capacity(route.geometry.coordinates.len());
        for pair in &route.geometry.coordinates {
            let (Some(&lng), Some(&lat)) = (pair.first(), pair.get(1)) else {
                return Route::empty();
            };
            // OSRM returns [lng, lat]; we store (lat, lng)
            match GeoPoint::new(lat, lng) {
                Ok(point) => points.push(point),
                Err(_) => return Route::empty(),
            }
        }

        let route = Route::from_points(points);
        if route.is_usable() {
            route
        } else {
            Route::empty()
        }
    }

    impl RouteProvider for OsrmRouteProvider {
        fn route(&self, from: GeoPoint, to: GeoPoint) -> Route {
            let url = format!(
                "{}/route/v1/driving/{},{};{},{}?overview=full&geometries=geojson",
                self.endpoint,
                from.lng(),
                from.lat(),
                to.lng(),
                to.lat(),
            );

            let resp: OsrmResponse = match self.client.get(&url).send() {
                Ok(r) => match r.json() {
                    Ok(j) => j,
                    Err(_) => return Route::empty(),
                },
                Err(_) => return Route::empty(),
            };

            route_from_response(resp)
        }
    }
}

// ---------------------------------------------------------------------------
// Caching wrapper
// ---------------------------------------------------------------------------

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// Cache key: both endpoints quantized to micro-degrees, directional.
fn cache_key(from: GeoPoint, to: GeoPoint) -> (i64, i64, i64, i64) {
    let quantize = |deg: f64| (deg * 1_000_000.0).round() as i64;
    (
        quantize(from.lat()),
        quantize(from.lng()),
        quantize(to.lat()),
        quantize(to.lng()),
    )
}

/// LRU-cached wrapper around any [`RouteProvider`].
///
/// On cache miss the inner provider is queried; if it comes back empty and
/// `fallback_to_direct` is set, the direct segment is returned instead.
/// Only usable routes are cached, so a transient upstream failure is retried
/// on the next lookup for the same endpoints.
pub struct CachedRouteProvider {
    inner: Box<dyn RouteProvider>,
    cache: Mutex<LruCache<(i64, i64, i64, i64), Route>>,
    fallback_to_direct: bool,
}

impl CachedRouteProvider {
    pub fn new(inner: Box<dyn RouteProvider>, capacity: usize, fallback_to_direct: bool) -> Self {
        Self {
            inner,
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity.max(1)).expect("cache capacity must be > 0"),
            )),
            fallback_to_direct,
        }
    }

    fn lookup(&self, key: (i64, i64, i64, i64)) -> Option<Route> {
        let mut cache = self.cache.lock().ok()?;
        cache.get(&key).cloned()
    }

    fn store(&self, key: (i64, i64, i64, i64), route: &Route) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, route.clone());
        }
    }
}

impl RouteProvider for CachedRouteProvider {
    fn route(&self, from: GeoPoint, to: GeoPoint) -> Route {
        let key = cache_key(from, to);

        if let Some(cached) = self.lookup(key) {
            return cached;
        }

        let result = self.inner.route(from, to);
        if result.is_usable() {
            self.store(key, &result);
            return result;
        }

        if self.fallback_to_direct {
            Route::direct(from, to)
        } else {
            Route::empty()
        }
    }
}

// ---------------------------------------------------------------------------
// Factory: build a provider from RouteProviderKind
// ---------------------------------------------------------------------------

/// Default route cache capacity for HTTP-backed providers.
#[cfg(feature = "osrm")]
const DEFAULT_ROUTE_CACHE_CAPACITY: usize = 1_000;

/// Construct a boxed [`RouteProvider`] from a [`RouteProviderKind`] descriptor.
///
/// - `DirectLine` is returned without caching (it performs no work).
/// - `Osrm` is wrapped in a [`CachedRouteProvider`] without the direct-line
///   fallback: the tracking view draws its own fallback segment, so an empty
///   route must stay observable to the caller.
pub fn build_route_provider(kind: &RouteProviderKind) -> Box<dyn RouteProvider> {
    match kind {
        RouteProviderKind::DirectLine => Box::new(DirectLineProvider),

        #[cfg(feature = "osrm")]
        RouteProviderKind::Osrm { endpoint } => {
            let inner = Box::new(osrm::OsrmRouteProvider::new(endpoint));
            Box::new(CachedRouteProvider::new(
                inner,
                DEFAULT_ROUTE_CACHE_CAPACITY,
                false,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn point(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).expect("valid point")
    }

    struct FixedProvider {
        route: Route,
        calls: Arc<AtomicUsize>,
    }

    impl FixedProvider {
        fn new(route: Route) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    route,
                    calls: Arc::clone(&calls),
                },
                calls,
            )
        }
    }

    impl RouteProvider for FixedProvider {
        fn route(&self, _from: GeoPoint, _to: GeoPoint) -> Route {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.route.clone()
        }
    }

    #[test]
    fn direct_line_provider_returns_two_point_segment() {
        let from = point(34.02, -6.84);
        let to = point(34.03, -6.83);
        let route = DirectLineProvider.route(from, to);
        assert_eq!(route.points(), &[from, to]);
        assert!(route.is_usable());
    }

    #[test]
    fn single_point_route_is_not_usable() {
        let route = Route::from_points(vec![point(34.02, -6.84)]);
        assert!(!route.is_usable());
        assert!(!route.is_empty());
    }

    #[test]
    fn route_provider_kind_default_is_direct_line() {
        assert_eq!(RouteProviderKind::default(), RouteProviderKind::DirectLine);
    }

    #[test]
    fn cached_provider_queries_inner_once_per_endpoint_pair() {
        let (inner, calls) =
            FixedProvider::new(Route::direct(point(34.0, -6.0), point(34.1, -6.1)));
        let provider = CachedRouteProvider::new(Box::new(inner), 10, false);

        let from = point(34.0, -6.0);
        let to = point(34.1, -6.1);
        let first = provider.route(from, to);
        let second = provider.route(from, to);
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cached_provider_does_not_cache_empty_results() {
        let (inner, calls) = FixedProvider::new(Route::empty());
        let provider = CachedRouteProvider::new(Box::new(inner), 10, false);

        let from = point(34.0, -6.0);
        let to = point(34.1, -6.1);
        assert!(provider.route(from, to).is_empty());
        assert!(provider.route(from, to).is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn cached_provider_falls_back_to_direct_segment() {
        let (inner, _calls) = FixedProvider::new(Route::empty());
        let provider = CachedRouteProvider::new(Box::new(inner), 10, true);

        let from = point(34.02, -6.84);
        let to = point(34.03, -6.83);
        let route = provider.route(from, to);
        assert_eq!(route.points(), &[from, to]);
    }

    #[cfg(feature = "osrm")]
    mod osrm_parsing {
        use crate::geo::GeoPoint;
        use crate::routing::osrm::{route_from_response, OsrmGeometry, OsrmResponse, OsrmRoute};

        fn point(lat: f64, lng: f64) -> GeoPoint {
            GeoPoint::new(lat, lng).expect("valid point")
        }

        fn response(code: &str, coordinates: Option<Vec<Vec<f64>>>) -> OsrmResponse {
            OsrmResponse {
                code: code.to_string(),
                routes: coordinates.map(|coordinates| {
                    vec![OsrmRoute {
                        geometry: OsrmGeometry { coordinates },
                    }]
                }),
            }
        }

        #[test]
        fn transposes_lng_lat_pairs() {
            let resp = response("Ok", Some(vec![vec![-6.84, 34.02], vec![-6.83, 34.03]]));
            let route = route_from_response(resp);
            assert_eq!(
                route.points(),
                &[point(34.02, -6.84), point(34.03, -6.83)]
            );
        }

        #[test]
        fn non_ok_code_yields_empty_route() {
            let resp = response("NoRoute", Some(vec![vec![-6.84, 34.02], vec![-6.83, 34.03]]));
            assert!(route_from_response(resp).is_empty());
        }

        #[test]
        fn missing_routes_yield_empty_route() {
            assert!(route_from_response(response("Ok", None)).is_empty());
        }

        #[test]
        fn empty_coordinate_list_yields_empty_route() {
            assert!(route_from_response(response("Ok", Some(vec![]))).is_empty());
        }

        #[test]
        fn single_coordinate_yields_empty_route() {
            let resp = response("Ok", Some(vec![vec![-6.84, 34.02]]));
            assert!(route_from_response(resp).is_empty());
        }

        #[test]
        fn out_of_range_coordinate_yields_empty_route() {
            let resp = response("Ok", Some(vec![vec![-6.84, 34.02], vec![-200.0, 95.0]]));
            assert!(route_from_response(resp).is_empty());
        }

        #[test]
        fn payload_deserializes_from_json() {
            let raw = r#"{
                "code": "Ok",
                "routes": [{"geometry": {"coordinates": [[-6.84, 34.02], [-6.83, 34.03]]}}]
            }"#;
            let resp: OsrmResponse = serde_json::from_str(raw).expect("parse");
            let route = route_from_response(resp);
            assert_eq!(route.len(), 2);
        }
    }
}
