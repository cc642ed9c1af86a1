//! Marker animation: maps wall-clock time to a position along a route.
//!
//! The courier marker loops endlessly along the route polyline on a
//! fixed-duration cycle, so longer routes move the marker faster per segment
//! rather than stretching the period. The host's per-frame redraw callback
//! reads the clock and queries [`AnimationCycle::position_at`]; there is no
//! internal timer.

use crate::geo::{lerp, GeoPoint};
use crate::routing::Route;

/// Default cycle duration: one full traversal of the route every 25 s.
pub const DEFAULT_CYCLE_DURATION_MS: f64 = 25_000.0;

/// One repeating traversal of a route, anchored at a start timestamp.
///
/// Built whole from a usable (≥2 point) route and replaced whole whenever the
/// route changes; fields are never mutated in place, which keeps a stale
/// route from ever being interpolated against fresh indices.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationCycle {
    started_at_ms: f64,
    cycle_duration_ms: f64,
    route: Route,
}

impl AnimationCycle {
    /// `None` when the route is unusable or the duration is not positive.
    pub fn new(route: Route, started_at_ms: f64, cycle_duration_ms: f64) -> Option<Self> {
        if !route.is_usable() || !(cycle_duration_ms > 0.0) {
            return None;
        }
        Some(Self {
            started_at_ms,
            cycle_duration_ms,
            route,
        })
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Fraction of the current cycle completed at `now_ms`, in [0, 1).
    pub fn progress_at(&self, now_ms: f64) -> f64 {
        let elapsed = (now_ms - self.started_at_ms).max(0.0);
        (elapsed % self.cycle_duration_ms) / self.cycle_duration_ms
    }

    /// Interpolated position along the route at `now_ms`.
    pub fn position_at(&self, now_ms: f64) -> GeoPoint {
        let points = self.route.points();
        let count = points.len();
        let progress = self.progress_at(now_ms);
        let index = progress * (count - 1) as f64;
        let i0 = (index.floor() as usize) % count;
        let i1 = (i0 + 1).min(count - 1);
        let t = index - index.floor();
        lerp(points[i0], points[i1], t)
    }
}

/// Owned handle for the per-frame animation loop.
///
/// `retarget` replaces the cycle wholesale (the new traversal restarts at
/// progress 0); `cancel` or dropping the owner stops the loop. The host is
/// expected to schedule frames only while [`MarkerAnimator::is_running`].
#[derive(Debug, Default)]
pub struct MarkerAnimator {
    cycle: Option<AnimationCycle>,
}

impl MarkerAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a cycle for `route`, discarding any previous one. Unusable
    /// routes clear the animator instead.
    pub fn retarget(&mut self, route: Route, now_ms: f64, cycle_duration_ms: f64) {
        self.cycle = AnimationCycle::new(route, now_ms, cycle_duration_ms);
    }

    pub fn cancel(&mut self) {
        self.cycle = None;
    }

    pub fn is_running(&self) -> bool {
        self.cycle.is_some()
    }

    pub fn cycle(&self) -> Option<&AnimationCycle> {
        self.cycle.as_ref()
    }

    pub fn position_at(&self, now_ms: f64) -> Option<GeoPoint> {
        self.cycle.as_ref().map(|cycle| cycle.position_at(now_ms))
    }
}
