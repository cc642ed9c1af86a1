//! Rendering functions for the tracking map.

use eframe::egui::{self, Align2, Color32, FontId, Stroke, Vec2};

use track_core::geo::GeoPoint;
use track_core::tracker::MarkerRole;
use track_core::viewport::ViewportSpec;

use crate::app::TrackUiApp;
use crate::ui::utils::{fallback_stroke_color, marker_color, route_stroke_color};

/// Web-mercator reference tile size.
const TILE_SIZE_PX: f64 = 256.0;

/// Geographic bounds for map projection.
pub struct MapBounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lng_min: f64,
    pub lng_max: f64,
}

impl MapBounds {
    pub fn new(lat_min: f64, lat_max: f64, lng_min: f64, lng_max: f64) -> Self {
        Self {
            lat_min,
            lat_max,
            lng_min,
            lng_max,
        }
    }

    fn centered(center: GeoPoint, lat_span: f64, lng_span: f64) -> Self {
        Self {
            lat_min: center.lat() - lat_span * 0.5,
            lat_max: center.lat() + lat_span * 0.5,
            lng_min: center.lng() - lng_span * 0.5,
            lng_max: center.lng() + lng_span * 0.5,
        }
    }
}

fn degrees_per_pixel(zoom: u8) -> f64 {
    360.0 / (TILE_SIZE_PX * (1u32 << zoom) as f64)
}

/// Convert a fitted [`ViewportSpec`] into projection bounds for `rect`.
///
/// Center specs span exactly the requested zoom level. Bounds specs are
/// expanded so the fitted content keeps `padding_px` free on each side, then
/// widened further if the result would be tighter than `max_zoom` allows.
pub fn bounds_for_viewport(spec: &ViewportSpec, rect: egui::Rect) -> MapBounds {
    match *spec {
        ViewportSpec::Center { point, zoom } => {
            let dpp = degrees_per_pixel(zoom);
            MapBounds::centered(point, rect.height() as f64 * dpp, rect.width() as f64 * dpp)
        }
        ViewportSpec::Bounds {
            bounds,
            padding_px,
            max_zoom,
        } => {
            let center = bounds.center();
            let pad_x = (padding_px as f64 / rect.width().max(1.0) as f64).min(0.4);
            let pad_y = (padding_px as f64 / rect.height().max(1.0) as f64).min(0.4);
            let mut lng_span = bounds.lng_span() / (1.0 - 2.0 * pad_x);
            let mut lat_span = bounds.lat_span() / (1.0 - 2.0 * pad_y);

            // Zoom cap: never show less than the max-zoom window.
            let dpp = degrees_per_pixel(max_zoom);
            lng_span = lng_span.max(rect.width() as f64 * dpp);
            lat_span = lat_span.max(rect.height() as f64 * dpp);

            MapBounds::centered(center, lat_span, lng_span)
        }
    }
}

/// Project a coordinate to screen space; `None` for degenerate bounds.
pub fn project_lat_lng(
    lat: f64,
    lng: f64,
    bounds: &MapBounds,
    rect: egui::Rect,
) -> Option<egui::Pos2> {
    if bounds.lat_max <= bounds.lat_min || bounds.lng_max <= bounds.lng_min {
        return None;
    }
    let x = (lng - bounds.lng_min) / (bounds.lng_max - bounds.lng_min);
    let y = (bounds.lat_max - lat) / (bounds.lat_max - bounds.lat_min);
    let px = rect.left() + rect.width() * x as f32;
    let py = rect.top() + rect.height() * y as f32;
    Some(egui::pos2(px, py))
}

/// Draw a polyline through the projected points.
pub fn draw_polyline(
    painter: &egui::Painter,
    points: &[GeoPoint],
    bounds: &MapBounds,
    rect: egui::Rect,
    stroke: Stroke,
) {
    let projected: Vec<egui::Pos2> = points
        .iter()
        .filter_map(|point| project_lat_lng(point.lat(), point.lng(), bounds, rect))
        .collect();
    for segment in projected.windows(2) {
        painter.line_segment([segment[0], segment[1]], stroke);
    }
}

/// Draw a labeled marker on the map.
pub fn draw_marker(painter: &egui::Painter, pos: egui::Pos2, label: &str, color: Color32) {
    painter.circle_filled(pos, 5.0, color);
    painter.text(
        pos + Vec2::new(7.0, -7.0),
        Align2::LEFT_TOP,
        label,
        FontId::monospace(9.5),
        color,
    );
}

/// Render a legend item (color swatch + label).
fn legend_item(ui: &mut egui::Ui, color: Color32, label: &str) {
    ui.horizontal(|ui| {
        let (rect, _) = ui.allocate_exact_size(Vec2::new(14.0, 14.0), egui::Sense::hover());
        ui.painter().rect_filled(rect, 2.0, color);
        ui.label(label);
    });
}

/// Render the map legend.
pub fn render_map_legend(ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        legend_item(ui, marker_color(MarkerRole::Driver), "Courier");
        legend_item(ui, marker_color(MarkerRole::Restaurant), "Restaurant");
        legend_item(ui, marker_color(MarkerRole::Destination), "Delivery address");
        legend_item(ui, route_stroke_color(), "Road route");
        legend_item(ui, fallback_stroke_color(), "Direct fallback");
    });
}

/// Render the tracking map panel.
pub fn render_map(ui: &mut egui::Ui, app: &mut TrackUiApp, now_ms: f64) {
    ui.heading("Live tracking");
    render_map_legend(ui);
    if app.route_fetch.is_inflight() {
        ui.label("Fetching route…");
    }

    let (rect, _response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::hover());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 4.0, Color32::from_gray(22));

    let bounds = bounds_for_viewport(&app.tracker.viewport(), rect);

    if let Some(path) = app.tracker.displayed_path() {
        let stroke = if app.tracker.route().is_usable() {
            Stroke::new(2.5, route_stroke_color())
        } else {
            Stroke::new(1.5, fallback_stroke_color())
        };
        draw_polyline(&painter, path.points(), &bounds, rect, stroke);
    }

    // Advance the cycle for this frame; markers() then reads the new position.
    let _ = app.tracker.tick(now_ms);
    for entity in app.tracker.markers(now_ms) {
        let Some(point) = entity.point else {
            continue;
        };
        if let Some(pos) = project_lat_lng(point.lat(), point.lng(), &bounds, rect) {
            draw_marker(&painter, pos, &entity.label, marker_color(entity.role));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use track_core::viewport::{GeoBounds, FIT_MAX_ZOOM, FIT_PADDING_PX, SINGLE_POINT_ZOOM};

    fn point(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).expect("valid point")
    }

    fn map_rect() -> egui::Rect {
        egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(800.0, 600.0))
    }

    #[test]
    fn center_spec_keeps_the_point_in_the_middle() {
        let destination = point(34.02, -6.84);
        let spec = ViewportSpec::Center {
            point: destination,
            zoom: SINGLE_POINT_ZOOM,
        };
        let bounds = bounds_for_viewport(&spec, map_rect());
        let pos = project_lat_lng(destination.lat(), destination.lng(), &bounds, map_rect())
            .expect("projectable");
        assert!((pos.x - 400.0).abs() < 0.5);
        assert!((pos.y - 300.0).abs() < 0.5);
    }

    #[test]
    fn fitted_points_stay_inside_the_padded_rect() {
        let a = point(34.00, -6.90);
        let b = point(34.06, -6.80);
        let spec = ViewportSpec::Bounds {
            bounds: GeoBounds::from_points([a, b]).expect("bounds"),
            padding_px: FIT_PADDING_PX,
            max_zoom: FIT_MAX_ZOOM,
        };
        let rect = map_rect();
        let bounds = bounds_for_viewport(&spec, rect);
        for p in [a, b] {
            let pos = project_lat_lng(p.lat(), p.lng(), &bounds, rect).expect("projectable");
            assert!(rect.contains(pos), "point projected outside rect: {pos:?}");
            assert!(pos.x >= rect.left() + FIT_PADDING_PX - 0.5);
            assert!(pos.x <= rect.right() - FIT_PADDING_PX + 0.5);
        }
    }

    #[test]
    fn close_points_are_capped_at_max_zoom_span() {
        let a = point(34.0200, -6.8400);
        let b = point(34.0201, -6.8401);
        let spec = ViewportSpec::Bounds {
            bounds: GeoBounds::from_points([a, b]).expect("bounds"),
            padding_px: FIT_PADDING_PX,
            max_zoom: FIT_MAX_ZOOM,
        };
        let rect = map_rect();
        let bounds = bounds_for_viewport(&spec, rect);
        let min_lng_span = rect.width() as f64 * 360.0 / (256.0 * (1u32 << FIT_MAX_ZOOM) as f64);
        assert!(bounds.lng_max - bounds.lng_min >= min_lng_span - 1e-9);
    }

    #[test]
    fn degenerate_bounds_do_not_project() {
        let bounds = MapBounds::new(34.0, 34.0, -6.84, -6.84);
        assert!(project_lat_lng(34.0, -6.84, &bounds, map_rect()).is_none());
    }
}
