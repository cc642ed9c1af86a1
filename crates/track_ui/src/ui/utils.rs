//! Colors and formatting helpers shared by the panels.

use eframe::egui::Color32;

use track_core::tracker::MarkerRole;

pub fn marker_color(role: MarkerRole) -> Color32 {
    match role {
        MarkerRole::Driver => Color32::from_rgb(66, 133, 244),
        MarkerRole::Restaurant => Color32::from_rgb(255, 140, 0),
        MarkerRole::Destination => Color32::from_rgb(52, 168, 83),
    }
}

pub fn route_stroke_color() -> Color32 {
    Color32::from_rgb(120, 180, 255)
}

pub fn fallback_stroke_color() -> Color32 {
    Color32::from_gray(140)
}

pub fn format_distance_km(distance_km: Option<f64>) -> String {
    match distance_km {
        Some(distance_km) => format!("{distance_km:.1} km"),
        None => "unknown".to_string(),
    }
}
