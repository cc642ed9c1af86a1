//! Left-hand control panel: order setup, routing settings, dispatch.

use eframe::egui::{self, Color32};

use crate::app::TrackUiApp;
use crate::ui::utils::format_distance_km;

pub fn render_control_panel(ui: &mut egui::Ui, app: &mut TrackUiApp) {
    ui.heading("Order");
    egui::Grid::new("order_grid").num_columns(3).show(ui, |ui| {
        ui.label("Delivery address");
        ui.add(egui::DragValue::new(&mut app.settings.destination_lat).speed(0.001));
        ui.add(egui::DragValue::new(&mut app.settings.destination_lng).speed(0.001));
        ui.end_row();

        ui.checkbox(&mut app.settings.restaurant_enabled, "Restaurant");
        ui.add(egui::DragValue::new(&mut app.settings.restaurant_lat).speed(0.001));
        ui.add(egui::DragValue::new(&mut app.settings.restaurant_lng).speed(0.001));
        ui.end_row();
    });
    ui.add(
        egui::Slider::new(&mut app.settings.cycle_duration_ms, 5_000.0..=60_000.0)
            .text("Animation cycle (ms)"),
    );

    ui.separator();
    ui.heading("Routing");
    ui.checkbox(&mut app.settings.use_osrm, "Use road routing service");
    ui.horizontal(|ui| {
        ui.label("Endpoint");
        ui.text_edit_singleline(&mut app.settings.routing_endpoint);
    });
    if ui.button("Apply settings").clicked() {
        app.apply_settings();
    }
    if let Some(status) = &app.settings_status {
        ui.label(status.clone());
    }

    ui.separator();
    ui.heading("Dispatch");
    ui.horizontal(|ui| {
        ui.label("Directory");
        ui.text_edit_singleline(&mut app.settings.directory_endpoint);
    });
    ui.horizontal(|ui| {
        ui.label("City");
        ui.text_edit_singleline(&mut app.settings.city);
    });
    if ui.button("Find available drivers").clicked() {
        app.refresh_dispatch();
    }
    if let Some(error) = &app.dispatch_error {
        ui.colored_label(Color32::from_rgb(230, 80, 80), error.clone());
    }

    render_driver_table(ui, app);
}

/// Ranked candidate list, nearest first, unknown positions at the bottom.
fn render_driver_table(ui: &mut egui::Ui, app: &mut TrackUiApp) {
    if app.ranked_drivers.is_empty() {
        return;
    }

    let mut assign: Option<i64> = None;
    egui::Grid::new("driver_table")
        .num_columns(4)
        .striped(true)
        .show(ui, |ui| {
            ui.label("Driver");
            ui.label("Distance");
            ui.label("Phone");
            ui.label("");
            ui.end_row();

            for candidate in &app.ranked_drivers {
                let is_assigned = app.assigned_driver_id == Some(candidate.id);
                let name = if is_assigned {
                    format!("{} (assigned)", candidate.name)
                } else {
                    candidate.name.clone()
                };
                ui.label(name);
                ui.label(format_distance_km(candidate.distance_km));
                ui.label(candidate.phone.clone());
                if ui.button("Assign").clicked() {
                    assign = Some(candidate.id);
                }
                ui.end_row();
            }
        });

    if let Some(driver_id) = assign {
        app.assign_driver(driver_id);
    }
}
