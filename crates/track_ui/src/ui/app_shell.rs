use std::time::Duration;

use eframe::egui;

use crate::app::route_fetch::RouteRequestKey;
use crate::app::TrackUiApp;
use crate::ui::controls::render_control_panel;
use crate::ui::rendering::render_map;

pub fn run() -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1280.0, 860.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Delivery Tracking",
        options,
        Box::new(|_cc| Ok(Box::new(TrackUiApp::new()))),
    )
}

impl eframe::App for TrackUiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now_ms = self.now_ms();

        // Drain completed fetches first so this frame draws current data.
        if let Some(route) = self.route_fetch.drain() {
            self.tracker.apply_route(route, now_ms);
        }

        // Issue a fetch when the tracked endpoints changed.
        if let Some((from, to)) = self.tracker.route_endpoints() {
            let key = RouteRequestKey::new(from, to);
            if self.route_fetch.needs_fetch(&key) {
                let kind = self.provider_kind();
                self.route_fetch.request(&kind, from, to);
            }
        }

        egui::SidePanel::left("controls")
            .default_width(340.0)
            .show(ctx, |ui| render_control_panel(ui, self));

        egui::CentralPanel::default().show(ctx, |ui| render_map(ui, self, now_ms));

        if self.tracker.is_animating() || self.route_fetch.is_inflight() {
            ctx.request_repaint_after(Duration::from_millis(16));
        }
    }
}
