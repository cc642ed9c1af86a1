mod app;
mod ui;

fn main() -> eframe::Result<()> {
    ui::app_shell::run()
}
