#![windows_subsystem = "windows"]

fn main() -> Result<(), eframe::Error> {
    pixelpad::app::run()
}
