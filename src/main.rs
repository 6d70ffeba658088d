use eframe::egui;

use orange_twist::{OrangePuzzle, PuzzleConfig};

mod app;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let config = PuzzleConfig::default().with_swipe_twist(50.0);
    let puzzle = match OrangePuzzle::with_default_sources(config) {
        Ok(puzzle) => puzzle,
        Err(err) => {
            log::error!("failed to build the puzzle: {}", err);
            return Err(eframe::Error::AppCreation(Box::new(err)));
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 720.0])
            .with_title("Orange Twist"),
        ..Default::default()
    };

    eframe::run_native(
        "Orange Twist",
        options,
        Box::new(|_cc| Ok(Box::new(app::PuzzleApp::new(puzzle)))),
    )
}
