//! Toolbar rendering for `PuzzleApp`.
//!
//! Scramble and Reset buttons, a light/dark toggle, and a status line with
//! the session phase and game clock.

use eframe::egui;

use orange_twist::session::SessionPhase;
use orange_twist::TwistStart;

use super::PuzzleApp;

impl PuzzleApp {
    /// Render the top toolbar strip.
    pub fn draw_toolbar(&mut self, ui: &mut egui::Ui, now_ms: f64) {
        ui.horizontal(|ui| {
            ui.add_space(4.0);

            let busy = self.puzzle.twist_in_progress();
            if ui
                .add_enabled(!busy, egui::Button::new("Scramble").min_size(egui::vec2(80.0, 24.0)))
                .clicked()
            {
                *self.solved.borrow_mut() = false;
                self.error = None;
                let started = self.puzzle.start_scramble();
                if let Some(TwistStart::Ignored(reason)) = self.report(started) {
                    log::debug!("toolbar: scramble ignored ({:?})", reason);
                }
            }

            if ui
                .add(egui::Button::new("Reset").min_size(egui::vec2(64.0, 24.0)))
                .clicked()
            {
                *self.solved.borrow_mut() = false;
                *self.twists.borrow_mut() = 0;
                self.error = None;
                let reset = self.puzzle.reset();
                self.report(reset);
            }

            let theme = if self.dark_mode { "\u{263E}" } else { "\u{2600}" };
            if ui.button(theme).clicked() {
                self.dark_mode = !self.dark_mode;
            }

            ui.separator();
            ui.label(self.status_text(now_ms));

            if let Some(ref err) = self.error {
                ui.separator();
                ui.colored_label(egui::Color32::from_rgb(220, 80, 60), err);
            }
        });
    }

    fn status_text(&self, now_ms: f64) -> String {
        let session = self.puzzle.session();
        let clock = session
            .elapsed_ms(now_ms)
            .map(|ms| format!("{:>5.1}s", ms / 1000.0))
            .unwrap_or_default();
        match session.phase() {
            SessionPhase::Ready if *self.solved.borrow() => {
                format!("Solved! ({} twists)", self.twists.borrow())
            }
            SessionPhase::Ready => String::from("Drag to spin, click a wedge to twist"),
            SessionPhase::Scrambling { remaining } => format!("Scrambling… {} to go", remaining),
            SessionPhase::Playing { .. } => format!("{}  {} moves", clock, session.moves()),
            SessionPhase::Solved { .. } => {
                format!("Solved in {} with {} moves", clock.trim(), session.moves())
            }
        }
    }
}
