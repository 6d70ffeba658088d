//! `PuzzleApp`: the egui host around [`OrangePuzzle`].
//!
//! - `toolbar`: Scramble / Reset buttons and the status line
//! - `board`: wedge outlines and pointer forwarding

pub mod board;
pub mod toolbar;

use std::cell::RefCell;
use std::rc::Rc;

use eframe::egui;

use orange_twist::session::SessionPhase;
use orange_twist::OrangePuzzle;

// ─── Application state ───────────────────────────────────────────────────────

pub struct PuzzleApp {
    pub puzzle: OrangePuzzle,
    /// Last error reported by the core, shown in the status line
    pub error: Option<String>,
    /// Set by the solved listener, cleared by Scramble / Reset
    pub solved: Rc<RefCell<bool>>,
    pub twists: Rc<RefCell<usize>>,
    pub dark_mode: bool,
}

impl PuzzleApp {
    pub fn new(mut puzzle: OrangePuzzle) -> Self {
        let solved = Rc::new(RefCell::new(false));
        let twists = Rc::new(RefCell::new(0));

        let flag = Rc::clone(&solved);
        puzzle.on_solved(move |_| *flag.borrow_mut() = true);
        let count = Rc::clone(&twists);
        puzzle.on_twist_complete(move |_| *count.borrow_mut() += 1);

        Self {
            puzzle,
            error: None,
            solved,
            twists,
            dark_mode: true,
        }
    }

    /// Log and surface a core error without stopping the app.
    pub fn report<T>(&mut self, result: Result<T, orange_twist::PuzzleError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                log::error!("puzzle: {}", err);
                self.error = Some(err.to_string());
                None
            }
        }
    }
}

impl eframe::App for PuzzleApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.dark_mode {
            ctx.set_visuals(egui::Visuals::dark());
        } else {
            ctx.set_visuals(egui::Visuals::light());
        }

        let now_ms = ctx.input(|i| i.time) * 1000.0;
        let ticked = self.puzzle.tick(now_ms);
        self.report(ticked);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui, now_ms);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_board(ui, ctx);
        });

        let clock_running = matches!(self.puzzle.session().phase(), SessionPhase::Playing { .. });
        if self.puzzle.is_animating() || clock_running {
            ctx.request_repaint();
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.puzzle.teardown();
    }
}
