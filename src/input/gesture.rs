//! Spin / Gesture Recognition
//!
//! Turns raw pointer events into ring actions:
//! - Drag: horizontal motion spins the ring (`Δx · sensitivity`)
//! - Fling: releasing a drag leaves the ring coasting, damped every frame
//! - Tap: release within a few pixels of the press → pick a wedge and twist
//! - Swipe (optional): a long vertical drag twists the half of the ring on
//!   that side of the screen
//!
//! Tap and drag are told apart by displacement alone; the pointer API sends
//! the same down/move/up sequence for both.

use crate::anim::twist::TwistDirection;
use crate::config::PuzzleConfig;

/// Gesture tuning, lifted out of [`PuzzleConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSettings {
    /// Radians of ring yaw per pixel
    pub sensitivity: f32,
    /// Max release displacement of a tap (px)
    pub tap_threshold: f32,
    /// Velocity multiplier per decay frame
    pub damping: f32,
    /// Coasting stops at or below this speed
    pub epsilon: f32,
    /// Vertical distance that turns a drag into a swipe twist
    pub swipe_threshold: Option<f32>,
}

impl GestureSettings {
    pub fn from_config(config: &PuzzleConfig) -> Self {
        Self {
            sensitivity: config.drag_sensitivity,
            tap_threshold: config.tap_threshold_px,
            damping: config.decay_damping,
            epsilon: config.decay_epsilon,
            swipe_threshold: config.swipe_twist_px,
        }
    }
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self::from_config(&PuzzleConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GesturePhase {
    Idle,
    Dragging {
        start: (f32, f32),
        last: (f32, f32),
    },
    Decaying,
}

/// A vertical swipe, resolved to a twist of one half of the ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swipe {
    /// Screen x where the drag began; picks the half of the ring
    pub start_x: f32,
    pub direction: TwistDirection,
}

/// What the caller should do in response to a pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureAction {
    None,
    /// Input arrived while a twist was running and was dropped
    Ignored,
    BeginDrag,
    Spin { delta_yaw: f32 },
    Swipe(Swipe),
    Tap { x: f32, y: f32 },
    /// Schedule the decay loop; the ring keeps turning at `velocity` rad/frame
    StartDecay { velocity: f32 },
}

/// Pointer state machine.
///
/// Pure: it never touches the scene, it only reports what should happen.
#[derive(Debug, Clone)]
pub struct GestureController {
    settings: GestureSettings,
    phase: GesturePhase,
    /// Last frame's spin (rad), carried into the decay
    velocity: f32,
}

impl GestureController {
    pub fn new(settings: GestureSettings) -> Self {
        Self {
            settings,
            phase: GesturePhase::Idle,
            velocity: 0.0,
        }
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, GesturePhase::Dragging { .. })
    }

    pub fn is_decaying(&self) -> bool {
        self.phase == GesturePhase::Decaying
    }

    /// Drop any drag or coast in progress.
    pub fn cancel(&mut self) {
        self.phase = GesturePhase::Idle;
        self.velocity = 0.0;
    }

    /// Press. A running decay is cancelled; nothing starts while twisting.
    pub fn pointer_down(&mut self, x: f32, y: f32, twist_active: bool) -> GestureAction {
        if twist_active {
            log::debug!("gesture: press at ({:.0}, {:.0}) ignored during twist", x, y);
            return GestureAction::Ignored;
        }
        self.phase = GesturePhase::Dragging {
            start: (x, y),
            last: (x, y),
        };
        self.velocity = 0.0;
        GestureAction::BeginDrag
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> GestureAction {
        let GesturePhase::Dragging { start, last } = self.phase else {
            return GestureAction::None;
        };
        // Same position as the last event: keep the fling velocity.
        if (x, y) == last {
            return GestureAction::None;
        }

        if let Some(threshold) = self.settings.swipe_threshold {
            let dy = y - start.1;
            if dy.abs() > threshold {
                // A swipe ends the drag; the twist owns the ring from here.
                self.cancel();
                let direction = if dy < 0.0 {
                    TwistDirection::Up
                } else {
                    TwistDirection::Down
                };
                return GestureAction::Swipe(Swipe {
                    start_x: start.0,
                    direction,
                });
            }
        }

        let delta_yaw = (x - last.0) * self.settings.sensitivity;
        self.velocity = delta_yaw;
        self.phase = GesturePhase::Dragging { start, last: (x, y) };
        GestureAction::Spin { delta_yaw }
    }

    /// Release: tap if the pointer barely moved, otherwise let the ring coast.
    pub fn pointer_up(&mut self, x: f32, y: f32) -> GestureAction {
        let GesturePhase::Dragging { start, .. } = self.phase else {
            return GestureAction::None;
        };
        let dx = x - start.0;
        let dy = y - start.1;
        if (dx * dx + dy * dy).sqrt() < self.settings.tap_threshold {
            self.cancel();
            return GestureAction::Tap { x, y };
        }
        self.release()
    }

    /// Pointer left the surface: a release that can never be a tap.
    pub fn pointer_leave(&mut self) -> GestureAction {
        if !self.is_dragging() {
            return GestureAction::None;
        }
        self.release()
    }

    fn release(&mut self) -> GestureAction {
        if self.velocity.abs() > self.settings.epsilon {
            self.phase = GesturePhase::Decaying;
            GestureAction::StartDecay {
                velocity: self.velocity,
            }
        } else {
            self.cancel();
            GestureAction::None
        }
    }

    /// One decay frame: damp, then return the spin to apply.
    /// `None` once the ring has come to rest (the controller is idle again).
    pub fn decay_step(&mut self) -> Option<f32> {
        if !self.is_decaying() {
            return None;
        }
        self.velocity *= self.settings.damping;
        if self.velocity.abs() > self.settings.epsilon {
            Some(self.velocity)
        } else {
            log::debug!("gesture: decay finished");
            self.cancel();
            None
        }
    }
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new(GestureSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_release_is_a_tap() {
        let mut g = GestureController::default();
        assert_eq!(g.pointer_down(200.0, 300.0, false), GestureAction::BeginDrag);
        g.pointer_move(202.0, 301.0);
        match g.pointer_up(203.0, 302.0) {
            GestureAction::Tap { x, y } => {
                assert!((x - 203.0).abs() < 1e-6);
                assert!((y - 302.0).abs() < 1e-6);
            }
            other => panic!("Expected Tap, got {:?}", other),
        }
        assert_eq!(g.phase(), GesturePhase::Idle);
    }

    #[test]
    fn test_drag_spins_by_sensitivity() {
        let mut g = GestureController::default();
        g.pointer_down(100.0, 100.0, false);
        match g.pointer_move(130.0, 100.0) {
            GestureAction::Spin { delta_yaw } => assert!((delta_yaw - 0.3).abs() < 1e-6),
            other => panic!("Expected Spin, got {:?}", other),
        }
        match g.pointer_move(120.0, 100.0) {
            GestureAction::Spin { delta_yaw } => assert!((delta_yaw + 0.1).abs() < 1e-6),
            other => panic!("Expected Spin, got {:?}", other),
        }
    }

    #[test]
    fn test_fling_decays_to_rest() {
        let mut g = GestureController::default();
        g.pointer_down(0.0, 0.0, false);
        g.pointer_move(40.0, 0.0);
        assert!(matches!(g.pointer_up(40.0, 0.0), GestureAction::StartDecay { .. }));

        let mut frames = 0;
        let mut prev = f32::MAX;
        while let Some(v) = g.decay_step() {
            assert!(v.abs() < prev);
            prev = v.abs();
            frames += 1;
            assert!(frames < 1000);
        }
        // 0.4 · 0.95^k ≤ 1e-4 first at k = 162
        assert_eq!(frames, 161);
        assert_eq!(g.phase(), GesturePhase::Idle);
    }

    #[test]
    fn test_press_cancels_decay_and_is_ignored_while_twisting() {
        let mut g = GestureController::default();
        g.pointer_down(0.0, 0.0, false);
        g.pointer_move(50.0, 0.0);
        g.pointer_up(50.0, 0.0);
        assert!(g.is_decaying());

        g.pointer_down(10.0, 10.0, false);
        assert!(g.is_dragging());
        assert_eq!(g.decay_step(), None);

        let mut busy = GestureController::default();
        assert_eq!(busy.pointer_down(0.0, 0.0, true), GestureAction::Ignored);
        assert_eq!(busy.phase(), GesturePhase::Idle);
        assert_eq!(busy.pointer_move(30.0, 0.0), GestureAction::None);
    }

    #[test]
    fn test_repeated_position_keeps_fling() {
        let mut g = GestureController::default();
        g.pointer_down(100.0, 300.0, false);
        g.pointer_move(140.0, 300.0);
        g.pointer_move(180.0, 300.0);
        assert_eq!(g.pointer_move(180.0, 300.0), GestureAction::None);
        match g.pointer_up(180.0, 300.0) {
            GestureAction::StartDecay { velocity } => assert!((velocity - 0.4).abs() < 1e-5),
            other => panic!("Expected StartDecay, got {:?}", other),
        }
    }

    #[test]
    fn test_leave_never_taps() {
        let mut g = GestureController::default();
        g.pointer_down(0.0, 0.0, false);
        assert_eq!(g.pointer_leave(), GestureAction::None);
        assert_eq!(g.phase(), GesturePhase::Idle);
    }

    #[test]
    fn test_vertical_swipe_fires_once() {
        let settings = GestureSettings {
            swipe_threshold: Some(50.0),
            ..GestureSettings::default()
        };
        let mut g = GestureController::new(settings);
        g.pointer_down(100.0, 400.0, false);
        assert!(matches!(g.pointer_move(101.0, 370.0), GestureAction::Spin { .. }));
        assert_eq!(
            g.pointer_move(102.0, 340.0),
            GestureAction::Swipe(Swipe {
                start_x: 100.0,
                direction: TwistDirection::Up
            })
        );
        assert_eq!(g.pointer_move(103.0, 300.0), GestureAction::None);
        assert_eq!(g.pointer_up(103.0, 300.0), GestureAction::None);
    }
}
