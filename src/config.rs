//! Puzzle configuration.
//!
//! Every tunable constant of the ring, the twist animation and the gesture
//! controller lives in [`PuzzleConfig`]. Defaults reproduce the classic
//! eight-wedge orange.

use crate::error::PuzzleError;

/// Which source solid starts in which slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LayoutOrder {
    /// Source `i` sits in slot `i`.
    #[default]
    Identity,
    /// Uniform random permutation.
    Shuffled,
    /// Source `i` sits in slot `perm[i]`. Must be a permutation of `0..slices`.
    Explicit(Vec<usize>),
}

/// Which arc of the ring a picked slot twists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// The picked slot and the following `span - 1` slots.
    #[default]
    Leading,
    /// The arc whose lower-central slot is the picked one
    /// (`pick - 1 ..= pick + 2` on an eight-slot ring).
    Centered,
}

impl SelectionPolicy {
    /// First slot of the twisted arc.
    pub fn arc_start(self, pick: usize, span: usize, slices: usize) -> usize {
        match self {
            SelectionPolicy::Leading => pick % slices,
            SelectionPolicy::Centered => {
                let back = (span / 2).saturating_sub(1) % slices;
                (pick + slices - back) % slices
            }
        }
    }
}

/// Which cyclic orders count as solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolvedPolicy {
    /// Ascending or descending cyclic order.
    #[default]
    EitherChirality,
    /// Ascending cyclic order only.
    ForwardOnly,
}

/// Configuration for an orange-twist ring.
#[derive(Debug, Clone, PartialEq)]
pub struct PuzzleConfig {
    /// Number of wedges N (even, ≥ 4)
    pub slices: usize,
    /// Wedge ball radius, used for ray picking
    pub radius: f32,
    /// Radial offset of each wedge from the ring centre
    pub gap: f32,
    /// Twist animation length in milliseconds
    pub twist_duration_ms: f64,
    /// Ring yaw per dragged pixel (radians)
    pub drag_sensitivity: f32,
    /// Release displacement below which a drag counts as a tap (pixels)
    pub tap_threshold_px: f32,
    /// Per-frame velocity multiplier while the ring coasts
    pub decay_damping: f32,
    /// Coasting stops once |velocity| falls to this value
    pub decay_epsilon: f32,
    /// Vertical drag distance that triggers a half-ring twist (`None` = off)
    pub swipe_twist_px: Option<f32>,
    /// How long the twisted wedges stay highlighted (milliseconds)
    pub highlight_ms: f64,
    pub layout: LayoutOrder,
    pub selection: SelectionPolicy,
    pub solved: SolvedPolicy,
    /// Random twists per scramble
    pub scramble_moves: usize,
    /// RNG seed; `None` seeds from OS entropy
    pub seed: Option<u64>,
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            slices: 8,
            radius: 1.0,
            gap: 0.01,
            twist_duration_ms: 900.0,
            drag_sensitivity: 0.01,
            tap_threshold_px: 5.0,
            decay_damping: 0.95,
            decay_epsilon: 1e-4,
            swipe_twist_px: None,
            highlight_ms: 500.0,
            layout: LayoutOrder::Identity,
            selection: SelectionPolicy::Leading,
            solved: SolvedPolicy::EitherChirality,
            scramble_moves: 5,
            seed: None,
        }
    }
}

impl PuzzleConfig {
    pub fn with_slices(mut self, slices: usize) -> Self {
        self.slices = slices;
        self
    }

    pub fn with_layout(mut self, layout: LayoutOrder) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_selection(mut self, selection: SelectionPolicy) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_solved_policy(mut self, solved: SolvedPolicy) -> Self {
        self.solved = solved;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_swipe_twist(mut self, threshold_px: f32) -> Self {
        self.swipe_twist_px = Some(threshold_px);
        self
    }

    pub fn with_twist_duration_ms(mut self, duration_ms: f64) -> Self {
        self.twist_duration_ms = duration_ms;
        self
    }

    /// Wedges carried by one twist: half the ring.
    pub fn twist_span(&self) -> usize {
        self.slices / 2
    }

    /// Angular width of one slot (radians).
    pub fn slot_angle(&self) -> f32 {
        std::f32::consts::TAU / self.slices as f32
    }

    pub fn validate(&self) -> Result<(), PuzzleError> {
        let fail = |msg: String| Err(PuzzleError::InvalidConfig(msg));
        if self.slices < 4 || self.slices % 2 != 0 {
            return fail(format!("slices must be even and at least 4, got {}", self.slices));
        }
        if !(self.radius > 0.0) {
            return fail(format!("radius must be positive, got {}", self.radius));
        }
        if !(self.gap > 0.0 && self.gap < self.radius) {
            return fail(format!("gap must lie in (0, radius), got {}", self.gap));
        }
        if !(self.twist_duration_ms > 0.0) {
            return fail(format!(
                "twist duration must be positive, got {}",
                self.twist_duration_ms
            ));
        }
        if !(self.drag_sensitivity > 0.0) {
            return fail(format!(
                "drag sensitivity must be positive, got {}",
                self.drag_sensitivity
            ));
        }
        if !(self.decay_damping > 0.0 && self.decay_damping < 1.0) {
            return fail(format!("decay damping must lie in (0, 1), got {}", self.decay_damping));
        }
        if !(self.decay_epsilon > 0.0) {
            return fail(format!("decay epsilon must be positive, got {}", self.decay_epsilon));
        }
        if !(self.tap_threshold_px >= 0.0) || !(self.highlight_ms >= 0.0) {
            return fail(String::from("thresholds must not be negative"));
        }
        if let Some(px) = self.swipe_twist_px {
            if !(px > self.tap_threshold_px) {
                return fail(format!(
                    "swipe threshold {} must exceed the tap threshold {}",
                    px, self.tap_threshold_px
                ));
            }
        }
        if self.scramble_moves == 0 {
            return fail(String::from("a scramble needs at least one move"));
        }
        if let LayoutOrder::Explicit(perm) = &self.layout {
            check_permutation(perm, self.slices)?;
        }
        Ok(())
    }
}

pub(crate) fn check_permutation(perm: &[usize], slices: usize) -> Result<(), PuzzleError> {
    if perm.len() != slices {
        return Err(PuzzleError::InvalidLayout(format!(
            "expected {} slot assignments, got {}",
            slices,
            perm.len()
        )));
    }
    let mut seen = vec![false; slices];
    for &slot in perm {
        if slot >= slices || std::mem::replace(&mut seen[slot], true) {
            return Err(PuzzleError::InvalidLayout(format!(
                "{:?} is not a permutation of 0..{}",
                perm, slices
            )));
        }
    }
    Ok(())
}
