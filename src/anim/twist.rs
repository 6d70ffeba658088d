//! Twist Animator.
//!
//! A twist carries half the ring (N/2 neighbouring wedges) through a 180° turn
//! about a horizontal axis lying in the gap at the middle of the arc:
//!
//! 1. `begin`: yaw the pivot group toward the first wedge of the arc, add
//!    `π/2 − π/N` so its local Z axis runs through the central gap, then
//!    attach the arc's wedges to the pivot (world transforms preserved).
//! 2. `advance`: per frame, rotate the pivot about its local Z by the change
//!    in `ease(t)·π` since the previous frame.
//! 3. At `t = 1`: attach every wedge to the slot it now occupies, snap its
//!    local transform to the exact resting value, and reset the pivot.
//!
//! The flip mirrors the arc: the wedge that left slot `start + k` lands in
//! slot `start + span − 1 − k`, upside down relative to where it was.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::Quat;
use rand::Rng;

use crate::error::PuzzleError;
use crate::puzzle::layout::RingLayout;
use crate::puzzle::registry::{Container, PieceRegistry};
use crate::scene::{NodeId, SceneGraph, Transform};

use super::cubic_ease;

/// Total rotation of one twist.
pub const TWIST_ANGLE: f32 = PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TwistDirection {
    /// Positive rotation about the pivot's Z axis.
    Up,
    /// Negative rotation about the pivot's Z axis.
    Down,
}

impl TwistDirection {
    pub fn sign(self) -> f32 {
        match self {
            TwistDirection::Up => 1.0,
            TwistDirection::Down => -1.0,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            TwistDirection::Up => TwistDirection::Down,
            TwistDirection::Down => TwistDirection::Up,
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            TwistDirection::Up
        } else {
            TwistDirection::Down
        }
    }
}

/// One wedge's journey through a twist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotMove {
    pub original_index: usize,
    pub from: usize,
    pub to: usize,
}

/// Reported once a twist has been reconciled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwistOutcome {
    pub start_slot: usize,
    pub direction: TwistDirection,
    pub moves: Vec<SlotMove>,
}

/// A twist in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveTwist {
    pub start_slot: usize,
    pub direction: TwistDirection,
    /// `(original_index, from_slot)`, in arc order.
    pub pieces: Vec<(usize, usize)>,
    /// Set by the first `advance`; the clock starts there.
    started_ms: Option<f64>,
    /// Rotation already applied to the pivot, unsigned.
    applied: f32,
}

impl ActiveTwist {
    pub fn original_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.pieces.iter().map(|(idx, _)| *idx)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TwistProgress {
    Running { t: f32 },
    Finished(TwistOutcome),
}

#[derive(Debug, Clone)]
pub struct TwistAnimator {
    duration_ms: f64,
    active: Option<ActiveTwist>,
}

impl TwistAnimator {
    pub fn new(duration_ms: f64) -> Self {
        Self {
            duration_ms,
            active: None,
        }
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&ActiveTwist> {
        self.active.as_ref()
    }

    /// Drop the in-flight twist without reconciling. Only valid when the
    /// caller is about to rebuild the layout.
    pub fn cancel(&mut self) -> Option<ActiveTwist> {
        self.active.take()
    }

    /// Orient the pivot and move the arc starting at `start_slot` into it.
    ///
    /// Returns `Ok(false)` without touching anything if a twist is already running.
    pub fn begin(
        &mut self,
        scene: &mut SceneGraph,
        registry: &mut PieceRegistry,
        layout: &RingLayout,
        start_slot: usize,
        direction: TwistDirection,
    ) -> Result<bool, PuzzleError> {
        let slices = layout.slices();
        if start_slot >= slices {
            return Err(PuzzleError::InvalidSelection {
                index: start_slot,
                slices,
            });
        }
        if self.active.is_some() {
            return Ok(false);
        }

        let span = slices / 2;
        let mut pieces = Vec::with_capacity(span);
        for k in 0..span {
            let slot = (start_slot + k) % slices;
            let piece = registry
                .piece_in_slot(slot)
                .ok_or_else(|| PuzzleError::InvalidLayout(format!("slot {} is empty", slot)))?;
            pieces.push((piece.original_index(), slot));
        }

        let picked = registry.world_position(scene, pieces[0].0)?;
        let facing = layout.ring_yaw_of(scene, picked)?;
        let axis_yaw = facing + FRAC_PI_2 - PI / slices as f32;
        scene.set_local(
            layout.pivot(),
            Transform::from_rotation(Quat::from_rotation_y(axis_yaw)),
        )?;

        for &(original_index, _) in &pieces {
            registry.transfer(scene, original_index, Container::Pivot, layout.pivot())?;
        }

        log::info!(
            "twist: start slot {} {:?}, wedges {:?}",
            start_slot,
            direction,
            pieces.iter().map(|(idx, _)| *idx).collect::<Vec<_>>()
        );
        self.active = Some(ActiveTwist {
            start_slot,
            direction,
            pieces,
            started_ms: None,
            applied: 0.0,
        });
        Ok(true)
    }

    /// Step the running twist to `now_ms`. `Ok(None)` when idle.
    pub fn advance(
        &mut self,
        scene: &mut SceneGraph,
        registry: &mut PieceRegistry,
        layout: &RingLayout,
        now_ms: f64,
    ) -> Result<Option<TwistProgress>, PuzzleError> {
        let Some(twist) = self.active.as_mut() else {
            return Ok(None);
        };

        let started = *twist.started_ms.get_or_insert(now_ms);
        let t = ((now_ms - started) / self.duration_ms).clamp(0.0, 1.0) as f32;
        let target = cubic_ease(t) * TWIST_ANGLE;
        let delta = target - twist.applied;
        scene.rotate_z(layout.pivot(), twist.direction.sign() * delta)?;
        twist.applied = target;

        if t < 1.0 {
            return Ok(Some(TwistProgress::Running { t }));
        }

        let outcome = self.reconcile(scene, registry, layout)?;
        Ok(Some(TwistProgress::Finished(outcome)))
    }

    fn reconcile(
        &mut self,
        scene: &mut SceneGraph,
        registry: &mut PieceRegistry,
        layout: &RingLayout,
    ) -> Result<TwistOutcome, PuzzleError> {
        let Some(twist) = self.active.take() else {
            return Err(PuzzleError::InvalidLayout(String::from("no twist to reconcile")));
        };

        let mut moves = Vec::with_capacity(twist.pieces.len());
        for &(original_index, from) in &twist.pieces {
            let pos = registry.world_position(scene, original_index)?;
            let to = layout.nearest_slot(scene, pos)?;
            if moves.iter().any(|m: &SlotMove| m.to == to) || registry.piece_in_slot(to).is_some() {
                return Err(PuzzleError::InvalidLayout(format!(
                    "wedge {} landed on occupied slot {}",
                    original_index, to
                )));
            }
            moves.push(SlotMove {
                original_index,
                from,
                to,
            });
        }

        for m in &moves {
            let slot = layout
                .slot(m.to)
                .ok_or(PuzzleError::InvalidSelection {
                    index: m.to,
                    slices: layout.slices(),
                })?;
            registry.transfer(scene, m.original_index, Container::Slot(m.to), slot.offset)?;
            snap_to_rest(scene, registry.get(m.original_index)?.node())?;
        }
        scene.set_local(layout.pivot(), Transform::IDENTITY)?;

        log::info!("twist: reconciled {:?}", moves);
        Ok(TwistOutcome {
            start_slot: twist.start_slot,
            direction: twist.direction,
            moves,
        })
    }
}

/// A resting wedge sits at its offset wrapper's origin, either upright or
/// turned half-way about local Z. Snap to whichever is closer so float error
/// from the animation never accumulates across twists.
fn snap_to_rest(scene: &mut SceneGraph, node: NodeId) -> Result<(), PuzzleError> {
    let current = scene.local(node)?.rotation;
    let half_turn = Quat::from_rotation_z(PI);
    let rotation = if current.dot(half_turn).abs() > current.dot(Quat::IDENTITY).abs() {
        half_turn
    } else {
        Quat::IDENTITY
    };
    scene.set_local(node, Transform::from_rotation(rotation))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutOrder;
    use crate::puzzle::layout::SourceSolid;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Rig {
        scene: SceneGraph,
        reg: PieceRegistry,
        layout: RingLayout,
        anim: TwistAnimator,
    }

    fn rig(slices: usize) -> Rig {
        let mut scene = SceneGraph::new();
        let mut reg = PieceRegistry::new();
        let mut layout = RingLayout::new(&mut scene, slices, 0.01).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        layout
            .rebuild(&mut scene, &mut reg, &SourceSolid::numbered(slices), &LayoutOrder::Identity, &mut rng)
            .unwrap();
        Rig {
            scene,
            reg,
            layout,
            anim: TwistAnimator::new(900.0),
        }
    }

    impl Rig {
        fn run(&mut self, start: usize, dir: TwistDirection) -> TwistOutcome {
            assert!(self.anim.begin(&mut self.scene, &mut self.reg, &self.layout, start, dir).unwrap());
            let mut now = 0.0;
            loop {
                match self
                    .anim
                    .advance(&mut self.scene, &mut self.reg, &self.layout, now)
                    .unwrap()
                {
                    Some(TwistProgress::Finished(outcome)) => return outcome,
                    Some(TwistProgress::Running { .. }) => now += 16.0,
                    None => panic!("animator went idle without finishing"),
                }
            }
        }
    }

    #[test]
    fn twist_mirrors_the_arc() {
        let mut r = rig(8);
        let out = r.run(0, TwistDirection::Up);
        let pairs: Vec<(usize, usize)> = out.moves.iter().map(|m| (m.from, m.to)).collect();
        assert_eq!(pairs, vec![(0, 3), (1, 2), (2, 1), (3, 0)]);
        assert_eq!(r.reg.slot_contents(8), vec![Some(3), Some(2), Some(1), Some(0), Some(4), Some(5), Some(6), Some(7)]);
        assert_eq!(r.scene.local(r.layout.pivot()).unwrap(), Transform::IDENTITY);
        assert!(r.scene.children(r.layout.pivot()).unwrap().is_empty());
    }

    #[test]
    fn twist_wraps_around_the_seam() {
        let mut r = rig(8);
        r.layout.spin(&mut r.scene, -2.2).unwrap();
        let out = r.run(6, TwistDirection::Down);
        let pairs: Vec<(usize, usize)> = out.moves.iter().map(|m| (m.from, m.to)).collect();
        assert_eq!(pairs, vec![(6, 1), (7, 0), (0, 7), (1, 6)]);
    }

    #[test]
    fn wedges_rest_exactly_after_reconcile() {
        let mut r = rig(8);
        r.run(2, TwistDirection::Up);
        let half_turn = Transform::from_rotation(Quat::from_rotation_z(PI));
        for k in 2..6 {
            let node = r.reg.piece_in_slot(k).unwrap().node();
            assert_eq!(r.scene.local(node).unwrap(), half_turn);
        }
        r.run(2, TwistDirection::Down);
        for k in 0..8 {
            let node = r.reg.piece_in_slot(k).unwrap().node();
            assert_eq!(r.scene.local(node).unwrap(), Transform::IDENTITY);
        }
    }

    #[test]
    fn twelve_slice_ring_flips_six_wedges() {
        let mut r = rig(12);
        let out = r.run(9, TwistDirection::Up);
        let to: Vec<usize> = out.moves.iter().map(|m| m.to).collect();
        assert_eq!(to, vec![2, 1, 0, 11, 10, 9]);
    }

    #[test]
    fn begin_rejects_out_of_range_before_touching_state() {
        let mut r = rig(8);
        let before = r.reg.slot_contents(8);
        let err = r.anim.begin(&mut r.scene, &mut r.reg, &r.layout, 8, TwistDirection::Up);
        assert_eq!(err, Err(PuzzleError::InvalidSelection { index: 8, slices: 8 }));
        assert_eq!(r.reg.slot_contents(8), before);
        assert!(!r.anim.is_active());
    }

    #[test]
    fn begin_is_single_flight() {
        let mut r = rig(8);
        assert!(r.anim.begin(&mut r.scene, &mut r.reg, &r.layout, 0, TwistDirection::Up).unwrap());
        let contents = r.reg.slot_contents(8);
        let pivot = r.scene.local(r.layout.pivot()).unwrap();
        assert!(!r.anim.begin(&mut r.scene, &mut r.reg, &r.layout, 4, TwistDirection::Down).unwrap());
        assert_eq!(r.reg.slot_contents(8), contents);
        assert_eq!(r.scene.local(r.layout.pivot()).unwrap(), pivot);
        assert_eq!(r.reg.in_pivot().count(), 4);
    }

    #[test]
    fn late_frame_clamps_and_reconciles() {
        let mut r = rig(8);
        r.anim.begin(&mut r.scene, &mut r.reg, &r.layout, 1, TwistDirection::Up).unwrap();
        let first = r.anim.advance(&mut r.scene, &mut r.reg, &r.layout, 1000.0).unwrap();
        assert_eq!(first, Some(TwistProgress::Running { t: 0.0 }));
        let done = r.anim.advance(&mut r.scene, &mut r.reg, &r.layout, 9000.0).unwrap();
        assert!(matches!(done, Some(TwistProgress::Finished(_))));
        assert!(!r.anim.is_active());
    }
}
