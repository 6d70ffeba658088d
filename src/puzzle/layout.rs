/// Ring Layout: builds the slot hierarchy and places the wedges.
///
/// Hierarchy (Y up, yaw = right-handed rotation about +Y):
///
///   root
///   └─ ring            spin (yaw) of the whole puzzle
///      ├─ pivot        transient twist group, identity at rest
///      └─ wedges
///         └─ slot-k    yaw k·2π/N
///            └─ offset-k   translation (0, 0, −gap)
///               └─ wedge   the piece; outward axis is its local −Z
///
/// Rebuilding throws away every slot and wedge and creates them again, so
/// calling it twice in a row ends in the same state.
use glam::{Quat, Vec3};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::{check_permutation, LayoutOrder};
use crate::error::PuzzleError;
use crate::scene::{NodeId, SceneGraph, Transform};

use super::registry::PieceRegistry;

/// A wedge model the host supplies (one per slice).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceSolid {
    pub name: String,
}

impl SourceSolid {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// `wedge-00`, `wedge-01`, …: stand-ins when no model file is loaded.
    pub fn numbered(count: usize) -> Vec<SourceSolid> {
        (0..count).map(|i| SourceSolid::new(format!("wedge-{:02}", i))).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutOutcome {
    /// Slot `k` holds original index `slots[k]`.
    Built { slots: Vec<usize> },
    /// Not enough wedge sources yet; nothing was touched.
    Deferred { available: usize, needed: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotNodes {
    pub rotation: NodeId,
    pub offset: NodeId,
}

#[derive(Debug, Clone)]
pub struct RingLayout {
    slices: usize,
    gap: f32,
    ring: NodeId,
    pivot: NodeId,
    wedges: NodeId,
    slots: Vec<SlotNodes>,
    yaw: f32,
}

impl RingLayout {
    /// Create the fixed ring / pivot / wedges groups. Slots come with [`rebuild`](Self::rebuild).
    pub fn new(scene: &mut SceneGraph, slices: usize, gap: f32) -> Result<Self, PuzzleError> {
        let ring = scene.create_group("ring", scene.root())?;
        let pivot = scene.create_group("pivot", ring)?;
        let wedges = scene.create_group("wedges", ring)?;
        Ok(Self {
            slices,
            gap,
            ring,
            pivot,
            wedges,
            slots: Vec::new(),
            yaw: 0.0,
        })
    }

    pub fn slices(&self) -> usize {
        self.slices
    }

    pub fn ring(&self) -> NodeId {
        self.ring
    }

    pub fn pivot(&self) -> NodeId {
        self.pivot
    }

    pub fn wedges(&self) -> NodeId {
        self.wedges
    }

    pub fn slot(&self, k: usize) -> Option<SlotNodes> {
        self.slots.get(k).copied()
    }

    pub fn is_built(&self) -> bool {
        self.slots.len() == self.slices
    }

    pub fn slot_angle(&self) -> f32 {
        std::f32::consts::TAU / self.slices as f32
    }

    /// Current spin of the ring (radians, unwrapped).
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn spin(&mut self, scene: &mut SceneGraph, delta_yaw: f32) -> Result<(), PuzzleError> {
        self.set_yaw(scene, self.yaw + delta_yaw)
    }

    pub fn set_yaw(&mut self, scene: &mut SceneGraph, yaw: f32) -> Result<(), PuzzleError> {
        // Rebuilt from the scalar each time so long spins do not drift.
        scene.set_rotation(self.ring, Quat::from_rotation_y(yaw))?;
        self.yaw = yaw;
        Ok(())
    }

    /// Yaw (in the ring's own frame) of the radial direction through `world_point`.
    pub fn ring_yaw_of(&self, scene: &SceneGraph, world_point: Vec3) -> Result<f32, PuzzleError> {
        let ring_world = scene.world_transform(self.ring)?;
        let local = ring_world.inverse().transform_point3(world_point);
        Ok((-local.x).atan2(-local.z))
    }

    /// Slot whose centre direction is nearest to `world_point`.
    pub fn nearest_slot(&self, scene: &SceneGraph, world_point: Vec3) -> Result<usize, PuzzleError> {
        let yaw = self.ring_yaw_of(scene, world_point)?;
        let k = (yaw / self.slot_angle()).round() as i64;
        Ok(k.rem_euclid(self.slices as i64) as usize)
    }

    /// Discard all wedges and lay out fresh ones from `sources`.
    pub fn rebuild<R: Rng + ?Sized>(
        &mut self,
        scene: &mut SceneGraph,
        registry: &mut PieceRegistry,
        sources: &[SourceSolid],
        order: &LayoutOrder,
        rng: &mut R,
    ) -> Result<LayoutOutcome, PuzzleError> {
        if sources.len() < self.slices {
            log::warn!(
                "layout: {} of {} wedge sources available, deferring",
                sources.len(),
                self.slices
            );
            return Ok(LayoutOutcome::Deferred {
                available: sources.len(),
                needed: self.slices,
            });
        }

        let assignment: Vec<usize> = match order {
            LayoutOrder::Identity => (0..self.slices).collect(),
            LayoutOrder::Shuffled => {
                let mut perm: Vec<usize> = (0..self.slices).collect();
                perm.shuffle(rng);
                perm
            }
            LayoutOrder::Explicit(perm) => {
                check_permutation(perm, self.slices)?;
                perm.clone()
            }
        };

        let mut sorted: Vec<&SourceSolid> = sources.iter().collect();
        sorted.sort();

        scene.clear_children(self.wedges)?;
        scene.clear_children(self.pivot)?;
        scene.set_local(self.pivot, Transform::IDENTITY)?;
        registry.clear();
        self.slots.clear();

        let step = self.slot_angle();
        for k in 0..self.slices {
            let rotation = scene.create_node(
                &format!("slot-{}", k),
                self.wedges,
                Transform::from_rotation(Quat::from_rotation_y(k as f32 * step)),
            )?;
            let offset = scene.create_node(
                &format!("offset-{}", k),
                rotation,
                Transform::from_translation(Vec3::new(0.0, 0.0, -self.gap)),
            )?;
            self.slots.push(SlotNodes { rotation, offset });
        }

        for (original_index, source) in sorted.iter().take(self.slices).enumerate() {
            let slot = assignment[original_index];
            let node = scene.create_group(&source.name, self.slots[slot].offset)?;
            registry.register(original_index, node, slot)?;
        }

        let slots: Vec<usize> = registry.slot_contents(self.slices).into_iter().flatten().collect();
        log::info!("layout: rebuilt {} wedges, slots hold {:?}", self.slices, slots);
        Ok(LayoutOutcome::Built { slots })
    }
}
