/// Piece Registry: the N wedges and who owns each of them.
///
/// A piece's identity (`original_index`) is fixed when the layout creates it.
/// Its owner is tracked as a [`Container`]; the matching scene-graph parent is
/// only ever changed through [`PieceRegistry::transfer`], which re-parents the
/// node and updates the owner in one step.
use glam::{Affine3A, Vec3};

use crate::error::PuzzleError;
use crate::scene::{NodeId, SceneGraph};

use super::solved::PieceSample;

/// Current owner of a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    /// Resting in ring slot `k`.
    Slot(usize),
    /// Carried by the pivot group during a twist.
    Pivot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    original_index: usize,
    node: NodeId,
    container: Container,
}

impl Piece {
    pub fn original_index(&self) -> usize {
        self.original_index
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn container(&self) -> Container {
        self.container
    }

    pub fn slot(&self) -> Option<usize> {
        match self.container {
            Container::Slot(k) => Some(k),
            Container::Pivot => None,
        }
    }
}

/// Pieces indexed by original index.
#[derive(Debug, Clone, Default)]
pub struct PieceRegistry {
    pieces: Vec<Piece>,
}

impl PieceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.pieces.clear();
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Register the next piece. Pieces must arrive in original-index order.
    pub fn register(&mut self, original_index: usize, node: NodeId, slot: usize) -> Result<(), PuzzleError> {
        if original_index != self.pieces.len() {
            return Err(PuzzleError::InvalidLayout(format!(
                "piece {} registered out of order (expected {})",
                original_index,
                self.pieces.len()
            )));
        }
        if self.piece_in_slot(slot).is_some() {
            return Err(PuzzleError::InvalidLayout(format!("slot {} is already occupied", slot)));
        }
        self.pieces.push(Piece {
            original_index,
            node,
            container: Container::Slot(slot),
        });
        Ok(())
    }

    pub fn get(&self, original_index: usize) -> Result<&Piece, PuzzleError> {
        self.pieces
            .get(original_index)
            .ok_or(PuzzleError::UnknownPiece { original_index })
    }

    pub fn piece_in_slot(&self, slot: usize) -> Option<&Piece> {
        self.pieces.iter().find(|p| p.container == Container::Slot(slot))
    }

    pub fn in_pivot(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter().filter(|p| p.container == Container::Pivot)
    }

    /// Re-parent a piece's node under `target` (world transform preserved) and
    /// record `to` as its new owner. On error nothing changes.
    pub fn transfer(
        &mut self,
        scene: &mut SceneGraph,
        original_index: usize,
        to: Container,
        target: NodeId,
    ) -> Result<(), PuzzleError> {
        let piece = self
            .pieces
            .get_mut(original_index)
            .ok_or(PuzzleError::UnknownPiece { original_index })?;
        scene.attach(piece.node, target)?;
        piece.container = to;
        Ok(())
    }

    pub fn world_transforms(&self, scene: &SceneGraph) -> Result<Vec<(usize, Affine3A)>, PuzzleError> {
        self.pieces
            .iter()
            .map(|p| Ok((p.original_index, scene.world_transform(p.node)?)))
            .collect()
    }

    pub fn world_position(&self, scene: &SceneGraph, original_index: usize) -> Result<Vec3, PuzzleError> {
        Ok(scene.world_position(self.get(original_index)?.node)?)
    }

    /// World-position samples for the solved detector.
    pub fn samples(&self, scene: &SceneGraph) -> Result<Vec<PieceSample>, PuzzleError> {
        self.pieces
            .iter()
            .map(|p| {
                Ok(PieceSample {
                    original_index: p.original_index,
                    world_position: scene.world_position(p.node)?,
                })
            })
            .collect()
    }

    /// Original index sitting in each slot, `None` for slots emptied by a twist.
    pub fn slot_contents(&self, slices: usize) -> Vec<Option<usize>> {
        let mut slots = vec![None; slices];
        for piece in &self.pieces {
            if let Container::Slot(k) = piece.container {
                if let Some(entry) = slots.get_mut(k) {
                    *entry = Some(piece.original_index);
                }
            }
        }
        slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_moves_node_and_owner_together() {
        let mut scene = SceneGraph::new();
        let slot = scene.create_group("slot", scene.root()).unwrap();
        let pivot = scene.create_group("pivot", scene.root()).unwrap();
        let node = scene.create_group("piece", slot).unwrap();

        let mut reg = PieceRegistry::new();
        reg.register(0, node, 0).unwrap();
        reg.transfer(&mut scene, 0, Container::Pivot, pivot).unwrap();

        assert_eq!(reg.get(0).unwrap().container(), Container::Pivot);
        assert_eq!(scene.parent(node).unwrap(), Some(pivot));
        assert_eq!(reg.in_pivot().count(), 1);
        assert_eq!(reg.slot_contents(2), vec![None, None]);
    }

    #[test]
    fn failed_transfer_leaves_owner_untouched() {
        let mut scene = SceneGraph::new();
        let slot = scene.create_group("slot", scene.root()).unwrap();
        let node = scene.create_group("piece", slot).unwrap();
        let mut reg = PieceRegistry::new();
        reg.register(0, node, 3).unwrap();

        // A piece cannot be attached under itself.
        assert!(reg.transfer(&mut scene, 0, Container::Pivot, node).is_err());
        assert_eq!(reg.get(0).unwrap().slot(), Some(3));
        assert!(matches!(reg.get(4), Err(PuzzleError::UnknownPiece { original_index: 4 })));
    }

    #[test]
    fn register_rejects_double_booked_slots() {
        let mut scene = SceneGraph::new();
        let a = scene.create_group("a", scene.root()).unwrap();
        let b = scene.create_group("b", scene.root()).unwrap();
        let mut reg = PieceRegistry::new();
        reg.register(0, a, 1).unwrap();
        assert!(reg.register(1, b, 1).is_err());
        assert!(reg.register(2, b, 0).is_err());
    }
}
