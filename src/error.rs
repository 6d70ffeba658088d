use thiserror::Error;

use crate::scene::SceneError;

/// Errors surfaced by the puzzle core.
///
/// Ignored input (a tap during an animation, a layout before the wedge
/// sources exist) is not an error; see `TwistStart` and `LayoutOutcome`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PuzzleError {
    #[error("twist selection {index} is out of range for a ring of {slices} slots")]
    InvalidSelection { index: usize, slices: usize },
    #[error("no piece with original index {original_index}")]
    UnknownPiece { original_index: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid layout: {0}")]
    InvalidLayout(String),
    #[error(transparent)]
    Scene(#[from] SceneError),
}
