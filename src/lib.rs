pub mod config;
pub mod error;
pub mod frame;
pub mod scene;

// Puzzle core: wedges, layout, twists, solved check
pub mod anim;
pub mod puzzle;

// Input & game flow
pub mod input;
pub mod session;

pub use anim::twist::{SlotMove, TwistDirection, TwistOutcome};
pub use config::{LayoutOrder, PuzzleConfig, SelectionPolicy, SolvedPolicy};
pub use error::PuzzleError;
pub use puzzle::layout::{LayoutOutcome, SourceSolid};
pub use puzzle::solved::{Chirality, SolvedReport};
pub use puzzle::{Highlight, IgnoreReason, OrangePuzzle, TwistStart};
