//! Pointer input.
//!
//! - `gesture`: drag-to-spin, inertial decay, tap and swipe recognition

pub mod gesture;
