//! Time-driven animation.
//!
//! - `twist`: the eased 180° half-ring flip and its reconciliation
//! - `cubic_ease`: the easing curve shared by every animation

pub mod twist;

/// Cubic ease-in-out on [0, 1]: `4t³` below ½, `1 − (2 − 2t)³ / 2` above.
///
/// Exact at both ends (`0 → 0`, `1 → 1`), so an animation driven by it lands
/// precisely on its target angle on the final frame.
#[inline]
pub fn cubic_ease(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ease_hits_endpoints_and_midpoint() {
        assert_eq!(cubic_ease(0.0), 0.0);
        assert_eq!(cubic_ease(1.0), 1.0);
        assert!((cubic_ease(0.5) - 0.5).abs() < 1e-6);
        assert_eq!(cubic_ease(-3.0), 0.0);
        assert_eq!(cubic_ease(7.0), 1.0);
    }

    #[test]
    fn ease_is_monotonic_and_symmetric() {
        let mut prev = 0.0;
        for i in 1..=100 {
            let t = i as f32 / 100.0;
            let v = cubic_ease(t);
            assert!(v >= prev);
            assert!((v + cubic_ease(1.0 - t) - 1.0).abs() < 1e-5);
            prev = v;
        }
    }
}
