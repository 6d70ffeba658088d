//! Solved Detector.
//!
//! Reads nothing but world positions: every wedge is placed on the ring by
//! its azimuth, the wedges are ordered around the ring, and the sequence of
//! original indices is checked for a constant circular step. Only relative
//! order matters, so spinning the whole ring never changes the verdict.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::Vec3;

use crate::config::SolvedPolicy;

/// One wedge as seen by the detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieceSample {
    pub original_index: usize,
    pub world_position: Vec3,
}

/// Direction in which the original indices run around the ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chirality {
    /// Every step is +1 (mod N).
    Forward,
    /// Every step is N−1 (mod N), the mirror image.
    Backward,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolvedReport {
    /// Original indices in ring order (descending azimuth).
    pub order: Vec<usize>,
    /// Set when the order is solved under the active policy.
    pub chirality: Option<Chirality>,
}

impl SolvedReport {
    pub fn is_solved(&self) -> bool {
        self.chirality.is_some()
    }
}

/// Azimuth of a world position in [0, 2π), phased so an unspun slot 0 reads 0.
pub fn ring_angle(position: Vec3) -> f32 {
    let angle = (position.z.atan2(position.x) + FRAC_PI_2).rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU
    if angle >= TAU {
        0.0
    } else {
        angle
    }
}

/// Pure: same samples, same report.
pub fn check_solved(samples: &[PieceSample], policy: SolvedPolicy) -> SolvedReport {
    let n = samples.len();
    let mut entries: Vec<(f32, usize)> = samples
        .iter()
        .map(|s| (ring_angle(s.world_position), s.original_index))
        .collect();
    entries.sort_by(|a, b| b.0.total_cmp(&a.0));
    let order: Vec<usize> = entries.into_iter().map(|(_, idx)| idx).collect();

    if n == 0 {
        return SolvedReport {
            order,
            chirality: None,
        };
    }

    let steps: Vec<usize> = order
        .windows(2)
        .map(|w| (w[1] + n - w[0]) % n)
        .collect();
    let forward = steps.iter().all(|&d| d == 1);
    let backward = steps.iter().all(|&d| d == n - 1);

    let chirality = match (forward, backward, policy) {
        (true, _, _) => Some(Chirality::Forward),
        (false, true, SolvedPolicy::EitherChirality) => Some(Chirality::Backward),
        _ => None,
    };

    SolvedReport { order, chirality }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    /// Sample for original index `idx` resting in slot `slot` of an N-ring spun by `yaw`.
    fn at_slot(idx: usize, slot: usize, n: usize, yaw: f32) -> PieceSample {
        let angle = yaw + slot as f32 * TAU / n as f32;
        PieceSample {
            original_index: idx,
            world_position: Quat::from_rotation_y(angle) * Vec3::new(0.0, 0.0, -0.01),
        }
    }

    fn layout(slots: &[usize], yaw: f32) -> Vec<PieceSample> {
        slots
            .iter()
            .enumerate()
            .map(|(idx, &slot)| at_slot(idx, slot, slots.len(), yaw))
            .collect()
    }

    #[test]
    fn unspun_slot_zero_reads_angle_zero() {
        assert!(ring_angle(Vec3::new(0.0, 0.0, -0.01)).abs() < 1e-6);
    }

    #[test]
    fn identity_layout_is_solved() {
        let report = check_solved(&layout(&[0, 1, 2, 3, 4, 5, 6, 7], 0.0), SolvedPolicy::EitherChirality);
        assert_eq!(report.order, vec![1, 2, 3, 4, 5, 6, 7, 0]);
        assert_eq!(report.chirality, Some(Chirality::Forward));
    }

    #[test]
    fn swapped_neighbours_are_not_solved() {
        let report = check_solved(&layout(&[1, 0, 2, 3, 4, 5, 6, 7], 0.0), SolvedPolicy::EitherChirality);
        assert!(!report.is_solved());
    }

    #[test]
    fn solved_under_any_spin() {
        for step in 0..37 {
            let yaw = step as f32 * 0.173 - 3.0;
            let samples = layout(&[0, 1, 2, 3, 4, 5, 6, 7], yaw);
            assert!(check_solved(&samples, SolvedPolicy::EitherChirality).is_solved(), "yaw {}", yaw);
        }
    }

    #[test]
    fn mirror_order_depends_on_policy() {
        // Original index i in slot (8 - i) % 8 runs backwards around the ring.
        let mirrored: Vec<usize> = (0..8).map(|i| (8 - i) % 8).collect();
        let samples = layout(&mirrored, 0.4);
        assert_eq!(
            check_solved(&samples, SolvedPolicy::EitherChirality).chirality,
            Some(Chirality::Backward)
        );
        assert!(!check_solved(&samples, SolvedPolicy::ForwardOnly).is_solved());
    }

    #[test]
    fn detector_is_pure() {
        let samples = layout(&[3, 1, 2, 0, 4, 7, 6, 5], 1.0);
        let first = check_solved(&samples, SolvedPolicy::EitherChirality);
        let second = check_solved(&samples, SolvedPolicy::EitherChirality);
        assert_eq!(first, second);
        assert_eq!(samples, layout(&[3, 1, 2, 0, 4, 7, 6, 5], 1.0));
    }
}
