//! Frame Scheduling: "run this loop once more before the next frame".
//!
//! The host owns the display loop and calls `OrangePuzzle::tick` once per
//! refresh. Animation loops never call themselves; they hold a
//! [`FrameRequest`] for their next step, and must re-request after each step
//! to keep running. At most one request per [`FrameLoop`] is pending: asking
//! again replaces (cancels) the older one, so loops cannot stack.

/// The per-frame loops the puzzle runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameLoop {
    /// Eased rotation of the pivot group.
    Twist,
    /// Inertial coasting of the ring after a fling.
    Decay,
}

/// Cancellation token for one pending step of a loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest {
    id: u64,
    kind: FrameLoop,
}

impl FrameRequest {
    pub fn kind(&self) -> FrameLoop {
        self.kind
    }
}

#[derive(Debug, Default)]
pub struct FrameScheduler {
    next_id: u64,
    pending: Vec<FrameRequest>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule one step of `kind` for the next tick, replacing any pending one.
    pub fn request(&mut self, kind: FrameLoop) -> FrameRequest {
        if self.cancel_loop(kind) {
            log::debug!("frame: replaced stale {:?} request", kind);
        }
        self.next_id += 1;
        let req = FrameRequest {
            id: self.next_id,
            kind,
        };
        self.pending.push(req);
        req
    }

    pub fn cancel_loop(&mut self, kind: FrameLoop) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.kind != kind);
        before != self.pending.len()
    }

    pub fn cancel_all(&mut self) {
        if !self.pending.is_empty() {
            log::debug!("frame: cancelling {} pending request(s)", self.pending.len());
        }
        self.pending.clear();
    }

    pub fn is_pending(&self, kind: FrameLoop) -> bool {
        self.pending.iter().any(|p| p.kind == kind)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Hand over every request due this tick. Each runs exactly once.
    pub fn take_due(&mut self) -> Vec<FrameRequest> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requesting_twice_keeps_one_pending() {
        let mut sched = FrameScheduler::new();
        let first = sched.request(FrameLoop::Decay);
        let second = sched.request(FrameLoop::Decay);
        assert_ne!(first, second);
        let due = sched.take_due();
        assert_eq!(due, vec![second]);
        assert!(!sched.has_pending());
    }

    #[test]
    fn loops_are_cancelled_independently() {
        let mut sched = FrameScheduler::new();
        sched.request(FrameLoop::Twist);
        sched.request(FrameLoop::Decay);
        assert!(sched.cancel_loop(FrameLoop::Decay));
        assert!(!sched.cancel_loop(FrameLoop::Decay));
        assert!(sched.is_pending(FrameLoop::Twist));
        assert!(!sched.is_pending(FrameLoop::Decay));
        sched.cancel_all();
        assert!(sched.take_due().is_empty());
    }
}
