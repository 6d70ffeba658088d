//! Game session: scramble, play, solve.
//!
//! A scramble is a run of random twists started back to back; the game clock
//! starts when the last one lands and stops when a player twist solves the
//! ring. The session only keeps score. Twists themselves are driven by the
//! puzzle, which asks [`GameSession::twist_completed`] what to do next.

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionPhase {
    /// Free play; no clock.
    Ready,
    /// `remaining` scramble twists have yet to complete.
    Scrambling { remaining: usize },
    Playing { started_ms: f64 },
    Solved { elapsed_ms: f64 },
}

/// What a completed twist means for the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    None,
    /// Start the next scramble twist.
    ScrambleNext { remaining: usize },
    /// The scramble is done and the clock is running.
    ScrambleFinished,
    /// A player twist solved the ring.
    Solved { elapsed_ms: f64, moves: usize },
}

#[derive(Debug, Clone)]
pub struct GameSession {
    phase: SessionPhase,
    moves: usize,
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Ready,
            moves: 0,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_scrambling(&self) -> bool {
        matches!(self.phase, SessionPhase::Scrambling { .. })
    }

    /// Player twists since the scramble finished.
    pub fn moves(&self) -> usize {
        self.moves
    }

    pub fn start_scramble(&mut self, moves: usize) {
        log::info!("session: scrambling with {} twists", moves);
        self.phase = SessionPhase::Scrambling { remaining: moves };
        self.moves = 0;
    }

    pub fn twist_completed(&mut self, now_ms: f64, solved: bool) -> SessionEvent {
        match self.phase {
            SessionPhase::Scrambling { remaining } => {
                let remaining = remaining.saturating_sub(1);
                if remaining > 0 {
                    self.phase = SessionPhase::Scrambling { remaining };
                    SessionEvent::ScrambleNext { remaining }
                } else {
                    log::info!("session: scramble finished, clock started");
                    self.phase = SessionPhase::Playing { started_ms: now_ms };
                    SessionEvent::ScrambleFinished
                }
            }
            SessionPhase::Playing { started_ms } => {
                self.moves += 1;
                if !solved {
                    return SessionEvent::None;
                }
                let elapsed_ms = (now_ms - started_ms).max(0.0);
                log::info!(
                    "session: solved in {:.1}s and {} moves",
                    elapsed_ms / 1000.0,
                    self.moves
                );
                self.phase = SessionPhase::Solved { elapsed_ms };
                SessionEvent::Solved {
                    elapsed_ms,
                    moves: self.moves,
                }
            }
            SessionPhase::Ready | SessionPhase::Solved { .. } => SessionEvent::None,
        }
    }

    /// Game time so far, if a game is running or finished.
    pub fn elapsed_ms(&self, now_ms: f64) -> Option<f64> {
        match self.phase {
            SessionPhase::Playing { started_ms } => Some((now_ms - started_ms).max(0.0)),
            SessionPhase::Solved { elapsed_ms } => Some(elapsed_ms),
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        self.phase = SessionPhase::Ready;
        self.moves = 0;
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scramble_counts_down_then_starts_clock() {
        let mut s = GameSession::new();
        s.start_scramble(3);
        assert_eq!(s.twist_completed(100.0, false), SessionEvent::ScrambleNext { remaining: 2 });
        // A scramble that passes through the solved state keeps going.
        assert_eq!(s.twist_completed(200.0, true), SessionEvent::ScrambleNext { remaining: 1 });
        assert_eq!(s.twist_completed(300.0, false), SessionEvent::ScrambleFinished);
        assert_eq!(s.phase(), SessionPhase::Playing { started_ms: 300.0 });
        assert_eq!(s.elapsed_ms(1300.0), Some(1000.0));
    }

    #[test]
    fn solving_stops_the_clock() {
        let mut s = GameSession::new();
        s.start_scramble(1);
        s.twist_completed(1000.0, false);
        assert_eq!(s.twist_completed(2000.0, false), SessionEvent::None);
        assert_eq!(
            s.twist_completed(4500.0, true),
            SessionEvent::Solved {
                elapsed_ms: 3500.0,
                moves: 2
            }
        );
        assert_eq!(s.elapsed_ms(9999.0), Some(3500.0));
        assert_eq!(s.twist_completed(5000.0, true), SessionEvent::None);
    }

    #[test]
    fn reset_returns_to_ready() {
        let mut s = GameSession::new();
        s.start_scramble(2);
        s.reset();
        assert_eq!(s.phase(), SessionPhase::Ready);
        assert_eq!(s.elapsed_ms(10.0), None);
        assert_eq!(s.twist_completed(20.0, true), SessionEvent::None);
    }
}
