use serde::{Deserialize, Serialize};

/// Consecutive round wins for one session.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct StreakTracker {
    current: u32,
    best: u32,
}

impl StreakTracker {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Longest run seen by this session.
    #[must_use]
    pub const fn best(&self) -> u32 {
        self.best
    }

    pub fn record_win(&mut self) -> u32 {
        self.current = self.current.saturating_add(1);
        self.best = self.best.max(self.current);
        self.current
    }

    pub fn record_loss(&mut self) {
        self.current = 0;
    }

    /// Session exit. Same effect on the current run as a loss.
    pub fn reset(&mut self) {
        self.current = 0;
    }
}
