use std::time::{Duration, Instant};

/// Single-shot cancellable timer.
///
/// `cancel` disarms synchronously, so no later `poll` can fire an arming
/// that a move, release or cancel already invalidated.
#[derive(Debug, Default)]
pub struct LongPressTimer {
    deadline: Option<Instant>,
}

impl LongPressTimer {
    /// Arm from `now`, replacing any earlier arming
    pub fn arm(&mut self, now: Instant, timeout: Duration) {
        self.deadline = Some(now + timeout);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fire if armed and due. Disarms on firing.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
