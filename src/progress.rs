use std::time::{Duration, Instant};

/// Trailing-edge rate limiter.
///
/// The first `trigger` opens a window; later triggers inside it only replace
/// the pending value. `poll` hands out the latest value once the window ends,
/// so a burst yields one update per interval.
#[derive(Debug)]
pub struct Throttle<T> {
    interval: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Throttle<T> {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn trigger(&mut self, now: Instant, value: T) {
        let due = match self.pending.take() {
            Some((due, _)) => due,
            None => now + self.interval,
        };
        self.pending = Some((due, value));
    }

    pub fn due_at(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(due, _)| *due)
    }

    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.pending {
            Some((due, _)) if now >= due => self.pending.take().map(|(_, value)| value),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
