//! Trailing-edge debouncer.
//!
//! The debouncer only tracks timing. It is driven with explicit instants so
//! the same state machine serves a synchronous host polling with its own
//! clock and the async engine loop sleeping until [`Debouncer::deadline`].

use std::time::Duration;

use tokio::time::Instant;

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct Debouncer {
    interval: Duration,
    deadline: Option<Instant>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

impl Debouncer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Records an event at `now`, pushing the trailing edge to `now + interval`.
    pub fn notify(&mut self, now: Instant) {
        self.deadline = Some(now + self.interval);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true once when the pending deadline has passed, disarming it.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drops any pending trailing edge.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
