use std::time::Duration;

/// Trailing debounce expressed as generations.
///
/// Every `trigger` hands out a new ticket and the caller arms a timer that
/// reports the ticket back after `delay`. Only the newest ticket fires, so
/// older timers that are still in flight are ignored when they expire.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    generation: u64,
    pending: bool,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            pending: false,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn trigger(&mut self) -> u64 {
        self.generation += 1;
        self.pending = true;
        self.generation
    }

    /// Returns true when `ticket` is the latest one and nothing has fired since.
    pub fn fire(&mut self, ticket: u64) -> bool {
        if self.pending && ticket == self.generation {
            self.pending = false;
            true
        } else {
            false
        }
    }

    pub fn cancel(&mut self) {
        self.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}
