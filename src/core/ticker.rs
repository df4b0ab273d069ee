//! Periodic tick deadline
//!
//! The control loop does not own a timer thread; it asks the ticker how long
//! until the next tick and whether one is due. Ticks that were missed while
//! the loop was busy collapse into a single tick.

use std::time::{Duration, Instant};

pub struct Ticker {
    period: Duration,
    next: Instant,
}

impl Ticker {
    /// First tick fires one `period` after `now`
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next: now + period,
        }
    }

    /// Time left until the next tick (zero when already due)
    pub fn remaining(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }

    /// Consume a due tick. Returns `false` when the deadline has not passed.
    pub fn fire(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next += self.period;
        if self.next <= now {
            self.next = now + self.period;
        }
        true
    }
}
