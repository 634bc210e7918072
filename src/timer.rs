//! Cancelable deadlines polled from `tick`.
//!
//! Nothing here sleeps. Components store a [`Timeout`] or [`Ticker`] per timer
//! role and poll it with the current instant; firing reports the *scheduled*
//! instant so chained timers never accumulate the caller's tick jitter.

use embassy_time::{Duration, Instant};

/// Periods the caller may fall behind before a [`Ticker`] skips its backlog.
const MAX_BACKLOG_PERIODS: u32 = 2;

/// One-shot timer
#[derive(Debug, Clone, Copy, Default)]
pub struct Timeout {
    deadline: Option<Instant>,
}

impl Timeout {
    pub const fn new() -> Self {
        Self { deadline: None }
    }

    /// Arm the timer to fire `after` the `from` instant.
    ///
    /// Any previously armed deadline is replaced.
    pub fn arm(&mut self, from: Instant, after: Duration) {
        self.deadline = Some(from + after);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub const fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the deadline once it has passed and disarms the timer.
    pub fn poll(&mut self, now: Instant) -> Option<Instant> {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                Some(deadline)
            }
            _ => None,
        }
    }
}

/// Periodic timer
#[derive(Debug, Clone, Copy)]
pub struct Ticker {
    next: Option<Instant>,
    period: Duration,
}

impl Ticker {
    pub const fn new(period: Duration) -> Self {
        Self { next: None, period }
    }

    /// Start ticking; the first fire is one period after `from`.
    pub fn start(&mut self, from: Instant) {
        self.next = Some(from + self.period);
    }

    /// Start ticking with the first fire at `from` itself.
    pub fn start_now(&mut self, from: Instant) {
        self.next = Some(from);
    }

    pub fn cancel(&mut self) {
        self.next = None;
    }

    pub const fn is_running(&self) -> bool {
        self.next.is_some()
    }

    pub const fn deadline(&self) -> Option<Instant> {
        self.next
    }

    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Returns the scheduled instant of the next due tick, if any.
    ///
    /// Call repeatedly to drain ticks that became due since the last poll.
    pub fn poll(&mut self, now: Instant) -> Option<Instant> {
        let next = self.next?;
        if next > now {
            return None;
        }
        // Fell too far behind: report the tick at `now` instead of bursting
        let fired = if now > next + self.period * MAX_BACKLOG_PERIODS {
            now
        } else {
            next
        };
        self.next = Some(fired + self.period);
        Some(fired)
    }
}

/// Earliest of two optional deadlines
pub(crate) fn earliest(a: Option<Instant>, b: Option<Instant>) -> Option<Instant> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}
