//! Tick pacing for the controller.
//!
//! Portable: no async and no platform timers. The caller sleeps for the
//! returned duration (or until an event is posted) and calls `tick` again.

use embassy_time::{Duration, Instant};

use crate::controller::PerformanceController;
use crate::{AudioCue, OutputDriver};

/// Longest sleep between ticks, so queued events are handled promptly even
/// when no timer is armed.
pub const DEFAULT_MAX_SLEEP: Duration = Duration::from_millis(50);

/// Result of a scheduler tick
#[derive(Debug, Clone, Copy)]
pub struct TickResult {
    /// When the next tick is due
    pub next_deadline: Instant,
    /// How long to wait until then (zero if already due)
    pub sleep_duration: Duration,
}

/// Drives a [`PerformanceController`] and tells the caller when to wake up.
///
/// # Usage
///
/// ```ignore
/// let mut scheduler = ShowScheduler::new(controller);
///
/// loop {
///     let result = scheduler.tick(Instant::now());
///     sleep_ms(result.sleep_duration.as_millis());
/// }
/// ```
pub struct ShowScheduler<'a, O: OutputDriver, A: AudioCue, const EVENTS: usize> {
    controller: PerformanceController<'a, O, A, EVENTS>,
    max_sleep: Duration,
}

impl<'a, O: OutputDriver, A: AudioCue, const EVENTS: usize> ShowScheduler<'a, O, A, EVENTS> {
    pub fn new(controller: PerformanceController<'a, O, A, EVENTS>) -> Self {
        Self::with_max_sleep(controller, DEFAULT_MAX_SLEEP)
    }

    pub fn with_max_sleep(
        controller: PerformanceController<'a, O, A, EVENTS>,
        max_sleep: Duration,
    ) -> Self {
        Self {
            controller,
            max_sleep,
        }
    }

    /// Run the controller at `now` and compute the next wake-up.
    pub fn tick(&mut self, now: Instant) -> TickResult {
        self.controller.tick(now);

        let latest = now + self.max_sleep;
        let next_deadline = self
            .controller
            .next_deadline()
            .map_or(latest, |deadline| deadline.min(latest))
            .max(now);

        TickResult {
            next_deadline,
            sleep_duration: next_deadline
                .checked_duration_since(now)
                .unwrap_or(Duration::from_millis(0)),
        }
    }

    pub fn controller(&self) -> &PerformanceController<'a, O, A, EVENTS> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PerformanceController<'a, O, A, EVENTS> {
        &mut self.controller
    }
}
