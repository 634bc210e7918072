//! Precomputed pulse widths for one software-PWM ramp.

use embassy_time::Duration;
use heapless::Vec;

use crate::config::ConfigError;

/// Maximum number of steps a single ramp can have
pub const MAX_TRANSITION_STEPS: usize = 512;

/// Lowest and highest pulse fraction used by the table. Widths never reach a
/// full or empty step, so every step still produces one visible toggle.
const PULSE_FLOOR: f32 = 0.1;
const PULSE_SPAN: f32 = 0.8;

/// Pulse widths (in milliseconds) for each step of a ramp.
///
/// Entry `n` is how long the line stays in its *new* state during step `n`;
/// widths grow linearly from 10% to 90% of the step. The same table serves
/// ramp-up and ramp-down.
#[derive(Debug, Clone)]
pub struct TransitionTable {
    widths: Vec<u16, MAX_TRANSITION_STEPS>,
    step: Duration,
}

impl TransitionTable {
    /// Build the table for a ramp of `duration` split into `step` slices.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(duration: Duration, step: Duration) -> Result<Self, ConfigError> {
        let step_ms = step.as_millis();
        if step_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        let steps = duration.as_millis().div_ceil(step_ms);
        if steps > MAX_TRANSITION_STEPS as u64 {
            return Err(ConfigError::TransitionTooLong { steps });
        }

        let mut widths = Vec::new();
        for n in 0..steps {
            let fraction = n as f32 / steps as f32 * PULSE_SPAN + PULSE_FLOOR;
            let width = libm::roundf(fraction * step_ms as f32) as u16;
            // Capacity checked above
            let _ = widths.push(width);
        }

        Ok(Self { widths, step })
    }

    pub fn len(&self) -> usize {
        self.widths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    pub const fn step(&self) -> Duration {
        self.step
    }

    /// Pulse width of step `n`
    pub fn width(&self, n: usize) -> Option<Duration> {
        self.widths
            .get(n)
            .map(|&ms| Duration::from_millis(u64::from(ms)))
    }

    /// Share of step `n` spent in the new state (0.0-1.0)
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self, n: usize) -> f32 {
        let step_ms = self.step.as_millis().max(1) as f32;
        self.widths
            .get(n)
            .map_or(1.0, |&ms| f32::from(ms) / step_ms)
    }
}
