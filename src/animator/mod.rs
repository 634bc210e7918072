//! Breathing channel animation.
//!
//! An animator drives one line through a repeating cycle: ramp up, hold on,
//! ramp down, hold off. Two strategies produce the same outer timing:
//!
//! - [`SteppedAnimator`] toggles the line in software, one pulse per step,
//!   with pulse widths taken from a [`TransitionTable`].
//! - [`ContinuousAnimator`] sends duty-cycle commands to the PWM collaborator.
//!
//! Stopping is graceful. A channel waiting in its off hold stops at once;
//! otherwise the current cycle runs on until the channel has ramped back to
//! off, so a channel is never left lit or frozen mid-ramp.

mod continuous;
mod stepped;
mod table;

use embassy_time::{Duration, Instant};
pub use continuous::ContinuousAnimator;
pub use stepped::SteppedAnimator;
pub use table::{MAX_TRANSITION_STEPS, TransitionTable};

use crate::OutputDriver;
use crate::config::ConfigError;
use crate::line::Line;
use crate::log::log;
use crate::ports::Ports;
use crate::timer::Timeout;

pub trait Animator {
    /// Line driven by this animator
    fn line(&self) -> Line;

    /// Force the line off and begin a new cycle with a ramp-up at `now`.
    fn start<O: OutputDriver>(&mut self, now: Instant, ports: &mut Ports<O>);

    /// Request a graceful stop
    fn stop(&mut self);

    /// Disarm every timer at once and forget the logical state. Writes
    /// nothing; the caller owns the line afterwards.
    fn halt(&mut self);

    /// Advance timers up to `now`.
    ///
    /// Returns the new logical state when a ramp completes. Returns after the
    /// first completed ramp, so call again until it yields `None`.
    fn tick<O: OutputDriver>(&mut self, now: Instant, ports: &mut Ports<O>) -> Option<bool>;

    /// Logical on/off state (flips at the end of each ramp)
    fn is_lit(&self) -> bool;

    /// `true` while a ramp or hold timer is armed
    fn is_running(&self) -> bool;

    fn next_deadline(&self) -> Option<Instant>;
}

/// How a channel produces its ramps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Software pulse-width modulation on a digital line
    Stepped,
    /// Duty-cycle commands to the PWM collaborator
    Continuous,
}

/// Durations of one breathing cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleTimings {
    /// Hold time at full on
    pub on: Duration,
    /// Hold time at off
    pub off: Duration,
    /// Duration of each ramp
    pub transition: Duration,
}

impl CycleTimings {
    pub const fn from_millis(on: u64, off: u64, transition: u64) -> Self {
        Self {
            on: Duration::from_millis(on),
            off: Duration::from_millis(off),
            transition: Duration::from_millis(transition),
        }
    }
}

/// Hold/stop bookkeeping shared by both strategies
#[derive(Debug, Clone)]
pub(crate) struct Cycle {
    line: Line,
    timings: CycleTimings,
    lit: bool,
    stopping: bool,
    hold: Timeout,
}

impl Cycle {
    pub(crate) const fn new(line: Line, timings: CycleTimings) -> Self {
        Self {
            line,
            timings,
            lit: false,
            // Idle until started
            stopping: true,
            hold: Timeout::new(),
        }
    }

    /// Reset to a dark channel about to ramp up
    pub(crate) fn restart<O: OutputDriver>(&mut self, ports: &mut Ports<O>) {
        log!("[Animator] starting {}", self.line.as_str());
        let _ = ports.off(self.line);
        self.lit = false;
        self.hold.cancel();
        self.stopping = false;
    }

    pub(crate) fn request_stop(&mut self) {
        log!("[Animator] stopping {}", self.line.as_str());
        // Waiting dark: nothing left to finish
        if self.hold.is_armed() && !self.lit {
            self.hold.cancel();
        }
        self.stopping = true;
    }

    pub(crate) fn halt(&mut self) {
        self.hold.cancel();
        self.lit = false;
        self.stopping = true;
    }

    /// Flip the logical state at the end of a ramp and arm the following
    /// hold. A stopping channel that just went dark arms nothing.
    pub(crate) fn finish_ramp(&mut self, at: Instant) -> bool {
        self.lit = !self.lit;
        if !self.stopping || self.lit {
            let hold = if self.lit {
                self.timings.on
            } else {
                self.timings.off
            };
            self.hold.arm(at, hold);
        }
        self.lit
    }

    /// Instant at which the hold ended and the next ramp starts
    pub(crate) fn poll_hold(&mut self, now: Instant) -> Option<Instant> {
        self.hold.poll(now)
    }

    pub(crate) const fn line(&self) -> Line {
        self.line
    }

    pub(crate) const fn transition(&self) -> Duration {
        self.timings.transition
    }

    pub(crate) const fn lit(&self) -> bool {
        self.lit
    }

    pub(crate) const fn hold_armed(&self) -> bool {
        self.hold.is_armed()
    }

    pub(crate) const fn hold_deadline(&self) -> Option<Instant> {
        self.hold.deadline()
    }
}

/// Configuration of one animated channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimatorConfig {
    pub line: Line,
    pub timings: CycleTimings,
    pub strategy: Strategy,
    /// Delay the start by a random offset so channels do not breathe in sync
    pub jitter: bool,
    /// Digital line that follows this channel's on/off state
    pub linked: Option<Line>,
}

impl AnimatorConfig {
    /// Build the animator selected by `strategy`.
    pub fn to_slot(
        &self,
        pwm_step: Duration,
        transition_interval: Duration,
    ) -> Result<AnimatorSlot, ConfigError> {
        Ok(match self.strategy {
            Strategy::Stepped => {
                let table = TransitionTable::new(self.timings.transition, pwm_step)?;
                AnimatorSlot::Stepped(SteppedAnimator::new(self.line, self.timings, table))
            }
            Strategy::Continuous => {
                if transition_interval.as_millis() == 0 {
                    return Err(ConfigError::ZeroInterval);
                }
                AnimatorSlot::Continuous(ContinuousAnimator::new(
                    self.line,
                    self.timings,
                    transition_interval,
                ))
            }
        })
    }
}

/// Animator slot - one of the strategies, selected at construction
#[derive(Debug, Clone)]
pub enum AnimatorSlot {
    Stepped(SteppedAnimator),
    Continuous(ContinuousAnimator),
}

impl AnimatorSlot {
    pub fn strategy(&self) -> Strategy {
        match self {
            Self::Stepped(_) => Strategy::Stepped,
            Self::Continuous(_) => Strategy::Continuous,
        }
    }
}

impl Animator for AnimatorSlot {
    fn line(&self) -> Line {
        match self {
            Self::Stepped(animator) => animator.line(),
            Self::Continuous(animator) => animator.line(),
        }
    }

    fn start<O: OutputDriver>(&mut self, now: Instant, ports: &mut Ports<O>) {
        match self {
            Self::Stepped(animator) => animator.start(now, ports),
            Self::Continuous(animator) => animator.start(now, ports),
        }
    }

    fn stop(&mut self) {
        match self {
            Self::Stepped(animator) => animator.stop(),
            Self::Continuous(animator) => animator.stop(),
        }
    }

    fn halt(&mut self) {
        match self {
            Self::Stepped(animator) => animator.halt(),
            Self::Continuous(animator) => animator.halt(),
        }
    }

    fn tick<O: OutputDriver>(&mut self, now: Instant, ports: &mut Ports<O>) -> Option<bool> {
        match self {
            Self::Stepped(animator) => animator.tick(now, ports),
            Self::Continuous(animator) => animator.tick(now, ports),
        }
    }

    fn is_lit(&self) -> bool {
        match self {
            Self::Stepped(animator) => animator.is_lit(),
            Self::Continuous(animator) => animator.is_lit(),
        }
    }

    fn is_running(&self) -> bool {
        match self {
            Self::Stepped(animator) => animator.is_running(),
            Self::Continuous(animator) => animator.is_running(),
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        match self {
            Self::Stepped(animator) => animator.next_deadline(),
            Self::Continuous(animator) => animator.next_deadline(),
        }
    }
}
