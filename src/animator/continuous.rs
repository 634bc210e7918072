//! Duty-cycle ramps through the PWM collaborator

use embassy_time::{Duration, Instant};

use super::{Animator, Cycle, CycleTimings};
use crate::OutputDriver;
use crate::line::Line;
use crate::log::log;
use crate::ports::Ports;
use crate::timer::{Ticker, earliest};

/// Breathing animator driven by duty-cycle commands.
///
/// Each tick sends `elapsed / transition` (ramp up) or its complement (ramp
/// down). Once the transition has elapsed a final duty of 0 is sent; only
/// when that command is acknowledged is the digital line switched to its new
/// state and the hold armed. An unacknowledged final command is re-sent on
/// the next tick.
#[derive(Debug, Clone)]
pub struct ContinuousAnimator {
    cycle: Cycle,
    ramp: Ticker,
    ramp_start: Instant,
}

impl ContinuousAnimator {
    pub const fn new(line: Line, timings: CycleTimings, interval: Duration) -> Self {
        Self {
            cycle: Cycle::new(line, timings),
            ramp: Ticker::new(interval),
            ramp_start: Instant::from_millis(0),
        }
    }

    pub const fn transition_interval(&self) -> Duration {
        self.ramp.period()
    }

    fn begin_ramp(&mut self, at: Instant) {
        self.ramp_start = at;
        self.ramp.start(at);
    }

    #[allow(clippy::cast_precision_loss)]
    fn advance<O: OutputDriver>(&mut self, at: Instant, ports: &mut Ports<O>) -> Option<bool> {
        let line = self.cycle.line();
        let transition = self.cycle.transition();
        let elapsed = at
            .checked_duration_since(self.ramp_start)
            .unwrap_or(Duration::from_millis(0));

        if elapsed < transition {
            let progress = elapsed.as_millis() as f32 / transition.as_millis() as f32;
            let duty = if self.cycle.lit() {
                1.0 - progress
            } else {
                progress
            };
            let _ = ports.duty(line, duty);
            return None;
        }

        if ports.duty(line, 0.0).is_err() {
            log!("[ContinuousAnimator] {} end of ramp not acknowledged", line.as_str());
            return None;
        }

        self.ramp.cancel();
        let lit = self.cycle.finish_ramp(at);
        let _ = ports.set(line, lit);
        Some(lit)
    }
}

impl Animator for ContinuousAnimator {
    fn line(&self) -> Line {
        self.cycle.line()
    }

    fn start<O: OutputDriver>(&mut self, now: Instant, ports: &mut Ports<O>) {
        self.cycle.restart(ports);
        self.begin_ramp(now);
    }

    fn stop(&mut self) {
        self.cycle.request_stop();
    }

    fn halt(&mut self) {
        self.ramp.cancel();
        self.cycle.halt();
    }

    fn tick<O: OutputDriver>(&mut self, now: Instant, ports: &mut Ports<O>) -> Option<bool> {
        loop {
            if let Some(at) = self.ramp.poll(now) {
                if let Some(lit) = self.advance(at, ports) {
                    return Some(lit);
                }
            } else if let Some(at) = self.cycle.poll_hold(now) {
                self.begin_ramp(at);
            } else {
                return None;
            }
        }
    }

    fn is_lit(&self) -> bool {
        self.cycle.lit()
    }

    fn is_running(&self) -> bool {
        self.ramp.is_running() || self.cycle.hold_armed()
    }

    fn next_deadline(&self) -> Option<Instant> {
        earliest(self.ramp.deadline(), self.cycle.hold_deadline())
    }
}
