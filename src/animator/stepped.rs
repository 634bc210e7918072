//! Software-PWM ramps on a plain digital line

use embassy_time::{Duration, Instant};

use super::{Animator, Cycle, CycleTimings, TransitionTable};
use crate::OutputDriver;
use crate::line::Line;
use crate::ports::Ports;
use crate::timer::{Ticker, Timeout, earliest};

/// Breathing animator that approximates brightness with timed pulses.
///
/// Every step the line is switched to the ramp's target state, then switched
/// back once the step's pulse width has elapsed. The first step runs at the
/// start of the ramp; one step after the last table entry the line is left in
/// the target state and the hold begins, so a ramp lasts exactly
/// `steps * step`.
#[derive(Debug, Clone)]
pub struct SteppedAnimator {
    cycle: Cycle,
    table: TransitionTable,
    ramp: Ticker,
    pulse: Timeout,
    step: usize,
}

impl SteppedAnimator {
    pub fn new(line: Line, timings: CycleTimings, table: TransitionTable) -> Self {
        let step = table.step();
        Self {
            cycle: Cycle::new(line, timings),
            table,
            ramp: Ticker::new(step),
            pulse: Timeout::new(),
            step: 0,
        }
    }

    pub const fn step_interval(&self) -> Duration {
        self.ramp.period()
    }

    fn begin_ramp(&mut self, at: Instant) {
        self.step = 0;
        self.pulse.cancel();
        self.ramp.start_now(at);
    }

    /// One ramp step; returns the new logical state after the last step
    fn advance<O: OutputDriver>(&mut self, at: Instant, ports: &mut Ports<O>) -> Option<bool> {
        let line = self.cycle.line();
        let lit = self.cycle.lit();
        // Switch toward the target state for this step
        let _ = ports.pulse(line, !lit);

        if let Some(width) = self.table.width(self.step) {
            let fraction = self.table.fraction(self.step);
            ports.note_level(line, if lit { 1.0 - fraction } else { fraction });
            self.pulse.arm(at, width);
            self.step += 1;
            return None;
        }

        self.ramp.cancel();
        let lit = self.cycle.finish_ramp(at);
        ports.note_level(line, if lit { 1.0 } else { 0.0 });
        Some(lit)
    }
}

impl Animator for SteppedAnimator {
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
        self.pulse.cancel();
        self.cycle.halt();
    }

    fn tick<O: OutputDriver>(&mut self, now: Instant, ports: &mut Ports<O>) -> Option<bool> {
        loop {
            // A pulse always ends before the next step begins
            if self.pulse.poll(now).is_some() {
                let _ = ports.pulse(self.cycle.line(), self.cycle.lit());
            } else if let Some(at) = self.ramp.poll(now) {
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
        let ramp = earliest(self.pulse.deadline(), self.ramp.deadline());
        earliest(ramp, self.cycle.hold_deadline())
    }
}
