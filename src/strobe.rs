//! Ambient two-channel strobe shown while the installation waits.

use embassy_time::{Duration, Instant};

use crate::OutputDriver;
use crate::line::Line;
use crate::ports::Ports;
use crate::timer::{Ticker, Timeout, earliest};

/// Alternating flash between two lines.
///
/// Every period one line flashes for a short time; the next period the other
/// one does. The two lines are never on together.
#[derive(Debug, Clone)]
pub struct AmbientStrobe {
    lines: [Line; 2],
    current: usize,
    period: Ticker,
    flash: Timeout,
    flash_duration: Duration,
}

impl AmbientStrobe {
    pub const fn new(lines: [Line; 2], interval: Duration, flash_duration: Duration) -> Self {
        Self {
            lines,
            current: 0,
            period: Ticker::new(interval),
            flash: Timeout::new(),
            flash_duration,
        }
    }

    /// (Re)start the strobe; the first flash comes one interval from now.
    pub fn start<O: OutputDriver>(&mut self, now: Instant, ports: &mut Ports<O>) {
        self.stop(ports);
        self.period.start(now);
    }

    /// Stop immediately, switching off a flash that is in flight.
    pub fn stop<O: OutputDriver>(&mut self, ports: &mut Ports<O>) {
        self.period.cancel();
        if self.flash.is_armed() {
            self.flash.cancel();
            self.flash_off(ports);
        }
    }

    pub const fn is_running(&self) -> bool {
        self.period.is_running()
    }

    /// Line that flashes next (or is flashing now)
    pub const fn current_line(&self) -> Line {
        self.lines[self.current]
    }

    pub fn tick<O: OutputDriver>(&mut self, now: Instant, ports: &mut Ports<O>) {
        loop {
            // The flash ends before the next period starts
            if self.flash.poll(now).is_some() {
                self.flash_off(ports);
            } else if let Some(at) = self.period.poll(now) {
                if self.flash.is_armed() {
                    self.flash.cancel();
                    self.flash_off(ports);
                }
                let _ = ports.on(self.current_line());
                self.flash.arm(at, self.flash_duration);
            } else {
                break;
            }
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        earliest(self.period.deadline(), self.flash.deadline())
    }

    fn flash_off<O: OutputDriver>(&mut self, ports: &mut Ports<O>) {
        let _ = ports.off(self.current_line());
        self.current = 1 - self.current;
    }
}
