//! Logical view over the output driver.
//!
//! Callers switch lines on and off in logical terms; [`Ports`] applies the
//! configured polarity and remembers the last commanded level of every line
//! for status reporting. Failures are logged and returned, never retried.

use crate::OutputDriver;
use crate::line::{Level, Line, Polarity};
use crate::log::log;

/// Error reported by an output collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputError {
    /// The write or command could not be delivered
    Io,
    /// The collaborator (e.g. the PWM daemon) is not reachable
    Disconnected,
}

/// Output lines with polarity and a level snapshot
pub struct Ports<O: OutputDriver> {
    driver: O,
    polarity: [Polarity; Line::COUNT],
    levels: [f32; Line::COUNT],
}

impl<O: OutputDriver> Ports<O> {
    pub const fn new(driver: O, polarity: [Polarity; Line::COUNT]) -> Self {
        Self {
            driver,
            polarity,
            levels: [0.0; Line::COUNT],
        }
    }

    /// Switch a line fully on
    pub fn on(&mut self, line: Line) -> Result<(), OutputError> {
        self.set(line, true)
    }

    /// Switch a line fully off
    pub fn off(&mut self, line: Line) -> Result<(), OutputError> {
        self.set(line, false)
    }

    /// Switch a line to a logical state
    pub fn set(&mut self, line: Line, on: bool) -> Result<(), OutputError> {
        self.levels[line.index()] = if on { 1.0 } else { 0.0 };
        self.write(line, on)
    }

    /// Toggle a line without touching its level snapshot.
    ///
    /// Used for software pulse-width modulation where the snapshot carries
    /// the averaged level instead.
    pub fn pulse(&mut self, line: Line, on: bool) -> Result<(), OutputError> {
        self.write(line, on)
    }

    /// Send a duty-cycle command (0.0-1.0)
    pub fn duty(&mut self, line: Line, duty: f32) -> Result<(), OutputError> {
        let duty = duty.clamp(0.0, 1.0);
        self.levels[line.index()] = duty;
        self.driver.set_duty(line, duty).inspect_err(|err| {
            log!("[Ports.duty] {} duty {} failed: {:?}", line.as_str(), duty, err);
        })
    }

    /// Record the averaged level of a line driven by pulses
    pub fn note_level(&mut self, line: Line, level: f32) {
        self.levels[line.index()] = level;
    }

    /// Last commanded logical level of a line
    pub fn level(&self, line: Line) -> f32 {
        self.levels[line.index()]
    }

    pub const fn levels(&self) -> &[f32; Line::COUNT] {
        &self.levels
    }

    /// Force every line to its physical off level.
    ///
    /// Best effort: every line is attempted even if some writes fail; the
    /// first failure is returned.
    pub fn all_off(&mut self) -> Result<(), OutputError> {
        let mut result = Ok(());
        for line in Line::ALL {
            if let Err(err) = self.off(line) {
                result = result.and(Err(err));
            }
        }
        result
    }

    pub const fn driver(&self) -> &O {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut O {
        &mut self.driver
    }

    fn write(&mut self, line: Line, on: bool) -> Result<(), OutputError> {
        let level: Level = self.polarity[line.index()].level(on);
        self.driver.write(line, level).inspect_err(|err| {
            log!("[Ports.write] {} {:?} failed: {:?}", line.as_str(), level, err);
        })
    }
}
