//! Motion sensor debouncing.
//!
//! A sensor becomes present on its first `Active` edge and reports a trigger
//! right away. While it stays present the hold timer re-triggers at every hold
//! boundary; a further `Active` edge restarts the hold window. An `Inactive`
//! edge clears presence at once and cancels the hold timer. The hold timer
//! never clears presence on its own.

use embassy_time::{Duration, Instant};

use crate::control::EnabledFlags;
use crate::event::Edge;
use crate::line::SensorId;
use crate::timer::{Timeout, earliest};

/// Presence tracker for a single sensor
#[derive(Debug, Clone)]
pub struct SensorDebouncer {
    present: bool,
    hold: Timeout,
    hold_time: Duration,
}

impl SensorDebouncer {
    pub const fn new(hold_time: Duration) -> Self {
        Self {
            present: false,
            hold: Timeout::new(),
            hold_time,
        }
    }

    pub const fn present(&self) -> bool {
        self.present
    }

    /// Feed a raw edge.
    ///
    /// Returns `true` when the sensor just became present.
    pub fn on_edge(&mut self, edge: Edge, now: Instant) -> bool {
        match edge {
            Edge::Active => {
                self.hold.arm(now, self.hold_time);
                if self.present {
                    return false;
                }
                self.present = true;
                true
            }
            Edge::Inactive => {
                self.present = false;
                self.hold.cancel();
                false
            }
        }
    }

    /// Advance the hold timer.
    ///
    /// Returns `true` when a hold boundary passed while still present.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut fired = false;
        while let Some(at) = self.hold.poll(now) {
            self.hold.arm(at, self.hold_time);
            fired = true;
        }
        fired
    }

    pub const fn next_deadline(&self) -> Option<Instant> {
        self.hold.deadline()
    }
}

/// All motion sensors combined into one presence signal
#[derive(Debug, Clone)]
pub struct SensorArray {
    sensors: [SensorDebouncer; SensorId::COUNT],
}

impl SensorArray {
    pub const fn new(hold_time: Duration) -> Self {
        Self {
            sensors: [
                SensorDebouncer::new(hold_time),
                SensorDebouncer::new(hold_time),
                SensorDebouncer::new(hold_time),
            ],
        }
    }

    /// `true` if any enabled sensor is present
    pub fn present(&self, enabled: &EnabledFlags) -> bool {
        SensorId::ALL
            .into_iter()
            .any(|id| enabled.sensor(id) && self.sensors[id.index()].present())
    }

    /// Raw presence of one sensor, regardless of whether it is enabled
    pub const fn is_present(&self, sensor: SensorId) -> bool {
        self.sensors[sensor.index()].present()
    }

    pub fn snapshot(&self) -> [bool; SensorId::COUNT] {
        SensorId::ALL.map(|id| self.is_present(id))
    }

    /// Feed an edge for one sensor.
    ///
    /// Returns `true` if this is a trigger: an enabled sensor just became
    /// present. Disabled sensors keep their bookkeeping but never trigger.
    pub fn on_edge(
        &mut self,
        sensor: SensorId,
        edge: Edge,
        now: Instant,
        enabled: &EnabledFlags,
    ) -> bool {
        let activated = self.sensors[sensor.index()].on_edge(edge, now);
        activated && enabled.sensor(sensor)
    }

    /// Advance hold timers; returns `true` if an enabled sensor re-triggered.
    pub fn tick(&mut self, now: Instant, enabled: &EnabledFlags) -> bool {
        let mut triggered = false;
        for id in SensorId::ALL {
            if self.sensors[id.index()].tick(now) && enabled.sensor(id) {
                triggered = true;
            }
        }
        triggered
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.sensors
            .iter()
            .fold(None, |acc, sensor| earliest(acc, sensor.next_deadline()))
    }
}
