//! Operator control surface: manual start/stop and feature toggles.

use crate::line::{Feature, SensorId};
use crate::log::log;

/// Request forwarded verbatim from the status/control façade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlIntent {
    /// Start the performance now, skipping the pre-roll delay
    ForceStart,
    /// Stop a running performance and return to idle without cool-down
    Stop,
    /// Enable or disable a feature
    SetEnabled(Feature, bool),
}

impl ControlIntent {
    /// Build a toggle from raw façade strings.
    ///
    /// Returns `None` for an unknown feature name or a value that is not a
    /// boolean; such input is dropped without further notice.
    pub fn enable_from_raw(name: &str, value: &str) -> Option<Self> {
        let Some(feature) = Feature::parse_from_str(name) else {
            log!("[ControlIntent] ignoring unknown feature {:?}", name);
            return None;
        };
        let enabled = match value {
            "true" | "1" => true,
            "false" | "0" => false,
            _ => {
                log!("[ControlIntent] ignoring bad value {:?} for {}", value, name);
                return None;
            }
        };
        Some(Self::SetEnabled(feature, enabled))
    }
}

/// Runtime feature switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnabledFlags {
    sensors: [bool; SensorId::COUNT],
    music: bool,
}

impl Default for EnabledFlags {
    fn default() -> Self {
        Self::new()
    }
}

impl EnabledFlags {
    /// Everything enabled
    pub const fn new() -> Self {
        Self {
            sensors: [true; SensorId::COUNT],
            music: true,
        }
    }

    pub const fn get(&self, feature: Feature) -> bool {
        match feature {
            Feature::Sensor(sensor) => self.sensors[sensor.index()],
            Feature::Music => self.music,
        }
    }

    pub fn set(&mut self, feature: Feature, enabled: bool) {
        log!(
            "[EnabledFlags] {} is {}",
            feature.as_str(),
            if enabled { "enabled" } else { "disabled" }
        );
        match feature {
            Feature::Sensor(sensor) => self.sensors[sensor.index()] = enabled,
            Feature::Music => self.music = enabled,
        }
    }

    pub const fn sensor(&self, sensor: SensorId) -> bool {
        self.sensors[sensor.index()]
    }

    pub const fn music(&self) -> bool {
        self.music
    }
}
