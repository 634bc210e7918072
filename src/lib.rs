#![no_std]

pub mod animator;
pub mod config;
pub mod control;
pub mod controller;
pub mod event;
pub mod line;
mod log;
pub mod ports;
pub mod scheduler;
pub mod sensor;
pub mod strobe;
pub mod timer;

pub use animator::{
    Animator, AnimatorConfig, AnimatorSlot, ContinuousAnimator, CycleTimings, SteppedAnimator,
    Strategy, TransitionTable,
};
pub use config::{ConfigError, ShowConfig, ShowTimings};
pub use control::{ControlIntent, EnabledFlags};
pub use controller::{PerformanceController, PerformanceMode, Status};
pub use event::{Edge, Event, EventChannel, EventReceiver, EventSender, TrySendError};
pub use line::{Feature, Level, Line, Polarity, SensorId};
pub use ports::{OutputError, Ports};
pub use scheduler::{ShowScheduler, TickResult};
pub use sensor::{SensorArray, SensorDebouncer};
pub use strobe::AmbientStrobe;

pub use embassy_time::{Duration, Instant};

/// Digital and PWM output collaborator
///
/// Implement this trait for the platform's GPIO lines and PWM daemon.
/// Levels are physical; polarity is applied by [`Ports`].
pub trait OutputDriver {
    /// Drive a digital line
    fn write(&mut self, line: Line, level: Level) -> Result<(), OutputError>;

    /// Send a duty-cycle command (0.0-1.0)
    fn set_duty(&mut self, line: Line, duty: f32) -> Result<(), OutputError>;
}

/// Audio playback collaborator
///
/// Playback completion is reported back as [`Event::AudioEnded`].
pub trait AudioCue {
    /// Begin the soundtrack, optionally muted
    fn begin(&mut self, muted: bool) -> Result<(), OutputError>;

    /// Ask the running soundtrack to stop. An accepted request is still
    /// answered by one [`Event::AudioEnded`] once the player exits.
    fn request_stop(&mut self) -> Result<(), OutputError>;
}
