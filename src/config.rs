//! Show configuration with the installation's stock timings.

use embassy_time::Duration;

use crate::animator::{AnimatorConfig, CycleTimings, Strategy};
use crate::line::{Line, Polarity};

/// Number of animated channels in a show
pub const ANIMATOR_COUNT: usize = 3;

/// Invalid configuration detected at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A periodic timer was configured with a zero period
    ZeroInterval,
    /// The ambient flash lasts as long as (or longer than) its period
    FlashTooLong,
    /// A stepped ramp needs more steps than a transition table can hold
    TransitionTooLong { steps: u64 },
}

/// Timings of the performance and its helpers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShowTimings {
    /// Time after boot during which sensor edges are ignored
    pub sensor_warmup: Duration,
    /// Hold window of each sensor
    pub sensor_hold: Duration,
    /// Confirmation window between a trigger and the performance
    pub pre_roll: Duration,
    /// Lockout after the audio cue ends
    pub cool_down: Duration,
    /// Upper bound (exclusive) of the random start offset of jittered channels
    pub max_start_jitter: Duration,
    /// Period of the ambient strobe
    pub flash_interval: Duration,
    /// How long each ambient flash stays on
    pub flash_duration: Duration,
    /// Step of software pulse-width modulation
    pub pwm_step: Duration,
    /// Tick of duty-cycle ramps
    pub transition_interval: Duration,
}

impl ShowTimings {
    pub const DEFAULT: Self = Self {
        sensor_warmup: Duration::from_millis(30_000),
        sensor_hold: Duration::from_millis(5_000),
        pre_roll: Duration::from_millis(4_000),
        cool_down: Duration::from_millis(90_000),
        max_start_jitter: Duration::from_millis(3_000),
        flash_interval: Duration::from_millis(2_000),
        flash_duration: Duration::from_millis(500),
        pwm_step: Duration::from_millis(10),
        transition_interval: Duration::from_millis(40),
    };
}

impl Default for ShowTimings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Complete show configuration
#[derive(Debug, Clone)]
pub struct ShowConfig {
    pub timings: ShowTimings,
    pub animators: [AnimatorConfig; ANIMATOR_COUNT],
    /// Lines alternated by the ambient strobe
    pub strobe_lines: [Line; 2],
    /// Output polarity per line, indexed by [`Line::index`]
    pub polarity: [Polarity; Line::COUNT],
    /// Seed of the start-offset generator.
    ///
    /// The stock value is a fixed placeholder that replays the same offsets
    /// on every power-on. Deployments should pass entropy from a hardware RNG
    /// or the boot time through [`ShowConfig::with_seed`].
    pub seed: u64,
}

impl ShowConfig {
    pub const DEFAULT: Self = Self {
        timings: ShowTimings::DEFAULT,
        animators: [
            AnimatorConfig {
                line: Line::Dog,
                timings: CycleTimings::from_millis(16_000, 15_000, 2_000),
                strategy: Strategy::Continuous,
                jitter: false,
                linked: Some(Line::DogSound),
            },
            AnimatorConfig {
                line: Line::Skull1,
                timings: CycleTimings::from_millis(2_000, 1_500, 1_500),
                strategy: Strategy::Continuous,
                jitter: true,
                linked: None,
            },
            AnimatorConfig {
                line: Line::Skull2,
                timings: CycleTimings::from_millis(3_000, 2_000, 1_500),
                strategy: Strategy::Continuous,
                jitter: true,
                linked: None,
            },
        ],
        strobe_lines: [Line::Flash1, Line::Flash2],
        polarity: default_polarity(),
        seed: 0x5EED_2015,
    };

    /// Same configuration with another start-offset seed
    #[must_use]
    pub const fn with_seed(self, seed: u64) -> Self {
        Self { seed, ..self }
    }

    /// Reject timings the engine cannot run.
    ///
    /// Transition tables are checked when the animators are built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.timings;
        if t.flash_interval.as_millis() == 0
            || t.pwm_step.as_millis() == 0
            || t.transition_interval.as_millis() == 0
            || t.sensor_hold.as_millis() == 0
        {
            return Err(ConfigError::ZeroInterval);
        }
        if t.flash_duration >= t.flash_interval {
            return Err(ConfigError::FlashTooLong);
        }
        Ok(())
    }
}

impl Default for ShowConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The ground light is wired active-low
const fn default_polarity() -> [Polarity; Line::COUNT] {
    let mut polarity = [Polarity::Normal; Line::COUNT];
    polarity[Line::AreaLight.index()] = Polarity::Inverted;
    polarity
}
