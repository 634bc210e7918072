//! Named output lines, sensors and toggleable features of the installation.

const LINE_NAME_AREA_LIGHT: &str = "lightNet";
const LINE_NAME_DOG: &str = "lightDog";
const LINE_NAME_DOG_SOUND: &str = "soundDog";
const LINE_NAME_SKULL1: &str = "lightSkull1";
const LINE_NAME_SKULL2: &str = "lightSkull2";
const LINE_NAME_FLASH1: &str = "flashLight1";
const LINE_NAME_FLASH2: &str = "flashLight2";

const SENSOR_NAME_1: &str = "sensor1";
const SENSOR_NAME_2: &str = "sensor2";
const SENSOR_NAME_3: &str = "sensor3";
const FEATURE_NAME_MUSIC: &str = "music";

/// Output channel driven by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Line {
    /// Ground light, lit for the whole performance
    AreaLight = 0,
    Dog = 1,
    /// Sound gate following the dog light
    DogSound = 2,
    Skull1 = 3,
    Skull2 = 4,
    Flash1 = 5,
    Flash2 = 6,
}

impl Line {
    pub const COUNT: usize = 7;

    pub const ALL: [Line; Self::COUNT] = [
        Self::AreaLight,
        Self::Dog,
        Self::DogSound,
        Self::Skull1,
        Self::Skull2,
        Self::Flash1,
        Self::Flash2,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_raw(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AreaLight => LINE_NAME_AREA_LIGHT,
            Self::Dog => LINE_NAME_DOG,
            Self::DogSound => LINE_NAME_DOG_SOUND,
            Self::Skull1 => LINE_NAME_SKULL1,
            Self::Skull2 => LINE_NAME_SKULL2,
            Self::Flash1 => LINE_NAME_FLASH1,
            Self::Flash2 => LINE_NAME_FLASH2,
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|line| line.as_str() == s)
    }
}

/// Output polarity of a line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Polarity {
    /// Logical on drives the line high
    #[default]
    Normal,
    /// Logical on drives the line low
    Inverted,
}

/// Physical level of a digital line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Polarity {
    /// Physical level for a logical state
    pub const fn level(self, on: bool) -> Level {
        match (self, on) {
            (Self::Normal, true) | (Self::Inverted, false) => Level::High,
            (Self::Normal, false) | (Self::Inverted, true) => Level::Low,
        }
    }
}

/// Motion sensor input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum SensorId {
    Sensor1 = 0,
    Sensor2 = 1,
    Sensor3 = 2,
}

impl SensorId {
    pub const COUNT: usize = 3;

    pub const ALL: [SensorId; Self::COUNT] = [Self::Sensor1, Self::Sensor2, Self::Sensor3];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sensor1 => SENSOR_NAME_1,
            Self::Sensor2 => SENSOR_NAME_2,
            Self::Sensor3 => SENSOR_NAME_3,
        }
    }
}

/// Feature that can be enabled or disabled at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feature {
    Sensor(SensorId),
    /// Audible soundtrack; when disabled the cue still runs muted
    Music,
}

impl Feature {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sensor(sensor) => sensor.as_str(),
            Self::Music => FEATURE_NAME_MUSIC,
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        match s {
            SENSOR_NAME_1 => Some(Self::Sensor(SensorId::Sensor1)),
            SENSOR_NAME_2 => Some(Self::Sensor(SensorId::Sensor2)),
            SENSOR_NAME_3 => Some(Self::Sensor(SensorId::Sensor3)),
            FEATURE_NAME_MUSIC => Some(Self::Music),
            _ => None,
        }
    }
}
