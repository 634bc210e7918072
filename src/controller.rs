//! Performance state machine.
//!
//! ```text
//!            trigger / start          pre-roll, presence
//!   Idle ─────────────────► Pending ───────────────────► Active
//!    ▲ ▲                       │                          │   │
//!    │ └─── pre-roll, absent ──┘       audio cue ended    │   │ operator stop
//!    │                                                    ▼   │
//!    └─────────────── cool-down elapsed ─────────── CoolDown  │
//!    ▲                                                        │
//!    └────────────────────────────────────────────────────────┘
//! ```
//!
//! A forced start (operator) goes from `Idle` or `Pending` straight to
//! `Active`. The ambient strobe runs in `Idle` and `CoolDown` only.

use embassy_time::{Duration, Instant};
use oorandom::Rand32;

use crate::animator::{Animator, AnimatorConfig, AnimatorSlot, Strategy};
use crate::config::{ANIMATOR_COUNT, ConfigError, ShowConfig, ShowTimings};
use crate::control::{ControlIntent, EnabledFlags};
use crate::event::{Event, EventReceiver};
use crate::line::{Line, SensorId};
use crate::log::log;
use crate::ports::{OutputError, Ports};
use crate::sensor::SensorArray;
use crate::strobe::AmbientStrobe;
use crate::timer::{Timeout, earliest};
use crate::{AudioCue, OutputDriver};

const MODE_NAME_IDLE: &str = "idle";
const MODE_NAME_PENDING: &str = "delay";
const MODE_NAME_ACTIVE: &str = "run";
const MODE_NAME_COOL_DOWN: &str = "cool-down";

/// Performance phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceMode {
    /// Waiting for visitors, ambient strobe running
    Idle,
    /// Triggered, waiting out the pre-roll delay
    Pending,
    /// Performance running
    Active,
    /// Lockout after a performance
    CoolDown,
}

impl PerformanceMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => MODE_NAME_IDLE,
            Self::Pending => MODE_NAME_PENDING,
            Self::Active => MODE_NAME_ACTIVE,
            Self::CoolDown => MODE_NAME_COOL_DOWN,
        }
    }
}

/// Snapshot for the status façade
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Status {
    pub mode: PerformanceMode,
    /// Raw presence per sensor, indexed by [`SensorId::index`]
    pub sensors: [bool; SensorId::COUNT],
    /// Last commanded level per line, indexed by [`Line::index`]
    pub lines: [f32; Line::COUNT],
    pub enabled: EnabledFlags,
    pub uptime_secs: u64,
}

impl Status {
    pub const fn line(&self, line: Line) -> f32 {
        self.lines[line.index()]
    }

    pub const fn sensor(&self, sensor: SensorId) -> bool {
        self.sensors[sensor.index()]
    }
}

/// Animated channel with its optional delayed start and linked line
#[derive(Debug, Clone)]
struct AnimatedChannel {
    animator: AnimatorSlot,
    jitter: bool,
    delayed_start: Timeout,
    linked: Option<Line>,
}

impl AnimatedChannel {
    fn new(config: &AnimatorConfig, timings: &ShowTimings) -> Result<Self, ConfigError> {
        Ok(Self {
            animator: config.to_slot(timings.pwm_step, timings.transition_interval)?,
            jitter: config.jitter,
            delayed_start: Timeout::new(),
            linked: config.linked,
        })
    }

    /// Start the animator from dark; a linked line goes dark with it
    fn start<O: OutputDriver>(&mut self, at: Instant, ports: &mut Ports<O>) {
        self.animator.start(at, ports);
        if let Some(linked) = self.linked {
            let _ = ports.off(linked);
        }
    }
}

/// The choreography engine
pub struct PerformanceController<'a, O: OutputDriver, A: AudioCue, const EVENTS: usize> {
    // External dependencies and configuration
    events: EventReceiver<'a, EVENTS>,
    ports: Ports<O>,
    audio: A,
    timings: ShowTimings,

    // Internal state
    mode: PerformanceMode,
    enabled: EnabledFlags,
    audio_playing: bool,
    /// End reports still owed by cues we asked to stop
    stale_cue_ends: u8,
    booted_at: Instant,
    pre_roll: Timeout,
    cool_down: Timeout,
    rng: Rand32,

    // Internal components
    sensors: SensorArray,
    strobe: AmbientStrobe,
    channels: [AnimatedChannel; ANIMATOR_COUNT],
}

impl<'a, O: OutputDriver, A: AudioCue, const EVENTS: usize> PerformanceController<'a, O, A, EVENTS> {
    /// Create the controller, force every line off and start the ambient
    /// strobe.
    pub fn new(
        events: EventReceiver<'a, EVENTS>,
        driver: O,
        audio: A,
        config: &ShowConfig,
        now: Instant,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let t = config.timings;

        let channels = [
            AnimatedChannel::new(&config.animators[0], &t)?,
            AnimatedChannel::new(&config.animators[1], &t)?,
            AnimatedChannel::new(&config.animators[2], &t)?,
        ];

        let mut controller = Self {
            events,
            ports: Ports::new(driver, config.polarity),
            audio,
            timings: t,
            mode: PerformanceMode::Idle,
            enabled: EnabledFlags::new(),
            audio_playing: false,
            stale_cue_ends: 0,
            booted_at: now,
            pre_roll: Timeout::new(),
            cool_down: Timeout::new(),
            rng: Rand32::new(config.seed),
            sensors: SensorArray::new(t.sensor_hold),
            strobe: AmbientStrobe::new(config.strobe_lines, t.flash_interval, t.flash_duration),
            channels,
        };
        let _ = controller.ports.all_off();
        controller.strobe.start(now, &mut controller.ports);
        Ok(controller)
    }

    pub const fn mode(&self) -> PerformanceMode {
        self.mode
    }

    pub const fn enabled(&self) -> &EnabledFlags {
        &self.enabled
    }

    /// Combined presence of all enabled sensors
    pub fn present(&self) -> bool {
        self.sensors.present(&self.enabled)
    }

    pub const fn ports(&self) -> &Ports<O> {
        &self.ports
    }

    pub const fn audio(&self) -> &A {
        &self.audio
    }

    pub const fn strobe(&self) -> &AmbientStrobe {
        &self.strobe
    }

    /// Animators in configuration order
    pub fn animators(&self) -> impl Iterator<Item = &AnimatorSlot> {
        self.channels.iter().map(|channel| &channel.animator)
    }

    pub fn status(&self, now: Instant) -> Status {
        Status {
            mode: self.mode,
            sensors: self.sensors.snapshot(),
            lines: *self.ports.levels(),
            enabled: self.enabled,
            uptime_secs: now
                .checked_duration_since(self.booted_at)
                .map_or(0, |uptime| uptime.as_secs()),
        }
    }

    /// Drain pending events, then advance every timer up to `now`.
    pub fn tick(&mut self, now: Instant) {
        while let Some(event) = self.events.try_receive() {
            self.handle(event, now);
        }

        if self.sensors.tick(now, &self.enabled) {
            self.trigger(now);
        }

        if let Some(at) = self.pre_roll.poll(now) {
            self.end_pre_roll(at);
        }
        if self.cool_down.poll(now).is_some() {
            log!("[Controller] cool-down over");
            self.mode = PerformanceMode::Idle;
        }

        for channel in &mut self.channels {
            if let Some(at) = channel.delayed_start.poll(now) {
                channel.start(at, &mut self.ports);
            }
            while let Some(lit) = channel.animator.tick(now, &mut self.ports) {
                if let Some(linked) = channel.linked {
                    let _ = self.ports.set(linked, lit);
                }
            }
        }

        self.strobe.tick(now, &mut self.ports);
    }

    /// Earliest armed timer across the engine
    pub fn next_deadline(&self) -> Option<Instant> {
        let mut next = earliest(self.pre_roll.deadline(), self.cool_down.deadline());
        next = earliest(next, self.sensors.next_deadline());
        next = earliest(next, self.strobe.next_deadline());
        for channel in &self.channels {
            next = earliest(next, channel.delayed_start.deadline());
            next = earliest(next, channel.animator.next_deadline());
        }
        next
    }

    /// Handle one event immediately
    pub fn handle(&mut self, event: Event, now: Instant) {
        match event {
            Event::SensorEdge { sensor, edge } => {
                if now < self.booted_at + self.timings.sensor_warmup {
                    return;
                }
                if self.sensors.on_edge(sensor, edge, now, &self.enabled) {
                    self.trigger(now);
                }
            }
            Event::AudioStarted => {
                log!("[Controller] audio cue started");
            }
            Event::AudioEnded => {
                if self.stale_cue_ends > 0 {
                    // Answer to an earlier stop request, not the current cue
                    self.stale_cue_ends -= 1;
                    return;
                }
                self.audio_ended(now);
            }
            Event::Control(intent) => self.control(intent, now),
        }
    }

    /// Force every line off, stop the audio cue and disarm every timer, so
    /// later ticks leave the outputs dark.
    ///
    /// Meant for process shutdown; returns the first output failure.
    pub fn shutdown(&mut self) -> Result<(), OutputError> {
        log!("[Controller] shutting down");
        self.stop_cue();
        self.pre_roll.cancel();
        self.cool_down.cancel();
        self.sensors = SensorArray::new(self.timings.sensor_hold);
        self.strobe.stop(&mut self.ports);
        for channel in &mut self.channels {
            channel.delayed_start.cancel();
            channel.animator.halt();
            if channel.animator.strategy() == Strategy::Continuous {
                let _ = self.ports.duty(channel.animator.line(), 0.0);
            }
        }
        self.mode = PerformanceMode::Idle;
        self.ports.all_off()
    }

    fn control(&mut self, intent: ControlIntent, now: Instant) {
        match intent {
            ControlIntent::ForceStart => match self.mode {
                PerformanceMode::Idle | PerformanceMode::Pending => self.begin_performance(now),
                PerformanceMode::Active | PerformanceMode::CoolDown => {
                    log!("[Controller] ignoring start in {}", self.mode.as_str());
                }
            },
            ControlIntent::Stop => {
                if self.mode == PerformanceMode::Active {
                    self.wind_down(now);
                    self.mode = PerformanceMode::Idle;
                }
            }
            ControlIntent::SetEnabled(feature, enabled) => self.enabled.set(feature, enabled),
        }
    }

    /// Presence detected
    fn trigger(&mut self, now: Instant) {
        if self.mode != PerformanceMode::Idle {
            return;
        }
        log!("[Controller] triggered, waiting {} ms", self.timings.pre_roll.as_millis());
        self.mode = PerformanceMode::Pending;
        self.strobe.stop(&mut self.ports);
        let _ = self.ports.on(Line::AreaLight);
        self.pre_roll.arm(now, self.timings.pre_roll);
    }

    fn end_pre_roll(&mut self, at: Instant) {
        if self.mode != PerformanceMode::Pending {
            return;
        }
        if self.present() {
            self.begin_performance(at);
        } else {
            log!("[Controller] presence lost, aborting");
            self.mode = PerformanceMode::Idle;
            self.wind_down(at);
        }
    }

    fn begin_performance(&mut self, now: Instant) {
        log!("[Controller] performance starting");
        self.pre_roll.cancel();
        self.mode = PerformanceMode::Active;
        self.strobe.stop(&mut self.ports);
        let _ = self.ports.on(Line::AreaLight);

        let max_jitter = u32::try_from(self.timings.max_start_jitter.as_millis()).unwrap_or(u32::MAX);
        for channel in &mut self.channels {
            if channel.jitter && max_jitter > 0 {
                let offset = self.rng.rand_range(0..max_jitter);
                channel
                    .delayed_start
                    .arm(now, Duration::from_millis(u64::from(offset)));
            } else {
                channel.start(now, &mut self.ports);
            }
        }

        let muted = !self.enabled.music();
        match self.audio.begin(muted) {
            Ok(()) => self.audio_playing = true,
            Err(err) => {
                log!("[Controller] audio cue failed to start: {:?}", err);
                self.audio_ended(now);
            }
        }
    }

    fn audio_ended(&mut self, now: Instant) {
        self.audio_playing = false;
        if self.mode != PerformanceMode::Active {
            return;
        }
        log!("[Controller] audio cue ended, cooling down");
        self.wind_down(now);
        self.mode = PerformanceMode::CoolDown;
        self.cool_down.arm(now, self.timings.cool_down);
    }

    fn stop_cue(&mut self) {
        if !self.audio_playing {
            return;
        }
        self.audio_playing = false;
        match self.audio.request_stop() {
            Ok(()) => self.stale_cue_ends = self.stale_cue_ends.saturating_add(1),
            Err(err) => log!("[Controller] audio cue stop failed: {:?}", err),
        }
    }

    /// Stop the cue, darken the area and let the animators finish their cycle
    fn wind_down(&mut self, now: Instant) {
        self.stop_cue();
        let _ = self.ports.off(Line::AreaLight);
        self.strobe.start(now, &mut self.ports);
        for channel in &mut self.channels {
            if channel.delayed_start.is_armed() {
                channel.delayed_start.cancel();
            } else {
                channel.animator.stop();
            }
        }
    }
}
