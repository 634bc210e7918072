//! Inbound events and the queue that carries them to the controller.
//!
//! Sensor edges, audio cue notifications and façade requests all arrive on one
//! bounded queue built on `critical-section` and `heapless::Deque`, so they can
//! be posted from interrupt handlers or other tasks and are handled one at a
//! time, in order, by [`crate::PerformanceController::tick`].

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;

use crate::control::ControlIntent;
use crate::line::SensorId;

/// Raw edge reported by a digital input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Active,
    Inactive,
}

/// Something that happened outside the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A motion sensor line changed
    SensorEdge { sensor: SensorId, edge: Edge },
    /// The audio cue started playing
    AudioStarted,
    /// The audio cue finished or was stopped
    AudioEnded,
    /// Request from the status/control façade
    Control(ControlIntent),
}

/// Error returned when the queue is full; carries the rejected event back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrySendError<T>(pub T);

/// Bounded event queue
pub struct EventChannel<const SIZE: usize> {
    inner: Mutex<RefCell<Deque<Event, SIZE>>>,
}

impl<const SIZE: usize> EventChannel<SIZE> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Handle for posting events; any number may coexist.
    pub const fn sender(&self) -> EventSender<'_, SIZE> {
        EventSender { channel: self }
    }

    /// Handle for draining events, owned by the controller.
    pub const fn receiver(&self) -> EventReceiver<'_, SIZE> {
        EventReceiver { channel: self }
    }

    fn try_send(&self, event: Event) -> Result<(), TrySendError<Event>> {
        critical_section::with(|cs| {
            self.inner
                .borrow(cs)
                .borrow_mut()
                .push_back(event)
                .map_err(TrySendError)
        })
    }

    fn try_receive(&self) -> Option<Event> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().pop_front())
    }
}

impl<const SIZE: usize> Default for EventChannel<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy)]
pub struct EventSender<'a, const SIZE: usize> {
    channel: &'a EventChannel<SIZE>,
}

impl<const SIZE: usize> EventSender<'_, SIZE> {
    /// Post an event; fails when the queue is full.
    pub fn try_send(&self, event: Event) -> Result<(), TrySendError<Event>> {
        self.channel.try_send(event)
    }

    pub fn sensor_edge(&self, sensor: SensorId, edge: Edge) -> Result<(), TrySendError<Event>> {
        self.try_send(Event::SensorEdge { sensor, edge })
    }

    pub fn control(&self, intent: ControlIntent) -> Result<(), TrySendError<Event>> {
        self.try_send(Event::Control(intent))
    }
}

#[derive(Clone, Copy)]
pub struct EventReceiver<'a, const SIZE: usize> {
    channel: &'a EventChannel<SIZE>,
}

impl<const SIZE: usize> EventReceiver<'_, SIZE> {
    /// Take the oldest pending event, if any.
    pub fn try_receive(&self) -> Option<Event> {
        self.channel.try_receive()
    }
}
