use std::fmt;

use shared::domain::GestureLabel;
use tokio::{
    sync::mpsc::{self, error::TrySendError},
    time::Instant,
};
use tracing::{debug, warn};

pub const GESTURE_QUEUE_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOrigin {
    Touch,
    Camera,
}

impl fmt::Display for GestureOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GestureOrigin::Touch => f.write_str("touch"),
            GestureOrigin::Camera => f.write_str("camera"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GestureEvent {
    pub label: GestureLabel,
    pub timestamp: Instant,
    pub origin: GestureOrigin,
}

impl GestureEvent {
    pub fn new(label: GestureLabel, origin: GestureOrigin) -> Self {
        Self {
            label,
            timestamp: Instant::now(),
            origin,
        }
    }
}

pub fn gesture_channel() -> (GestureSink, mpsc::Receiver<GestureEvent>) {
    let (tx, rx) = mpsc::channel(GESTURE_QUEUE_CAPACITY);
    (GestureSink { tx }, rx)
}

/// Entry point of the gesture pipeline, shared by every source.
#[derive(Clone)]
pub struct GestureSink {
    tx: mpsc::Sender<GestureEvent>,
}

impl GestureSink {
    /// Never waits: when the queue is full the event is dropped, which the cooldown would do anyway.
    pub fn emit(&self, label: GestureLabel, origin: GestureOrigin) -> bool {
        self.send(GestureEvent::new(label, origin))
    }

    pub fn send(&self, event: GestureEvent) -> bool {
        let label = event.label.to_string();
        match self.tx.try_send(event) {
            Ok(()) => {
                debug!(%label, "queued gesture event");
                true
            }
            Err(TrySendError::Full(_)) => {
                debug!(%label, "gesture queue full; dropping event");
                false
            }
            Err(TrySendError::Closed(_)) => {
                warn!(%label, "gesture pipeline stopped; dropping event");
                false
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
