//! Outbound events for whatever renders the controller state.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use shared::domain::{SessionState, TrackSnapshot};
use tokio::sync::broadcast;

pub const FEEDBACK_DURATION: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackNotice {
    pub id: u64,
    pub label: String,
    pub success: bool,
    pub shown_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    ConnectionChanged(SessionState),
    TrackChanged(Option<TrackSnapshot>),
    Feedback(FeedbackNotice),
    FeedbackDismissed { id: u64 },
    Notice(String),
}

pub fn event_channel() -> broadcast::Sender<ControllerEvent> {
    let (events, _) = broadcast::channel(256);
    events
}

/// Emits transient success/failure acknowledgements that dismiss themselves.
#[derive(Clone)]
pub struct FeedbackEmitter {
    events: broadcast::Sender<ControllerEvent>,
    duration: Duration,
    next_id: Arc<AtomicU64>,
}

impl FeedbackEmitter {
    pub fn new(events: broadcast::Sender<ControllerEvent>, duration: Duration) -> Self {
        Self {
            events,
            duration,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn show(&self, label: impl Into<String>, success: bool) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let _ = self.events.send(ControllerEvent::Feedback(FeedbackNotice {
            id,
            label: label.into(),
            success,
            shown_at: Utc::now(),
        }));

        let events = self.events.clone();
        let duration = self.duration;
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = events.send(ControllerEvent::FeedbackDismissed { id });
        });
        id
    }
}
