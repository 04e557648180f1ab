use std::{sync::Arc, time::Duration};

use shared::protocol::ControlRequest;
use tracing::{info, warn};

use crate::{backend::PlaybackBackend, events::FeedbackEmitter, mapper::Command, poller::TrackPoller};

pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub ok: bool,
    pub error: Option<String>,
}

impl DispatchOutcome {
    pub fn success() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
        }
    }
}

pub struct CommandDispatcher {
    backend: Arc<dyn PlaybackBackend>,
    poller: Arc<TrackPoller>,
    feedback: FeedbackEmitter,
    refresh_delay: Duration,
}

impl CommandDispatcher {
    pub fn new(
        backend: Arc<dyn PlaybackBackend>,
        poller: Arc<TrackPoller>,
        feedback: FeedbackEmitter,
        refresh_delay: Duration,
    ) -> Self {
        Self {
            backend,
            poller,
            feedback,
            refresh_delay,
        }
    }

    /// Always yields an outcome; transport and backend failures never escape.
    pub async fn dispatch(&self, command: Command) -> DispatchOutcome {
        let label = command.action.to_string();
        let request = ControlRequest::from(command.action);

        let outcome = match self.backend.control(&request).await {
            Ok(response) if response.ok => DispatchOutcome::success(),
            Ok(response) => DispatchOutcome::failure(
                response
                    .error
                    .unwrap_or_else(|| "backend rejected the command".to_string()),
            ),
            Err(err) => DispatchOutcome::failure(err.to_string()),
        };

        if outcome.ok {
            info!(action = %label, "playback command executed");
            self.poller.schedule_refresh(self.refresh_delay);
        } else {
            warn!(
                action = %label,
                error = outcome.error.as_deref().unwrap_or_default(),
                "playback command failed"
            );
        }
        self.feedback.show(label, outcome.ok);
        outcome
    }
}

#[cfg(test)]
#[path = "tests/dispatcher_tests.rs"]
mod tests;
