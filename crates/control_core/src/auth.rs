use std::sync::Arc;

use shared::domain::SessionState;
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use crate::{backend::PlaybackBackend, events::ControllerEvent};

/// Owns the session state; everything else observes it read-only.
pub struct AuthGate {
    backend: Arc<dyn PlaybackBackend>,
    state: watch::Sender<SessionState>,
    events: broadcast::Sender<ControllerEvent>,
}

impl AuthGate {
    pub fn new(
        backend: Arc<dyn PlaybackBackend>,
        events: broadcast::Sender<ControllerEvent>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::unauthorized());
        Self {
            backend,
            state,
            events,
        }
    }

    /// Fail-closed: an unreachable backend leaves the session unauthorized.
    pub async fn check_auth(&self) -> SessionState {
        let session = match self.backend.status().await {
            Ok(status) => {
                let session = status.into_session();
                if session.authorized {
                    info!(
                        account = session.account_label.as_deref().unwrap_or("unknown"),
                        "spotify session authorized"
                    );
                } else {
                    info!("spotify session not authorized");
                }
                session
            }
            Err(err) => {
                warn!(error = %err, "failed to check spotify auth");
                let _ = self
                    .events
                    .send(ControllerEvent::Notice(err.user_notice().to_string()));
                SessionState::unauthorized()
            }
        };

        self.state.send_replace(session.clone());
        let _ = self
            .events
            .send(ControllerEvent::ConnectionChanged(session.clone()));
        session
    }

    pub fn is_authorized(&self) -> bool {
        self.state.borrow().authorized
    }

    pub fn session(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/auth_tests.rs"]
mod tests;
