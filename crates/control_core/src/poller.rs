use std::{sync::Arc, time::Duration};

use shared::domain::TrackSnapshot;
use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};

use crate::{
    backend::PlaybackBackend,
    events::ControllerEvent,
    task::{stop_requested, TaskHandle},
};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Updated,
    Cleared,
    Failed,
}

/// Sole owner of the current track snapshot.
pub struct TrackPoller {
    backend: Arc<dyn PlaybackBackend>,
    snapshot: watch::Sender<Option<TrackSnapshot>>,
    events: broadcast::Sender<ControllerEvent>,
    halted: watch::Sender<bool>,
}

impl TrackPoller {
    pub fn new(
        backend: Arc<dyn PlaybackBackend>,
        events: broadcast::Sender<ControllerEvent>,
    ) -> Arc<Self> {
        let (snapshot, _) = watch::channel(None);
        let (halted, _) = watch::channel(false);
        Arc::new(Self {
            backend,
            snapshot,
            events,
            halted,
        })
    }

    pub fn current(&self) -> Option<TrackSnapshot> {
        self.snapshot.borrow().clone()
    }

    pub fn is_playing(&self) -> bool {
        self.snapshot
            .borrow()
            .as_ref()
            .is_some_and(|snapshot| snapshot.is_playing)
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<TrackSnapshot>> {
        self.snapshot.subscribe()
    }

    /// A failed fetch keeps the previous snapshot; only successful polls replace it.
    pub async fn poll_once(&self) -> PollOutcome {
        match self.backend.current_playback().await {
            Ok(response) => {
                let snapshot = response.into_snapshot();
                let outcome = if snapshot.is_some() {
                    PollOutcome::Updated
                } else {
                    PollOutcome::Cleared
                };
                debug!(?outcome, "track poll completed");
                self.snapshot.send_replace(snapshot.clone());
                let _ = self.events.send(ControllerEvent::TrackChanged(snapshot));
                outcome
            }
            Err(err) => {
                warn!(error = %err, "failed to update current track");
                PollOutcome::Failed
            }
        }
    }

    /// Polls immediately, then again `interval` after each poll finishes.
    pub fn start(self: &Arc<Self>, interval: Duration) -> TaskHandle {
        let poller = Arc::clone(self);
        TaskHandle::spawn("track-poller", move |mut stop| async move {
            loop {
                tokio::select! {
                    _ = stop_requested(&mut stop) => break,
                    _ = poller.poll_once() => {}
                }
                tokio::select! {
                    _ = stop_requested(&mut stop) => break,
                    _ = tokio::time::sleep(interval) => {}
                }
            }
        })
    }

    /// Best-effort refresh after a command lands; the periodic poll converges regardless.
    /// Dropped if the poller is halted before it fires.
    pub fn schedule_refresh(self: &Arc<Self>, delay: Duration) {
        let poller = Arc::clone(self);
        let mut halted = self.halted.subscribe();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = stop_requested(&mut halted) => debug!("pending track refresh cancelled"),
                _ = async {
                    tokio::time::sleep(delay).await;
                    poller.poll_once().await;
                } => {}
            }
        });
    }

    /// Cancels pending refreshes and refuses new ones.
    pub fn halt(&self) {
        self.halted.send_replace(true);
    }
}

#[cfg(test)]
#[path = "tests/poller_tests.rs"]
mod tests;
