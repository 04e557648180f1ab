use std::future::Future;

use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, warn};

/// A spawned background loop with an explicit stop signal.
pub struct TaskHandle {
    name: &'static str,
    stop_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl TaskHandle {
    pub fn spawn<F, Fut>(name: &'static str, body: F) -> Self
    where
        F: FnOnce(watch::Receiver<bool>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (stop_tx, stop_rx) = watch::channel(false);
        let join = tokio::spawn(body(stop_rx));
        debug!(task = name, "background task started");
        Self {
            name,
            stop_tx,
            join,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }

    pub fn is_stopping(&self) -> bool {
        *self.stop_tx.borrow()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    pub async fn shutdown(self) {
        self.stop();
        if let Err(err) = self.join.await {
            warn!(task = self.name, error = %err, "background task ended abnormally");
        } else {
            debug!(task = self.name, "background task stopped");
        }
    }
}

/// Resolves once a stop has been requested or the handle was dropped.
pub async fn stop_requested(stop: &mut watch::Receiver<bool>) {
    let _ = stop.wait_for(|stopped| *stopped).await;
}
