use std::sync::Arc;

use anyhow::{bail, Result};
use shared::domain::{PlaybackAction, SessionState, TrackSnapshot, VOLUME_STEP};
use tokio::{
    sync::{broadcast, mpsc, Mutex},
    time::Instant,
};
use tracing::{debug, info, warn};

use crate::{
    auth::AuthGate,
    backend::{HttpBackend, PlaybackBackend},
    camera::{CameraGestureSource, FrameSource},
    config::Settings,
    cooldown::CooldownGate,
    dispatcher::{CommandDispatcher, DispatchOutcome},
    events::{event_channel, ControllerEvent, FeedbackEmitter},
    mapper::{resolve, toggle_action, Command},
    poller::TrackPoller,
    source::{gesture_channel, GestureEvent, GestureSink},
    task::{stop_requested, TaskHandle},
    touch::TouchGestureSource,
};

/// Composition root: owns session and track state, the gesture loop, and the sources.
pub struct GestureController {
    settings: Settings,
    backend: Arc<dyn PlaybackBackend>,
    events: broadcast::Sender<ControllerEvent>,
    auth: Arc<AuthGate>,
    poller: Arc<TrackPoller>,
    dispatcher: Arc<CommandDispatcher>,
    sink: GestureSink,
    runtime: Mutex<ControllerRuntime>,
}

#[derive(Default)]
struct ControllerRuntime {
    gesture_rx: Option<mpsc::Receiver<GestureEvent>>,
    event_loop: Option<TaskHandle>,
    track_poll: Option<TaskHandle>,
    camera: Option<CameraGestureSource>,
    touch: Option<TouchGestureSource>,
}

/// Per-event gating shared by every source: session, then cooldown, then mapping.
struct GesturePipeline {
    cooldown: CooldownGate,
    auth: Arc<AuthGate>,
    poller: Arc<TrackPoller>,
}

impl GesturePipeline {
    fn accept(&mut self, event: &GestureEvent) -> Option<Command> {
        if !self.auth.is_authorized() {
            debug!(label = %event.label, origin = %event.origin, "gesture ignored (not authenticated)");
            return None;
        }
        if !self.cooldown.admit(event.timestamp) {
            debug!(label = %event.label, origin = %event.origin, "gesture ignored (cooldown)");
            return None;
        }

        let command = resolve(&event.label, self.poller.is_playing(), event.timestamp);
        match &command {
            Some(command) => {
                info!(label = %event.label, origin = %event.origin, action = %command.action, "gesture accepted")
            }
            None => debug!(label = %event.label, "unknown gesture"),
        }
        command
    }
}

impl GestureController {
    pub fn new(settings: Settings, backend: Arc<dyn PlaybackBackend>) -> Arc<Self> {
        let events = event_channel();
        let auth = Arc::new(AuthGate::new(Arc::clone(&backend), events.clone()));
        let poller = TrackPoller::new(Arc::clone(&backend), events.clone());
        let dispatcher = Arc::new(CommandDispatcher::new(
            Arc::clone(&backend),
            Arc::clone(&poller),
            FeedbackEmitter::new(events.clone(), settings.feedback_duration()),
            settings.refresh_delay(),
        ));
        let (sink, gesture_rx) = gesture_channel();

        Arc::new(Self {
            settings,
            backend,
            events,
            auth,
            poller,
            dispatcher,
            sink,
            runtime: Mutex::new(ControllerRuntime {
                gesture_rx: Some(gesture_rx),
                ..ControllerRuntime::default()
            }),
        })
    }

    pub fn from_settings(settings: Settings) -> Result<Arc<Self>> {
        settings.validate()?;
        let backend = HttpBackend::new(&settings.backend_url, settings.request_timeout())?;
        Ok(Self::new(settings, Arc::new(backend)))
    }

    /// Checks auth, sets up the enabled sources, then starts polling and the gesture loop.
    pub async fn start(self: &Arc<Self>, frames: Option<Box<dyn FrameSource>>) -> Result<()> {
        let Some(gesture_rx) = self.runtime.lock().await.gesture_rx.take() else {
            bail!("gesture controller already started");
        };
        info!(backend = %self.settings.backend_url, "initializing gesture controller");

        self.auth.check_auth().await;

        if self.settings.enable_touch_gestures {
            self.runtime.lock().await.touch = Some(TouchGestureSource::new(self.sink.clone()));
            info!("touch gestures initialized");
        }

        if self.settings.enable_camera_gestures {
            match frames {
                Some(frames) => {
                    self.enable_camera(frames).await;
                }
                None => warn!("camera gestures enabled but no camera device was provided"),
            }
        }

        let track_poll = self.poller.start(self.settings.poll_interval());
        let event_loop = self.spawn_gesture_loop(gesture_rx);

        let mut runtime = self.runtime.lock().await;
        runtime.track_poll = Some(track_poll);
        runtime.event_loop = Some(event_loop);
        info!("gesture controller initialized");
        Ok(())
    }

    fn spawn_gesture_loop(&self, mut gesture_rx: mpsc::Receiver<GestureEvent>) -> TaskHandle {
        let mut pipeline = GesturePipeline {
            cooldown: CooldownGate::new(self.settings.cooldown()),
            auth: Arc::clone(&self.auth),
            poller: Arc::clone(&self.poller),
        };
        let dispatcher = Arc::clone(&self.dispatcher);

        TaskHandle::spawn("gesture-loop", move |mut stop| async move {
            loop {
                let event = tokio::select! {
                    _ = stop_requested(&mut stop) => break,
                    event = gesture_rx.recv() => match event {
                        Some(event) => event,
                        None => break,
                    },
                };

                let Some(command) = pipeline.accept(&event) else {
                    continue;
                };
                let dispatcher = Arc::clone(&dispatcher);
                tokio::spawn(async move {
                    dispatcher.dispatch(command).await;
                });
            }
        })
    }

    /// Starts camera control on `frames`, replacing any camera already running.
    pub async fn enable_camera(&self, frames: Box<dyn FrameSource>) {
        let camera = CameraGestureSource::start(
            frames,
            Arc::clone(&self.backend),
            self.sink.clone(),
            self.settings.camera_options(),
        );
        let previous = self.runtime.lock().await.camera.replace(camera);
        if let Some(previous) = previous {
            previous.stop().await;
        }
        info!("camera gestures initialized");
    }

    pub async fn disable_camera(&self) -> bool {
        let camera = self.runtime.lock().await.camera.take();
        match camera {
            Some(camera) => {
                camera.stop().await;
                true
            }
            None => false,
        }
    }

    pub async fn camera_active(&self) -> bool {
        self.runtime
            .lock()
            .await
            .camera
            .as_ref()
            .is_some_and(CameraGestureSource::is_running)
    }

    pub async fn touch_source(&self) -> Option<TouchGestureSource> {
        self.runtime.lock().await.touch.clone()
    }

    /// Entry point for additional gesture sources.
    pub fn gesture_sink(&self) -> GestureSink {
        self.sink.clone()
    }

    pub async fn refresh_auth(&self) -> SessionState {
        self.auth.check_auth().await
    }

    pub fn session(&self) -> SessionState {
        self.auth.session()
    }

    pub fn current_track(&self) -> Option<TrackSnapshot> {
        self.poller.current()
    }

    /// Polls once now instead of waiting for the next tick.
    pub async fn refresh_track(&self) -> Option<TrackSnapshot> {
        self.poller.poll_once().await;
        self.poller.current()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    // Manual controls skip the cooldown and session gates.

    pub async fn toggle_play_pause(&self) -> DispatchOutcome {
        self.send_action(toggle_action(self.poller.is_playing())).await
    }

    pub async fn next_track(&self) -> DispatchOutcome {
        self.send_action(PlaybackAction::Next).await
    }

    pub async fn previous_track(&self) -> DispatchOutcome {
        self.send_action(PlaybackAction::Previous).await
    }

    pub async fn volume_up(&self) -> DispatchOutcome {
        self.send_action(PlaybackAction::Volume { delta: VOLUME_STEP })
            .await
    }

    pub async fn volume_down(&self) -> DispatchOutcome {
        self.send_action(PlaybackAction::Volume {
            delta: -VOLUME_STEP,
        })
        .await
    }

    async fn send_action(&self, action: PlaybackAction) -> DispatchOutcome {
        self.dispatcher
            .dispatch(Command::new(action, Instant::now()))
            .await
    }

    pub async fn shutdown(&self) {
        self.poller.halt();
        let (camera, event_loop, track_poll) = {
            let mut runtime = self.runtime.lock().await;
            runtime.touch = None;
            (
                runtime.camera.take(),
                runtime.event_loop.take(),
                runtime.track_poll.take(),
            )
        };

        if let Some(camera) = camera {
            camera.stop().await;
        }
        if let Some(event_loop) = event_loop {
            event_loop.shutdown().await;
        }
        if let Some(track_poll) = track_poll {
            track_poll.shutdown().await;
        }
        info!("gesture controller stopped");
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
