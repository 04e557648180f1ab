use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use shared::{
    error::BackendError,
    protocol::{
        AccountSummary, ControlRequest, ControlResponse, CurrentPlaybackResponse, PlaybackPayload,
        PredictRequest, PredictResponse, StatusResponse, TrackPayload,
    },
};
use tokio::sync::broadcast;

use crate::{
    backend::PlaybackBackend,
    camera::{CameraError, Frame, FrameSource},
    events::ControllerEvent,
};

type Reply<T> = Result<T, String>;

/// Replays queued replies in order; the last queued reply repeats forever.
struct Script<T: Clone> {
    replies: Mutex<VecDeque<Reply<T>>>,
    calls: AtomicUsize,
}

impl<T: Clone> Default for Script<T> {
    fn default() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }
}

impl<T: Clone> Script<T> {
    fn push(&self, reply: Reply<T>) {
        self.replies.lock().expect("script lock").push_back(reply);
    }

    fn next(&self) -> Result<T, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut replies = self.replies.lock().expect("script lock");
        let reply = if replies.len() > 1 {
            replies.pop_front()
        } else {
            replies.front().cloned()
        };
        match reply {
            Some(Ok(value)) => Ok(value),
            Some(Err(reason)) => Err(BackendError::Transport(reason)),
            None => Err(BackendError::Transport("no scripted reply".to_string())),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub(crate) struct ScriptedBackend {
    status: Script<StatusResponse>,
    current: Script<CurrentPlaybackResponse>,
    control: Script<ControlResponse>,
    predict: Script<PredictResponse>,
    predict_delay: Mutex<Option<Duration>>,
    control_requests: Mutex<Vec<ControlRequest>>,
    predict_requests: Mutex<Vec<PredictRequest>>,
}

impl ScriptedBackend {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn authorized(name: &str) -> Arc<Self> {
        let backend = Self::new();
        backend.push_status(Ok(authorized_status(name)));
        backend.push_control(Ok(ControlResponse {
            ok: true,
            error: None,
        }));
        backend.push_current(Ok(idle_playback()));
        backend
    }

    pub(crate) fn push_status(&self, reply: Reply<StatusResponse>) {
        self.status.push(reply);
    }

    pub(crate) fn push_current(&self, reply: Reply<CurrentPlaybackResponse>) {
        self.current.push(reply);
    }

    pub(crate) fn push_control(&self, reply: Reply<ControlResponse>) {
        self.control.push(reply);
    }

    pub(crate) fn push_predict(&self, reply: Reply<PredictResponse>) {
        self.predict.push(reply);
    }

    pub(crate) fn set_predict_delay(&self, delay: Duration) {
        *self.predict_delay.lock().expect("delay lock") = Some(delay);
    }

    pub(crate) fn status_calls(&self) -> usize {
        self.status.calls()
    }

    pub(crate) fn current_calls(&self) -> usize {
        self.current.calls()
    }

    pub(crate) fn predict_calls(&self) -> usize {
        self.predict.calls()
    }

    pub(crate) fn control_requests(&self) -> Vec<ControlRequest> {
        self.control_requests.lock().expect("requests lock").clone()
    }

    pub(crate) fn predict_requests(&self) -> Vec<PredictRequest> {
        self.predict_requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl PlaybackBackend for ScriptedBackend {
    async fn status(&self) -> Result<StatusResponse, BackendError> {
        self.status.next()
    }

    async fn current_playback(&self) -> Result<CurrentPlaybackResponse, BackendError> {
        self.current.next()
    }

    async fn control(&self, request: &ControlRequest) -> Result<ControlResponse, BackendError> {
        self.control_requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        self.control.next()
    }

    async fn predict(&self, request: &PredictRequest) -> Result<PredictResponse, BackendError> {
        self.predict_requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        let delay = *self.predict_delay.lock().expect("delay lock");
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.predict.next()
    }
}

pub(crate) fn authorized_status(name: &str) -> StatusResponse {
    StatusResponse {
        authenticated: true,
        user: Some(AccountSummary {
            id: Some(format!("{name}-id")),
            name: Some(name.to_string()),
        }),
        error: None,
    }
}

pub(crate) fn idle_playback() -> CurrentPlaybackResponse {
    CurrentPlaybackResponse {
        ok: true,
        playing: false,
        ..CurrentPlaybackResponse::default()
    }
}

pub(crate) fn playing_track(name: &str, is_playing: bool) -> CurrentPlaybackResponse {
    CurrentPlaybackResponse {
        ok: true,
        playing: true,
        track: Some(TrackPayload {
            name: name.to_string(),
            artists: vec!["Artist One".to_string(), "Artist Two".to_string()],
            album_art: Some(format!("https://img.example/{name}.jpg")),
            duration_ms: 200_000,
        }),
        playback: Some(PlaybackPayload {
            is_playing,
            progress_ms: 50_000,
        }),
        error: None,
    }
}

pub(crate) fn drain_events(rx: &mut broadcast::Receiver<ControllerEvent>) -> Vec<ControllerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// In-memory camera that hands out the same JPEG bytes on every capture.
pub(crate) struct FakeCamera {
    pub(crate) captures: Arc<AtomicUsize>,
    pub(crate) released: Arc<AtomicBool>,
}

impl FakeCamera {
    pub(crate) fn new() -> Self {
        Self {
            captures: Arc::new(AtomicUsize::new(0)),
            released: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait]
impl FrameSource for FakeCamera {
    async fn capture(&mut self) -> Result<Option<Frame>, CameraError> {
        if self.released.load(Ordering::SeqCst) {
            return Err(CameraError::Released);
        }
        self.captures.fetch_add(1, Ordering::SeqCst);
        Ok(Some(Frame::jpeg(vec![0xFF, 0xD8, 0xFF, 0xD9])))
    }

    fn release(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

/// Replays a fixed capture sequence, then reports the device as released.
pub(crate) struct ScriptedCamera {
    captures: VecDeque<Result<Option<Frame>, CameraError>>,
    pub(crate) attempts: Arc<AtomicUsize>,
}

impl ScriptedCamera {
    pub(crate) fn new(captures: Vec<Result<Option<Frame>, CameraError>>) -> Self {
        Self {
            captures: captures.into(),
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl FrameSource for ScriptedCamera {
    async fn capture(&mut self) -> Result<Option<Frame>, CameraError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.captures
            .pop_front()
            .unwrap_or(Err(CameraError::Released))
    }

    fn release(&mut self) {
        self.captures.clear();
    }
}
