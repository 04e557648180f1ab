use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use shared::{domain::GestureLabel, protocol::PredictRequest};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    backend::PlaybackBackend,
    source::{GestureOrigin, GestureSink},
    task::TaskHandle,
};

pub const DEFAULT_GESTURE_THRESHOLD: f64 = 0.3;
/// One display refresh at 60 Hz.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera device already released")]
    Released,
    #[error("failed to open camera device: {0}")]
    Open(String),
    #[error("frame capture failed: {0}")]
    Capture(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl Frame {
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime_type: "image/jpeg".to_string(),
        }
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

/// Exclusive handle on a capture device.
#[async_trait]
pub trait FrameSource: Send {
    /// `Ok(None)` means the device has no frame ready yet.
    async fn capture(&mut self) -> Result<Option<Frame>, CameraError>;
    fn release(&mut self);
}

#[derive(Debug, Clone, Copy)]
pub struct CameraOptions {
    pub threshold: f64,
    pub frame_interval: Duration,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_GESTURE_THRESHOLD,
            frame_interval: DEFAULT_FRAME_INTERVAL,
        }
    }
}

/// Streams frames to the recognition endpoint, one request in flight at a time.
pub struct CameraGestureSource {
    device: Arc<Mutex<Option<Box<dyn FrameSource>>>>,
    task: TaskHandle,
}

impl CameraGestureSource {
    pub fn start(
        frames: Box<dyn FrameSource>,
        backend: Arc<dyn PlaybackBackend>,
        sink: GestureSink,
        options: CameraOptions,
    ) -> Self {
        let device = Arc::new(Mutex::new(Some(frames)));
        let loop_device = Arc::clone(&device);
        let task = TaskHandle::spawn("camera-gestures", move |stop| async move {
            info!(threshold = options.threshold, "camera gesture recognition started");
            loop {
                if *stop.borrow() {
                    break;
                }

                let captured = {
                    let mut guard = loop_device.lock().await;
                    let Some(source) = guard.as_mut() else {
                        break;
                    };
                    if *stop.borrow() {
                        break;
                    }
                    source.capture().await
                };

                let frame = match captured {
                    Ok(Some(frame)) => frame,
                    Ok(None) => {
                        tokio::time::sleep(options.frame_interval).await;
                        continue;
                    }
                    Err(CameraError::Released) => break,
                    Err(err) => {
                        warn!(error = %err, "camera frame capture failed");
                        tokio::time::sleep(options.frame_interval).await;
                        continue;
                    }
                };

                let request = PredictRequest {
                    image: frame.to_data_url(),
                };
                match backend.predict(&request).await {
                    Ok(_) if *stop.borrow() => {
                        debug!("discarding recognition result that resolved after stop");
                        break;
                    }
                    Ok(prediction) => {
                        if let Some(label) = prediction.accepted_label(options.threshold) {
                            debug!(label, confidence = prediction.confidence, "camera gesture recognized");
                            sink.emit(GestureLabel::from(label), GestureOrigin::Camera);
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, "camera gesture recognition error");
                    }
                }

                tokio::time::sleep(options.frame_interval).await;
            }
            debug!("camera gesture loop exited");
        });

        Self { device, task }
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_stopping() && !self.task.is_finished()
    }

    /// Stops capturing and releases the device. A recognition request already in
    /// flight is left to finish and its result is dropped.
    pub async fn stop(self) {
        self.task.stop();
        if let Some(mut source) = self.device.lock().await.take() {
            source.release();
            info!("camera released");
        }
    }
}

#[cfg(test)]
#[path = "tests/camera_tests.rs"]
mod tests;
