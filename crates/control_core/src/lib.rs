//! Gesture-driven playback control bridged through the Smart Music backend.
//!
//! Gesture sources (touch recognizer events, camera frames classified by the
//! backend) feed a single inbound channel. The controller loop gates each event
//! on the session and the cooldown window, maps it to a playback command, and
//! hands it to the dispatcher. A poller keeps the current track snapshot fresh
//! independently of commands.

pub mod auth;
pub mod backend;
pub mod camera;
pub mod config;
mod controller;
pub mod cooldown;
pub mod dispatcher;
pub mod events;
pub mod mapper;
pub mod poller;
pub mod source;
pub mod task;
pub mod touch;

pub use auth::AuthGate;
pub use backend::{HttpBackend, PlaybackBackend};
pub use camera::{CameraError, CameraGestureSource, Frame, FrameSource};
pub use config::{load_settings, Settings};
pub use controller::GestureController;
pub use cooldown::CooldownGate;
pub use dispatcher::{CommandDispatcher, DispatchOutcome};
pub use events::{ControllerEvent, FeedbackNotice};
pub use mapper::{resolve, Command};
pub use poller::{PollOutcome, TrackPoller};
pub use source::{GestureEvent, GestureOrigin, GestureSink};
pub use task::TaskHandle;
pub use touch::{TouchGesture, TouchGestureSource};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
