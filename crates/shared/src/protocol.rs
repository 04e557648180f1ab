use serde::{Deserialize, Serialize};

use crate::domain::{PlaybackAction, SessionState, TrackSnapshot};

pub const STATUS_PATH: &str = "/api/spotify/status";
pub const CURRENT_PATH: &str = "/api/spotify/current";
pub const CONTROL_PATH: &str = "/api/spotify/control";
pub const PREDICT_PATH: &str = "/api/gesture/predict";

/// Label the recognizer returns when no hand gesture was found in a frame.
pub const NO_GESTURE_LABEL: &str = "none";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl AccountSummary {
    pub fn label(&self) -> Option<String> {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or(self.id.as_deref())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<AccountSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusResponse {
    pub fn into_session(self) -> SessionState {
        if self.authenticated {
            SessionState::authorized(self.user.as_ref().and_then(AccountSummary::label))
        } else {
            SessionState::unauthorized()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackPayload {
    pub name: String,
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_art: Option<String>,
    #[serde(default)]
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaybackPayload {
    #[serde(default)]
    pub is_playing: bool,
    #[serde(default)]
    pub progress_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentPlaybackResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub playing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<TrackPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playback: Option<PlaybackPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CurrentPlaybackResponse {
    /// `None` unless the backend reports an active track.
    pub fn into_snapshot(self) -> Option<TrackSnapshot> {
        if !self.ok || !self.playing {
            return None;
        }
        let track = self.track?;
        let playback = self.playback.unwrap_or_default();
        Some(TrackSnapshot {
            track_name: track.name,
            artists: track.artists,
            album_art_url: track.album_art.filter(|url| !url.is_empty()),
            duration_ms: track.duration_ms,
            progress_ms: playback.progress_ms,
            is_playing: playback.is_playing,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlRequest {
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<i32>,
}

impl From<PlaybackAction> for ControlRequest {
    fn from(action: PlaybackAction) -> Self {
        Self {
            action: action.wire_name().to_string(),
            delta: action.volume_delta(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControlResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub gesture: Option<String>,
    #[serde(default)]
    pub confidence: f64,
}

impl PredictResponse {
    /// Recognized label when it clears `threshold`; `none` and low-confidence frames yield nothing.
    pub fn accepted_label(&self, threshold: f64) -> Option<&str> {
        let gesture = self.gesture.as_deref()?.trim();
        if gesture.is_empty() || gesture == NO_GESTURE_LABEL {
            return None;
        }
        (self.confidence >= threshold).then_some(gesture)
    }
}
