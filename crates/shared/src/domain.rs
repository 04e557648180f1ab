use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! gesture_labels {
    ($($variant:ident => $label:literal),+ $(,)?) => {
        /// Gesture vocabulary shared by the touch and camera sources.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum GestureLabel {
            $($variant,)+
            Unknown(String),
        }

        impl GestureLabel {
            pub const KNOWN: &'static [GestureLabel] = &[$(GestureLabel::$variant),+];

            pub fn as_str(&self) -> &str {
                match self {
                    $(GestureLabel::$variant => $label,)+
                    GestureLabel::Unknown(raw) => raw.as_str(),
                }
            }
        }

        impl From<String> for GestureLabel {
            fn from(value: String) -> Self {
                match value.trim() {
                    $($label => GestureLabel::$variant,)+
                    _ => GestureLabel::Unknown(value),
                }
            }
        }
    };
}

gesture_labels! {
    SwipeLeft => "swipe_left",
    SwipeRight => "swipe_right",
    SwipeUp => "swipe_up",
    SwipeDown => "swipe_down",
    Tap => "tap",
    DoubleTap => "double_tap",
    Fist => "fist",
    OpenPalm => "open_palm",
    ThumbsUp => "thumbs_up",
    ThumbsDown => "thumbs_down",
    Peace => "peace",
}

impl GestureLabel {
    pub fn is_known(&self) -> bool {
        !matches!(self, GestureLabel::Unknown(_))
    }
}

impl From<&str> for GestureLabel {
    fn from(value: &str) -> Self {
        GestureLabel::from(value.to_string())
    }
}

impl From<GestureLabel> for String {
    fn from(value: GestureLabel) -> Self {
        value.as_str().to_string()
    }
}

impl FromStr for GestureLabel {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(GestureLabel::from(s))
    }
}

impl fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const VOLUME_STEP: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackAction {
    Previous,
    Next,
    Play,
    Pause,
    Volume { delta: i32 },
}

impl PlaybackAction {
    /// Name the control endpoint expects in the `action` field.
    pub fn wire_name(&self) -> &'static str {
        match self {
            PlaybackAction::Previous => "previous",
            PlaybackAction::Next => "next",
            PlaybackAction::Play => "play",
            PlaybackAction::Pause => "pause",
            PlaybackAction::Volume { .. } => "volume",
        }
    }

    pub fn volume_delta(&self) -> Option<i32> {
        match self {
            PlaybackAction::Volume { delta } => Some(*delta),
            _ => None,
        }
    }
}

impl fmt::Display for PlaybackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackAction::Volume { delta } => write!(f, "volume {delta:+}"),
            other => f.write_str(other.wire_name()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub authorized: bool,
    pub account_label: Option<String>,
}

impl SessionState {
    pub fn unauthorized() -> Self {
        Self::default()
    }

    pub fn authorized(account_label: Option<String>) -> Self {
        Self {
            authorized: true,
            account_label,
        }
    }

    /// Text for the connection indicator.
    pub fn indicator_text(&self) -> String {
        match (self.authorized, &self.account_label) {
            (true, Some(label)) => format!("Connected to Spotify as {label}"),
            (true, None) => "Connected to Spotify".to_string(),
            (false, _) => "Not connected to Spotify".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSnapshot {
    pub track_name: String,
    pub artists: Vec<String>,
    pub album_art_url: Option<String>,
    pub duration_ms: u64,
    pub progress_ms: u64,
    pub is_playing: bool,
}

impl TrackSnapshot {
    pub fn artist_line(&self) -> String {
        self.artists.join(", ")
    }

    pub fn progress_percent(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        let percent = self.progress_ms as f64 / self.duration_ms as f64 * 100.0;
        percent.clamp(0.0, 100.0)
    }

    pub fn display_line(&self) -> String {
        let state = if self.is_playing { "playing" } else { "paused" };
        format!(
            "{} - {} [{state} {:.0}%]",
            self.track_name,
            self.artist_line(),
            self.progress_percent()
        )
    }
}

pub const NO_TRACK_TEXT: &str = "No track playing";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_labels_and_keeps_unknown_raw() {
        assert_eq!(GestureLabel::from("swipe_left"), GestureLabel::SwipeLeft);
        assert_eq!(GestureLabel::from("peace"), GestureLabel::Peace);
        assert_eq!(
            GestureLabel::from("wave"),
            GestureLabel::Unknown("wave".to_string())
        );
        assert!(GestureLabel::KNOWN.iter().all(GestureLabel::is_known));
        assert_eq!(GestureLabel::KNOWN.len(), 11);
    }

    #[test]
    fn gesture_label_serializes_as_plain_string() {
        let json = serde_json::to_string(&GestureLabel::DoubleTap).expect("json");
        assert_eq!(json, "\"double_tap\"");
        let parsed: GestureLabel = serde_json::from_str("\"thumbs_up\"").expect("parse");
        assert_eq!(parsed, GestureLabel::ThumbsUp);
    }

    #[test]
    fn progress_percent_handles_zero_duration_and_overrun() {
        let mut snapshot = TrackSnapshot {
            track_name: "Song".to_string(),
            artists: vec!["A".to_string(), "B".to_string()],
            album_art_url: None,
            duration_ms: 0,
            progress_ms: 500,
            is_playing: true,
        };
        assert_eq!(snapshot.progress_percent(), 0.0);

        snapshot.duration_ms = 1000;
        assert_eq!(snapshot.progress_percent(), 50.0);

        snapshot.progress_ms = 5000;
        assert_eq!(snapshot.progress_percent(), 100.0);
        assert_eq!(snapshot.artist_line(), "A, B");
    }

    #[test]
    fn indicator_text_prefers_account_label() {
        assert_eq!(
            SessionState::authorized(Some("alice".to_string())).indicator_text(),
            "Connected to Spotify as alice"
        );
        assert_eq!(
            SessionState::unauthorized().indicator_text(),
            "Not connected to Spotify"
        );
    }

    #[test]
    fn volume_action_displays_signed_delta() {
        assert_eq!(PlaybackAction::Volume { delta: -10 }.to_string(), "volume -10");
        assert_eq!(PlaybackAction::Volume { delta: 10 }.to_string(), "volume +10");
        assert_eq!(PlaybackAction::Next.to_string(), "next");
    }
}
