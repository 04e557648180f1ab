use std::str::FromStr;

use chrono::Local;
use control_core::{ControllerEvent, TouchGesture};
use shared::domain::NO_TRACK_TEXT;

/// One line typed at the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Gesture(TouchGesture),
    Toggle,
    Next,
    Previous,
    VolumeUp,
    VolumeDown,
    Status,
    Track,
    CameraOff,
    Help,
    Quit,
}

impl FromStr for ConsoleCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim().to_ascii_lowercase();
        let command = match line.as_str() {
            "play" | "pause" | "toggle" => Self::Toggle,
            "next" | "skip" => Self::Next,
            "prev" | "previous" | "back" => Self::Previous,
            "vol+" | "volume up" => Self::VolumeUp,
            "vol-" | "volume down" => Self::VolumeDown,
            "status" => Self::Status,
            "track" | "now" => Self::Track,
            "camera off" => Self::CameraOff,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => {
                return other
                    .parse::<TouchGesture>()
                    .map(Self::Gesture)
                    .map_err(|_| format!("unrecognized input '{other}' (try 'help')"))
            }
        };
        Ok(command)
    }
}

pub const HELP: &str = "\
gestures: swipe_left swipe_right swipe_up swipe_down tap double_tap
controls: toggle next prev vol+ vol- status track camera off quit";

/// Renders a controller event as a console line; `None` for events with nothing to show.
pub fn render_event(event: &ControllerEvent) -> Option<String> {
    let line = match event {
        ControllerEvent::ConnectionChanged(session) => session.indicator_text(),
        ControllerEvent::TrackChanged(Some(track)) => track.display_line(),
        ControllerEvent::TrackChanged(None) => NO_TRACK_TEXT.to_string(),
        ControllerEvent::Feedback(notice) => {
            let mark = if notice.success { "ok" } else { "failed" };
            format!(
                "[{}] {} ({mark})",
                notice.shown_at.with_timezone(&Local).format("%H:%M:%S"),
                notice.label
            )
        }
        ControllerEvent::FeedbackDismissed { .. } => return None,
        ControllerEvent::Notice(message) => format!("! {message}"),
    };
    Some(line)
}
