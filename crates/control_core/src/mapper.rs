use shared::domain::{GestureLabel, PlaybackAction, VOLUME_STEP};
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub action: PlaybackAction,
    pub issued_at: Instant,
}

impl Command {
    pub fn new(action: PlaybackAction, issued_at: Instant) -> Self {
        Self { action, issued_at }
    }
}

enum Mapping {
    Fixed(PlaybackAction),
    TogglePlayback,
}

fn mapping_for(label: &GestureLabel) -> Option<Mapping> {
    let mapping = match label {
        GestureLabel::SwipeLeft | GestureLabel::ThumbsDown => Mapping::Fixed(PlaybackAction::Previous),
        GestureLabel::SwipeRight | GestureLabel::DoubleTap | GestureLabel::ThumbsUp => {
            Mapping::Fixed(PlaybackAction::Next)
        }
        GestureLabel::SwipeUp | GestureLabel::Tap => Mapping::TogglePlayback,
        GestureLabel::SwipeDown => Mapping::Fixed(PlaybackAction::Volume {
            delta: -VOLUME_STEP,
        }),
        GestureLabel::Peace => Mapping::Fixed(PlaybackAction::Volume { delta: VOLUME_STEP }),
        GestureLabel::Fist => Mapping::Fixed(PlaybackAction::Pause),
        GestureLabel::OpenPalm => Mapping::Fixed(PlaybackAction::Play),
        GestureLabel::Unknown(_) => return None,
    };
    Some(mapping)
}

pub fn toggle_action(currently_playing: bool) -> PlaybackAction {
    if currently_playing {
        PlaybackAction::Pause
    } else {
        PlaybackAction::Play
    }
}

/// Maps a gesture label to the playback command it triggers; unrecognized labels map to nothing.
pub fn resolve(label: &GestureLabel, currently_playing: bool, issued_at: Instant) -> Option<Command> {
    let action = match mapping_for(label)? {
        Mapping::Fixed(action) => action,
        Mapping::TogglePlayback => toggle_action(currently_playing),
    };
    Some(Command::new(action, issued_at))
}
