use std::str::FromStr;

use shared::domain::GestureLabel;

use crate::source::{GestureOrigin, GestureSink};

/// Discrete events produced by the touch/mouse gesture recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchGesture {
    SwipeLeft,
    SwipeRight,
    SwipeUp,
    SwipeDown,
    Tap,
    DoubleTap,
}

impl TouchGesture {
    pub fn label(self) -> GestureLabel {
        match self {
            TouchGesture::SwipeLeft => GestureLabel::SwipeLeft,
            TouchGesture::SwipeRight => GestureLabel::SwipeRight,
            TouchGesture::SwipeUp => GestureLabel::SwipeUp,
            TouchGesture::SwipeDown => GestureLabel::SwipeDown,
            TouchGesture::Tap => GestureLabel::Tap,
            TouchGesture::DoubleTap => GestureLabel::DoubleTap,
        }
    }
}

impl FromStr for TouchGesture {
    type Err = String;

    /// Accepts recognizer event names (`swipeleft`) as well as pipeline labels (`swipe_left`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "swipeleft" | "left" => Ok(TouchGesture::SwipeLeft),
            "swiperight" | "right" => Ok(TouchGesture::SwipeRight),
            "swipeup" | "up" => Ok(TouchGesture::SwipeUp),
            "swipedown" | "down" => Ok(TouchGesture::SwipeDown),
            "tap" => Ok(TouchGesture::Tap),
            "doubletap" => Ok(TouchGesture::DoubleTap),
            _ => Err(format!("unrecognized touch gesture '{}'", s.trim())),
        }
    }
}

#[derive(Clone)]
pub struct TouchGestureSource {
    sink: GestureSink,
}

impl TouchGestureSource {
    pub fn new(sink: GestureSink) -> Self {
        Self { sink }
    }

    pub fn emit(&self, gesture: TouchGesture) -> bool {
        self.sink.emit(gesture.label(), GestureOrigin::Touch)
    }
}
