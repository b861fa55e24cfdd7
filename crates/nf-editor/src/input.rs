//! Input abstraction layer.
//!
//! Normalizes host pointer, wheel and keyboard events into a unified
//! `InputEvent` consumed by the canvas controller. Pointer positions are in
//! viewport (screen) coordinates relative to the canvas widget.

use nf_core::geometry::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Keyboard modifier state at the time of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Self::NONE
    };

    /// ⌘ on macOS, Ctrl elsewhere.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A normalized input event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown {
        position: Point,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// `time_ms` is a monotonic host timestamp used for throttling.
    PointerMove {
        position: Point,
        #[serde(default)]
        modifiers: Modifiers,
        #[serde(default)]
        time_ms: u64,
    },
    PointerUp {
        position: Point,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Wheel {
        delta: Vec2,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// `key` is the host key value (e.g. `"z"`, `"Delete"`, `" "`).
    KeyDown {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
    },
    KeyUp {
        key: String,
        #[serde(default)]
        modifiers: Modifiers,
    },
}

impl InputEvent {
    pub fn pointer_down(x: f64, y: f64, modifiers: Modifiers) -> Self {
        Self::PointerDown {
            position: Point::new(x, y),
            modifiers,
        }
    }

    pub fn pointer_move(x: f64, y: f64, modifiers: Modifiers, time_ms: u64) -> Self {
        Self::PointerMove {
            position: Point::new(x, y),
            modifiers,
            time_ms,
        }
    }

    pub fn pointer_up(x: f64, y: f64, modifiers: Modifiers) -> Self {
        Self::PointerUp {
            position: Point::new(x, y),
            modifiers,
        }
    }

    pub fn key(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self::KeyDown {
            key: key.into(),
            modifiers,
        }
    }

    /// Extract position if this is a pointer event.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { position, .. }
            | Self::PointerMove { position, .. }
            | Self::PointerUp { position, .. } => Some(*position),
            _ => None,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match self {
            Self::PointerDown { modifiers, .. }
            | Self::PointerMove { modifiers, .. }
            | Self::PointerUp { modifiers, .. }
            | Self::Wheel { modifiers, .. }
            | Self::KeyDown { modifiers, .. }
            | Self::KeyUp { modifiers, .. } => *modifiers,
        }
    }
}

/// Drops pointer-move events that arrive closer together than the interval.
#[derive(Debug, Clone)]
pub struct PointerThrottle {
    interval_ms: u64,
    last: Option<u64>,
}

impl PointerThrottle {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last: None,
        }
    }

    /// Whether an event at `time_ms` should be processed.
    pub fn admit(&mut self, time_ms: u64) -> bool {
        match self.last {
            Some(last) if time_ms >= last && time_ms - last < self.interval_ms => false,
            _ => {
                self.last = Some(time_ms);
                true
            }
        }
    }

    /// Forget the last admitted event so the next one always passes.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttle_drops_close_events() {
        let mut t = PointerThrottle::new(16);
        assert!(t.admit(0));
        assert!(!t.admit(5));
        assert!(!t.admit(15));
        assert!(t.admit(16));
        assert!(!t.admit(20));
        t.reset();
        assert!(t.admit(21));
    }

    #[test]
    fn throttle_accepts_clock_going_backwards() {
        let mut t = PointerThrottle::new(16);
        assert!(t.admit(100));
        assert!(t.admit(50));
    }

    #[test]
    fn command_is_ctrl_or_meta() {
        assert!(Modifiers { ctrl: true, ..Modifiers::NONE }.command());
        assert!(Modifiers { meta: true, ..Modifiers::NONE }.command());
        assert!(!Modifiers::SHIFT.command());
    }

    #[test]
    fn events_deserialize_from_tagged_json() {
        let e: InputEvent =
            serde_json::from_str(r#"{"event":"pointer_down","position":{"x":1.0,"y":2.0}}"#)
                .unwrap();
        assert_eq!(e.position(), Some(Point::new(1.0, 2.0)));
        assert_eq!(e.modifiers(), Modifiers::NONE);
    }
}
