//! Input primitives shared by the bridge and the controller fabric

use serde::{Deserialize, Serialize};

/// Two-state button machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonState {
    #[default]
    Up,
    Down,
}

impl ButtonState {
    /// Event name used on the wire and by controller subscribers
    pub fn event_name(self) -> &'static str {
        match self {
            ButtonState::Up => "keyup",
            ButtonState::Down => "keydown",
        }
    }
}

/// Touch surface phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchPhase {
    #[serde(rename = "touchstart")]
    Start,
    #[serde(rename = "touchmove")]
    Move,
    #[serde(rename = "touchend")]
    End,
    #[serde(rename = "touchleave")]
    Leave,
    #[serde(rename = "touchcancel")]
    Cancel,
}

impl TouchPhase {
    pub const ALL: [TouchPhase; 5] = [
        TouchPhase::Start,
        TouchPhase::Move,
        TouchPhase::End,
        TouchPhase::Leave,
        TouchPhase::Cancel,
    ];

    pub fn event_name(self) -> &'static str {
        match self {
            TouchPhase::Start => "touchstart",
            TouchPhase::Move => "touchmove",
            TouchPhase::End => "touchend",
            TouchPhase::Leave => "touchleave",
            TouchPhase::Cancel => "touchcancel",
        }
    }

    pub fn from_event_name(name: &str) -> Option<Self> {
        TouchPhase::ALL
            .into_iter()
            .find(|phase| phase.event_name() == name)
    }
}

/// Normalized 2D position.
///
/// Touch positions run from (0, 0) top-left to (1, 1) bottom-right.
/// Joystick axes run from -1 to 1 with (0, 0) at the center.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn clamped(self, min: f64, max: f64) -> Self {
        Self {
            x: self.x.clamp(min, max),
            y: self.y.clamp(min, max),
        }
    }
}
