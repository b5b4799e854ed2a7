//! Controller kind registry names

use crate::error::{GameeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of controller layouts a game can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControllerKind {
    OneButton,
    TwoButtons,
    TwoActionButtons,
    FourButtons,
    FiveButtons,
    SixButtons,
    TwoArrowsOneButton,
    TwoArrowsTwoButtons,
    FourArrows,
    Touch,
    Joystick,
    JoystickWithButton,
    /// Sentinel: the game handles input itself, no controller is created
    FullScreen,
}

impl ControllerKind {
    pub const ALL: [ControllerKind; 13] = [
        ControllerKind::OneButton,
        ControllerKind::TwoButtons,
        ControllerKind::TwoActionButtons,
        ControllerKind::FourButtons,
        ControllerKind::FiveButtons,
        ControllerKind::SixButtons,
        ControllerKind::TwoArrowsOneButton,
        ControllerKind::TwoArrowsTwoButtons,
        ControllerKind::FourArrows,
        ControllerKind::Touch,
        ControllerKind::Joystick,
        ControllerKind::JoystickWithButton,
        ControllerKind::FullScreen,
    ];

    /// Wire name sent in the init payload
    pub fn as_str(self) -> &'static str {
        match self {
            ControllerKind::OneButton => "OneButton",
            ControllerKind::TwoButtons => "TwoButtons",
            ControllerKind::TwoActionButtons => "TwoActionButtons",
            ControllerKind::FourButtons => "FourButtons",
            ControllerKind::FiveButtons => "FiveButtons",
            ControllerKind::SixButtons => "SixButtons",
            ControllerKind::TwoArrowsOneButton => "TwoArrowsOneButton",
            ControllerKind::TwoArrowsTwoButtons => "TwoArrowsTwoButtons",
            ControllerKind::FourArrows => "FourArrows",
            ControllerKind::Touch => "Touch",
            ControllerKind::Joystick => "Joystick",
            ControllerKind::JoystickWithButton => "JoystickWithButton",
            ControllerKind::FullScreen => "FullScreen",
        }
    }
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ControllerKind {
    type Err = GameeError;

    fn from_str(s: &str) -> Result<Self> {
        ControllerKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| GameeError::UnsupportedControllerKind(s.to_string()))
    }
}
