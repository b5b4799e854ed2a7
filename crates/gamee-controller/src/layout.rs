//! Fixed button layouts per controller kind

use gamee_core::{ControllerKind, GameeError, Result};

// Default keyboard bindings
const SPACE: u32 = 32;
const CTRL: u32 = 17;
const LEFT: u32 = 37;
const UP: u32 = 38;
const RIGHT: u32 = 39;
const DOWN: u32 = 40;

/// Non-button input surface of a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    None,
    Touch,
    Joystick,
}

/// Buttons and surface for one controller kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub buttons: &'static [(&'static str, u32)],
    pub surface: Surface,
}

impl Layout {
    /// Look up the layout for a kind. `FullScreen` has no controller.
    pub fn for_kind(kind: ControllerKind) -> Result<Self> {
        let (buttons, surface) = match kind {
            ControllerKind::OneButton => (ONE_BUTTON, Surface::None),
            ControllerKind::TwoButtons => (TWO_BUTTONS, Surface::None),
            ControllerKind::TwoActionButtons => (TWO_ACTION_BUTTONS, Surface::None),
            ControllerKind::FourButtons => (FOUR_BUTTONS, Surface::None),
            ControllerKind::FiveButtons => (FIVE_BUTTONS, Surface::None),
            ControllerKind::SixButtons => (SIX_BUTTONS, Surface::None),
            ControllerKind::TwoArrowsOneButton => (TWO_ARROWS_ONE_BUTTON, Surface::None),
            ControllerKind::TwoArrowsTwoButtons => (TWO_ARROWS_TWO_BUTTONS, Surface::None),
            ControllerKind::FourArrows => (FOUR_ARROWS, Surface::None),
            ControllerKind::Touch => (NO_BUTTONS, Surface::Touch),
            ControllerKind::Joystick => (NO_BUTTONS, Surface::Joystick),
            ControllerKind::JoystickWithButton => (ONE_BUTTON, Surface::Joystick),
            ControllerKind::FullScreen => {
                return Err(GameeError::UnsupportedControllerKind(kind.to_string()));
            }
        };

        Ok(Self { buttons, surface })
    }
}

type Buttons = &'static [(&'static str, u32)];

const NO_BUTTONS: Buttons = &[];
const ONE_BUTTON: Buttons = &[("button", SPACE)];
const TWO_BUTTONS: Buttons = &[("left", LEFT), ("right", RIGHT)];
const TWO_ACTION_BUTTONS: Buttons = &[("A", SPACE), ("B", CTRL)];
const FOUR_BUTTONS: Buttons = &[("up", UP), ("left", LEFT), ("right", RIGHT), ("A", SPACE)];
const FIVE_BUTTONS: Buttons = &[
    ("up", UP),
    ("left", LEFT),
    ("right", RIGHT),
    ("down", DOWN),
    ("A", SPACE),
];
const SIX_BUTTONS: Buttons = &[
    ("up", UP),
    ("left", LEFT),
    ("right", RIGHT),
    ("down", DOWN),
    ("A", SPACE),
    ("B", CTRL),
];
const TWO_ARROWS_ONE_BUTTON: Buttons = &[("left", LEFT), ("right", RIGHT), ("A", SPACE)];
const TWO_ARROWS_TWO_BUTTONS: Buttons = &[
    ("left", LEFT),
    ("right", RIGHT),
    ("A", SPACE),
    ("B", CTRL),
];
const FOUR_ARROWS: Buttons = &[("up", UP), ("left", LEFT), ("right", RIGHT), ("down", DOWN)];
