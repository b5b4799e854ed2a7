//! Controllers
//!
//! A controller owns a fixed set of buttons chosen by its kind, plus an
//! optional touch or joystick surface. Input reaches it two ways:
//!
//! - [`Controller::trigger`] dispatches a public event by logical button name.
//! - [`Controller::trigger_host`] is the host-private path. Button names are
//!   translated through the alias table exactly once and then dispatched as a
//!   public event, so games that remapped buttons never see host names.
//!
//! Subscribers receive [`ControllerEvent`]s over a broadcast channel. Button
//! events fire on state transitions only.

use crate::button::Button;
use crate::keyboard::{KeyEvent, KeyboardBinding};
use crate::layout::{Layout, Surface};
use gamee_core::{
    ButtonState, ControllerKind, GameeError, InputMethod, Position, Result, TouchPhase,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::broadcast;
use tracing::debug;

/// Broadcast buffer per controller
const EVENT_CAPACITY: usize = 64;

/// Input delivered to a controller
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerInput {
    Button { button: String, state: ButtonState },
    Touch { phase: TouchPhase, position: Position },
    Change { position: Position },
}

impl ControllerInput {
    pub fn key_down(button: impl Into<String>) -> Self {
        ControllerInput::Button {
            button: button.into(),
            state: ButtonState::Down,
        }
    }

    pub fn key_up(button: impl Into<String>) -> Self {
        ControllerInput::Button {
            button: button.into(),
            state: ButtonState::Up,
        }
    }

    /// Decode host input. Touch and joystick requests carry
    /// `{"position": {"x", "y"}}`.
    pub fn from_host(method: InputMethod, data: Option<&Value>) -> Result<Self> {
        match method {
            InputMethod::Button { button, state } => Ok(ControllerInput::Button { button, state }),
            InputMethod::Touch(phase) => Ok(ControllerInput::Touch {
                phase,
                position: position(phase.event_name(), data)?,
            }),
            InputMethod::Change => Ok(ControllerInput::Change {
                position: position("change", data)?,
            }),
        }
    }
}

fn position(method: &str, data: Option<&Value>) -> Result<Position> {
    let raw = data
        .and_then(|d| d.get("position"))
        .ok_or_else(|| GameeError::InvalidArgument(format!("{} requires a position", method)))?;
    serde_json::from_value(raw.clone()).map_err(|e| {
        GameeError::InvalidArgument(format!("{} has a malformed position: {}", method, e))
    })
}

/// Event observed by controller subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// A button changed state
    Button { button: String, state: ButtonState },
    /// Raw touch payload
    Touch { phase: TouchPhase, position: Position },
    /// Joystick moved; axes are in [-1, 1]
    Change { position: Position },
}

/// New name for a remapped button.
///
/// Accepts both `"throttle"` and the older `{"name": "throttle"}` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RemapTarget {
    Name(String),
    Named { name: String },
}

impl RemapTarget {
    pub fn name(&self) -> &str {
        match self {
            RemapTarget::Name(name) => name,
            RemapTarget::Named { name } => name,
        }
    }
}

impl From<&str> for RemapTarget {
    fn from(name: &str) -> Self {
        RemapTarget::Name(name.to_string())
    }
}

/// Construction options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerOptions {
    /// Bind the layout's default key codes
    #[serde(default)]
    pub enable_keyboard: bool,
    /// Remaps applied after construction, old name -> new name
    #[serde(default)]
    pub buttons: BTreeMap<String, RemapTarget>,
}

impl ControllerOptions {
    pub fn with_keyboard() -> Self {
        Self {
            enable_keyboard: true,
            ..Default::default()
        }
    }
}

/// A named collection of buttons and axes representing one input device
#[derive(Debug)]
pub struct Controller {
    kind: ControllerKind,
    surface: Surface,
    buttons: BTreeMap<String, Button>,
    /// Host name -> current button name
    aliases: HashMap<String, String>,
    axes: Position,
    keyboard: Option<KeyboardBinding>,
    event_tx: broadcast::Sender<ControllerEvent>,
}

impl Controller {
    /// Create a controller with the default layout for `kind`
    pub fn new(kind: ControllerKind) -> Result<Self> {
        Self::with_options(kind, &ControllerOptions::default())
    }

    /// Create a controller, then apply keyboard binding and remaps
    pub fn with_options(kind: ControllerKind, options: &ControllerOptions) -> Result<Self> {
        let layout = Layout::for_kind(kind)?;
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);

        let buttons = layout
            .buttons
            .iter()
            .map(|(name, key_code)| (name.to_string(), Button::new(*name, Some(*key_code))))
            .collect();

        let mut controller = Self {
            kind,
            surface: layout.surface,
            buttons,
            aliases: HashMap::new(),
            axes: Position::default(),
            keyboard: None,
            event_tx,
        };

        if options.enable_keyboard {
            controller.enable_keyboard();
        }

        for (old_name, target) in &options.buttons {
            controller.remap_button(old_name, target.name())?;
        }

        debug!("Created {} controller", kind);
        Ok(controller)
    }

    pub fn kind(&self) -> ControllerKind {
        self.kind
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn button(&self, name: &str) -> Option<&Button> {
        self.buttons.get(name)
    }

    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.buttons.values()
    }

    pub fn button_names(&self) -> Vec<&str> {
        self.buttons.keys().map(String::as_str).collect()
    }

    /// Whether the named button is currently pressed
    pub fn is_down(&self, name: &str) -> bool {
        self.buttons.get(name).is_some_and(Button::is_down)
    }

    pub fn aliases(&self) -> &HashMap<String, String> {
        &self.aliases
    }

    /// Last joystick position, (0, 0) until the first `change`
    pub fn axes(&self) -> Position {
        self.axes
    }

    /// Subscribe to controller events
    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.event_tx.subscribe()
    }

    /// Derive the key code table from the current buttons
    pub fn enable_keyboard(&mut self) {
        self.keyboard = Some(KeyboardBinding::from_buttons(self.buttons.values()));
    }

    pub fn keyboard_enabled(&self) -> bool {
        self.keyboard.is_some()
    }

    /// Rename a button.
    ///
    /// Fails with `ButtonNotFound` when `old_name` is not a current button.
    /// The alias is recorded and the button moved in one step; on error the
    /// controller is unchanged.
    pub fn remap_button(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        if !self.buttons.contains_key(old_name) {
            return Err(GameeError::ButtonNotFound(old_name.to_string()));
        }
        if old_name == new_name {
            return Ok(());
        }
        if self.buttons.contains_key(new_name) {
            return Err(GameeError::InvalidArgument(format!(
                "cannot remap {} to {}: button already exists",
                old_name, new_name
            )));
        }

        let Some(mut button) = self.buttons.remove(old_name) else {
            return Err(GameeError::ButtonNotFound(old_name.to_string()));
        };
        button.rename(new_name);
        self.buttons.insert(new_name.to_string(), button);

        // Keep every alias one hop from its final name
        for target in self.aliases.values_mut() {
            if target == old_name {
                *target = new_name.to_string();
            }
        }
        self.aliases
            .insert(old_name.to_string(), new_name.to_string());
        if let Some(keyboard) = self.keyboard.as_mut() {
            keyboard.rename(old_name, new_name);
        }

        debug!("Remapped button {} -> {}", old_name, new_name);
        Ok(())
    }

    /// Dispatch a public event. Returns false when nothing on this controller
    /// handles the input.
    pub fn trigger(&mut self, input: ControllerInput) -> bool {
        match input {
            ControllerInput::Button { button, state } => {
                let Some(target) = self.buttons.get_mut(&button) else {
                    return false;
                };
                if target.transition(state) {
                    self.emit(ControllerEvent::Button { button, state });
                }
                true
            }
            ControllerInput::Touch { phase, position } => {
                if self.surface != Surface::Touch {
                    return false;
                }
                self.emit(ControllerEvent::Touch { phase, position });
                true
            }
            ControllerInput::Change { position } => {
                if self.surface != Surface::Joystick {
                    return false;
                }
                let position = position.clamped(-1.0, 1.0);
                self.axes = position;
                self.emit(ControllerEvent::Change { position });
                true
            }
        }
    }

    /// Host-private dispatch: translate the button name through the alias
    /// table once, then dispatch publicly
    pub fn trigger_host(&mut self, input: ControllerInput) -> bool {
        let input = match input {
            ControllerInput::Button { button, state } => {
                let button = self.aliases.get(&button).cloned().unwrap_or(button);
                ControllerInput::Button { button, state }
            }
            other => other,
        };
        self.trigger(input)
    }

    /// Route a physical key event. Returns true when the key is bound to a
    /// button of this controller and was consumed.
    pub fn handle_key(&mut self, event: KeyEvent) -> bool {
        let Some(name) = self
            .keyboard
            .as_ref()
            .and_then(|binding| binding.resolve(event.key_code))
            .map(str::to_string)
        else {
            return false;
        };

        // The binding already holds current names
        self.trigger(ControllerInput::Button {
            button: name,
            state: event.state,
        });
        true
    }

    fn emit(&self, event: ControllerEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    #[test]
    fn test_remap_moves_button_and_routes_host_input() {
        let mut controller = Controller::new(ControllerKind::TwoButtons).unwrap();
        controller.remap_button("left", "throttle").unwrap();

        assert!(controller.button("throttle").is_some());
        assert!(controller.button("left").is_none());

        assert!(controller.trigger_host(ControllerInput::key_down("left")));
        assert!(controller.is_down("throttle"));
    }

    #[test]
    fn test_remap_unknown_button_leaves_controller_unchanged() {
        let mut controller = Controller::new(ControllerKind::TwoButtons).unwrap();
        let before: Vec<String> = controller.button_names().iter().map(|s| s.to_string()).collect();

        let err = controller.remap_button("nonexistent", "x").unwrap_err();
        assert!(matches!(err, GameeError::ButtonNotFound(name) if name == "nonexistent"));

        let after: Vec<String> = controller.button_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(before, after);
        assert!(controller.aliases().is_empty());
    }

    #[test]
    fn test_remap_onto_existing_button_is_rejected() {
        let mut controller = Controller::new(ControllerKind::TwoButtons).unwrap();
        assert!(controller.remap_button("left", "right").is_err());
        assert!(controller.button("left").is_some());
        assert!(controller.button("right").is_some());
    }

    #[test]
    fn test_chained_remap_resolves_in_one_hop() {
        let mut controller = Controller::new(ControllerKind::TwoButtons).unwrap();
        controller.remap_button("left", "throttle").unwrap();
        controller.remap_button("throttle", "gas").unwrap();

        controller.trigger_host(ControllerInput::key_down("left"));
        assert!(controller.is_down("gas"));
        assert_eq!(controller.aliases().get("left").map(String::as_str), Some("gas"));
    }

    #[test]
    fn test_repeated_keydown_fires_once() {
        let mut controller = Controller::new(ControllerKind::OneButton).unwrap();
        let mut rx = controller.subscribe();

        controller.trigger(ControllerInput::key_down("button"));
        controller.trigger(ControllerInput::key_down("button"));
        assert!(controller.is_down("button"));

        assert_eq!(
            rx.try_recv().unwrap(),
            ControllerEvent::Button {
                button: "button".into(),
                state: ButtonState::Down
            }
        );
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

        controller.trigger(ControllerInput::key_up("button"));
        assert!(!controller.is_down("button"));
        assert_eq!(
            rx.try_recv().unwrap(),
            ControllerEvent::Button {
                button: "button".into(),
                state: ButtonState::Up
            }
        );
    }

    #[test]
    fn test_public_trigger_ignores_aliases() {
        let mut controller = Controller::new(ControllerKind::TwoButtons).unwrap();
        controller.remap_button("left", "throttle").unwrap();

        assert!(!controller.trigger(ControllerInput::key_down("left")));
        assert!(!controller.is_down("throttle"));
        assert!(controller.trigger(ControllerInput::key_down("throttle")));
    }

    #[test]
    fn test_touch_rebroadcasts_raw_payload() {
        let mut controller = Controller::new(ControllerKind::Touch).unwrap();
        let mut rx = controller.subscribe();
        let position = Position::new(0.25, 0.75);

        assert!(controller.trigger_host(ControllerInput::Touch {
            phase: TouchPhase::Start,
            position
        }));
        assert_eq!(
            rx.try_recv().unwrap(),
            ControllerEvent::Touch {
                phase: TouchPhase::Start,
                position
            }
        );

        // Touch input means nothing to a button layout
        let mut buttons = Controller::new(ControllerKind::FourArrows).unwrap();
        assert!(!buttons.trigger(ControllerInput::Touch {
            phase: TouchPhase::Move,
            position
        }));
    }

    #[test]
    fn test_joystick_change_tracks_clamped_axes() {
        let mut controller = Controller::new(ControllerKind::JoystickWithButton).unwrap();
        let mut rx = controller.subscribe();

        controller.trigger_host(ControllerInput::Change {
            position: Position::new(0.5, -3.0),
        });
        assert_eq!(controller.axes(), Position::new(0.5, -1.0));
        assert_eq!(
            rx.try_recv().unwrap(),
            ControllerEvent::Change {
                position: Position::new(0.5, -1.0)
            }
        );

        controller.trigger(ControllerInput::key_down("button"));
        assert!(controller.is_down("button"));
    }

    #[test]
    fn test_keyboard_routes_through_aliases() {
        let options: ControllerOptions = serde_json::from_value(serde_json::json!({
            "enableKeyboard": true,
            "buttons": { "left": { "name": "throttle" }, "right": "brake" }
        }))
        .unwrap();
        let mut controller =
            Controller::with_options(ControllerKind::TwoButtons, &options).unwrap();

        assert!(controller.handle_key(KeyEvent::down(37)));
        assert!(controller.is_down("throttle"));
        assert!(controller.handle_key(KeyEvent::down(39)));
        assert!(controller.is_down("brake"));
        assert!(controller.handle_key(KeyEvent::up(37)));
        assert!(!controller.is_down("throttle"));

        // Unmapped key codes are ignored
        assert!(!controller.handle_key(KeyEvent::down(65)));
    }

    #[test]
    fn test_keyboard_enabled_after_remap() {
        let mut controller = Controller::new(ControllerKind::TwoButtons).unwrap();
        controller.remap_button("left", "x").unwrap();
        controller.remap_button("right", "left").unwrap();
        controller.enable_keyboard();

        // Right arrow belongs to the button that used to be `right`
        assert!(controller.handle_key(KeyEvent::down(39)));
        assert!(controller.is_down("left"));
        assert!(!controller.is_down("x"));

        assert!(controller.handle_key(KeyEvent::down(37)));
        assert!(controller.is_down("x"));
    }

    #[test]
    fn test_keyboard_follows_later_remaps() {
        let mut controller = Controller::with_options(
            ControllerKind::TwoButtons,
            &ControllerOptions::with_keyboard(),
        )
        .unwrap();
        controller.remap_button("left", "x").unwrap();
        controller.remap_button("right", "left").unwrap();

        assert!(controller.handle_key(KeyEvent::down(39)));
        assert!(controller.is_down("left"));
        assert!(!controller.is_down("x"));
    }

    #[test]
    fn test_keyboard_disabled_by_default() {
        let mut controller = Controller::new(ControllerKind::OneButton).unwrap();
        assert!(!controller.keyboard_enabled());
        assert!(!controller.handle_key(KeyEvent::down(32)));
        assert!(!controller.is_down("button"));
    }

    #[test]
    fn test_decode_host_input() {
        let input = ControllerInput::from_host(
            InputMethod::Touch(TouchPhase::End),
            Some(&serde_json::json!({ "position": { "x": 0.5, "y": 0.1 } })),
        )
        .unwrap();
        assert_eq!(
            input,
            ControllerInput::Touch {
                phase: TouchPhase::End,
                position: Position::new(0.5, 0.1)
            }
        );

        assert!(ControllerInput::from_host(InputMethod::Change, None).is_err());

        let input = ControllerInput::from_host(
            InputMethod::Button {
                button: "A".into(),
                state: ButtonState::Down,
            },
            None,
        )
        .unwrap();
        assert_eq!(input, ControllerInput::key_down("A"));
    }

    #[test]
    fn test_full_screen_has_no_controller() {
        assert!(matches!(
            Controller::new(ControllerKind::FullScreen),
            Err(GameeError::UnsupportedControllerKind(_))
        ));
    }
}
