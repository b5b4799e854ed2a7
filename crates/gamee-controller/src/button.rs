//! Controller button

use gamee_core::ButtonState;

/// A single named button with an optional keyboard key code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    name: String,
    key_code: Option<u32>,
    state: ButtonState,
}

impl Button {
    pub fn new(name: impl Into<String>, key_code: Option<u32>) -> Self {
        Self {
            name: name.into(),
            key_code,
            state: ButtonState::Up,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_code(&self) -> Option<u32> {
        self.key_code
    }

    pub fn state(&self) -> ButtonState {
        self.state
    }

    /// Whether the button is currently pressed
    pub fn is_down(&self) -> bool {
        self.state == ButtonState::Down
    }

    /// Apply a transition. Returns true when the state actually changed;
    /// repeating the current state is a no-op.
    pub fn transition(&mut self, state: ButtonState) -> bool {
        if self.state == state {
            return false;
        }
        self.state = state;
        true
    }

    pub(crate) fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }
}
