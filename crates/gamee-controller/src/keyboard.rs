//! Keyboard binding
//!
//! Maps physical key codes to button names. The table is taken from the
//! buttons when the keyboard is enabled and follows later remaps, so it
//! always holds current names.

use crate::button::Button;
use gamee_core::ButtonState;
use std::collections::HashMap;

/// Physical key transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key_code: u32,
    pub state: ButtonState,
}

impl KeyEvent {
    pub fn down(key_code: u32) -> Self {
        Self {
            key_code,
            state: ButtonState::Down,
        }
    }

    pub fn up(key_code: u32) -> Self {
        Self {
            key_code,
            state: ButtonState::Up,
        }
    }
}

/// Key code -> button name table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardBinding {
    codes: HashMap<u32, String>,
}

impl KeyboardBinding {
    pub fn from_buttons<'a>(buttons: impl IntoIterator<Item = &'a Button>) -> Self {
        let codes = buttons
            .into_iter()
            .filter_map(|button| {
                button
                    .key_code()
                    .map(|code| (code, button.name().to_string()))
            })
            .collect();
        Self { codes }
    }

    /// Button bound to `key_code`, if any
    pub fn resolve(&self, key_code: u32) -> Option<&str> {
        self.codes.get(&key_code).map(String::as_str)
    }

    /// Point every code bound to `old_name` at `new_name`
    pub fn rename(&mut self, old_name: &str, new_name: &str) {
        for name in self.codes.values_mut() {
            if name == old_name {
                *name = new_name.to_string();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
