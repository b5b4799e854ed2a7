//! Controller event fabric
//!
//! This crate provides:
//! - Button state machines
//! - The controller-kind layout registry
//! - Controllers with remapping and host input routing
//! - Keyboard bindings derived from button key codes

pub mod button;
pub mod controller;
pub mod keyboard;
pub mod layout;

pub use button::Button;
pub use controller::{Controller, ControllerEvent, ControllerInput, ControllerOptions, RemapTarget};
pub use keyboard::{KeyEvent, KeyboardBinding};
pub use layout::{Layout, Surface};
