//! Session context
//!
//! Owns the main controller. Only the main controller receives ambient input;
//! additional controllers belong to whoever requested them.

use gamee_controller::{Controller, ControllerInput, ControllerOptions, KeyEvent};
use gamee_core::{ControllerKind, GameeError, Result};
use tracing::info;

#[derive(Debug, Default)]
pub struct SessionContext {
    main: Option<Controller>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the main controller, replacing any previous one.
    ///
    /// Full-screen games have no controller and leave the slot empty.
    pub fn request_controller(
        &mut self,
        kind: ControllerKind,
        options: &ControllerOptions,
    ) -> Result<Option<&mut Controller>> {
        if kind == ControllerKind::FullScreen {
            self.main = None;
            return Ok(None);
        }

        let controller = Controller::with_options(kind, options)?;
        info!("Main controller: {}", kind);
        Ok(Some(self.main.insert(controller)))
    }

    /// Build a controller that never receives ambient input
    pub fn additional_controller(
        &self,
        kind: ControllerKind,
        options: &ControllerOptions,
    ) -> Result<Controller> {
        Controller::with_options(kind, options)
    }

    pub fn main(&self) -> Option<&Controller> {
        self.main.as_ref()
    }

    pub fn main_mut(&mut self) -> Option<&mut Controller> {
        self.main.as_mut()
    }

    /// Public dispatch on the main controller
    pub fn trigger(&mut self, input: ControllerInput) -> Result<bool> {
        Ok(self.require_main()?.trigger(input))
    }

    /// Host dispatch on the main controller, through its aliases
    pub fn trigger_host(&mut self, input: ControllerInput) -> Result<bool> {
        Ok(self.require_main()?.trigger_host(input))
    }

    pub fn key_event(&mut self, event: KeyEvent) -> Result<bool> {
        Ok(self.require_main()?.handle_key(event))
    }

    fn require_main(&mut self) -> Result<&mut Controller> {
        self.main.as_mut().ok_or(GameeError::NoMainController)
    }
}
