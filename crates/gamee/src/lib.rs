//! Game-facing gamee API
//!
//! This crate provides:
//! - The `Gamee` session facade (init handshake, gated requests)
//! - Session configuration and platform selection
//! - The session context owning the main controller
//! - Request payload types

pub mod config;
pub mod gamee;
pub mod init;
pub mod options;
pub mod session;

pub use config::GameeConfig;
pub use gamee::{Callback, Gamee};
pub use init::InitResponse;
pub use options::{GameOverOptions, ReplayData};
pub use session::SessionContext;

pub use gamee_bridge::{
    Acknowledger, InstantGamesSdk, MessageChannel, MessageSource, PlatformEvent, QueueChannel,
};
pub use gamee_controller::{
    Controller, ControllerEvent, ControllerInput, ControllerOptions, KeyEvent, RemapTarget,
};
pub use gamee_core::{
    ButtonState, Capability, ControllerKind, GameeError, HostEnvironment, InboundMessage,
    Platform, Position, Result, Signal, StartOptions, WireMessage,
};
