//! # gamee-core
//!
//! Core types for the gamee platform bridge protocol.
//!
//! This crate provides the vocabulary shared by every bridge backend and the
//! game-facing facade:
//! - Error taxonomy
//! - Capability vocabulary and negotiation
//! - Request and signal method names
//! - Wire envelopes
//! - Controller kinds and input primitives
//! - Platform detection

pub mod capability;
pub mod error;
pub mod input;
pub mod kind;
pub mod method;
pub mod platform;
pub mod protocol;
pub mod signal;

pub use capability::{Capability, CapabilityCache, CapabilitySet};
pub use error::{GameeError, Result};
pub use input::{ButtonState, Position, TouchPhase};
pub use kind::ControllerKind;
pub use method::{InboundMethod, InputMethod, RequestMethod, SignalMethod};
pub use platform::{HostEnvironment, Platform};
pub use protocol::{
    Envelope, InboundMessage, MessageId, Request, RequestEnvelope, Response, ResponseEnvelope,
    WireMessage,
};
pub use signal::{Signal, StartOptions};
