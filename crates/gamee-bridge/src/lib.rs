//! Platform bridge for gamee games
//!
//! This crate provides:
//! - Request/response correlation
//! - The `PlatformBridge` contract and its three backends
//! - Transport abstractions (`MessageChannel` / `MessageSource`)
//! - Host signal dispatch with acknowledgements
//! - An async listener loop for inbound host traffic

pub mod bridge;
pub mod channel;
pub mod correlator;
pub mod instant;
pub mod listener;
pub mod mobile;
pub mod signal;
pub mod web;

pub use bridge::{BridgeConfig, Inbound, Outbox, PROTOCOL_VERSION, PlatformBridge};
pub use channel::{MessageChannel, MessageSource, QueueChannel};
pub use correlator::{RequestCorrelator, ResponseCallback};
pub use instant::{InstantGamesBridge, InstantGamesSdk};
pub use listener::{InboundHandler, InputEvent, Relay, listen};
pub use mobile::{Device, MobileBridge};
pub use signal::{Acknowledger, PlatformEvent, PlatformSignalEmitter};
pub use web::EmbeddedWebBridge;
