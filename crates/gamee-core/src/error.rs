//! Error types for the gamee bridge

use crate::capability::Capability;
use thiserror::Error;

/// Result type for gamee operations
pub type Result<T> = std::result::Result<T, GameeError>;

/// Gamee error types
#[derive(Debug, Error)]
pub enum GameeError {
    /// Malformed envelope or a host signal missing a required field
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    /// Controller kind outside the registry
    #[error("Unsupported controller type: {0}")]
    UnsupportedControllerKind(String),

    /// Remap of a button the controller does not have
    #[error("Button {0} was not found in controller")]
    ButtonNotFound(String),

    /// Capability-gated operation without the capability negotiated at init
    #[error("{0} not supported, you must add the capability on init")]
    CapabilityNotGranted(Capability),

    /// Capability list rejected during the init handshake
    #[error("Capabilities passed to init are void, malformed or unsupported: {0}")]
    InvalidCapabilities(String),

    /// Input triggered before a main controller exists
    #[error("No controller present")]
    NoMainController,

    /// Host sent a request method this side does not handle
    #[error("Unknown method call: {0}")]
    UnknownInboundMethod(String),

    /// Host answered a request with an explicit error field
    #[error("Host error: {0}")]
    HostError(serde_json::Value),

    /// Backend has no mapping for the method
    #[error("Method {method} is not supported on platform {platform}")]
    UnsupportedMethod { platform: String, method: String },

    /// Caller-supplied argument failed validation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Outbound channel refused the message
    #[error("Transport error: {0}")]
    Transport(String),

    /// Platform SDK call failed
    #[error("SDK error: {0}")]
    Sdk(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl GameeError {
    /// Fatal errors stop a listener; everything else is reported and dropped.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GameeError::ProtocolViolation(_))
    }
}

impl From<serde_json::Error> for GameeError {
    fn from(err: serde_json::Error) -> Self {
        GameeError::Serialization(err.to_string())
    }
}
