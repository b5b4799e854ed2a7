//! Host-initiated control signals

use crate::capability::{Capability, CapabilitySet};
use crate::error::{GameeError, Result};
use crate::method::SignalMethod;
use crate::protocol::is_truthy;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Session-mode flags carried by `start`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartOptions {
    #[serde(default, deserialize_with = "truthy")]
    pub replay: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub ghost_mode: bool,
    #[serde(default, deserialize_with = "truthy")]
    pub reset_state: bool,
}

/// Hosts send flags as any JSON value; null, 0 and "" are off
fn truthy<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    Ok(is_truthy(&Value::deserialize(deserializer)?))
}

impl StartOptions {
    /// Reason the requested mode cannot run with the granted capabilities.
    ///
    /// Ghost mode is checked last, so it wins when both are missing.
    pub fn rejection(&self, granted: Option<&CapabilitySet>) -> Option<String> {
        let has = |cap: Capability| granted.is_some_and(|set| set.contains(cap));
        let mut error = None;

        if self.replay && !has(Capability::Replay) {
            error = Some("Game doesn't support replay. ".to_string());
        }
        if self.ghost_mode && !has(Capability::GhostMode) {
            error = Some("Game doesn't support ghost Mode. ".to_string());
        }

        error
    }
}

/// Decoded control signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Pause,
    Resume,
    Mute,
    Unmute,
    GhostShow,
    GhostHide,
    Start(StartOptions),
}

impl Signal {
    /// Build a signal from its method and request payload.
    ///
    /// `start` without a payload is a protocol violation by the host.
    pub fn from_request(method: SignalMethod, data: Option<&Value>) -> Result<Self> {
        Ok(match method {
            SignalMethod::Pause => Signal::Pause,
            SignalMethod::Resume => Signal::Resume,
            SignalMethod::Mute => Signal::Mute,
            SignalMethod::Unmute => Signal::Unmute,
            SignalMethod::GhostShow => Signal::GhostShow,
            SignalMethod::GhostHide => Signal::GhostHide,
            SignalMethod::Start => {
                let data = data.filter(|d| !d.is_null()).ok_or_else(|| {
                    GameeError::ProtocolViolation("Method start missing params".into())
                })?;
                let options: StartOptions =
                    serde_json::from_value(data.clone()).map_err(|e| {
                        GameeError::ProtocolViolation(format!(
                            "Method start has malformed params: {}",
                            e
                        ))
                    })?;
                Signal::Start(options)
            }
        })
    }

    pub fn method(&self) -> SignalMethod {
        match self {
            Signal::Pause => SignalMethod::Pause,
            Signal::Resume => SignalMethod::Resume,
            Signal::Mute => SignalMethod::Mute,
            Signal::Unmute => SignalMethod::Unmute,
            Signal::GhostShow => SignalMethod::GhostShow,
            Signal::GhostHide => SignalMethod::GhostHide,
            Signal::Start(_) => SignalMethod::Start,
        }
    }
}
