//! Init handshake response

use gamee_core::ControllerKind;
use serde_json::Value;

/// Host answer to `init`, plus the controller kind the session ended up with.
///
/// The controller itself stays owned by the session; reach it through
/// `Gamee::controller` / `Gamee::controller_mut` once the callback runs.
#[derive(Debug, Clone, PartialEq)]
pub struct InitResponse {
    /// Previously saved game state, if any
    pub save_state: Option<String>,
    /// Replay to play back when the session starts in replay mode
    pub replay_data: Option<Value>,
    /// Whether sound starts enabled
    pub sound: bool,
    /// Kind of the main controller held by the session; `None` for
    /// full-screen games
    pub controller: Option<ControllerKind>,
    /// Untouched host payload
    pub raw: Value,
}

impl InitResponse {
    pub fn from_host(raw: Option<Value>, controller: Option<ControllerKind>) -> Self {
        let raw = raw.unwrap_or(Value::Null);
        let save_state = raw
            .get("saveState")
            .and_then(Value::as_str)
            .map(str::to_string);
        let replay_data = raw.get("replayData").filter(|v| !v.is_null()).cloned();
        let sound = raw.get("sound").and_then(Value::as_bool).unwrap_or(false);

        Self {
            save_state,
            replay_data,
            sound,
            controller,
            raw,
        }
    }
}
