//! Request payloads

use gamee_core::{GameeError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Replay attached to `gameOver`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayData {
    /// Game variant the replay belongs to
    #[serde(default)]
    pub variant: String,
    /// Serialized replay; the game owns the format
    pub data: String,
}

impl ReplayData {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            variant: String::new(),
            data: data.into(),
        }
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = variant.into();
        self
    }
}

/// `gameOver` arguments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameOverOptions {
    pub replay_data: Option<ReplayData>,
    pub save_state: Option<String>,
    pub hide_overlay: bool,
}

impl GameOverOptions {
    pub(crate) fn to_payload(&self) -> Result<Value> {
        let mut payload = Map::new();
        if let Some(replay) = &self.replay_data {
            payload.insert("replayData".into(), serde_json::to_value(replay)?);
        }
        payload.insert("hideOverlay".into(), Value::Bool(self.hide_overlay));
        if let Some(state) = &self.save_state {
            payload.insert("state".into(), Value::String(state.clone()));
        }
        Ok(Value::Object(payload))
    }
}

/// Check that a caller-supplied options object carries every named field
pub(crate) fn require_fields(options: &Value, what: &str, fields: &[&str]) -> Result<()> {
    let object = options
        .as_object()
        .ok_or_else(|| GameeError::InvalidArgument(format!("{} must be an object", what)))?;

    for field in fields {
        if !object.contains_key(*field) {
            return Err(GameeError::InvalidArgument(format!(
                "{} must have `{}` property",
                what, field
            )));
        }
    }
    Ok(())
}
