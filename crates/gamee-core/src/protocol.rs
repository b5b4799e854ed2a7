//! Wire protocol for game <-> host communication
//!
//! Requests travel as `{"request": {"method", "messageId", "data"}}`.
//! Responses travel as `{"response": {"messageId", "data"}}`, optionally with
//! a top-level `"error"` field.
//!
//! Field names are camelCase throughout to match the host SDKs.

use crate::error::{GameeError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request identifier, unique per bridge instance
pub type MessageId = u64;

/// Number of characters of a payload included in trace output
const PREVIEW_CHARS: usize = 200;

/// Inner request object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub method: String,
    pub message_id: MessageId,
    /// `null` unless the caller supplied an object payload
    #[serde(default)]
    pub data: Option<Value>,
}

/// `{"request": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub request: Request,
}

impl RequestEnvelope {
    pub fn new(method: impl Into<String>, message_id: MessageId) -> Self {
        Self {
            request: Request {
                method: method.into(),
                message_id,
                data: None,
            },
        }
    }

    /// Attach a payload. Only object payloads are forwarded, anything else
    /// leaves `data` as `null`.
    pub fn with_data(mut self, data: Option<Value>) -> Self {
        self.request.data = match data {
            Some(Value::Object(map)) => Some(Value::Object(map)),
            Some(Value::Null) => Some(Value::Object(serde_json::Map::new())),
            _ => None,
        };
        self
    }

    pub fn message_id(&self) -> MessageId {
        self.request.message_id
    }
}

/// Inner response object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub message_id: MessageId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// `{"response": {...}}` or `{"response": {...}, "error": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub response: Response,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl ResponseEnvelope {
    pub fn new(message_id: MessageId, data: Option<Value>) -> Self {
        Self {
            response: Response { message_id, data },
            error: None,
        }
    }

    /// Host-side error response
    pub fn error(message_id: MessageId, error: Value) -> Self {
        Self {
            response: Response {
                message_id,
                data: None,
            },
            error: Some(error),
        }
    }
}

/// Classified inbound payload
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// Host-initiated request (signal or controller input)
    Request(Request),
    /// Answer to one of our requests
    Response(ResponseEnvelope),
    /// Bare `{"error": ...}` that cannot be correlated
    Error(Value),
    /// Legacy raw host button message, e.g. `["button_left_down"]`
    LegacyInput(String),
    /// Not addressed to this framework
    Foreign,
}

impl Envelope {
    /// Classify a decoded inbound payload.
    ///
    /// A payload is a request when it has `request.method` and
    /// `request.messageId`, and a response when it has `response.messageId`.
    /// Everything else is foreign traffic and ignored.
    pub fn classify(value: &Value) -> Result<Self> {
        if let Some(first) = value
            .as_array()
            .and_then(|items| items.first())
            .and_then(Value::as_str)
        {
            return Ok(Envelope::LegacyInput(first.to_string()));
        }

        let Some(object) = value.as_object() else {
            return Ok(Envelope::Foreign);
        };

        if let Some(request) = object.get("request") {
            let has_method = request
                .get("method")
                .and_then(Value::as_str)
                .is_some_and(|method| !method.is_empty());
            if has_method && request.get("messageId").is_some() {
                let request: Request = serde_json::from_value(request.clone()).map_err(|e| {
                    GameeError::ProtocolViolation(format!("malformed request envelope: {}", e))
                })?;
                return Ok(Envelope::Request(request));
            }
        }

        if let Some(response) = object.get("response") {
            if let Some(message_id) = response.get("messageId") {
                let message_id = message_id.as_u64().ok_or_else(|| {
                    GameeError::ProtocolViolation(format!(
                        "response messageId is not an integer: {}",
                        message_id
                    ))
                })?;
                let data = response.get("data").cloned();
                let error = object.get("error").filter(|e| is_truthy(e)).cloned();
                return Ok(Envelope::Response(ResponseEnvelope {
                    response: Response { message_id, data },
                    error,
                }));
            }
        }

        if let Some(error) = object.get("error").filter(|e| is_truthy(e)) {
            return Ok(Envelope::Error(error.clone()));
        }

        Ok(Envelope::Foreign)
    }
}

/// Hosts mark "no error" with null, false, 0 or an empty string
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Outbound message as handed to a transport
#[derive(Debug, Clone, PartialEq)]
pub enum WireMessage {
    /// Structured payload (postMessage, object-accepting native layer)
    Object(Value),
    /// Stringified payload for native layers that only accept text
    Text(String),
}

impl WireMessage {
    /// Encode an envelope, stringified when the transport only takes text
    pub fn encode<T: Serialize>(envelope: &T, stringify: bool) -> Result<Self> {
        if stringify {
            Ok(WireMessage::Text(serde_json::to_string(envelope)?))
        } else {
            Ok(WireMessage::Object(serde_json::to_value(envelope)?))
        }
    }

    /// JSON text form regardless of encoding
    pub fn to_text(&self) -> Result<String> {
        match self {
            WireMessage::Object(value) => Ok(serde_json::to_string(value)?),
            WireMessage::Text(text) => Ok(text.clone()),
        }
    }

    /// Decoded JSON form regardless of encoding
    pub fn to_value(&self) -> Result<Value> {
        match self {
            WireMessage::Object(value) => Ok(value.clone()),
            WireMessage::Text(text) => Ok(serde_json::from_str(text)?),
        }
    }

    pub fn preview(&self) -> String {
        match self {
            WireMessage::Object(value) => preview(&value.to_string()),
            WireMessage::Text(text) => preview(text),
        }
    }
}

/// Inbound message as delivered by a transport
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    /// postMessage `data` / event `detail`
    Object(Value),
    /// Text pushed by a native layer; must be JSON
    Text(String),
}

impl InboundMessage {
    /// Decode into a JSON value.
    ///
    /// Non-object structured payloads are not addressed to the bridge and
    /// yield `None`. Text that is not JSON is a protocol violation.
    pub fn decode(self) -> Result<Option<Value>> {
        match self {
            InboundMessage::Object(value) if value.is_object() || value.is_array() => {
                Ok(Some(value))
            }
            InboundMessage::Object(_) => Ok(None),
            InboundMessage::Text(text) => serde_json::from_str(&text).map(Some).map_err(|e| {
                GameeError::ProtocolViolation(format!(
                    "Couldn't parse message from native app: {}: {}",
                    preview(&text),
                    e
                ))
            }),
        }
    }
}

/// First characters of a payload for trace output
pub fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}
