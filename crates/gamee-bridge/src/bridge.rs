//! Platform bridge contract
//!
//! A bridge turns game requests into whatever its platform understands and
//! turns host traffic back into callbacks, signals and controller input. The
//! embedded-web and native-mobile backends speak envelopes over a
//! [`MessageChannel`]; the Instant Games backend calls an SDK instead.

use crate::channel::MessageChannel;
use crate::correlator::ResponseCallback;
use crate::signal::Acknowledger;
use gamee_core::{
    InboundMessage, InputMethod, MessageId, Platform, RequestEnvelope, RequestMethod, Result,
    ResponseEnvelope, SignalMethod, WireMessage,
};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Protocol version announced during init
pub const PROTOCOL_VERSION: &str = "2.4.0";

/// Bridge configuration
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Suppress payload tracing and unknown-method reports
    pub silent_mode: bool,
    /// Protocol version sent with `init`
    pub version: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            silent_mode: false,
            version: PROTOCOL_VERSION.to_string(),
        }
    }
}

/// Outcome of handling one inbound message
#[derive(Debug)]
pub enum Inbound {
    /// Response delivered to its pending callback
    Resolved(MessageId),
    /// Response for an id with no pending callback; dropped
    Unmatched(MessageId),
    /// Control signal handed to the signal emitter
    Signal {
        method: SignalMethod,
        dispatched: bool,
    },
    /// Controller input to route into the main controller, then acknowledge
    Input {
        input: InputMethod,
        data: Option<Value>,
        ack: Acknowledger,
    },
    /// Traffic not addressed to the bridge
    Ignored,
}

/// Shared contract of every platform backend
pub trait PlatformBridge: Send {
    fn platform(&self) -> Platform;

    fn config(&self) -> &BridgeConfig;

    /// Whether `method` may be forwarded to this platform
    fn validate_method(&self, method: RequestMethod) -> bool {
        let _ = method;
        true
    }

    /// Send a request.
    ///
    /// Returns the allocated id, or `None` when the request was refused by
    /// [`validate_method`](Self::validate_method) or the backend does not
    /// correlate by id. A callback is invoked at most once.
    fn create_request(
        &mut self,
        method: RequestMethod,
        data: Option<Value>,
        callback: Option<ResponseCallback>,
    ) -> Result<Option<MessageId>>;

    /// Deliver a prepared request envelope
    fn do_call(&self, envelope: &RequestEnvelope) -> Result<()>;

    /// Acknowledge a host request
    fn do_response(&self, message_id: MessageId, data: Option<Value>) -> Result<()>;

    /// Handle one message from the host
    fn handle_inbound(&mut self, message: InboundMessage) -> Result<Inbound>;

    /// Requests still waiting for a response
    fn pending_count(&self) -> usize {
        0
    }
}

/// Outbound half shared by the envelope backends and their acknowledgers
#[derive(Clone)]
pub struct Outbox {
    channel: Arc<dyn MessageChannel>,
    /// Native layers that only accept text get JSON strings
    stringify: bool,
    silent: bool,
}

impl Outbox {
    pub fn new(channel: Arc<dyn MessageChannel>, stringify: bool, silent: bool) -> Self {
        Self {
            channel,
            stringify,
            silent,
        }
    }

    pub fn stringifies(&self) -> bool {
        self.stringify
    }

    /// Encode and post any envelope
    pub fn send<T: Serialize>(&self, envelope: &T) -> Result<()> {
        let message = WireMessage::encode(envelope, self.stringify)?;
        if !self.silent {
            debug!("[Game→Host] {}", message.preview());
        }
        self.channel.post_message(message)
    }

    /// `{"response": {"messageId", "data"?}}`
    pub fn respond(&self, message_id: MessageId, data: Option<Value>) -> Result<()> {
        self.send(&ResponseEnvelope::new(message_id, data))
    }

    /// Acknowledge with an error instead of data
    pub fn reject(&self, message_id: MessageId, reason: &str) -> Result<()> {
        self.send(&ResponseEnvelope::error(
            message_id,
            Value::String(reason.to_string()),
        ))
    }
}

impl fmt::Debug for Outbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outbox")
            .field("stringify", &self.stringify)
            .field("silent", &self.silent)
            .finish()
    }
}
