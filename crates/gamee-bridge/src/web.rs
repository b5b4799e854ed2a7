//! Embedded-web backend
//!
//! The game runs in an iframe and talks to a single peer, the parent frame.
//! Envelopes are posted as structured objects. Inbound messages are either
//! host requests (signals, controller input) or responses to our requests.

use crate::bridge::{BridgeConfig, Inbound, Outbox, PlatformBridge};
use crate::channel::MessageChannel;
use crate::correlator::{RequestCorrelator, ResponseCallback};
use crate::signal::{Acknowledger, PlatformSignalEmitter};
use gamee_core::{
    Envelope, GameeError, InboundMessage, InboundMethod, InputMethod, MessageId, Platform, Request,
    RequestEnvelope, RequestMethod, Result, ResponseEnvelope, Signal, protocol::preview,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Envelope bridge to a parent frame
#[derive(Debug)]
pub struct EmbeddedWebBridge {
    platform: Platform,
    config: BridgeConfig,
    correlator: RequestCorrelator,
    outbox: Outbox,
    emitter: PlatformSignalEmitter,
}

impl EmbeddedWebBridge {
    pub fn new(
        channel: Arc<dyn MessageChannel>,
        emitter: PlatformSignalEmitter,
        config: BridgeConfig,
    ) -> Self {
        Self::with_encoding(Platform::Web, channel, false, emitter, config)
    }

    /// Same listener logic with a different outbound encoding
    pub(crate) fn with_encoding(
        platform: Platform,
        channel: Arc<dyn MessageChannel>,
        stringify: bool,
        emitter: PlatformSignalEmitter,
        config: BridgeConfig,
    ) -> Self {
        info!(
            "Bridge ready: platform={} protocol={} stringify={}",
            platform, config.version, stringify
        );
        Self {
            platform,
            outbox: Outbox::new(channel, stringify, config.silent_mode),
            config,
            correlator: RequestCorrelator::new(),
            emitter,
        }
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    fn on_response(&mut self, envelope: ResponseEnvelope) -> Result<Inbound> {
        let id = envelope.response.message_id;
        let result = match envelope.error {
            // Nobody to hand the error to
            Some(error) if !self.correlator.is_pending(id) => {
                return Err(GameeError::HostError(error));
            }
            Some(error) => Err(GameeError::HostError(error)),
            None => Ok(envelope.response.data),
        };

        if self.correlator.resolve(id, result) {
            Ok(Inbound::Resolved(id))
        } else {
            if !self.config.silent_mode {
                debug!("Response for unknown request {}", id);
            }
            Ok(Inbound::Unmatched(id))
        }
    }

    fn on_request(&mut self, request: Request) -> Result<Inbound> {
        let ack = Acknowledger::new(self.outbox.clone(), request.message_id);

        match InboundMethod::parse(&request.method) {
            Some(InboundMethod::Signal(method)) => {
                let signal = Signal::from_request(method, request.data.as_ref())?;
                let dispatched = self.emitter.emit(signal, ack)?;
                Ok(Inbound::Signal { method, dispatched })
            }
            Some(InboundMethod::Input(input)) => Ok(Inbound::Input {
                input,
                data: request.data,
                ack,
            }),
            None => Err(GameeError::UnknownInboundMethod(request.method)),
        }
    }
}

impl PlatformBridge for EmbeddedWebBridge {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Loading progress is too chatty for the host apps
    fn validate_method(&self, method: RequestMethod) -> bool {
        method != RequestMethod::GameLoadingProgress
    }

    fn create_request(
        &mut self,
        method: RequestMethod,
        data: Option<Value>,
        callback: Option<ResponseCallback>,
    ) -> Result<Option<MessageId>> {
        if !self.validate_method(method) {
            debug!("{} is not forwarded on {}", method, self.platform);
            return Ok(None);
        }

        let id = self.correlator.register(callback);
        let envelope = RequestEnvelope::new(method.as_str(), id).with_data(data);

        if let Err(e) = self.do_call(&envelope) {
            self.correlator.discard(id);
            return Err(e);
        }
        Ok(Some(id))
    }

    fn do_call(&self, envelope: &RequestEnvelope) -> Result<()> {
        self.outbox.send(envelope)
    }

    fn do_response(&self, message_id: MessageId, data: Option<Value>) -> Result<()> {
        self.outbox.respond(message_id, data)
    }

    fn handle_inbound(&mut self, message: InboundMessage) -> Result<Inbound> {
        let Some(value) = message.decode()? else {
            return Ok(Inbound::Ignored);
        };

        if !self.config.silent_mode {
            let text = value.to_string();
            debug!("[Host→Game] len={} json={}", text.len(), preview(&text));
        }

        match Envelope::classify(&value)? {
            Envelope::Request(request) => self.on_request(request),
            Envelope::Response(envelope) => self.on_response(envelope),
            Envelope::Error(error) => Err(GameeError::HostError(error)),
            Envelope::LegacyInput(message) => match InputMethod::parse_button(&message) {
                Some(input) => Ok(Inbound::Input {
                    input,
                    data: None,
                    ack: Acknowledger::noop(),
                }),
                None => Ok(Inbound::Ignored),
            },
            Envelope::Foreign => Ok(Inbound::Ignored),
        }
    }

    fn pending_count(&self) -> usize {
        self.correlator.pending_count()
    }
}
