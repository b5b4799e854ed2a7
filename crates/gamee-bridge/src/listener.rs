//! Inbound listener loop
//!
//! Pulls host messages from a [`MessageSource`] and feeds them to a handler.
//! Non-fatal errors (unknown methods, host errors without a pending request)
//! are reported and the loop keeps listening. A protocol violation stops it.

use crate::bridge::{Inbound, PlatformBridge};
use crate::channel::MessageSource;
use crate::signal::Acknowledger;
use gamee_core::{GameeError, InboundMessage, InputMethod, Result};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Something that consumes inbound host messages
pub trait InboundHandler {
    fn handle(&mut self, message: InboundMessage) -> Result<()>;

    /// Suppress reports of non-fatal errors
    fn silent(&self) -> bool {
        false
    }
}

/// Controller input decoded by a bridge, waiting to be routed
#[derive(Debug)]
pub struct InputEvent {
    pub input: InputMethod,
    pub data: Option<Value>,
    pub ack: Acknowledger,
}

/// Handler that only runs the bridge and forwards input elsewhere
pub struct Relay<B> {
    bridge: B,
    inputs: mpsc::UnboundedSender<InputEvent>,
}

impl<B: PlatformBridge> Relay<B> {
    pub fn new(bridge: B) -> (Self, mpsc::UnboundedReceiver<InputEvent>) {
        let (inputs, rx) = mpsc::unbounded_channel();
        (Self { bridge, inputs }, rx)
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut B {
        &mut self.bridge
    }

    pub fn into_inner(self) -> B {
        self.bridge
    }
}

impl<B: PlatformBridge> InboundHandler for Relay<B> {
    fn handle(&mut self, message: InboundMessage) -> Result<()> {
        if let Inbound::Input { input, data, ack } = self.bridge.handle_inbound(message)? {
            if self.inputs.send(InputEvent { input, data, ack }).is_err() {
                debug!("Input receiver dropped");
            }
        }
        Ok(())
    }

    fn silent(&self) -> bool {
        self.bridge.config().silent_mode
    }
}

/// Run until the source closes or a fatal error occurs
pub async fn listen<H, S>(handler: &mut H, source: &mut S) -> Result<()>
where
    H: InboundHandler + ?Sized,
    S: MessageSource + ?Sized,
{
    while let Some(message) = source.next_message().await {
        match handler.handle(message) {
            Ok(()) => {}
            Err(e) if e.is_fatal() => {
                error!("Listener stopped: {}", e);
                return Err(e);
            }
            Err(e) => report(&e, handler.silent()),
        }
    }

    info!("Host channel closed");
    Ok(())
}

fn report(err: &GameeError, silent: bool) {
    if silent {
        return;
    }
    match err {
        GameeError::UnknownInboundMethod(method) => error!("Unknown method call: {}", method),
        other => warn!("Dropped inbound message: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::BridgeConfig;
    use crate::channel::QueueChannel;
    use crate::signal::PlatformSignalEmitter;
    use crate::web::EmbeddedWebBridge;
    use gamee_core::{ButtonState, CapabilityCache, Signal};
    use serde_json::json;
    use std::sync::Arc;
    use tokio_test::{assert_err, assert_ok};

    fn request(method: &str, id: u64) -> InboundMessage {
        InboundMessage::Object(json!({ "request": { "method": method, "messageId": id } }))
    }

    #[tokio::test]
    async fn test_listener_survives_unknown_methods() {
        let (channel, _wire) = QueueChannel::new();
        let (emitter, mut events) = PlatformSignalEmitter::new(CapabilityCache::new());
        let bridge = EmbeddedWebBridge::new(Arc::new(channel), emitter, BridgeConfig::default());
        let (mut relay, mut inputs) = Relay::new(bridge);

        let (tx, mut source) = mpsc::unbounded_channel();
        tx.send(request("explode", 0)).unwrap();
        tx.send(request("pause", 1)).unwrap();
        tx.send(request("button_up_down", 2)).unwrap();
        drop(tx);

        assert_ok!(listen(&mut relay, &mut source).await);

        assert_eq!(events.try_recv().unwrap().signal, Signal::Pause);
        let input = inputs.try_recv().unwrap();
        assert_eq!(
            input.input,
            InputMethod::Button {
                button: "up".into(),
                state: ButtonState::Down
            }
        );
        assert_eq!(input.ack.message_id(), Some(2));
    }

    #[tokio::test]
    async fn test_listener_stops_on_protocol_violation() {
        let (channel, _wire) = QueueChannel::new();
        let (emitter, mut events) = PlatformSignalEmitter::new(CapabilityCache::new());
        let bridge = EmbeddedWebBridge::new(Arc::new(channel), emitter, BridgeConfig::default());
        let (mut relay, _inputs) = Relay::new(bridge);

        let (tx, mut source) = mpsc::unbounded_channel();
        tx.send(request("start", 0)).unwrap();
        tx.send(request("pause", 1)).unwrap();

        let err = assert_err!(listen(&mut relay, &mut source).await);
        assert!(err.is_fatal());

        // Nothing after the violation was processed
        assert!(events.try_recv().is_err());
        assert!(source.try_recv().is_ok());
    }
}
