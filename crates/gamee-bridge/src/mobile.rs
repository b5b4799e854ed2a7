//! Native-mobile backend
//!
//! Mobile apps host the game in a webview. Inbound handling is the same as on
//! the web; only the outbound call differs. The iOS message handler accepts
//! structured objects, the Android bridge only accepts strings.

use crate::bridge::{BridgeConfig, Inbound, PlatformBridge};
use crate::channel::MessageChannel;
use crate::correlator::ResponseCallback;
use crate::signal::PlatformSignalEmitter;
use crate::web::EmbeddedWebBridge;
use gamee_core::{
    GameeError, InboundMessage, MessageId, Platform, RequestEnvelope, RequestMethod, Result,
};
use serde_json::Value;
use std::sync::Arc;

/// Native layer variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Ios,
    Android,
}

impl Device {
    pub fn platform(self) -> Platform {
        match self {
            Device::Ios => Platform::Ios,
            Device::Android => Platform::Android,
        }
    }

    /// Whether envelopes must be sent as JSON text
    pub fn stringifies(self) -> bool {
        self == Device::Android
    }
}

impl TryFrom<Platform> for Device {
    type Error = GameeError;

    fn try_from(platform: Platform) -> Result<Self> {
        match platform {
            Platform::Ios => Ok(Device::Ios),
            Platform::Android => Ok(Device::Android),
            other => Err(GameeError::InvalidArgument(format!(
                "Unknown device used in webkit bridge: {}",
                other
            ))),
        }
    }
}

/// Envelope bridge to a native app
#[derive(Debug)]
pub struct MobileBridge {
    device: Device,
    inner: EmbeddedWebBridge,
}

impl MobileBridge {
    pub fn new(
        device: Device,
        channel: Arc<dyn MessageChannel>,
        emitter: PlatformSignalEmitter,
        config: BridgeConfig,
    ) -> Self {
        Self {
            device,
            inner: EmbeddedWebBridge::with_encoding(
                device.platform(),
                channel,
                device.stringifies(),
                emitter,
                config,
            ),
        }
    }

    pub fn device(&self) -> Device {
        self.device
    }
}

impl PlatformBridge for MobileBridge {
    fn platform(&self) -> Platform {
        self.device.platform()
    }

    fn config(&self) -> &BridgeConfig {
        self.inner.config()
    }

    fn validate_method(&self, method: RequestMethod) -> bool {
        self.inner.validate_method(method)
    }

    fn create_request(
        &mut self,
        method: RequestMethod,
        data: Option<Value>,
        callback: Option<ResponseCallback>,
    ) -> Result<Option<MessageId>> {
        self.inner.create_request(method, data, callback)
    }

    fn do_call(&self, envelope: &RequestEnvelope) -> Result<()> {
        self.inner.do_call(envelope)
    }

    fn do_response(&self, message_id: MessageId, data: Option<Value>) -> Result<()> {
        self.inner.do_response(message_id, data)
    }

    fn handle_inbound(&mut self, message: InboundMessage) -> Result<Inbound> {
        self.inner.handle_inbound(message)
    }

    fn pending_count(&self) -> usize {
        self.inner.pending_count()
    }
}
