//! Host-initiated signals
//!
//! Each control message from the host becomes a [`PlatformEvent`] carrying
//! an [`Acknowledger`]. Acknowledging sends a response with the original
//! message id back to the host.

use crate::bridge::Outbox;
use gamee_core::{CapabilityCache, MessageId, Result, Signal};
use serde_json::Value;
use std::fmt;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Acknowledgement handle for one host request
pub struct Acknowledger {
    target: Option<(Outbox, MessageId)>,
}

impl Acknowledger {
    pub fn new(outbox: Outbox, message_id: MessageId) -> Self {
        Self {
            target: Some((outbox, message_id)),
        }
    }

    /// Acknowledger for locally synthesized signals; acknowledging does nothing
    pub fn noop() -> Self {
        Self { target: None }
    }

    pub fn message_id(&self) -> Option<MessageId> {
        self.target.as_ref().map(|(_, id)| *id)
    }

    pub fn is_noop(&self) -> bool {
        self.target.is_none()
    }

    pub fn ack(self) -> Result<()> {
        self.ack_with(None)
    }

    pub fn ack_with(self, data: Option<Value>) -> Result<()> {
        match self.target {
            Some((outbox, id)) => outbox.respond(id, data),
            None => Ok(()),
        }
    }

    /// Refuse the request, e.g. a `start` mode the game cannot run
    pub fn reject(self, reason: &str) -> Result<()> {
        match self.target {
            Some((outbox, id)) => outbox.reject(id, reason),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Acknowledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Acknowledger")
            .field("message_id", &self.message_id())
            .finish()
    }
}

/// Signal delivered to the game
#[derive(Debug)]
pub struct PlatformEvent {
    pub signal: Signal,
    pub ack: Acknowledger,
}

/// Dispatches decoded signals to the game's event queue
#[derive(Debug, Clone)]
pub struct PlatformSignalEmitter {
    tx: mpsc::UnboundedSender<PlatformEvent>,
    capabilities: CapabilityCache,
}

impl PlatformSignalEmitter {
    pub fn new(capabilities: CapabilityCache) -> (Self, mpsc::UnboundedReceiver<PlatformEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, capabilities }, rx)
    }

    /// Dispatch a signal.
    ///
    /// A `start` asking for replay or ghost mode without the capability is
    /// rejected through its acknowledger and never reaches the game. Returns
    /// whether the event was dispatched.
    pub fn emit(&self, signal: Signal, ack: Acknowledger) -> Result<bool> {
        if let Signal::Start(options) = &signal {
            if let Some(reason) = options.rejection(self.capabilities.get()) {
                debug!("Rejecting start: {}", reason);
                ack.reject(&reason)?;
                return Ok(false);
            }
        }

        let method = signal.method();
        if self.tx.send(PlatformEvent { signal, ack }).is_err() {
            warn!("Dropped {} signal, nobody is listening", method);
            return Ok(false);
        }
        Ok(true)
    }
}
