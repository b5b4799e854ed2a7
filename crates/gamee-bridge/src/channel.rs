//! Transport abstractions for platform bridges
//!
//! Outbound traffic goes through a [`MessageChannel`], a fire-and-forget
//! one-way sink provided by the host environment (parent frame, native
//! message handler, ...). Inbound traffic is pulled from a [`MessageSource`].

use async_trait::async_trait;
use gamee_core::{GameeError, InboundMessage, Result, WireMessage};
use tokio::sync::mpsc;

/// One-way outbound channel to the host
pub trait MessageChannel: Send + Sync {
    /// Hand a message to the transport. Delivery is not confirmed.
    fn post_message(&self, message: WireMessage) -> Result<()>;
}

/// Trait for async reading of host messages
#[async_trait]
pub trait MessageSource: Send {
    /// Next inbound message, `None` once the host side is gone
    async fn next_message(&mut self) -> Option<InboundMessage>;
}

#[async_trait]
impl MessageSource for mpsc::UnboundedReceiver<InboundMessage> {
    async fn next_message(&mut self) -> Option<InboundMessage> {
        self.recv().await
    }
}

#[async_trait]
impl MessageSource for mpsc::Receiver<InboundMessage> {
    async fn next_message(&mut self) -> Option<InboundMessage> {
        self.recv().await
    }
}

/// In-process channel backed by an unbounded queue.
///
/// The receiving half plays the host: stdio writers drain it, tests inspect
/// exactly what reached the transport.
#[derive(Debug, Clone)]
pub struct QueueChannel {
    tx: mpsc::UnboundedSender<WireMessage>,
}

impl QueueChannel {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<WireMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl MessageChannel for QueueChannel {
    fn post_message(&self, message: WireMessage) -> Result<()> {
        self.tx
            .send(message)
            .map_err(|_| GameeError::Transport("host end of the channel is closed".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_queue_channel_delivers_in_order() {
        let (channel, mut rx) = QueueChannel::new();
        channel
            .post_message(WireMessage::Object(json!({ "n": 1 })))
            .unwrap();
        channel.post_message(WireMessage::Text("{\"n\":2}".into())).unwrap();

        assert_eq!(rx.try_recv().unwrap(), WireMessage::Object(json!({ "n": 1 })));
        assert_eq!(rx.try_recv().unwrap(), WireMessage::Text("{\"n\":2}".into()));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_queue_channel_reports_closed_peer() {
        let (channel, rx) = QueueChannel::new();
        drop(rx);
        let err = channel
            .post_message(WireMessage::Object(json!({})))
            .unwrap_err();
        assert!(matches!(err, GameeError::Transport(_)));
    }

    #[tokio::test]
    async fn test_receiver_is_a_message_source() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.send(InboundMessage::Text("{}".into())).unwrap();
        drop(tx);

        assert_eq!(
            rx.next_message().await,
            Some(InboundMessage::Text("{}".into()))
        );
        assert_eq!(rx.next_message().await, None);
    }
}
