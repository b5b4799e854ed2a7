//! Request/response correlation
//!
//! Every request gets the next integer id, starting at 0. Callbacks are kept
//! by id and resolved at most once: the entry leaves the table before the
//! callback runs, so a callback that triggers another response for the same
//! id finds nothing.
//!
//! Outstanding requests never expire.

use gamee_core::{MessageId, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Completion callback for a request. Receives the response `data`, or the
/// host error when the response carried one.
pub type ResponseCallback = Box<dyn FnOnce(Result<Option<Value>>) + Send>;

/// Pending request table owned by one bridge instance
#[derive(Default)]
pub struct RequestCorrelator {
    next_id: MessageId,
    pending: HashMap<MessageId, ResponseCallback>,
}

impl RequestCorrelator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next id, storing the callback when one is given
    pub fn register(&mut self, callback: Option<ResponseCallback>) -> MessageId {
        let id = self.next_id;
        self.next_id += 1;
        if let Some(callback) = callback {
            self.pending.insert(id, callback);
        }
        id
    }

    /// Complete the request with `id`.
    ///
    /// Returns false for ids that were never registered with a callback or
    /// were already resolved; those responses are dropped.
    pub fn resolve(&mut self, id: MessageId, result: Result<Option<Value>>) -> bool {
        match self.pending.remove(&id) {
            Some(callback) => {
                callback(result);
                true
            }
            None => false,
        }
    }

    /// Drop the callback for a request that never left this side
    pub fn discard(&mut self, id: MessageId) -> bool {
        self.pending.remove(&id).is_some()
    }

    pub fn is_pending(&self, id: MessageId) -> bool {
        self.pending.contains_key(&id)
    }

    /// Callbacks still waiting for a response
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Id the next request will get
    pub fn next_id(&self) -> MessageId {
        self.next_id
    }
}

impl fmt::Debug for RequestCorrelator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestCorrelator")
            .field("next_id", &self.next_id)
            .field("pending", &self.pending.len())
            .finish()
    }
}
