use std::collections::HashMap;

use log::debug;
use tokio::sync::oneshot;

use crate::bridge::envelope::{BridgeReply, RequestId};
use crate::errors::BridgeError;
use crate::normalize::{normalize, CanonicalResponse};

pub type Completion = oneshot::Sender<Result<CanonicalResponse, BridgeError>>;
pub type CompletionReceiver = oneshot::Receiver<Result<CanonicalResponse, BridgeError>>;

/// Requests that were sent and are still waiting for a reply.
///
/// Entries leave the table on resolution, rejection or timeout, so a late
/// reply for an id that already timed out finds nothing and is ignored.
#[derive(Debug, Default)]
pub struct PendingRequests {
    next_id: u64,
    entries: HashMap<RequestId, Completion>,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next id and the receiver its reply will arrive on.
    pub fn register(&mut self) -> (RequestId, CompletionReceiver) {
        self.next_id += 1;
        let id = RequestId::new(self.next_id);

        let (tx, rx) = oneshot::channel();
        self.entries.insert(id, tx);
        (id, rx)
    }

    /// Drops an entry without completing it. Returns false when it was already gone.
    pub fn discard(&mut self, id: RequestId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Completes the entry the reply belongs to. Responses are normalized
    /// first; transport failures reject. Fails with
    /// [`BridgeError::UnknownRequest`] when no entry matches, which is expected
    /// for replies that arrive after a timeout.
    pub fn resolve(&mut self, reply: BridgeReply) -> Result<(), BridgeError> {
        let id = reply.id();
        let tx = self.entries.remove(&id).ok_or(BridgeError::UnknownRequest(id))?;

        let outcome = match reply {
            BridgeReply::Response { response, .. } => Ok(normalize(response.as_ref())),
            BridgeReply::Error { error, .. } => Err(BridgeError::Transport(error)),
        };

        if tx.send(outcome).is_err() {
            debug!("caller for {id} went away before its reply arrived");
        }
        Ok(())
    }

    /// Rejects everything still waiting. Used when the bridge stops.
    pub fn fail_all(&mut self) {
        for (id, tx) in self.entries.drain() {
            debug!("failing pending request {id}: bridge closed");
            let _ = tx.send(Err(BridgeError::ChannelClosed));
        }
    }

    pub fn contains(&self, id: RequestId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
