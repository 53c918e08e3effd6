//! The request bridge.
//!
//! Page scripts cannot make cross-origin requests; the privileged side can.
//! The bridge connects the two with a pair of channels. The page side sends
//! a [`BridgeRequest`] tagged with a fresh [`RequestId`] and parks a oneshot
//! in the [`PendingRequests`] table. The [`BridgeWorker`] performs the request
//! through a [`Transport`] and answers with a [`BridgeReply`] carrying the same
//! id. A dispatcher task matches the reply to its pending entry, normalizes
//! it, and wakes the caller.
//!
//! ```no_run
//! use cross_request::bridge::Bridge;
//! use cross_request::config::BridgeConfig;
//! use cross_request::net::HttpTransport;
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BridgeConfig::default();
//! let transport = HttpTransport::new(&config)?;
//! let (bridge, tasks) = Bridge::start(config, transport)?;
//!
//! let res = bridge.fetch("https://example.com/api/items").await?;
//! println!("{} {}", res.status, res.data);
//!
//! bridge.shutdown();
//! tasks.join().await?;
//! # Ok(()) }
//! ```
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, error};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::config::BridgeConfig;
use crate::errors::BridgeError;
use crate::net::Transport;

pub mod envelope;
pub mod handle;
pub mod pending;
pub mod worker;

pub use envelope::{BridgeReply, BridgeRequest, RequestId};
pub use handle::BridgeHandle;
pub use pending::PendingRequests;
pub use worker::BridgeWorker;

/// Background tasks of a running bridge.
#[derive(Debug)]
pub struct BridgeTasks {
    pub worker: JoinHandle<()>,
    pub dispatcher: JoinHandle<()>,
}

impl BridgeTasks {
    /// Waits for both tasks to finish.
    pub async fn join(self) -> Result<(), JoinError> {
        self.worker.await?;
        self.dispatcher.await
    }
}

pub struct Bridge;

impl Bridge {
    /// Starts the worker and the reply dispatcher. Must be called from within
    /// a tokio runtime.
    pub fn start<T: Transport>(config: BridgeConfig, transport: T) -> Result<(BridgeHandle, BridgeTasks), BridgeError> {
        config.validate()?;

        let (req_tx, req_rx) = mpsc::channel(config.channel_capacity);
        let (reply_tx, reply_rx) = mpsc::channel(config.channel_capacity);
        let cancel = CancellationToken::new();
        let pending = Arc::new(Mutex::new(PendingRequests::new()));

        let worker = BridgeWorker::new(Box::new(transport), req_rx, reply_tx, cancel.child_token());
        let worker = tokio::spawn(worker.run());
        let dispatcher = tokio::spawn(dispatch_replies(reply_rx, pending.clone(), cancel.child_token()));

        let handle = BridgeHandle::new(Arc::new(config), pending, req_tx, cancel);
        Ok((handle, BridgeTasks { worker, dispatcher }))
    }
}

async fn dispatch_replies(
    mut reply_rx: mpsc::Receiver<BridgeReply>,
    pending: Arc<Mutex<PendingRequests>>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,

            msg = reply_rx.recv() => {
                let Some(reply) = msg else {
                    break;
                };
                let id = reply.id();
                let resolved = pending.lock().map(|mut p| p.resolve(reply)).map_err(|_| BridgeError::Poisoned);
                match resolved {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => debug!("ignoring reply: {e}"),
                    Err(e) => {
                        error!("{e}, dropping reply for {id}");
                        break;
                    }
                }
            }
        }
    }

    debug!("reply dispatcher stopped");
    // Waiters must hear about the stop even if a holder of the lock panicked
    pending.lock().unwrap_or_else(PoisonError::into_inner).fail_all();
}
