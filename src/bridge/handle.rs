use std::sync::{Arc, Mutex, MutexGuard};

use log::{info, warn};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::bridge::envelope::{BridgeRequest, RequestId};
use crate::bridge::pending::PendingRequests;
use crate::config::BridgeConfig;
use crate::errors::BridgeError;
use crate::normalize::CanonicalResponse;
use crate::request::{curl_command, prepare, RequestOptions};

/// Page-side handle to a running bridge. Cheap to clone.
#[derive(Clone)]
pub struct BridgeHandle {
    config: Arc<BridgeConfig>,
    /// Shared with the reply dispatcher
    pending: Arc<Mutex<PendingRequests>>,
    req_tx: mpsc::Sender<BridgeRequest>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for BridgeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeHandle")
            .field("config", &self.config)
            .field("pending", &self.pending_count())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl BridgeHandle {
    pub(crate) fn new(
        config: Arc<BridgeConfig>,
        pending: Arc<Mutex<PendingRequests>>,
        req_tx: mpsc::Sender<BridgeRequest>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            pending,
            req_tx,
            cancel,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Number of requests still waiting for a reply.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled() || self.req_tx.is_closed()
    }

    /// Stops the worker and the reply dispatcher. Requests still waiting are
    /// rejected with [`BridgeError::ChannelClosed`].
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Sends a request across the bridge and waits for its normalized response.
    ///
    /// When the request's timeout fires first, the pending entry is dropped
    /// and the synthetic timeout response ([`CanonicalResponse::timed_out`])
    /// is returned instead. A late reply for that request is ignored.
    pub async fn fetch<O: Into<RequestOptions>>(&self, options: O) -> Result<CanonicalResponse, BridgeError> {
        if self.is_closed() {
            return Err(BridgeError::ChannelClosed);
        }

        let (id, mut rx) = self.lock()?.register();

        let request = match prepare(options.into(), id, &self.config) {
            Ok(request) => request,
            Err(e) => {
                self.discard(id);
                return Err(e);
            }
        };

        if !self.config.silent {
            info!("{id}:\n{}", curl_command(&request));
        }

        let timeout = request.timeout;
        let timeout_ms = request.timeout_ms();
        if self.req_tx.send(request).await.is_err() {
            self.discard(id);
            return Err(BridgeError::ChannelClosed);
        }

        tokio::select! {
            _ = self.cancel.cancelled() => {
                self.discard(id);
                Err(BridgeError::ChannelClosed)
            }

            res = tokio::time::timeout(timeout, &mut rx) => match res {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(_)) => Err(BridgeError::ChannelClosed),
                Err(_elapsed) => {
                    if self.discard(id) {
                        warn!("{id} timed out after {timeout_ms}ms");
                        Ok(CanonicalResponse::timed_out())
                    } else {
                        // The reply won the race against the timer
                        rx.try_recv().unwrap_or_else(|_| Ok(CanonicalResponse::timed_out()))
                    }
                }
            }
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, PendingRequests>, BridgeError> {
        self.pending.lock().map_err(|_| BridgeError::Poisoned)
    }

    fn discard(&self, id: RequestId) -> bool {
        self.lock().map(|mut p| p.discard(id)).unwrap_or(false)
    }
}
