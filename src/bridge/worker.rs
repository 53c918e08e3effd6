use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use log::{debug, error};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::bridge::envelope::{BridgeReply, BridgeRequest};
use crate::net::Transport;

/// The privileged side of the bridge.
///
/// Receives requests, drives each one through the transport, and sends back
/// exactly one reply per request. Requests run concurrently, so replies go
/// out in completion order, not submission order.
pub struct BridgeWorker {
    transport: Box<dyn Transport>,
    req_rx: mpsc::Receiver<BridgeRequest>,
    reply_tx: mpsc::Sender<BridgeReply>,
    cancel: CancellationToken,
}

impl BridgeWorker {
    pub fn new(
        transport: Box<dyn Transport>,
        req_rx: mpsc::Receiver<BridgeRequest>,
        reply_tx: mpsc::Sender<BridgeReply>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            transport,
            req_rx,
            reply_tx,
            cancel,
        }
    }

    pub async fn run(mut self) {
        let mut in_flight: FuturesUnordered<BoxFuture<'static, BridgeReply>> = FuturesUnordered::new();

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    debug!("bridge worker cancelled with {} request(s) in flight", in_flight.len());
                    break;
                }

                msg = self.req_rx.recv() => {
                    let Some(request) = msg else {
                        // All handles are gone, nobody is left to read replies
                        break;
                    };
                    in_flight.push(self.dispatch(request));
                }

                Some(reply) = in_flight.next(), if !in_flight.is_empty() => {
                    if self.reply_tx.send(reply).await.is_err() {
                        error!("reply channel closed, stopping bridge worker");
                        break;
                    }
                }
            }
        }
    }

    fn dispatch(&self, request: BridgeRequest) -> BoxFuture<'static, BridgeReply> {
        let id = request.id;
        debug!("{id}: {} {}", request.method, request.url);

        let send = self.transport.send(request);
        async move {
            match send.await {
                Ok(response) => BridgeReply::Response {
                    id,
                    response: Some(response),
                },
                Err(error) => {
                    debug!("{id} failed: {} ({})", error, error.name());
                    BridgeReply::Error { id, error }
                }
            }
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::RequestId;
    use crate::net::{Headers, RawResponse, TransportError};
    use crate::testing::{ScriptedTransport, Step};
    use std::time::Duration;
    use url::Url;

    fn request(id: u64, path: &str) -> BridgeRequest {
        BridgeRequest {
            id: RequestId::new(id),
            url: Url::parse("https://api.test/").unwrap().join(path).unwrap(),
            method: "GET".into(),
            headers: Headers::new(),
            body: None,
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn replies_in_completion_order() {
        let transport = ScriptedTransport::new(|req| {
            if req.url.path() == "/slow" {
                Step::respond(RawResponse::new(200).with_body("slow")).after(Duration::from_millis(150))
            } else {
                Step::fail(TransportError::Network("reset".into()))
            }
        });

        let (req_tx, req_rx) = mpsc::channel(8);
        let (reply_tx, mut reply_rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();
        let worker = tokio::spawn(BridgeWorker::new(Box::new(transport.clone()), req_rx, reply_tx, cancel.clone()).run());

        req_tx.send(request(1, "slow")).await.unwrap();
        req_tx.send(request(2, "fast")).await.unwrap();

        let first = reply_rx.recv().await.unwrap();
        assert!(matches!(first, BridgeReply::Error { id, .. } if id == RequestId::new(2)));

        let second = reply_rx.recv().await.unwrap();
        match second {
            BridgeReply::Response { id, response: Some(raw) } => {
                assert_eq!(id, RequestId::new(1));
                assert_eq!(raw.status, Some(200));
            }
            other => panic!("unexpected reply: {other:?}"),
        }

        assert_eq!(transport.seen().len(), 2);

        cancel.cancel();
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn stops_when_requests_channel_closes() {
        let transport = ScriptedTransport::always(RawResponse::new(204));
        let (req_tx, req_rx) = mpsc::channel(1);
        let (reply_tx, _reply_rx) = mpsc::channel(1);
        let worker = tokio::spawn(BridgeWorker::new(Box::new(transport), req_rx, reply_tx, CancellationToken::new()).run());

        drop(req_tx);
        worker.await.unwrap();
    }
}
