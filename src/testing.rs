//! Test doubles.
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::bridge::BridgeRequest;
use crate::net::{RawResponse, Transport, TransportError};

/// What a [`ScriptedTransport`] does with one request.
pub struct Step {
    pub delay: Duration,
    pub result: Result<RawResponse, TransportError>,
}

impl Step {
    pub fn respond(raw: RawResponse) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Ok(raw),
        }
    }

    pub fn fail(error: TransportError) -> Self {
        Self {
            delay: Duration::ZERO,
            result: Err(error),
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Script = dyn Fn(&BridgeRequest) -> Step + Send + Sync;

/// A transport that answers from a closure and records every request it sees.
#[derive(Clone)]
pub struct ScriptedTransport {
    script: Arc<Script>,
    delay: Duration,
    seen: Arc<Mutex<Vec<BridgeRequest>>>,
}

impl ScriptedTransport {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&BridgeRequest) -> Step + Send + Sync + 'static,
    {
        Self {
            script: Arc::new(script),
            delay: Duration::ZERO,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answers every request with a clone of `raw`.
    pub fn always(raw: RawResponse) -> Self {
        Self::new(move |_| Step::respond(raw.clone()))
    }

    /// Extra delay added to every step.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn seen(&self) -> Vec<BridgeRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: BridgeRequest) -> BoxFuture<'static, Result<RawResponse, TransportError>> {
        let step = (self.script)(&request);
        self.seen.lock().unwrap().push(request);

        let delay = self.delay + step.delay;
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            step.result
        }
        .boxed()
    }
}
