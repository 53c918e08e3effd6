use std::fmt;
use std::time::Duration;

use url::Url;

use crate::net::{Headers, RawResponse, TransportError};
use crate::request::RequestBody;

/// Correlates a request with its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl RequestId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request-{}", self.0)
    }
}

/// Page side → privileged side.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeRequest {
    pub id: RequestId,
    pub url: Url,
    /// Upper-cased.
    pub method: String,
    pub headers: Headers,
    pub body: Option<RequestBody>,
    pub timeout: Duration,
}

impl BridgeRequest {
    /// GET and HEAD never carry a body.
    pub fn carries_body(&self) -> bool {
        self.method != "GET" && self.method != "HEAD"
    }

    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Privileged side → page side. Exactly one per request.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeReply {
    Response {
        id: RequestId,
        response: Option<RawResponse>,
    },
    Error {
        id: RequestId,
        error: TransportError,
    },
}

impl BridgeReply {
    pub fn id(&self) -> RequestId {
        match self {
            BridgeReply::Response { id, .. } | BridgeReply::Error { id, .. } => *id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_render_with_prefix() {
        assert_eq!(RequestId::new(12).to_string(), "request-12");
        assert!(RequestId::new(1) < RequestId::new(2));
    }

    #[test]
    fn reply_exposes_its_id() {
        let reply = BridgeReply::Error {
            id: RequestId::new(3),
            error: TransportError::Network("reset".into()),
        };
        assert_eq!(reply.id(), RequestId::new(3));
    }

    #[test]
    fn head_carries_no_body() {
        let req = BridgeRequest {
            id: RequestId::new(1),
            url: Url::parse("https://api.test/").unwrap(),
            method: "HEAD".into(),
            headers: Headers::new(),
            body: None,
            timeout: Duration::from_millis(1500),
        };
        assert!(!req.carries_body());
        assert_eq!(req.timeout_ms(), 1500);
    }
}
