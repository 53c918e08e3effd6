//! Cross-origin request bridge.
//!
//! Page scripts hand request options to the bridge, the privileged side
//! performs the HTTP exchange, and the reply comes back as a single
//! [`CanonicalResponse`] shape that legacy callers can consume through the
//! [`adapter`] functions.

pub mod adapter;
pub mod bridge;
pub mod callback;
pub mod config;
pub mod errors;
pub mod net;
pub mod normalize;
pub mod request;

#[cfg(test)]
mod testing;

pub use bridge::{Bridge, BridgeHandle, BridgeTasks, RequestId};
pub use config::{BridgeConfig, BridgeConfigError, LogLevel};
pub use errors::BridgeError;
pub use net::{HttpTransport, RawResponse, Transport, TransportError};
pub use normalize::{normalize, CanonicalResponse};
pub use request::{RequestBody, RequestOptions};
