//! Network side of the bridge.
//!
//! The privileged side performs the actual HTTP exchange on behalf of the page
//! and hands back a [`RawResponse`]. Everything here is I/O glue; the
//! interesting rules live in [`crate::normalize`].

pub mod preview;
pub mod response;
pub mod status;
pub mod transport;

pub use response::{Headers, RawResponse};
pub use transport::{HttpTransport, Transport, TransportError};
