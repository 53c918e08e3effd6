//! Page-side request construction.
//!
//! A page script describes a request with [`RequestOptions`]. [`prepare`]
//! turns those into a [`BridgeRequest`](crate::bridge::BridgeRequest) ready to
//! cross over to the privileged side, and [`curl_command`] renders the same
//! request for the logs.

pub mod body;
pub mod curl;
pub mod options;
pub mod query;

pub use body::RequestBody;
pub use curl::curl_command;
pub use options::{prepare, RequestOptions};
pub use query::{append_query, build_query_string};
