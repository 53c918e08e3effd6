//! Legacy callback shapes.
//!
//! Both builders take an already-normalized [`CanonicalResponse`](crate::normalize::CanonicalResponse)
//! and only rearrange it. They never decode bodies again and never fail.
//!
//! - [`legacy`] builds the `(res, header, data)` triple expected by the
//!   API-testing tool's `crossRequest` success callback.
//! - [`jqxhr`] builds the jqXHR-like object handed to jQuery `ajax` callbacks.

pub mod jqxhr;
pub mod legacy;

pub use jqxhr::{build_jq_xhr, JqXhr};
pub use legacy::{build_legacy_params, FullPayload, LegacyParams, ResPayload};
