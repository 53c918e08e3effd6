//! Legacy calling conventions on top of [`BridgeHandle::fetch`](crate::bridge::BridgeHandle::fetch).
//!
//! Two kinds of page code call the bridge without knowing about futures:
//! API-testing tools that expect `crossRequest({ success, error })` with
//! `(res, header, data)` arguments ([`yapi`]), and jQuery-style code that
//! expects `$.ajax({ success, error, complete })` with a jqXHR ([`jquery`]).

pub mod jquery;
pub mod yapi;

pub use jquery::{ajax, intercept_ajax, AjaxCallbacks};
pub use yapi::{cross_request, LegacyConsumer};

/// Whether a jQuery ajax call is routed through the bridge.
///
/// In full mode every call is intercepted unless it opts out with
/// `crossRequest: false`. In silent mode the page owns its traffic and only
/// calls that opt in with `crossRequest: true` are intercepted.
pub fn should_intercept(silent: bool, flag: Option<bool>) -> bool {
    if silent {
        flag == Some(true)
    } else {
        flag != Some(false)
    }
}
