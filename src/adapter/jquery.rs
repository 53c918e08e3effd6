use log::debug;
use serde_json::Value;

use crate::adapter::should_intercept;
use crate::bridge::BridgeHandle;
use crate::callback::{build_jq_xhr, JqXhr};
use crate::errors::BridgeError;
use crate::normalize::CanonicalResponse;
use crate::request::RequestOptions;

pub const TEXT_STATUS_SUCCESS: &str = "success";
pub const TEXT_STATUS_ERROR: &str = "error";

/// jQuery `$.ajax` callbacks. All of them are optional.
pub trait AjaxCallbacks {
    fn success(&mut self, _data: &Value, _text_status: &str, _jq_xhr: &JqXhr) {}

    fn error(&mut self, _jq_xhr: &JqXhr, _text_status: &str, _error_thrown: &str) {}

    fn complete(&mut self, _jq_xhr: &JqXhr, _text_status: &str) {}
}

/// No callbacks; the caller only uses the returned result.
impl AjaxCallbacks for () {}

/// `$.ajax` through the bridge.
///
/// A resolved request calls `success(data, "success", jqXHR)` then
/// `complete(jqXHR, "success")`, whatever the HTTP status. A rejected one
/// calls `error(jqXHR, "error", message)` then `complete(jqXHR, "error")`
/// with a minimal jqXHR.
pub async fn ajax<O, C>(handle: &BridgeHandle, options: O, callbacks: &mut C) -> Result<CanonicalResponse, BridgeError>
where
    O: Into<RequestOptions>,
    C: AjaxCallbacks + ?Sized,
{
    let result = handle.fetch(options).await;

    match &result {
        Ok(res) => {
            debug!("ajax response: {}", res.status);
            let jq_xhr = build_jq_xhr(res);
            callbacks.success(&res.data, TEXT_STATUS_SUCCESS, &jq_xhr);
            callbacks.complete(&jq_xhr, TEXT_STATUS_SUCCESS);
        }
        Err(e) => {
            let message = e.user_message();
            let jq_xhr = JqXhr::failed(message.as_str());
            callbacks.error(&jq_xhr, TEXT_STATUS_ERROR, &message);
            callbacks.complete(&jq_xhr, TEXT_STATUS_ERROR);
        }
    }

    result
}

/// Routes a page's `$.ajax` call through the bridge when the interception
/// policy says so. `None` means the page's own jQuery should handle it.
pub async fn intercept_ajax<C>(
    handle: &BridgeHandle,
    options: RequestOptions,
    callbacks: &mut C,
) -> Option<Result<CanonicalResponse, BridgeError>>
where
    C: AjaxCallbacks + ?Sized,
{
    if !should_intercept(handle.config().silent, options.cross_request) {
        debug!("leaving {} to the page's jQuery", options.url);
        return None;
    }
    Some(ajax(handle, options, callbacks).await)
}
