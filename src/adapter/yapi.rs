use log::{debug, error, warn};
use serde_json::{json, Value};

use crate::bridge::BridgeHandle;
use crate::callback::{build_legacy_params, FullPayload};
use crate::errors::BridgeError;
use crate::net::status::http_error_message;
use crate::net::Headers;
use crate::normalize::CanonicalResponse;
use crate::request::RequestOptions;

const REQUEST_FAILED: &str = "请求失败";
const NETWORK_ERROR_STATUS_TEXT: &str = "Network Error";
const UNAVAILABLE_STATUS: u16 = 503;
const UNAVAILABLE_STATUS_TEXT: &str = "Service Unavailable";

/// Callbacks of an API-testing tool, called as `(res, header, data)`.
pub trait LegacyConsumer {
    fn success(&mut self, res: &Value, header: &Headers, data: &Value) -> anyhow::Result<()>;

    /// Consumers without an error callback get failures through `success`.
    fn has_error_callback(&self) -> bool {
        false
    }

    fn error(&mut self, _res: &Value, _header: &Headers, _data: &Value) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Performs a request and reports it to `consumer` in the legacy shape.
///
/// Returns whatever the underlying fetch returned, so callers may also
/// await the result directly.
pub async fn cross_request<O, C>(
    handle: &BridgeHandle,
    options: O,
    consumer: &mut C,
) -> Result<CanonicalResponse, BridgeError>
where
    O: Into<RequestOptions>,
    C: LegacyConsumer + ?Sized,
{
    let silent = handle.config().silent;
    let result = handle.fetch(options).await;

    match &result {
        Ok(res) => deliver_response(res, consumer, silent),
        Err(e) => deliver_failure(e, consumer, silent),
    }

    result
}

fn deliver_response<C: LegacyConsumer + ?Sized>(res: &CanonicalResponse, consumer: &mut C, silent: bool) {
    if res.is_error {
        let message = if res.status_text.is_empty() { REQUEST_FAILED } else { res.status_text.as_str() };
        if !silent {
            warn!("{message}");
        }

        if consumer.has_error_callback() {
            let body = error_body(&res.body, message);
            let payload_body = match &res.body {
                Value::Null => body.to_string(),
                _ => res.body_text(),
            };
            let status_text = if res.status_text.is_empty() { NETWORK_ERROR_STATUS_TEXT } else { res.status_text.as_str() };
            let payload = FullPayload::new(Value::String(payload_body), res.headers.clone(), res.status, status_text, false);

            if let Err(e) = consumer.error(&body, &res.headers, &payload.to_value()) {
                error!("error callback failed: {e:#}");
            }
            return;
        }
        debug!("no error callback, handing the failed response to success");
    }

    if res.status >= 400 && !silent {
        warn!("{}", http_error_message(res.status));
    }

    let params = build_legacy_params(res);
    if let Err(e) = consumer.success(&params.primary, &params.header_map, &params.full_payload.to_value()) {
        error!("success callback failed: {e:#}");

        // Older consumers want the canonical record itself as the third argument
        if let Err(e) = consumer.success(&res.data, &res.headers, &res.to_value()) {
            error!("success callback failed again with the simplified arguments: {e:#}");
        }
    }
}

fn deliver_failure<C: LegacyConsumer + ?Sized>(err: &BridgeError, consumer: &mut C, silent: bool) {
    let message = err.user_message();
    if !silent {
        warn!("{message}");
    }

    let mut header = Headers::new();
    header.insert("content-type".to_string(), "application/json".to_string());

    let outcome = if consumer.has_error_callback() {
        let payload = FullPayload::new(Value::Null, header.clone(), UNAVAILABLE_STATUS, UNAVAILABLE_STATUS_TEXT, false);
        consumer.error(&Value::Null, &header, &payload.to_value())
    } else {
        let body = Value::String(String::new());
        let payload = FullPayload::new(body.clone(), header.clone(), UNAVAILABLE_STATUS, UNAVAILABLE_STATUS_TEXT, false);
        consumer.success(&body, &header, &payload.to_value())
    };

    if let Err(e) = outcome {
        error!("callback failed while reporting \"{message}\": {e:#}");
    }
}

/// First argument of the error callback for a synthesized error response.
fn error_body(body: &Value, message: &str) -> Value {
    let fallback = || {
        json!({
            "data": {
                "success": false,
                "error": message,
                "message": message,
                "code": "NETWORK_ERROR",
            }
        })
    };

    match body {
        Value::Object(_) | Value::Array(_) => body.clone(),
        Value::String(text) if !text.is_empty() => serde_json::from_str(text).unwrap_or_else(|_| fallback()),
        _ => fallback(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::Bridge;
    use crate::config::BridgeConfig;
    use crate::net::{RawResponse, TransportError};
    use crate::testing::{ScriptedTransport, Step};
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Success(Value, Headers, Value),
        Error(Value, Headers, Value),
    }

    #[derive(Default)]
    struct Recorder {
        with_error: bool,
        failing_successes: usize,
        calls: Vec<Call>,
    }

    impl LegacyConsumer for Recorder {
        fn success(&mut self, res: &Value, header: &Headers, data: &Value) -> anyhow::Result<()> {
            self.calls.push(Call::Success(res.clone(), header.clone(), data.clone()));
            if self.failing_successes > 0 {
                self.failing_successes -= 1;
                anyhow::bail!("consumer blew up");
            }
            Ok(())
        }

        fn has_error_callback(&self) -> bool {
            self.with_error
        }

        fn error(&mut self, res: &Value, header: &Headers, data: &Value) -> anyhow::Result<()> {
            self.calls.push(Call::Error(res.clone(), header.clone(), data.clone()));
            Ok(())
        }
    }

    fn start(transport: ScriptedTransport) -> BridgeHandle {
        let config = BridgeConfig::builder().silent(true).build().unwrap();
        let (handle, _tasks) = Bridge::start(config, transport).unwrap();
        handle
    }

    #[tokio::test]
    async fn json_success_gets_decoded_data() {
        let handle = start(ScriptedTransport::always(
            RawResponse::new(200)
                .with_header("Content-Type", "application/json")
                .with_body(r#"{"ok":true}"#),
        ));
        let mut consumer = Recorder::default();

        let res = cross_request(&handle, "https://api.test/ok", &mut consumer).await.unwrap();
        assert_eq!(res.status, 200);

        let [Call::Success(primary, header, data)] = consumer.calls.as_slice() else {
            panic!("unexpected calls: {:?}", consumer.calls);
        };
        assert_eq!(primary, &json!({"ok": true}));
        assert_eq!(header.get("content-type").map(String::as_str), Some("application/json"));
        assert_eq!(data["success"], json!(true));
        assert_eq!(data["res"]["body"], json!(r#"{"ok":true}"#));
        assert_eq!(data["res"]["status"], json!(200));
    }

    #[tokio::test]
    async fn http_errors_still_go_to_success() {
        let handle = start(ScriptedTransport::always(RawResponse::new(404).with_body("missing")));
        let mut consumer = Recorder {
            with_error: true,
            ..Default::default()
        };

        cross_request(&handle, "https://api.test/x", &mut consumer).await.unwrap();

        let [Call::Success(primary, _, data)] = consumer.calls.as_slice() else {
            panic!("unexpected calls: {:?}", consumer.calls);
        };
        assert_eq!(primary, &json!("missing"));
        assert_eq!(data["status"], json!(404));
        assert_eq!(data["success"], json!(true));
    }

    #[tokio::test]
    async fn failing_success_is_retried_once_with_simplified_arguments() {
        let handle = start(ScriptedTransport::always(RawResponse::new(200).with_data(json!({"n": 1}))));
        let mut consumer = Recorder {
            failing_successes: 2,
            ..Default::default()
        };

        let res = cross_request(&handle, "https://api.test/", &mut consumer).await.unwrap();

        assert_eq!(consumer.calls.len(), 2);
        let Call::Success(data, _, whole) = &consumer.calls[1] else {
            panic!("expected a success retry");
        };
        assert_eq!(data, &json!({"n": 1}));
        assert_eq!(whole, &res.to_value());
    }

    #[tokio::test]
    async fn timeout_goes_to_error_callback() {
        let handle = start(ScriptedTransport::always(RawResponse::new(200)).with_delay(Duration::from_millis(500)));
        let mut consumer = Recorder {
            with_error: true,
            ..Default::default()
        };

        let options = RequestOptions::new("https://api.test/slow").timeout(Duration::from_millis(20));
        let res = cross_request(&handle, options, &mut consumer).await.unwrap();
        assert!(res.is_error);

        let [Call::Error(body, header, data)] = consumer.calls.as_slice() else {
            panic!("unexpected calls: {:?}", consumer.calls);
        };
        // The timeout body is JSON text, so it is decoded for the consumer
        assert_eq!(body, &json!({"error": "请求超时"}));
        assert!(header.is_empty());
        assert_eq!(data["success"], json!(false));
        assert_eq!(data["status"], json!(0));
        assert_eq!(data["statusText"], json!("请求超时"));
        assert_eq!(data["res"]["body"], json!(r#"{"error":"请求超时"}"#));
    }

    #[tokio::test]
    async fn timeout_without_error_callback_reaches_success() {
        let handle = start(ScriptedTransport::always(RawResponse::new(200)).with_delay(Duration::from_millis(500)));
        let mut consumer = Recorder::default();

        let options = RequestOptions::new("https://api.test/slow").timeout(Duration::from_millis(20));
        cross_request(&handle, options, &mut consumer).await.unwrap();

        let [Call::Success(primary, _, data)] = consumer.calls.as_slice() else {
            panic!("unexpected calls: {:?}", consumer.calls);
        };
        assert_eq!(primary, &json!({"error": "请求超时"}));
        assert_eq!(data["status"], json!(0));
    }

    #[tokio::test]
    async fn rejection_reports_service_unavailable() {
        let handle = start(ScriptedTransport::new(|req| {
            Step::fail(TransportError::FailedToFetch {
                url: req.url.to_string(),
                message: "connection refused".into(),
            })
        }));

        let mut with_error = Recorder {
            with_error: true,
            ..Default::default()
        };
        let err = cross_request(&handle, "https://api.test/", &mut with_error).await.unwrap_err();
        assert_eq!(err.user_message(), "无法连接到服务器 https://api.test/");

        let [Call::Error(body, header, data)] = with_error.calls.as_slice() else {
            panic!("unexpected calls: {:?}", with_error.calls);
        };
        assert_eq!(body, &Value::Null);
        assert_eq!(header.get("content-type").map(String::as_str), Some("application/json"));
        assert_eq!(data["status"], json!(503));
        assert_eq!(data["statusText"], json!("Service Unavailable"));
        assert_eq!(data["res"]["success"], json!(false));

        let mut success_only = Recorder::default();
        cross_request(&handle, "https://api.test/", &mut success_only).await.unwrap_err();
        let [Call::Success(body, _, data)] = success_only.calls.as_slice() else {
            panic!("unexpected calls: {:?}", success_only.calls);
        };
        assert_eq!(body, &json!(""));
        assert_eq!(data["res"]["body"], json!(""));
        assert_eq!(data["status"], json!(503));
    }

    #[test]
    fn error_body_fallbacks() {
        assert_eq!(error_body(&json!({"a": 1}), "x"), json!({"a": 1}));
        assert_eq!(error_body(&json!("[1]"), "x"), json!([1]));
        assert_eq!(error_body(&json!("oops"), "x")["data"]["code"], json!("NETWORK_ERROR"));
        assert_eq!(error_body(&json!(""), "boom")["data"]["message"], json!("boom"));
        assert_eq!(error_body(&Value::Null, "boom")["data"]["success"], json!(false));
    }
}
