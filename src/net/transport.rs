//! Transport capability.
//!
//! The privileged side performs requests through a [`Transport`]. The
//! production implementation is [`HttpTransport`], built on `reqwest`. It
//! buffers the whole body (no streaming) and reports failures with the
//! discriminants legacy consumers know: `AbortError` for timeouts and
//! `TypeError`/"Failed to fetch" for unreachable servers.
use futures::future::BoxFuture;
use futures::FutureExt;
use log::{debug, error};
use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::bridge::BridgeRequest;
use crate::config::BridgeConfig;
use crate::net::preview::{safe_preview, PreviewLimits};
use crate::net::response::{Headers, RawResponse};
use crate::net::status::status_text;
use crate::normalize::{is_json_content_type, looks_like_json_str};
use crate::request::options::find_header;
use crate::request::query::scalar_text;
use crate::request::RequestBody;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out after {timeout_ms}ms")]
    Abort { timeout_ms: u64 },

    #[error("Failed to fetch {url}: {message}")]
    FailedToFetch { url: String, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("request failed: {0}")]
    Other(String),
}

impl TransportError {
    /// Discriminant name, as the page-side failure handling expects it.
    pub fn name(&self) -> &'static str {
        match self {
            TransportError::Abort { .. } => "AbortError",
            TransportError::FailedToFetch { .. } => "TypeError",
            TransportError::Network(_) => "NetworkError",
            TransportError::Other(_) => "Error",
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            TransportError::Abort { timeout_ms } => format!("请求超时 ({timeout_ms}ms)"),
            TransportError::FailedToFetch { url, .. } => format!("无法连接到服务器 {url}"),
            TransportError::Network(message) => format!("网络错误：{message}"),
            TransportError::Other(message) => format!("请求失败：{message}"),
        }
    }
}

/// Performs one HTTP exchange.
pub trait Transport: Send + Sync + 'static {
    fn send(&self, request: BridgeRequest) -> BoxFuture<'static, Result<RawResponse, TransportError>>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    preview: PreviewLimits,
}

impl HttpTransport {
    pub fn new(config: &BridgeConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .cookie_store(true)
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self::with_client(client, config.preview))
    }

    pub fn with_client(client: reqwest::Client, preview: PreviewLimits) -> Self {
        Self { client, preview }
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: BridgeRequest) -> BoxFuture<'static, Result<RawResponse, TransportError>> {
        fetch(self.client.clone(), request, self.preview).boxed()
    }
}

// Loads the request and returns the raw response, or a classified failure
async fn fetch(client: reqwest::Client, request: BridgeRequest, preview: PreviewLimits) -> Result<RawResponse, TransportError> {
    let timeout_ms = request.timeout_ms();
    let url = request.url.to_string();

    let method = reqwest::Method::from_bytes(request.method.as_bytes())
        .map_err(|e| TransportError::Other(format!("invalid method {}: {e}", request.method)))?;

    debug!(
        "sending {} {} (has body: {})",
        request.method,
        url,
        request.body.is_some()
    );

    let mut builder = client.request(method, request.url.clone()).timeout(request.timeout);
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if request.carries_body() {
        if let Some(body) = &request.body {
            builder = attach_body(builder, body, &request.headers);
        }
    }

    let res = builder.send().await.map_err(|e| classify(e, &url, timeout_ms))?;

    // Fetch results
    let status = res.status().as_u16();
    let reason = res
        .status()
        .canonical_reason()
        .unwrap_or_else(|| status_text(status))
        .to_string();

    let headers = collect_headers(res.headers());

    // Fetch body. We don't do streaming yet
    let text = res.text().await.map_err(|e| classify(e, &url, timeout_ms))?;

    let content_type = headers.get("content-type").cloned().unwrap_or_default();
    debug!(
        "response from {url}: status={status} content-type={} length={} preview={}",
        if content_type.is_empty() { "unknown" } else { content_type.as_str() },
        text.len(),
        safe_preview(&Value::String(text.clone()), &preview)
    );

    let mut raw = RawResponse {
        status: Some(status),
        status_text: Some(reason),
        headers,
        ..Default::default()
    };

    if is_json_content_type(&content_type) || looks_like_json_str(&text) {
        match serde_json::from_str::<Value>(&text) {
            Ok(parsed) => {
                raw.body = Some(parsed);
                raw.origin_body = Some(text);
            }
            Err(e) => {
                error!("response from {url} declared JSON but did not decode: {e}");
                raw.body = Some(Value::String(text));
            }
        }
    } else {
        raw.body = Some(Value::String(text));
    }

    Ok(raw)
}

/// Folds response headers into one entry per name, joining repeats with
/// `", "`. Bytes that are not UTF-8 are replaced rather than dropping the value.
fn collect_headers(map: &HeaderMap) -> Headers {
    let mut headers = Headers::new();
    for (name, value) in map {
        let value = String::from_utf8_lossy(value.as_bytes());
        headers
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }
    headers
}

fn attach_body(builder: reqwest::RequestBuilder, body: &RequestBody, headers: &Headers) -> reqwest::RequestBuilder {
    match body {
        RequestBody::Json(value) => {
            let content_type = find_header(headers, "content-type").unwrap_or("");
            if content_type.contains("application/x-www-form-urlencoded") {
                builder.body(urlencode_value(value))
            } else if content_type.is_empty() {
                builder
                    .header(http::header::CONTENT_TYPE, "application/json")
                    .body(value.to_string())
            } else {
                builder.body(value.to_string())
            }
        }
        RequestBody::FormData(pairs) => {
            let form = pairs
                .iter()
                .fold(reqwest::multipart::Form::new(), |form, (k, v)| form.text(k.clone(), v.clone()));
            builder.multipart(form)
        }
        RequestBody::Text(text) => builder.body(text.clone()),
        RequestBody::Binary(bytes) => builder.body(bytes.clone()),
    }
}

/// Url-encodes the top-level fields of a JSON object. Other values are sent as JSON text.
fn urlencode_value(value: &Value) -> String {
    match value {
        Value::Object(map) => url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(map.iter().map(|(k, v)| (k.clone(), scalar_text(v))))
            .finish(),
        other => other.to_string(),
    }
}

fn classify(e: reqwest::Error, url: &str, timeout_ms: u64) -> TransportError {
    error!("request to {url} failed: {e}");

    if e.is_timeout() {
        TransportError::Abort { timeout_ms }
    } else if e.is_connect() {
        TransportError::FailedToFetch {
            url: url.to_string(),
            message: e.to_string(),
        }
    } else if e.is_builder() {
        TransportError::Other(e.to_string())
    } else {
        TransportError::Network(e.to_string())
    }
}
