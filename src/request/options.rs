use std::time::Duration;

use log::debug;
use url::Url;

use crate::bridge::{BridgeRequest, RequestId};
use crate::config::BridgeConfig;
use crate::errors::BridgeError;
use crate::net::Headers;
use crate::request::body::RequestBody;
use crate::request::query::{append_query, build_query_string, encode_pairs};

/// What a page script passes to `crossRequest` / `ajax`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub url: String,
    /// Defaults to `GET`. Compared case-insensitively.
    pub method: Option<String>,
    /// Request headers, names as given by the caller.
    pub headers: Headers,
    pub data: Option<RequestBody>,
    pub timeout: Option<Duration>,
    /// The page's `document.cookie`, forwarded as `Cookie` when present.
    pub cookies: Option<String>,
    /// Per-call jQuery interception flag.
    pub cross_request: Option<bool>,
}

impl RequestOptions {
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn method<S: Into<String>>(mut self, method: S) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn data<B: Into<RequestBody>>(mut self, data: B) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn cookies<S: Into<String>>(mut self, cookies: S) -> Self {
        self.cookies = Some(cookies.into());
        self
    }

    pub fn cross_request(mut self, on: bool) -> Self {
        self.cross_request = Some(on);
        self
    }
}

impl From<&str> for RequestOptions {
    fn from(url: &str) -> Self {
        RequestOptions::new(url)
    }
}

impl From<String> for RequestOptions {
    fn from(url: String) -> Self {
        RequestOptions::new(url)
    }
}

pub(crate) fn has_header(headers: &Headers, name: &str) -> bool {
    headers.iter().any(|(k, v)| k.eq_ignore_ascii_case(name) && !v.is_empty())
}

pub(crate) fn find_header<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Turns page options into the envelope sent to the privileged side.
///
/// - the method is upper-cased, `GET` by default;
/// - `GET`/`HEAD` data moves into the query string and the body is dropped;
/// - `User-Agent`, `Accept` and `Cookie` are filled in when missing;
/// - a `Content-Type` is chosen from the body kind for requests that carry one,
///   except for forms and binary payloads.
pub fn prepare(options: RequestOptions, id: RequestId, config: &BridgeConfig) -> Result<BridgeRequest, BridgeError> {
    let method = options
        .method
        .as_deref()
        .filter(|m| !m.is_empty())
        .unwrap_or("GET")
        .to_ascii_uppercase();
    let bodyless = method == "GET" || method == "HEAD";

    let data = options.data.filter(|d| !d.is_empty());
    let mut url = options.url;
    let mut headers = options.headers;

    let body = if bodyless {
        if let Some(data) = data {
            let query = match &data {
                RequestBody::Json(value) => build_query_string(value),
                RequestBody::Text(text) => text.clone(),
                RequestBody::FormData(pairs) => encode_pairs(pairs),
                RequestBody::Binary(bytes) => {
                    debug!("dropping {} byte binary payload from {method} request", bytes.len());
                    String::new()
                }
            };
            url = append_query(&url, &query);
        }
        None
    } else {
        if let Some(data) = data.as_ref().filter(|d| !d.is_form_like()) {
            if !has_header(&headers, "content-type") {
                if let Some(ct) = data.default_content_type() {
                    headers.insert("Content-Type".to_string(), ct.to_string());
                }
            }
        }
        data
    };

    if !has_header(&headers, "user-agent") {
        headers.insert("User-Agent".to_string(), config.user_agent.clone());
    }
    if !has_header(&headers, "accept") {
        headers.insert("Accept".to_string(), config.accept.clone());
    }
    if let Some(cookies) = options.cookies.filter(|c| !c.is_empty()) {
        if !has_header(&headers, "cookie") {
            headers.insert("Cookie".to_string(), cookies);
        }
    }

    let url = Url::parse(&url).map_err(|e| BridgeError::InvalidRequest(format!("{url}: {e}")))?;

    Ok(BridgeRequest {
        id,
        url,
        method,
        headers,
        body,
        timeout: options.timeout.unwrap_or(config.default_timeout),
    })
}
