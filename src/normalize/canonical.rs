//! The canonical response record.
//!
//! Every response handed to a caller, whether it came from a real HTTP
//! exchange or was synthesized by the page side (no response, timeout), has
//! this exact shape.
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::net::{Headers, RawResponse};
use crate::normalize::{is_json_content_type, looks_like_json, stringify_body};

pub const NO_RESPONSE_STATUS_TEXT: &str = "No Response";
pub const TIMEOUT_STATUS_TEXT: &str = "请求超时";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalResponse {
    /// HTTP status, `0` when the exchange never completed.
    pub status: u16,
    pub status_text: String,
    pub headers: Headers,
    /// Decoded value. Never absent; `null`, `0`, `false` and `""` are legitimate values.
    pub data: Value,
    /// The original body, untouched. Use [`CanonicalResponse::body_text`] for a string form.
    pub body: Value,
    /// Carried through when the input supplied it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_parsed: Option<Value>,
    /// Set on responses synthesized by the page side for failed exchanges.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
    /// Server text behind a body the transport already decoded. Not part of the record's JSON form.
    #[serde(skip)]
    pub origin_body: Option<String>,
}

impl CanonicalResponse {
    /// The record produced when there is no response at all.
    pub fn no_response() -> Self {
        Self {
            status: 0,
            status_text: NO_RESPONSE_STATUS_TEXT.to_string(),
            headers: Headers::new(),
            data: Value::Object(Map::new()),
            body: Value::String(String::new()),
            body_parsed: None,
            is_error: false,
            origin_body: None,
        }
    }

    /// The record a pending request resolves with when its timer fires first.
    pub fn timed_out() -> Self {
        let data = json!({ "error": TIMEOUT_STATUS_TEXT });
        Self {
            status: 0,
            status_text: TIMEOUT_STATUS_TEXT.to_string(),
            headers: Headers::new(),
            body: Value::String(data.to_string()),
            data,
            body_parsed: None,
            is_error: true,
            origin_body: None,
        }
    }

    /// Lower-cased `content-type`, or an empty string.
    pub fn content_type(&self) -> String {
        self.headers
            .get("content-type")
            .map(|ct| ct.to_ascii_lowercase())
            .unwrap_or_default()
    }

    /// True when the content type declares JSON, the body text looks like
    /// JSON, or the body is an object or array that was decoded upstream.
    pub fn is_json(&self) -> bool {
        is_json_content_type(&self.content_type())
            || looks_like_json(&self.body)
            || matches!(self.body, Value::Object(_) | Value::Array(_))
    }

    /// String form of the body. A decoded body is rendered from the text the
    /// server sent when that text is known, so key order and spacing survive.
    pub fn body_text(&self) -> String {
        match (&self.body, &self.origin_body) {
            (Value::Object(_) | Value::Array(_), Some(text)) => text.clone(),
            (body, _) => stringify_body(body),
        }
    }

    /// JSON form of the whole record, as handed to legacy consumers.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Re-entering the normalizer with a canonical record. `data` travels as
/// `bodyParsed` so it is taken as-is and never decoded a second time.
impl From<&CanonicalResponse> for RawResponse {
    fn from(canonical: &CanonicalResponse) -> Self {
        RawResponse {
            status: Some(canonical.status),
            status_text: Some(canonical.status_text.clone()),
            headers: canonical.headers.clone(),
            body: Some(canonical.body.clone()),
            data: None,
            body_parsed: Some(canonical.data.clone()),
            origin_body: canonical.origin_body.clone(),
        }
    }
}
