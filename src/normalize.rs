//! Response normalization.
//!
//! [`normalize`] maps a [`RawResponse`] onto exactly one [`CanonicalResponse`].
//! It is a pure function: no I/O, no shared state, and it never fails. Any
//! problem met while decoding ends up *in* the returned value.
//!
//! # Resolving `data`
//!
//! `data` is taken from the first source that applies, in this order:
//!
//! 1. `bodyParsed`, when present.
//! 2. `data`, when present (a present `null` counts).
//! 3. The body decoded as JSON, when the body is text and either the content
//!    type contains `application/json` or the trimmed text starts with `{` or
//!    `[`. A decode failure yields `{"error": "JSON解析失败", "raw": <text>}`.
//! 4. The body itself, unchanged.
//! 5. `{}` when the body is `null` or missing.
//!
//! HTTP error statuses get no special treatment here; a `500` normalizes like
//! a `200`.
//!
//! # The `body` field
//!
//! The original body is kept verbatim. It is *not* coerced to a string, since
//! some callers rely on an already-decoded body staying a value. Use
//! [`stringify_body`] when a string form is needed.
use log::warn;
use serde_json::{json, Map, Value};

pub mod canonical;

pub use canonical::CanonicalResponse;

use crate::net::RawResponse;

/// `error` value of the diagnostic object produced by a failed decode.
pub const JSON_PARSE_FAILED: &str = "JSON解析失败";

/// Status text used when the input carries none.
pub const DEFAULT_STATUS_TEXT: &str = "OK";

pub fn normalize(raw: Option<&RawResponse>) -> CanonicalResponse {
    let Some(raw) = raw else {
        return CanonicalResponse::no_response();
    };

    let content_type = raw.content_type();
    let data = resolve_data(raw, &content_type);

    let body = match (&raw.body, &raw.body_parsed) {
        (Some(body), _) => body.clone(),
        (None, Some(parsed)) => parsed.clone(),
        (None, None) => Value::String(String::new()),
    };

    CanonicalResponse {
        status: raw.status.unwrap_or(0),
        status_text: raw
            .status_text
            .as_deref()
            .filter(|text| !text.is_empty())
            .unwrap_or(DEFAULT_STATUS_TEXT)
            .to_string(),
        headers: raw.headers.clone(),
        data,
        body,
        body_parsed: raw.body_parsed.clone(),
        is_error: false,
        origin_body: raw.origin_body.clone(),
    }
}

fn resolve_data(raw: &RawResponse, content_type: &str) -> Value {
    if let Some(parsed) = &raw.body_parsed {
        return parsed.clone();
    }
    if let Some(data) = &raw.data {
        return data.clone();
    }

    match &raw.body {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(Value::String(text)) if is_json_content_type(content_type) || looks_like_json_str(text) => {
            decode_json(text)
        }
        Some(body) => body.clone(),
    }
}

/// Decodes `text` as JSON. Failure is folded into a diagnostic value.
pub fn decode_json(text: &str) -> Value {
    match serde_json::from_str::<Value>(strip_bom(text)) {
        Ok(value) => value,
        Err(e) => {
            warn!("JSON decode failed, keeping raw body: {e}");
            json!({ "error": JSON_PARSE_FAILED, "raw": text })
        }
    }
}

pub fn is_json_content_type(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("application/json")
}

/// True when `body` is text whose trimmed form starts with `{` or `[`.
pub fn looks_like_json(body: &Value) -> bool {
    matches!(body, Value::String(text) if looks_like_json_str(text))
}

pub fn looks_like_json_str(text: &str) -> bool {
    let trimmed = strip_bom(text).trim_start();
    trimmed.starts_with('{') || trimmed.starts_with('[')
}

fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

/// String form of a body: `""` for `null`, text as-is, scalars printed, and
/// everything else JSON-encoded.
pub fn stringify_body(body: &Value) -> String {
    match body {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
