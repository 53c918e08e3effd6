//! Raw response descriptor.
//!
//! This struct represents a response as it arrives from the privileged side
//! of the bridge, **before** normalization. Every field may be missing, since
//! earlier stages (or a synthetic failure) only fill in what they know.
//!
//! ## Notes
//! - `body` is either the raw text or an already-decoded JSON value when the
//!   transport decoded it upfront.
//! - `Some(Value::Null)` and `None` are different things: a present `null`
//!   body is not the same as a missing body. The serde helpers below keep that
//!   distinction when deserializing.
//! - `headers` keys are expected to be lower-cased already.
//!
use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Response headers keyed by lower-cased name. Iteration order is the key order.
pub type Headers = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawResponse {
    /// Numeric HTTP status code. `0` (or missing) means the exchange never completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// Human-readable reason phrase, if the transport had one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: Headers,

    /// Raw text or already-decoded value.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,

    /// Value decoded by an earlier stage.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Alias of `data` used by the background path. Wins over everything else.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub body_parsed: Option<Value>,

    /// Undecoded text when `body` holds a value the transport already decoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_body: Option<String>,
}

impl RawResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn with_status_text<S: Into<String>>(mut self, text: S) -> Self {
        self.status_text = Some(text.into());
        self
    }

    /// Adds a header. The name is lower-cased.
    pub fn with_header<K: AsRef<str>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body<V: Into<Value>>(mut self, body: V) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_data<V: Into<Value>>(mut self, data: V) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_body_parsed<V: Into<Value>>(mut self, parsed: V) -> Self {
        self.body_parsed = Some(parsed.into());
        self
    }

    /// Lower-cased `content-type`, or an empty string.
    pub fn content_type(&self) -> String {
        self.headers
            .get("content-type")
            .map(|ct| ct.to_ascii_lowercase())
            .unwrap_or_default()
    }
}

// A field that is present (even as `null`) deserializes to `Some(_)`; absence is
// handled by `#[serde(default)]`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn null_as_default<'de, D>(deserializer: D) -> Result<Headers, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Headers>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_body_is_kept_apart_from_missing_body() {
        let with_null: RawResponse = serde_json::from_value(json!({"status": 200, "body": null})).unwrap();
        assert_eq!(with_null.body, Some(Value::Null));

        let missing: RawResponse = serde_json::from_value(json!({"status": 200})).unwrap();
        assert_eq!(missing.body, None);
    }

    #[test]
    fn camel_case_fields_and_null_headers() {
        let raw: RawResponse = serde_json::from_value(json!({
            "statusText": "Created",
            "headers": null,
            "bodyParsed": {"id": 3},
        }))
        .unwrap();

        assert_eq!(raw.status, None);
        assert_eq!(raw.status_text.as_deref(), Some("Created"));
        assert!(raw.headers.is_empty());
        assert_eq!(raw.body_parsed, Some(json!({"id": 3})));
    }

    #[test]
    fn builder_lowercases_header_names() {
        let raw = RawResponse::new(200).with_header("Content-Type", "Application/JSON; charset=utf-8");
        assert_eq!(raw.headers.get("content-type").map(String::as_str), Some("Application/JSON; charset=utf-8"));
        assert_eq!(raw.content_type(), "application/json; charset=utf-8");
    }

    #[test]
    fn content_type_defaults_to_empty() {
        assert_eq!(RawResponse::new(204).content_type(), "");
    }
}
