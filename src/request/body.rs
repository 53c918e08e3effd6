use serde_json::Value;

use crate::request::query::encode_pairs;

/// Request payload, classified once when the request is built.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Structured data, sent as JSON (or url-encoded when the caller asked for it).
    Json(Value),
    /// Multipart form fields.
    FormData(Vec<(String, String)>),
    /// Text sent verbatim.
    Text(String),
    Binary(Vec<u8>),
}

impl RequestBody {
    /// Forms and binary payloads let the transport pick the content type.
    pub fn is_form_like(&self) -> bool {
        matches!(self, RequestBody::FormData(_) | RequestBody::Binary(_))
    }

    /// Content type injected when the caller did not set one.
    pub fn default_content_type(&self) -> Option<&'static str> {
        match self {
            _ if self.is_form_like() => None,
            RequestBody::Json(_) => Some("application/json"),
            _ => Some("application/x-www-form-urlencoded"),
        }
    }

    /// Empty payloads are treated as no payload at all.
    pub fn is_empty(&self) -> bool {
        match self {
            RequestBody::Json(v) => v.is_null(),
            RequestBody::FormData(_) => false,
            RequestBody::Text(t) => t.is_empty(),
            RequestBody::Binary(b) => b.is_empty(),
        }
    }

    /// Text form used for display (cURL). Binary payloads have none.
    pub fn display_text(&self) -> Option<String> {
        match self {
            RequestBody::Json(v) => Some(v.to_string()),
            RequestBody::FormData(pairs) => Some(encode_pairs(pairs)),
            RequestBody::Text(t) => Some(t.clone()),
            RequestBody::Binary(_) => None,
        }
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => RequestBody::Text(text),
            other => RequestBody::Json(other),
        }
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        RequestBody::Text(text.to_string())
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        RequestBody::Text(text)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        RequestBody::Binary(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strings_become_text_and_values_json() {
        assert_eq!(RequestBody::from(json!("a=1")), RequestBody::Text("a=1".into()));
        assert_eq!(RequestBody::from(json!({"a": 1})), RequestBody::Json(json!({"a": 1})));
    }

    #[test]
    fn default_content_types() {
        assert_eq!(RequestBody::Json(json!({})).default_content_type(), Some("application/json"));
        assert_eq!(RequestBody::Text("x".into()).default_content_type(), Some("application/x-www-form-urlencoded"));
        assert!(RequestBody::FormData(vec![]).is_form_like());
        assert_eq!(RequestBody::Binary(vec![1]).default_content_type(), None);
    }

    #[test]
    fn emptiness_and_display() {
        assert!(RequestBody::Text(String::new()).is_empty());
        assert!(RequestBody::Json(Value::Null).is_empty());
        assert!(!RequestBody::Json(json!(0)).is_empty());

        let form = RequestBody::FormData(vec![("a".into(), "x y".into())]);
        assert_eq!(form.display_text().as_deref(), Some("a=x+y"));
        assert_eq!(RequestBody::Binary(vec![0]).display_text(), None);
    }
}
