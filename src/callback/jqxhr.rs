//! jqXHR-like view of a canonical response.
use log::debug;
use serde_json::Value;

use crate::net::Headers;
use crate::normalize::{is_json_content_type, CanonicalResponse};

#[derive(Debug, Clone, PartialEq)]
pub struct JqXhr {
    pub status: u16,
    pub status_text: String,
    /// `4` for any resolved response, `0` for transport failures.
    pub ready_state: u8,
    pub response_text: String,
    /// `None` stands for jQuery's `undefined`.
    pub response_json: Option<Value>,
    headers: Headers,
}

impl JqXhr {
    pub const UNSENT: u8 = 0;
    pub const DONE: u8 = 4;

    /// Minimal object for requests that never produced a response.
    pub fn failed<S: Into<String>>(message: S) -> Self {
        Self {
            status: 0,
            status_text: message.into(),
            ready_state: Self::UNSENT,
            response_text: String::new(),
            response_json: None,
            headers: Headers::new(),
        }
    }

    /// Case-insensitive header lookup.
    pub fn get_response_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// `name: value` lines joined by CRLF.
    pub fn get_all_response_headers(&self) -> String {
        self.headers
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join("\r\n")
    }
}

pub fn build_jq_xhr(canonical: &CanonicalResponse) -> JqXhr {
    JqXhr {
        status: canonical.status,
        status_text: canonical.status_text.clone(),
        ready_state: JqXhr::DONE,
        response_text: canonical.body_text(),
        response_json: response_json(canonical),
        headers: canonical.headers.clone(),
    }
}

fn response_json(canonical: &CanonicalResponse) -> Option<Value> {
    if !is_json_content_type(&canonical.content_type()) {
        return None;
    }

    match &canonical.data {
        // A string means the body never decoded; try once more.
        Value::String(text) => match serde_json::from_str(text) {
            Ok(value) => Some(value),
            Err(_) => {
                debug!("responseJSON re-parse failed, leaving it unset");
                None
            }
        },
        // JSON null is object-typed for jQuery consumers, so it counts as parsed.
        other => Some(other.clone()),
    }
}
