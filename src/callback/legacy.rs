use serde::Serialize;
use serde_json::Value;

use crate::net::Headers;
use crate::normalize::{CanonicalResponse, DEFAULT_STATUS_TEXT};

/// The `res` part of the full payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResPayload {
    pub body: Value,
    pub header: Headers,
    pub status: u16,
    pub status_text: String,
    pub success: bool,
}

/// Third callback argument. The consumer reads either `res.*` or the top-level
/// copies depending on its code path, so both are filled.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FullPayload {
    pub res: ResPayload,
    pub status: u16,
    pub status_text: String,
    pub success: bool,
}

impl FullPayload {
    pub fn new<S: Into<String>>(body: Value, header: Headers, status: u16, status_text: S, success: bool) -> Self {
        let status_text = status_text.into();
        Self {
            res: ResPayload {
                body,
                header,
                status,
                status_text: status_text.clone(),
                success,
            },
            status,
            status_text,
            success,
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegacyParams {
    /// First argument: decoded data for JSON responses, body text otherwise.
    pub primary: Value,
    pub header_map: Headers,
    pub full_payload: FullPayload,
}

pub fn build_legacy_params(canonical: &CanonicalResponse) -> LegacyParams {
    let primary = if canonical.is_json() {
        canonical.data.clone()
    } else {
        Value::String(canonical.body_text())
    };

    let status_text = if canonical.status_text.is_empty() {
        DEFAULT_STATUS_TEXT
    } else {
        canonical.status_text.as_str()
    };

    // Only completed exchanges get here, so `success` holds whatever the status code.
    let full_payload = FullPayload::new(
        canonical.body.clone(),
        canonical.headers.clone(),
        canonical.status,
        status_text,
        true,
    );

    LegacyParams {
        primary,
        header_map: canonical.headers.clone(),
        full_payload,
    }
}
