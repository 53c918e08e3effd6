//! Bounded body previews for the logs.
//!
//! Response bodies can be arbitrarily large. Before a body is written to the
//! log it goes through [`safe_preview`], which returns the body untouched when
//! it is small enough, or a summary object with the head and tail of its text
//! otherwise.

use serde_json::{json, Value};

use crate::normalize::stringify_body;

const TRUNCATED_HINT: &str = "响应体过大，已截断显示";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewLimits {
    /// Bodies up to this many UTF-8 bytes are logged as-is.
    pub max_bytes: usize,
    /// Characters kept from the start of a truncated body.
    pub head_chars: usize,
    /// Characters kept from the end of a truncated body. `0` drops the tail.
    pub tail_chars: usize,
}

impl Default for PreviewLimits {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024,
            head_chars: 512,
            tail_chars: 512,
        }
    }
}

pub fn safe_preview(body: &Value, limits: &PreviewLimits) -> Value {
    let text = stringify_body(body);
    let size = text.len();
    if size <= limits.max_bytes {
        return body.clone();
    }

    let head: String = text.chars().take(limits.head_chars).collect();
    let tail: String = if limits.tail_chars > 0 {
        let total = text.chars().count();
        text.chars().skip(total.saturating_sub(limits.tail_chars)).collect()
    } else {
        String::new()
    };

    json!({
        "truncated": true,
        "size": format!("{size} bytes"),
        "head": head,
        "tail": tail,
        "hint": TRUNCATED_HINT,
    })
}
