use crate::bridge::RequestId;
use crate::config::BridgeConfigError;
use crate::net::TransportError;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Bridge channel closed")]
    ChannelClosed,

    #[error("Unknown request ID: {0}")]
    UnknownRequest(RequestId),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Configuration error: {0}")]
    Config(#[from] BridgeConfigError),

    #[error("Pending request table is poisoned")]
    Poisoned,
}

impl BridgeError {
    /// Message shown to legacy consumers when a request could not complete.
    pub fn user_message(&self) -> String {
        match self {
            BridgeError::Transport(e) => e.user_message(),
            other => format!("请求失败：{other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_keep_their_wording() {
        let err: BridgeError = TransportError::Abort { timeout_ms: 500 }.into();
        assert_eq!(err.user_message(), "请求超时 (500ms)");
        assert!(err.to_string().contains("500ms"));
    }

    #[test]
    fn other_errors_are_prefixed() {
        let err = BridgeError::ChannelClosed;
        assert_eq!(err.user_message(), "请求失败：Bridge channel closed");

        let err = BridgeError::UnknownRequest(RequestId::new(7));
        assert_eq!(err.to_string(), "Unknown request ID: request-7");
    }
}
