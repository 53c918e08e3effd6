//! Bridge configuration.
//!
//! `BridgeConfig` controls how requests are prepared and how the bridge
//! behaves on the page side: the defaults injected into outgoing requests,
//! the timeout applied when a caller does not specify one, and whether the
//! bridge runs in *silent* mode.
//!
//! `BridgeConfig` provides sensible defaults via [`Default`] and a fluent
//! [`BridgeConfig::builder()`] for customization with validation.
//!
//! # Examples
//!
//! ## Use defaults
//! ```rust
//! use cross_request::config::BridgeConfig;
//! let cfg = BridgeConfig::default();
//! assert_eq!(cfg.default_timeout.as_millis(), 30_000);
//! ```
//!
//! ## Customize with the builder
//! ```rust
//! use std::time::Duration;
//! use cross_request::config::BridgeConfig;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = BridgeConfig::builder()
//!     .default_timeout(Duration::from_secs(5))
//!     .user_agent("CrossRequest/0.1")
//!     .silent(true)
//!     .build()?; // returns Result<BridgeConfig, BridgeConfigError>
//! # Ok(()) }
//! ```
//!
//! # Fields (summary)
//! - `default_timeout`: Timeout for requests that do not carry one (default: 30s).
//! - `user_agent`: `User-Agent` injected when the caller did not set one.
//! - `accept`: `Accept` injected when the caller did not set one.
//! - `silent`: Silent mode. No cURL echo, no HTTP error warnings, and jQuery
//!   interception becomes opt-in.
//! - `channel_capacity`: Capacity of the request and reply channels.
//! - `preview`: Limits for body previews in the logs.
//! - `log_level`: Level used by [`init_logging`].
//!
//! # Errors
//!
//! Builder validation can return [`BridgeConfigError`] if values are invalid
//! (e.g. a zero timeout, a zero channel capacity or an empty user agent).

use std::fmt;
use std::time::Duration;

use crate::net::preview::PreviewLimits;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) CrossRequest/0.1";
pub const DEFAULT_ACCEPT: &str = "application/json, text/plain, */*";
pub const DEFAULT_CHANNEL_CAPACITY: usize = 32;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Initializes `env_logger` at the given level. `RUST_LOG` takes precedence when set.
pub fn init_logging(level: LogLevel) -> Result<(), log::SetLoggerError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str()))
        .format_timestamp_millis()
        .try_init()
}

#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    pub default_timeout: Duration,
    pub user_agent: String,
    pub accept: String,
    pub silent: bool,
    pub channel_capacity: usize,
    pub preview: PreviewLimits,
    pub log_level: LogLevel,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            default_timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            silent: false,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            preview: PreviewLimits::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl BridgeConfig {
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::default()
    }

    /// Checks a config that was assembled by hand rather than through the builder.
    pub fn validate(&self) -> Result<(), BridgeConfigError> {
        validate(self)
    }
}

/// Builder for [`BridgeConfig`].
#[derive(Debug, Clone, Default)]
pub struct BridgeConfigBuilder {
    inner: BridgeConfig,
}

impl BridgeConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut BridgeConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn default_timeout(self, timeout: Duration) -> Self { self.map(|c| c.default_timeout = timeout) }
    pub fn user_agent<S: Into<String>>(self, ua: S) -> Self { self.map(|c| c.user_agent = ua.into()) }
    pub fn accept<S: Into<String>>(self, accept: S) -> Self { self.map(|c| c.accept = accept.into()) }
    pub fn silent(self, on: bool) -> Self { self.map(|c| c.silent = on) }
    pub fn channel_capacity(self, n: usize) -> Self { self.map(|c| c.channel_capacity = n) }
    pub fn preview(self, limits: PreviewLimits) -> Self { self.map(|c| c.preview = limits) }
    pub fn log_level(self, level: LogLevel) -> Self { self.map(|c| c.log_level = level) }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut BridgeConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<BridgeConfig, BridgeConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq)]
pub enum BridgeConfigError {
    ZeroTimeout,
    ZeroChannelCapacity,
    EmptyUserAgent,
}

impl fmt::Display for BridgeConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeConfigError::ZeroTimeout =>
                write!(f, "default_timeout must be greater than zero"),
            BridgeConfigError::ZeroChannelCapacity =>
                write!(f, "channel_capacity must be at least 1"),
            BridgeConfigError::EmptyUserAgent =>
                write!(f, "user_agent must not be empty"),
        }
    }
}
impl std::error::Error for BridgeConfigError {}

fn validate(c: &BridgeConfig) -> Result<(), BridgeConfigError> {
    if c.default_timeout.is_zero() {
        return Err(BridgeConfigError::ZeroTimeout);
    }
    if c.channel_capacity == 0 {
        return Err(BridgeConfigError::ZeroChannelCapacity);
    }
    if c.user_agent.trim().is_empty() {
        return Err(BridgeConfigError::EmptyUserAgent);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = BridgeConfig::builder().build().unwrap();
        assert_eq!(cfg, BridgeConfig::default());
        assert_eq!(cfg.default_timeout, Duration::from_secs(30));
        assert_eq!(cfg.accept, "application/json, text/plain, */*");
        assert!(!cfg.silent);
    }

    #[test]
    fn builder_applies_changes() {
        let cfg = BridgeConfig::builder()
            .default_timeout(Duration::from_millis(250))
            .user_agent("Test/1.0")
            .silent(true)
            .with(|c| c.channel_capacity = 4)
            .build()
            .unwrap();

        assert_eq!(cfg.default_timeout.as_millis(), 250);
        assert_eq!(cfg.user_agent, "Test/1.0");
        assert!(cfg.silent);
        assert_eq!(cfg.channel_capacity, 4);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let err = BridgeConfig::builder().default_timeout(Duration::ZERO).build().unwrap_err();
        assert_eq!(err, BridgeConfigError::ZeroTimeout);

        let err = BridgeConfig::builder().channel_capacity(0).build().unwrap_err();
        assert_eq!(err, BridgeConfigError::ZeroChannelCapacity);

        let err = BridgeConfig::builder().user_agent("  ").build().unwrap_err();
        assert_eq!(err.to_string(), "user_agent must not be empty");
    }

    #[test]
    fn log_level_maps_to_filter() {
        assert_eq!(log::LevelFilter::from(LogLevel::Warn), log::LevelFilter::Warn);
        assert_eq!(LogLevel::default().as_str(), "info");
    }
}
