//! Configuration error types.

use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Port value is outside valid range (1-65535).
    #[error("invalid port '{value}': must be between 1 and 65535")]
    InvalidPort { value: String },

    /// Port string could not be parsed as a number.
    #[error("failed to parse port '{value}': {source}")]
    PortParseError {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Bind address string could not be parsed.
    #[error("failed to parse bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// Neither `OPENAI_API_KEY` nor `GOOGLE_API_KEY` is set.
    #[error("no source adapters configured: set OPENAI_API_KEY and/or GOOGLE_API_KEY")]
    NoAdaptersConfigured,

    #[error("invalid short-circuit threshold '{value}': must be a number between 0 and 1")]
    InvalidThreshold { value: String },

    #[error("invalid adapter timeout '{value}': must be whole seconds")]
    InvalidTimeout { value: String },

    #[error("{name} must be at least 1")]
    InvalidConcurrency { name: &'static str },

    #[error("invalid fact-check URL '{value}': {reason}")]
    InvalidUrl { value: String, reason: String },
}
