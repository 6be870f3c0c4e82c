use thiserror::Error;

/// Failures inside a source adapter.
///
/// Only [`AdapterError::MissingCredential`] ever reaches a caller (at
/// construction). Everything else is folded into a `no_data` verdict.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("missing credential: {name} is empty")]
    MissingCredential { name: &'static str },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned status {status}")]
    Status { status: u16 },

    #[error("malformed provider response: {reason}")]
    MalformedResponse { reason: String },

    #[error("model call failed: {0}")]
    Model(String),

    #[error("malformed model reply: {reason}")]
    MalformedReply { reason: String },
}

pub type AdapterResult<T> = Result<T, AdapterError>;
