//! Chat-completions error mapping.

use thiserror::Error;

/// Errors from the chat-completions backend.
#[derive(Error, Debug)]
pub enum LlmApiError {
    /// Request rejected as malformed (HTTP 400)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Missing, invalid or unauthorised key (HTTP 401/403)
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Quota or request rate exceeded (HTTP 429)
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Backend failure (HTTP 5xx)
    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("Request timeout")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    /// Response body did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl LlmApiError {
    /// Map a non-success HTTP status and its body onto an error.
    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            400 => Self::InvalidRequest(body),
            401 | 403 => Self::AuthenticationFailed(body),
            429 => Self::RateLimitExceeded,
            code @ 500..=599 => Self::ServerError(code, body),
            _ => Self::Unknown(format!("HTTP {status}: {body}")),
        }
    }

    /// Classify a transport failure.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }

    /// Whether the backend answered 429.
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimitExceeded)
    }
}
