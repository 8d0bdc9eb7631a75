//! Classification of completion-provider failures.
//!
//! The provider only gives us an error message, so the kind is derived from
//! substrings of that message. Checks run in a fixed order and the first match
//! wins: a message mentioning both "429" and "503" is `Overloaded`.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// "503" or "overloaded"
    Overloaded,
    /// "429" or "quota"
    RateLimited,
    /// "400"
    InvalidRequest,
    Unknown,
}

impl ErrorKind {
    pub fn classify(message: &str) -> Self {
        if message.contains("503") || message.contains("overloaded") {
            ErrorKind::Overloaded
        } else if message.contains("429") || message.contains("quota") {
            ErrorKind::RateLimited
        } else if message.contains("400") {
            ErrorKind::InvalidRequest
        } else {
            ErrorKind::Unknown
        }
    }

    /// Only transient provider conditions are worth another attempt.
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Overloaded | ErrorKind::RateLimited)
    }

    /// Message surfaced to the caller once retrying has stopped.
    pub fn user_message(self) -> &'static str {
        match self {
            ErrorKind::Overloaded => "provider overloaded, retry later",
            ErrorKind::RateLimited => "rate limit exceeded, retry later",
            ErrorKind::InvalidRequest => "invalid request, code too long or malformed",
            ErrorKind::Unknown => "failed to generate code explanation",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Overloaded => write!(f, "overloaded"),
            ErrorKind::RateLimited => write!(f, "rate-limited"),
            ErrorKind::InvalidRequest => write!(f, "invalid-request"),
            ErrorKind::Unknown => write!(f, "unknown"),
        }
    }
}
