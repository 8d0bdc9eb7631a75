//! Completion provider abstraction.

use async_trait::async_trait;
use std::fmt;

/// Failure reported by a completion provider.
///
/// Only the message is kept: callers classify failures by inspecting it, so
/// implementations must put the HTTP status (e.g. "503") into the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ProviderError {}

impl From<reqwest::Error> for ProviderError {
    /// Transport failures drop the request URL: host, port and model name
    /// would otherwise be matched as status codes.
    fn from(error: reqwest::Error) -> Self {
        let reason = if error.is_timeout() {
            "request timed out"
        } else if error.is_connect() {
            "connection failed"
        } else {
            "request failed"
        };
        ProviderError::new(format!("{}: {}", reason, error.without_url()))
    }
}

/// A text-generation backend: one prompt in, one complete text out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}
