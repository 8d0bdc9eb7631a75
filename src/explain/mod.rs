//! Code explanation through a completion provider.
//!
//! [`Explainer`] turns a snippet into a prompt, asks the provider for an
//! explanation and retries transient provider failures with exponential
//! backoff. Each call owns its attempt counter and last error; nothing is
//! shared between concurrent calls except the immutable provider handle.
//!
//! # Structure
//!
//! - `classify` - Failure kinds derived from provider error messages
//! - `prompt` - Prompt template
//! - `provider` - Provider trait and error type
//! - `gemini` - Gemini REST implementation of the provider
//! - `validate` - Input checks applied before the explainer is called
//! - `language` - Heuristic language detection

mod classify;
pub mod gemini;
mod language;
mod prompt;
mod provider;
mod validate;

use log::{debug, info, warn};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub use classify::ErrorKind;
pub use gemini::GeminiProvider;
pub use language::{PLAIN_TEXT, detect_language};
pub use prompt::build_prompt;
pub use provider::{CompletionProvider, ProviderError};
pub use validate::{MAX_CODE_CHARS, ValidationError, validate_code};

#[cfg(test)]
pub use provider::MockCompletionProvider;

/// Total number of provider attempts per call.
pub const MAX_RETRIES: usize = 3;

/// Unit of the exponential backoff; attempt `n` waits `BASE_DELAY * 2^(n+1)`.
pub const BASE_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            base_delay: BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Wait after a retryable failure of `attempt` (0-based): 2s, 4s, 8s with the defaults.
    pub fn backoff(&self, attempt: usize) -> Duration {
        let exponent = u32::try_from(attempt + 1).unwrap_or(u32::MAX).min(31);
        self.base_delay.saturating_mul(1u32 << exponent)
    }
}

/// Final failure of an [`Explainer::explain`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplainError {
    kind: ErrorKind,
    attempts: usize,
    cause: String,
}

impl ExplainError {
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Provider calls made before giving up.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Raw message of the last provider failure.
    pub fn cause(&self) -> &str {
        &self.cause
    }
}

impl fmt::Display for ExplainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.user_message())
    }
}

impl std::error::Error for ExplainError {}

/// Retrying front end over a [`CompletionProvider`].
#[derive(Clone)]
pub struct Explainer {
    provider: Arc<dyn CompletionProvider>,
    policy: RetryPolicy,
}

impl Explainer {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self::with_policy(provider, RetryPolicy::default())
    }

    pub fn with_policy(provider: Arc<dyn CompletionProvider>, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Explains `code`, optionally framed for `language`.
    ///
    /// The code is expected to be validated already (see [`validate_code`]).
    /// Returns the first successful provider response, even if it is empty.
    #[tracing::instrument(skip(self, code), fields(code_bytes = code.len()))]
    pub async fn explain(&self, code: &str, language: Option<&str>) -> Result<String, ExplainError> {
        let prompt = build_prompt(code, language);
        let max_retries = self.policy.max_retries;
        let mut last_error: Option<(ErrorKind, ProviderError)> = None;
        let mut attempts = 0;

        for attempt in 0..max_retries {
            attempts = attempt + 1;

            match self.provider.generate(&prompt).await {
                Ok(text) => {
                    debug!("explanation received on attempt {}/{}", attempts, max_retries);
                    return Ok(text);
                }
                Err(e) => {
                    let kind = ErrorKind::classify(e.message());
                    warn!(
                        "completion attempt {}/{} failed ({}): {}",
                        attempts, max_retries, kind, e
                    );

                    let retry = kind.is_retryable() && attempt < max_retries - 1;
                    last_error = Some((kind, e));

                    if !retry {
                        break;
                    }

                    let delay = self.policy.backoff(attempt);
                    info!("waiting {}ms before retry...", delay.as_millis());
                    tokio::time::sleep(delay).await;
                }
            }
        }

        let (kind, cause) = match last_error {
            Some((kind, e)) => (kind, e.message().to_string()),
            None => (ErrorKind::Unknown, "no attempts were made".to_string()),
        };

        Err(ExplainError {
            kind,
            attempts,
            cause,
        })
    }
}
