//! Which market-data failures are worth another attempt.

use reqwest::StatusCode;
use std::fmt;
use std::time::Duration;

/// Attempts per request, the first one included.
pub const MAX_ATTEMPTS: usize = 3;

pub const RETRY_DELAY: Duration = Duration::from_secs(1);

/// A failure that will not go away by asking again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NonRetryableError {
    /// HTTP 429. The public API only allows a few calls per minute.
    RateLimited,
    /// HTTP 404, with the request path.
    NotFound(String),
    /// Any other 4xx.
    Rejected(u16),
}

impl fmt::Display for NonRetryableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NonRetryableError::RateLimited => write!(
                f,
                "Rate limit exceeded for the market data API. Wait a minute and try again."
            ),
            NonRetryableError::NotFound(path) => write!(f, "Not found: {}", path),
            NonRetryableError::Rejected(code) => write!(f, "Request rejected with HTTP {}", code),
        }
    }
}

impl std::error::Error for NonRetryableError {}

/// Maps a failed status to a permanent error, or `None` when a retry may help (5xx).
pub fn non_retryable(status: StatusCode, path: &str) -> Option<NonRetryableError> {
    match status {
        StatusCode::TOO_MANY_REQUESTS => Some(NonRetryableError::RateLimited),
        StatusCode::NOT_FOUND => Some(NonRetryableError::NotFound(path.to_string())),
        s if s.is_client_error() => Some(NonRetryableError::Rejected(s.as_u16())),
        _ => None,
    }
}

/// Converts an `error_for_status` failure into what the retry loop sees.
/// Transient failures keep their `reqwest::Error` so they are retried.
pub fn classify(error: reqwest::Error) -> anyhow::Error {
    let path = error.url().map(|u| u.path().to_string()).unwrap_or_default();
    match error.status().and_then(|s| non_retryable(s, &path)) {
        Some(permanent) => permanent.into(),
        None => error.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            non_retryable(StatusCode::TOO_MANY_REQUESTS, "/coins/markets"),
            Some(NonRetryableError::RateLimited)
        );
        assert_eq!(
            non_retryable(StatusCode::NOT_FOUND, "/coins/nope/market_chart"),
            Some(NonRetryableError::NotFound("/coins/nope/market_chart".to_string()))
        );
        assert_eq!(
            non_retryable(StatusCode::UNAUTHORIZED, "/"),
            Some(NonRetryableError::Rejected(401))
        );
        assert_eq!(non_retryable(StatusCode::BAD_GATEWAY, "/"), None);
        assert_eq!(non_retryable(StatusCode::SERVICE_UNAVAILABLE, "/"), None);
    }

    #[test]
    fn test_display() {
        assert!(
            NonRetryableError::RateLimited
                .to_string()
                .contains("Wait a minute")
        );
        assert_eq!(
            NonRetryableError::NotFound("/coins/x".to_string()).to_string(),
            "Not found: /coins/x"
        );
        assert_eq!(
            NonRetryableError::Rejected(400).to_string(),
            "Request rejected with HTTP 400"
        );
    }

    #[tokio::test]
    async fn test_classify_keeps_transient_errors() {
        let mut server = mockito::Server::new_async().await;
        let _gone = server
            .mock("GET", "/gone")
            .with_status(404)
            .create_async()
            .await;
        let _busy = server
            .mock("GET", "/busy")
            .with_status(503)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let status_error = |path: &'static str| {
            let client = client.clone();
            let url = format!("{}{}", server.url(), path);
            async move {
                client
                    .get(url)
                    .send()
                    .await
                    .unwrap()
                    .error_for_status()
                    .unwrap_err()
            }
        };

        let err = classify(status_error("/gone").await);
        assert_eq!(
            err.downcast_ref::<NonRetryableError>(),
            Some(&NonRetryableError::NotFound("/gone".to_string()))
        );

        let err = classify(status_error("/busy").await);
        assert!(err.downcast_ref::<NonRetryableError>().is_none());
        assert!(err.downcast_ref::<reqwest::Error>().is_some());
    }
}
