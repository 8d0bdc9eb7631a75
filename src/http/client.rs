//! JSON GET client that retries transient failures.

use anyhow::{Context, Result};
use log::{debug, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;

use super::retry::{MAX_ATTEMPTS, NonRetryableError, RETRY_DELAY, classify};

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    attempts: usize,
    delay: Duration,
}

impl HttpClient {
    /// Three attempts, one second apart.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            attempts: MAX_ATTEMPTS,
            delay: RETRY_DELAY,
        }
    }

    /// Overrides the retry schedule. `attempts` is clamped to at least one.
    pub fn with_backoff(mut self, attempts: usize, delay: Duration) -> Self {
        self.attempts = attempts.max(1);
        self.delay = delay;
        self
    }

    /// GET `url` with `query` and decode the JSON body.
    ///
    /// Connection failures, timeouts and 5xx responses are retried; 4xx
    /// responses fail at once with a [`NonRetryableError`].
    #[tracing::instrument(skip(self, query))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        self.retrying(url, move || self.fetch_json(url, query)).await
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        debug!("GET {} {:?}", url, query);
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .context("Failed to send request")?
            .error_for_status()
            .map_err(classify)?;

        response
            .json::<T>()
            .await
            .context("Failed to parse JSON response")
    }

    async fn retrying<F, Fut, T>(&self, what: &str, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if err.is::<NonRetryableError>() || attempt >= self.attempts {
                return Err(err);
            }

            warn!(
                "{}: attempt {}/{} failed ({:#}), retrying in {:?}",
                what, attempt, self.attempts, err, self.delay
            );
            tokio::time::sleep(self.delay).await;
            attempt += 1;
        }
    }
}
