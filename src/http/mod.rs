//! Market-data HTTP plumbing: a JSON client with retries and the
//! classification of failures that should not be retried.

mod client;
mod retry;

pub use client::HttpClient;
pub use retry::{MAX_ATTEMPTS, NonRetryableError, RETRY_DELAY, classify, non_retryable};
