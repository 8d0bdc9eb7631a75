//! Service factory for building command dependencies.
//!
//! Clients are built from configuration values but are not part of the
//! configuration itself.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;

use crate::explain::{Explainer, GeminiProvider};
use crate::market::CoinGecko;

use super::config::Config;

/// Completion calls can take a while for long snippets.
pub const PROVIDER_TIMEOUT: Duration = Duration::from_secs(60);

pub const MARKET_TIMEOUT: Duration = Duration::from_secs(10);

/// Build a reqwest client with the crate's user agent and a request timeout
pub fn build_http_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .user_agent(concat!("sidekick-cli/", env!("SIDEKICK_VERSION")))
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// Build the explainer backed by Gemini; fails without an API key
pub fn build_explainer(config: &Config) -> Result<Explainer> {
    let api_key = config.require_api_key()?;
    let provider = GeminiProvider::new(
        build_http_client(PROVIDER_TIMEOUT)?,
        api_key,
        config.model.as_str(),
        config.gemini_url.as_str(),
    );
    Ok(Explainer::with_policy(Arc::new(provider), config.retry))
}

/// Build the market-data client
pub fn build_market(config: &Config) -> Result<CoinGecko> {
    let client = build_http_client(MARKET_TIMEOUT)?;
    Ok(CoinGecko::with_api_url(client, &config.market_url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explain::RetryPolicy;
    use std::path::PathBuf;

    fn config(api_key: Option<&str>) -> Config {
        Config {
            data_dir: PathBuf::from("/tmp/sidekick"),
            api_key: api_key.map(str::to_string),
            model: "gemini-2.5-flash".to_string(),
            gemini_url: "http://127.0.0.1:9".to_string(),
            market_url: "http://127.0.0.1:9/api/v3/".to_string(),
            retry: RetryPolicy::default(),
        }
    }

    #[test]
    fn test_build_explainer_requires_key() {
        let err = build_explainer(&config(None)).err().unwrap();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
        assert!(build_explainer(&config(Some("key"))).is_ok());
    }

    #[test]
    fn test_build_explainer_uses_configured_retry_policy() {
        let retry = RetryPolicy {
            max_retries: 1,
            base_delay: Duration::from_millis(20),
        };
        let config = Config {
            retry,
            ..config(Some("key"))
        };

        let explainer = build_explainer(&config).unwrap();
        assert_eq!(explainer.policy(), retry);
    }

    #[test]
    fn test_build_market_uses_configured_url() {
        let market = build_market(&config(None)).unwrap();
        assert_eq!(market.api_url(), "http://127.0.0.1:9/api/v3");
    }

    #[tokio::test]
    async fn test_http_client_sends_user_agent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_header(
                "user-agent",
                mockito::Matcher::Regex("^sidekick-cli/".to_string()),
            )
            .create_async()
            .await;

        let client = build_http_client(MARKET_TIMEOUT).unwrap();
        let _ = client.get(server.url()).send().await;

        mock.assert_async().await;
    }
}
