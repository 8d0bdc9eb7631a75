use anyhow::{Context, Result};
use log::debug;
use std::path::PathBuf;
use std::time::Duration;

use crate::explain::{RetryPolicy, gemini};
use crate::market;
use crate::runtime::Runtime;

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Values supplied on the command line (or through clap's env fallbacks).
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub gemini_url: Option<String>,
    pub market_url: Option<String>,
    pub max_retries: Option<usize>,
    pub base_delay_ms: Option<u64>,
}

/// Resolved settings shared by all commands.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub api_key: Option<String>,
    pub model: String,
    pub gemini_url: String,
    pub market_url: String,
    /// Explainer attempts and backoff unit.
    pub retry: RetryPolicy,
}

impl Config {
    #[tracing::instrument(skip(runtime, overrides))]
    pub fn load<R: Runtime>(runtime: &R, overrides: ConfigOverrides) -> Result<Self> {
        let data_dir = match overrides.data_dir {
            Some(path) => path,
            None => default_data_dir(runtime)?,
        };

        let api_key = overrides
            .api_key
            .or_else(|| runtime.env_var(API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty());

        if let Some(key) = &api_key {
            debug!("Using {} for authentication: {}", API_KEY_ENV, mask(key));
        }

        let defaults = RetryPolicy::default();
        let retry = RetryPolicy {
            max_retries: overrides.max_retries.unwrap_or(defaults.max_retries),
            base_delay: overrides
                .base_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.base_delay),
        };

        Ok(Self {
            data_dir,
            api_key,
            model: overrides
                .model
                .unwrap_or_else(|| gemini::DEFAULT_MODEL.to_string()),
            gemini_url: overrides
                .gemini_url
                .unwrap_or_else(|| gemini::DEFAULT_API_URL.to_string()),
            market_url: overrides
                .market_url
                .unwrap_or_else(|| market::DEFAULT_API_URL.to_string()),
            retry,
        })
    }

    /// The API key, for commands that talk to the completion provider.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().with_context(|| {
            format!(
                "{} is not set. Export it or pass --api-key to use the explainer.",
                API_KEY_ENV
            )
        })
    }
}

/// `~/.sidekick`
#[tracing::instrument(skip(runtime))]
pub fn default_data_dir<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    let home_dir = runtime
        .home_dir()
        .context("Could not find home directory")?;
    Ok(home_dir.join(".sidekick"))
}

fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*********".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}*********{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;

    fn runtime_with_key(key: Option<&'static str>) -> MockRuntime {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_home_dir()
            .returning(|| Some(PathBuf::from("/home/user")));
        runtime
            .expect_env_var()
            .with(eq(API_KEY_ENV))
            .returning(move |_| {
                key.map(str::to_string)
                    .ok_or(std::env::VarError::NotPresent)
            });
        runtime
    }

    #[test]
    fn test_defaults() {
        let runtime = runtime_with_key(None);
        let config = Config::load(&runtime, ConfigOverrides::default()).unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/home/user/.sidekick"));
        assert_eq!(config.api_key, None);
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.gemini_url, gemini::DEFAULT_API_URL);
        assert_eq!(config.market_url, "https://api.coingecko.com/api/v3");
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.base_delay, Duration::from_secs(1));
        assert!(config.require_api_key().is_err());
    }

    #[test]
    fn test_api_key_from_environment() {
        let runtime = runtime_with_key(Some("AIzaSyExampleKey1234"));
        let config = Config::load(&runtime, ConfigOverrides::default()).unwrap();

        assert_eq!(config.require_api_key().unwrap(), "AIzaSyExampleKey1234");
    }

    #[test]
    fn test_overrides_win() {
        let mut runtime = MockRuntime::new();
        runtime.expect_home_dir().never();
        runtime.expect_env_var().never();

        let config = Config::load(
            &runtime,
            ConfigOverrides {
                data_dir: Some(PathBuf::from("/srv/sidekick")),
                api_key: Some("flag-key".to_string()),
                model: Some("gemini-2.0-pro".to_string()),
                gemini_url: Some("http://127.0.0.1:1".to_string()),
                market_url: Some("http://127.0.0.1:2".to_string()),
                max_retries: Some(5),
                base_delay_ms: Some(250),
            },
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/sidekick"));
        assert_eq!(config.api_key.as_deref(), Some("flag-key"));
        assert_eq!(config.model, "gemini-2.0-pro");
        assert_eq!(config.market_url, "http://127.0.0.1:2");
        assert_eq!(
            config.retry,
            RetryPolicy {
                max_retries: 5,
                base_delay: Duration::from_millis(250),
            }
        );
    }

    #[test]
    fn test_blank_api_key_is_ignored() {
        let runtime = runtime_with_key(Some("   "));
        let config = Config::load(&runtime, ConfigOverrides::default()).unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_missing_home_dir_fails() {
        let mut runtime = MockRuntime::new();
        runtime.expect_home_dir().returning(|| None);
        runtime
            .expect_env_var()
            .returning(|_| Err(std::env::VarError::NotPresent));

        assert!(Config::load(&runtime, ConfigOverrides::default()).is_err());
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask("AIzaSyExampleKey1234"), "AIza*********1234");
        assert_eq!(mask("short"), "*********");
    }
}
