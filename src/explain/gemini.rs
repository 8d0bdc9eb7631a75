//! Google Gemini `generateContent` provider.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use super::provider::{CompletionProvider, ProviderError};

pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Gemini API wire types (internal).
mod api {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Debug)]
    pub struct GenerateRequest<'a> {
        pub contents: Vec<Content<'a>>,
    }

    #[derive(Serialize, Debug)]
    pub struct Content<'a> {
        pub parts: Vec<Part<'a>>,
    }

    #[derive(Serialize, Debug)]
    pub struct Part<'a> {
        pub text: &'a str,
    }

    impl<'a> GenerateRequest<'a> {
        pub fn from_prompt(prompt: &'a str) -> Self {
            Self {
                contents: vec![Content {
                    parts: vec![Part { text: prompt }],
                }],
            }
        }
    }

    #[derive(Deserialize, Debug, Default)]
    #[serde(default)]
    pub struct GenerateResponse {
        pub candidates: Vec<Candidate>,
    }

    #[derive(Deserialize, Debug, Default)]
    #[serde(default)]
    pub struct Candidate {
        pub content: CandidateContent,
    }

    #[derive(Deserialize, Debug, Default)]
    #[serde(default)]
    pub struct CandidateContent {
        pub parts: Vec<CandidatePart>,
    }

    #[derive(Deserialize, Debug, Default)]
    #[serde(default)]
    pub struct CandidatePart {
        pub text: Option<String>,
    }

    impl GenerateResponse {
        /// Text of the first candidate; empty when the model returned none.
        pub fn text(self) -> String {
            self.candidates
                .into_iter()
                .next()
                .map(|c| {
                    c.content
                        .parts
                        .into_iter()
                        .filter_map(|p| p.text)
                        .collect::<String>()
                })
                .unwrap_or_default()
        }
    }

    #[derive(Deserialize, Debug)]
    pub struct ErrorBody {
        pub error: ErrorDetail,
    }

    #[derive(Deserialize, Debug)]
    pub struct ErrorDetail {
        pub message: String,
    }
}

/// Completion provider backed by the Gemini REST API.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    api_url: String,
}

impl GeminiProvider {
    pub fn new(
        client: Client,
        api_key: impl Into<String>,
        model: impl Into<String>,
        api_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            api_url: api_url.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    #[tracing::instrument(skip(self, prompt), fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let url = self.endpoint();
        debug!("POST {} ({} prompt bytes)", url, prompt.len());

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&api::GenerateRequest::from_prompt(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // e.g. "[503 Service Unavailable] The model is overloaded."
            return Err(ProviderError::new(format!(
                "[{}] {}",
                status,
                error_detail(&body)
            )));
        }

        let parsed: api::GenerateResponse = response.json().await?;
        Ok(parsed.text())
    }
}

/// The API wraps failures as `{"error": {"message": ...}}`; anything else is passed through.
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<api::ErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body.trim().to_string(),
    }
}
