//! Axum web server exposing the explainer over HTTP.
//!
//! - `POST /api/explain` - `{code, language?}` -> `{explanation}` or `{error}`
//! - `GET /api/explain` - 405 with a usage hint
//! - `GET /api/health`

use anyhow::Context;
use axum::{Json, Router, body::Bytes, extract::State, http::StatusCode, routing::get};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::explain::{Explainer, validate_code};

pub type SharedExplainer = Arc<Explainer>;

#[derive(Deserialize, Debug, Default)]
pub struct ExplainRequest {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct ExplainResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExplainResponse {
    fn ok(explanation: String) -> Self {
        Self {
            explanation: Some(explanation),
            error: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            explanation: None,
            error: Some(message.into()),
        }
    }
}

pub fn router(explainer: Explainer) -> Router {
    Router::new()
        .route("/api/explain", get(explain_get).post(explain_post))
        .route("/api/health", get(health))
        .with_state(Arc::new(explainer))
}

/// Serve the API until the process is stopped.
#[tracing::instrument(skip(explainer))]
pub async fn serve(explainer: Explainer, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(explainer)).await?;
    Ok(())
}

/// POST /api/explain
///
/// The body is parsed as JSON whatever its content type, so `curl -d` works.
async fn explain_post(
    State(explainer): State<SharedExplainer>,
    body: Bytes,
) -> (StatusCode, Json<ExplainResponse>) {
    let request: ExplainRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("rejected explain request: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(ExplainResponse::error("Invalid JSON body")),
            );
        }
    };

    let code = request.code.unwrap_or_default();
    if let Err(e) = validate_code(&code) {
        return (StatusCode::BAD_REQUEST, Json(ExplainResponse::error(e.to_string())));
    }

    let language = request
        .language
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty());

    match explainer.explain(&code, language).await {
        Ok(explanation) => (StatusCode::OK, Json(ExplainResponse::ok(explanation))),
        Err(e) => {
            warn!(
                "explain failed after {} attempt(s): {} ({})",
                e.attempts(),
                e,
                e.cause()
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ExplainResponse::error(e.to_string())),
            )
        }
    }
}

/// GET /api/explain
async fn explain_get() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(serde_json::json!({ "message": "Use POST method to explain code" })),
    )
}

/// GET /api/health
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "sidekick"
    }))
}
