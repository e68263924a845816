//! Completion proxy server
//!
//! Holds the upstream API key on the server side so the interactive editor
//! never sees it. Accepts `POST /v1/complete {"prompt"}` and forwards it as
//! an OpenAI-compatible chat completion, answering `{"text"}` or
//! `{"error"}`.

use super::completion::{CompletionRequest, CompletionResponse, ErrorBody};
use crate::config::ProxyConfig;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, info, instrument, warn};

/// Largest prompt the proxy will forward
pub const MAX_PROMPT_BYTES: usize = 16 * 1024;

const SYSTEM_PROMPT: &str =
    "You are a product analyst. Answer only with the JSON object the user asks for.";

/// Errors surfaced by the proxy to its clients
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("{0}")]
    BadRequest(String),

    #[error("upstream request failed: {0}")]
    Upstream(String),

    #[error("upstream returned HTTP {status}: {message}")]
    UpstreamStatus { status: u16, message: String },

    #[error("upstream returned no choices")]
    EmptyCompletion,
}

impl ProxyError {
    fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::Upstream(_)
            | ProxyError::UpstreamStatus { .. }
            | ProxyError::EmptyCompletion => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

// ============================================================================
// Upstream (OpenAI-compatible) wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpstreamError {
    error: UpstreamErrorDetail,
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorDetail {
    message: String,
}

// ============================================================================
// Server
// ============================================================================

/// Shared proxy state
pub struct ProxyState {
    http: reqwest::Client,
    config: ProxyConfig,
    api_key: String,
}

impl ProxyState {
    pub fn new(config: ProxyConfig, api_key: String) -> Result<Self, ProxyError> {
        let http = reqwest::Client::builder()
            .user_agent(format!("compare-tui-proxy/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .build()
            .map_err(|e| ProxyError::Upstream(e.to_string()))?;

        Ok(Self {
            http,
            config,
            api_key,
        })
    }

    /// Forward a prompt to the upstream chat-completions API
    async fn forward(&self, prompt: &str) -> Result<String, ProxyError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .http
            .post(&self.config.upstream_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProxyError::Upstream(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<UpstreamError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ProxyError::UpstreamStatus {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProxyError::Upstream(format!("undecodable response: {}", e)))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ProxyError::EmptyCompletion)
    }
}

/// Build the proxy router
pub fn router(state: Arc<ProxyState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/complete", post(complete))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[instrument(skip_all)]
async fn complete(
    State(state): State<Arc<ProxyState>>,
    Json(request): Json<CompletionRequest>,
) -> Result<Json<CompletionResponse>, ProxyError> {
    let prompt = request.prompt.trim();
    debug!(prompt_len = prompt.len(), "completion requested");
    if prompt.is_empty() {
        return Err(ProxyError::BadRequest("prompt must not be empty".to_string()));
    }
    if prompt.len() > MAX_PROMPT_BYTES {
        return Err(ProxyError::BadRequest(format!(
            "prompt exceeds {} bytes",
            MAX_PROMPT_BYTES
        )));
    }

    match state.forward(prompt).await {
        Ok(text) => {
            info!(text_len = text.len(), "completion forwarded");
            Ok(Json(CompletionResponse { text }))
        }
        Err(e) => {
            warn!(error = %e, "completion failed");
            Err(e)
        }
    }
}

/// Bind and serve until Ctrl+C
pub async fn serve(config: ProxyConfig, api_key: String) -> anyhow::Result<()> {
    let listen = config.listen.clone();
    let state = Arc::new(ProxyState::new(config, api_key)?);

    let listener = TcpListener::bind(&listen).await?;
    info!(addr = %listener.local_addr()?, "completion proxy listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for shutdown signal");
            }
        })
        .await?;

    info!("completion proxy stopped");
    Ok(())
}
