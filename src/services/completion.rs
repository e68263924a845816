//! Completion service client
//!
//! The editor never holds an upstream API key. It talks to a completion
//! endpoint (normally the `compare-tui proxy` server) through the
//! [`CompletionService`] trait so the app can be handed any implementation
//! at startup, including fakes in tests.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from a completion request
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("network error: {0}")]
    Network(String),

    #[error("completion service returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("invalid response from completion service: {0}")]
    InvalidResponse(String),
}

/// Something that turns a prompt into a text completion
pub trait CompletionService: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// Request body of the completion endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub prompt: String,
}

/// Successful response body of the completion endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub text: String,
}

/// Error response body of the completion endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Blocking HTTP client for the completion endpoint
///
/// Intended to be called from a background thread, never the event loop.
pub struct HttpCompletionClient {
    http: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpCompletionClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, CompletionError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("compare-tui/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl CompletionService for HttpCompletionClient {
    fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        debug!(endpoint = %self.endpoint, prompt_len = prompt.len(), "sending completion request");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&CompletionRequest {
                prompt: prompt.to_string(),
            })
            .send()
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body);
            warn!(status = status.as_u16(), %message, "completion request failed");
            return Err(CompletionError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body: CompletionResponse = response
            .json()
            .map_err(|e| CompletionError::InvalidResponse(e.to_string()))?;

        debug!(text_len = body.text.len(), "completion received");
        Ok(body.text)
    }
}

/// Build the generation prompt for a product description
pub fn build_prompt(description: &str) -> String {
    format!(
        r#"You build feature comparison tables.

Compare two vendors for the following product or need:
{description}

Return ONLY a JSON object, with no surrounding text and no Markdown fences, shaped exactly like:
{{"headers": ["Feature", "<vendor 1 name>", "<vendor 2 name>"],
 "rows": [{{"feature": "<feature name>", "kind": "text", "vendor1": "<value>", "vendor2": "<value>"}}]}}

Rules:
- "kind" is one of "text", "number" or "currency" and applies to both vendor values of the row
- For "number" and "currency" rows, vendor values are plain decimal numbers without symbols or separators
- Include between 5 and 12 rows"#,
        description = description.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client_for(server: &MockServer) -> HttpCompletionClient {
        HttpCompletionClient::new(server.url("/v1/complete"), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_complete_returns_text() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/complete")
                .json_body(serde_json::json!({ "prompt": "compare CRMs" }));
            then.status(200)
                .json_body(serde_json::json!({ "text": "{\"headers\": []}" }));
        });

        let text = client_for(&server).complete("compare CRMs").unwrap();

        mock.assert();
        assert_eq!(text, "{\"headers\": []}");
    }

    #[test]
    fn test_http_error_uses_error_body_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/complete");
            then.status(502)
                .json_body(serde_json::json!({ "error": "upstream timed out" }));
        });

        let err = client_for(&server).complete("x").unwrap_err();
        match err {
            CompletionError::Http { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream timed out");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_http_error_with_plain_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/complete");
            then.status(500).body("boom");
        });

        let err = client_for(&server).complete("x").unwrap_err();
        assert!(matches!(
            err,
            CompletionError::Http { status: 500, ref message } if message == "boom"
        ));
    }

    #[test]
    fn test_unexpected_body_is_invalid_response() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/complete");
            then.status(200).body("<html>not json</html>");
        });

        let err = client_for(&server).complete("x").unwrap_err();
        assert!(matches!(err, CompletionError::InvalidResponse(_)));
    }

    #[test]
    fn test_unreachable_endpoint_is_network_error() {
        // Port 9 (discard) is essentially never listening on localhost
        let client =
            HttpCompletionClient::new("http://127.0.0.1:9/v1/complete", Duration::from_secs(2))
                .unwrap();
        let err = client.complete("x").unwrap_err();
        assert!(matches!(err, CompletionError::Network(_)));
    }

    #[test]
    fn test_prompt_mentions_description_and_kinds() {
        let prompt = build_prompt("  project management tools for small teams \n");
        assert!(prompt.contains("project management tools for small teams\n"));
        assert!(prompt.contains("\"currency\""));
        assert!(prompt.contains("\"vendor2\""));
    }
}
