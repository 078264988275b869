//! Claude API client for insight narration.
//!
//! Non-streaming access to the Anthropic Messages API. The narrator only
//! ever needs a full response, and treating the call as one fallible
//! operation keeps the degradation story simple.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::instrument;

use crate::config::ClaudeConfig;

use super::error::{ApiErrorResponse, ClaudeError};
use super::types::{ChatRequest, ChatResponse, Message};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;
/// The narration call is the single point of external latency in a
/// request; cap it so numeric results are never held hostage.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Claude API client.
///
/// Cheaply cloneable; provides the two text-generation operations the
/// insight narrator consumes.
#[derive(Clone)]
pub struct ClaudeClient {
    inner: Arc<ClaudeClientInner>,
}

struct ClaudeClientInner {
    client: reqwest::Client,
    model: String,
}

impl ClaudeClient {
    /// Create a new Claude client.
    ///
    /// # Arguments
    ///
    /// * `config` - Claude API configuration containing API key and model
    ///
    /// # Panics
    ///
    /// Panics if the API key contains invalid header characters.
    #[must_use]
    pub fn new(config: &ClaudeConfig) -> Self {
        let api_key = config.api_key.expose_secret();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key).expect("Invalid API key for header"),
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            inner: Arc::new(ClaudeClientInner {
                client,
                model: config.model.clone(),
            }),
        }
    }

    /// Generate free-form prose for a prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails, returns an error
    /// response, or produces no text.
    #[instrument(skip(self, prompt), fields(model = %self.inner.model))]
    pub async fn generate_prose(&self, prompt: &str) -> Result<String, ClaudeError> {
        let text = self.complete(prompt).await?;
        if text.trim().is_empty() {
            return Err(ClaudeError::Parse("response contained no text".to_string()));
        }
        Ok(text)
    }

    /// Generate a structured JSON object for a prompt.
    ///
    /// The response text is trimmed to its outermost braces before parsing;
    /// models often wrap JSON in prose despite instructions.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails, returns an error
    /// response, or the response does not contain a JSON object.
    #[instrument(skip(self, prompt), fields(model = %self.inner.model))]
    pub async fn generate_structured(&self, prompt: &str) -> Result<serde_json::Value, ClaudeError> {
        let text = self.complete(prompt).await?;
        extract_json_object(&text)
    }

    /// Send a single-message completion request and return the text.
    async fn complete(&self, prompt: &str) -> Result<String, ClaudeError> {
        let request = ChatRequest {
            model: self.inner.model.clone(),
            max_tokens: DEFAULT_MAX_TOKENS,
            messages: vec![Message::user(prompt)],
            system: None,
        };

        let response = self
            .inner
            .client
            .post(ANTHROPIC_API_URL)
            .json(&request)
            .send()
            .await?;

        let response = self.handle_response(response).await?;
        Ok(response.text())
    }

    /// Handle a successful response.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<ChatResponse, ClaudeError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body)
                .map_err(|e| ClaudeError::Parse(format!("Failed to parse response: {e}")))
        } else {
            Err(self.handle_error_status(status, response).await)
        }
    }

    /// Handle an error status code.
    async fn handle_error_status(
        &self,
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> ClaudeError {
        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return ClaudeError::RateLimited(retry_after);
        }

        // Check for unauthorized
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return ClaudeError::Unauthorized("Invalid API key".to_string());
        }

        // Try to parse API error response
        match response.text().await {
            Ok(body) => {
                if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&body) {
                    ClaudeError::Api {
                        error_type: api_error.error.error_type,
                        message: api_error.error.message,
                    }
                } else {
                    ClaudeError::Api {
                        error_type: "unknown".to_string(),
                        message: body,
                    }
                }
            }
            Err(e) => ClaudeError::Http(e),
        }
    }
}

/// Extract the outermost JSON object from a block of text.
fn extract_json_object(text: &str) -> Result<serde_json::Value, ClaudeError> {
    let start = text
        .find('{')
        .ok_or_else(|| ClaudeError::Parse("no JSON object in response".to_string()))?;
    let end = text
        .rfind('}')
        .ok_or_else(|| ClaudeError::Parse("no JSON object in response".to_string()))?;
    let json = text
        .get(start..=end)
        .ok_or_else(|| ClaudeError::Parse("no JSON object in response".to_string()))?;

    serde_json::from_str(json).map_err(|e| ClaudeError::Parse(format!("invalid JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_object_plain() {
        let value = extract_json_object(r#"{"day_1": 5}"#).expect("valid object");
        assert_eq!(value.get("day_1").and_then(serde_json::Value::as_i64), Some(5));
    }

    #[test]
    fn test_extract_json_object_with_surrounding_prose() {
        let value = extract_json_object("Sure! Here you go:\n{\"a\": 1}\nAnything else?")
            .expect("valid object");
        assert_eq!(value.get("a").and_then(serde_json::Value::as_i64), Some(1));
    }

    #[test]
    fn test_extract_json_object_missing() {
        let err = extract_json_object("no json here").expect_err("should fail");
        assert!(matches!(err, ClaudeError::Parse(_)));
    }

    #[test]
    fn test_extract_json_object_malformed() {
        let err = extract_json_object("{not valid}").expect_err("should fail");
        assert!(matches!(err, ClaudeError::Parse(_)));
    }

    #[test]
    fn test_claude_client_is_clone_send_sync() {
        fn assert_clone<T: Clone>() {}
        fn assert_send_sync<T: Send + Sync>() {}
        assert_clone::<ClaudeClient>();
        assert_send_sync::<ClaudeClient>();
    }
}
