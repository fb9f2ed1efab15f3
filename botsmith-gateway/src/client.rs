//! Google Gemini capability client.
//!
//! Wraps a single `generateContent` REST call against one named model.
//! The underlying HTTP handle is created lazily on first use and shared;
//! initialization is race-safe, so concurrent first callers converge on
//! one handle.

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Classification of a provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Missing credential or similar setup problem. Never retried.
    Configuration,
    /// Provider-signaled rate limit / quota exhaustion (HTTP 429).
    RateLimited,
    /// Anything else: transport errors, bad responses, server faults.
    Other,
}

/// Failure of one capability call against one model.
#[derive(Debug, Clone, Error)]
#[error("[gemini:{model}] {message}")]
pub struct ProviderFailure {
    pub model: String,
    pub message: String,
    pub status_code: Option<u16>,
    pub kind: FailureKind,
}

impl ProviderFailure {
    fn new(model: &str, message: impl Into<String>, kind: FailureKind) -> Self {
        Self {
            model: model.to_string(),
            message: message.into(),
            status_code: None,
            kind,
        }
    }

    pub(crate) fn timed_out(model: &str, timeout: Duration) -> Self {
        Self::new(
            model,
            format!("Call timed out after {}s", timeout.as_secs()),
            FailureKind::Other,
        )
    }

    /// Whether the fallback rotation should advance to the next model.
    ///
    /// The typed classification decides first; textual markers are kept as
    /// a secondary check for unstructured provider messages.
    pub fn is_retryable(&self) -> bool {
        match self.kind {
            FailureKind::RateLimited => true,
            FailureKind::Configuration => false,
            FailureKind::Other => {
                let message = self.message.to_uppercase();
                message.contains("RESOURCE_EXHAUSTED")
                    || message.contains("QUOTA")
                    || message.contains("429")
            }
        }
    }
}

/// A message part in a multi-turn generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// "user" or "assistant"
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Input to a generation call: a plain prompt or an ordered sequence of
/// role-tagged messages.
#[derive(Debug, Clone)]
pub enum GenerateContent {
    Prompt(String),
    Messages(Vec<ChatMessage>),
}

impl From<String> for GenerateContent {
    fn from(prompt: String) -> Self {
        Self::Prompt(prompt)
    }
}

impl From<&str> for GenerateContent {
    fn from(prompt: &str) -> Self {
        Self::Prompt(prompt.to_string())
    }
}

/// Single call-and-response capability against one named model.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, model: &str, content: &GenerateContent)
        -> Result<String, ProviderFailure>;
}

// ══════════════════════════════════════════════════════════════════════════════
// API REQUEST/RESPONSE TYPES
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Gemini REST client.
pub struct GeminiClient {
    api_key: Option<String>,
    timeout: Duration,
    client: OnceCell<Client>,
}

impl GeminiClient {
    /// Create a client. A `None` key falls back to the `GEMINI_API_KEY`
    /// environment variable; if both are absent, calls fail with a
    /// configuration error. The timeout bounds each transport request and
    /// should match the caller's per-call bound.
    pub fn new(api_key: Option<String>, timeout: Duration) -> Self {
        let resolved = api_key
            .filter(|key| !key.is_empty())
            .or_else(|| std::env::var("GEMINI_API_KEY").ok().filter(|key| !key.is_empty()));

        Self {
            api_key: resolved,
            timeout,
            client: OnceCell::new(),
        }
    }

    /// The shared HTTP handle, created on first use.
    fn http(&self) -> &Client {
        self.client.get_or_init(|| {
            Client::builder()
                .timeout(self.timeout)
                .connect_timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new())
        })
    }

    fn build_request(content: &GenerateContent) -> GenerateContentRequest {
        let contents = match content {
            GenerateContent::Prompt(prompt) => vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.clone(),
                }],
            }],
            GenerateContent::Messages(messages) => messages
                .iter()
                .map(|msg| Content {
                    role: match msg.role.as_str() {
                        "assistant" => "model".to_string(),
                        other => other.to_string(),
                    },
                    parts: vec![Part {
                        text: msg.content.clone(),
                    }],
                })
                .collect(),
        };

        GenerateContentRequest { contents }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(
        &self,
        model: &str,
        content: &GenerateContent,
    ) -> Result<String, ProviderFailure> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            ProviderFailure::new(
                model,
                "Gemini API key missing. Set GEMINI_API_KEY in the environment.",
                FailureKind::Configuration,
            )
        })?;

        let url = format!("{GEMINI_ENDPOINT}/models/{model}:generateContent?key={api_key}");
        let request = Self::build_request(content);

        let response = self
            .http()
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ProviderFailure::new(model, format!("Request failed: {e}"), FailureKind::Other)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let kind = if status.as_u16() == 429 {
                FailureKind::RateLimited
            } else {
                FailureKind::Other
            };
            return Err(ProviderFailure {
                model: model.to_string(),
                message: format!("API error ({}): {}", status.as_u16(), error_text),
                status_code: Some(status.as_u16()),
                kind,
            });
        }

        let result: GenerateContentResponse = response.json().await.map_err(|e| {
            ProviderFailure::new(
                model,
                format!("Failed to parse response: {e}"),
                FailureKind::Other,
            )
        })?;

        if let Some(err) = result.error {
            return Err(ProviderFailure::new(
                model,
                format!("API error: {}", err.message),
                FailureKind::Other,
            ));
        }

        let text = result
            .candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|candidate| candidate.content.parts)
            .and_then(|parts| parts.into_iter().next())
            .and_then(|part| part.text)
            .ok_or_else(|| {
                ProviderFailure::new(model, "No response from Gemini", FailureKind::Other)
            })?;

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creates_with_key() {
        let client = GeminiClient::new(Some("test-api-key".to_string()), Duration::from_secs(30));
        assert_eq!(client.api_key.as_deref(), Some("test-api-key"));
    }

    #[test]
    fn empty_key_counts_as_absent() {
        // May still resolve from the environment; only assert the explicit
        // empty string is not kept verbatim.
        let client = GeminiClient::new(Some(String::new()), Duration::from_secs(30));
        assert_ne!(client.api_key.as_deref(), Some(""));
    }

    #[test]
    fn transport_timeout_follows_configuration() {
        // The transport bound must track the configured per-call timeout,
        // not cap it at some fixed value.
        let client = GeminiClient::new(Some("key".to_string()), Duration::from_secs(300));
        assert_eq!(client.timeout, Duration::from_secs(300));
        let _ = client.http();
    }

    #[tokio::test]
    async fn missing_key_is_a_configuration_failure() {
        let client = GeminiClient {
            api_key: None,
            timeout: Duration::from_secs(5),
            client: OnceCell::new(),
        };
        let err = client
            .generate("gemini-2.0-flash", &"hi".into())
            .await
            .unwrap_err();
        assert_eq!(err.kind, FailureKind::Configuration);
        assert!(!err.is_retryable());
    }

    #[test]
    fn http_handle_is_created_once() {
        let client = GeminiClient::new(Some("key".to_string()), Duration::from_secs(30));
        let first = client.http() as *const Client;
        let second = client.http() as *const Client;
        assert_eq!(first, second);
    }

    #[test]
    fn assistant_role_maps_to_model() {
        let content = GenerateContent::Messages(vec![
            ChatMessage::new("user", "hello"),
            ChatMessage::new("assistant", "hi there"),
        ]);
        let request = GeminiClient::build_request(&content);
        assert_eq!(request.contents[0].role, "user");
        assert_eq!(request.contents[1].role, "model");
        assert_eq!(request.contents[1].parts[0].text, "hi there");
    }

    #[test]
    fn prompt_becomes_single_user_content() {
        let request = GeminiClient::build_request(&"just a prompt".into());
        assert_eq!(request.contents.len(), 1);
        assert_eq!(request.contents[0].role, "user");
        assert_eq!(request.contents[0].parts[0].text, "just a prompt");
    }

    #[test]
    fn rate_limited_kind_is_retryable() {
        let failure = ProviderFailure {
            model: "m".to_string(),
            message: "slow down".to_string(),
            status_code: Some(429),
            kind: FailureKind::RateLimited,
        };
        assert!(failure.is_retryable());
    }

    #[test]
    fn textual_markers_are_a_secondary_fallback() {
        for marker in ["RESOURCE_EXHAUSTED", "quota exceeded", "error 429"] {
            let failure = ProviderFailure::new("m", marker, FailureKind::Other);
            assert!(failure.is_retryable(), "{marker} should be retryable");
        }

        let failure = ProviderFailure::new("m", "internal server error", FailureKind::Other);
        assert!(!failure.is_retryable());
    }
}
