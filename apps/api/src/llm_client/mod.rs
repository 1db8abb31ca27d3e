//! LLM Client — the single point of entry for all Groq completion calls in InnerVoice.
//!
//! ARCHITECTURAL RULE: No other module may call the completion API directly.
//! Everything goes through `CompletionBackend`, so the coaching pipeline can be
//! driven by `LlmClient` in production and by a scripted backend in tests.
//!
//! Model: llama-3.1-8b-instant (hardcoded — do not make configurable to prevent drift)
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

pub const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
/// The model used for all LLM calls in InnerVoice.
pub const MODEL: &str = "llama-3.1-8b-instant";
const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_BACKOFF: Duration = Duration::from_millis(1000);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM response contained no choices")]
    NoChoices,
}

/// Role tag of a single prompt turn, serialized the way the chat API expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }
}

/// One remote completion call: sampling settings plus ordered prompt turns.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub temperature: f32,
    pub max_tokens: u32,
    pub turns: Vec<ChatTurn>,
}

impl CompletionRequest {
    /// Returns the content of the last user turn, if any.
    #[allow(dead_code)]
    pub fn user_content(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == TurnRole::User)
            .map(|t| t.content.as_str())
    }
}

/// The completion seam. Implement this to swap the remote service without
/// touching the routing, classification, or generation code.
///
/// Carried in `AppState` as `Arc<dyn CompletionBackend>`.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Issues one completion and returns the first choice's text.
    /// A missing or null message content comes back as an empty string.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct GroqRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: &'a [ChatTurn],
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletion {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatCompletion {
    /// Extracts the text of the first choice. Only the first choice is consumed.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .map(|c| c.message.content.as_deref().unwrap_or(""))
    }
}

#[derive(Debug, Deserialize)]
struct GroqError {
    error: GroqErrorBody,
}

#[derive(Debug, Deserialize)]
struct GroqErrorBody {
    message: String,
}

/// The production completion backend.
/// Wraps the Groq chat-completions API with bounded retry and exponential backoff.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    backoff: Duration,
}

impl LlmClient {
    pub fn new(api_key: String, api_url: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            api_key,
            api_url,
            backoff: DEFAULT_BACKOFF,
        })
    }

    /// Overrides the base backoff delay (doubled after each failed attempt).
    #[allow(dead_code)]
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Makes a raw call to the chat-completions API, returning the full response object.
    /// Retries on transport errors, 429 (rate limit) and 5xx with exponential backoff.
    pub async fn call(&self, request: &CompletionRequest) -> Result<ChatCompletion, LlmError> {
        let request_body = GroqRequest {
            model: MODEL,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            messages: &request.turns,
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1x, 2x, 4x the base delay
                let delay = self.backoff * (1 << (attempt - 1));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.api_url)
                .bearer_auth(&self.api_key)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                // Try to parse error message
                let message = serde_json::from_str::<GroqError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.bytes().await?;
            let completion: ChatCompletion = serde_json::from_slice(&body)?;

            if let Some(usage) = &completion.usage {
                debug!(
                    "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens, usage.completion_tokens
                );
            }
            if let Some(reason) = completion.choices.first().and_then(|c| c.finish_reason.as_deref()) {
                if reason == "length" {
                    warn!("LLM output truncated at max_tokens={}", request.max_tokens);
                }
            }

            return Ok(completion);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl CompletionBackend for LlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let completion = self.call(request).await?;
        completion
            .text()
            .map(str::to_string)
            .ok_or(LlmError::NoChoices)
    }
}


#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    use super::*;

    /// Spins up a local stand-in for the chat-completions endpoint.
    /// The first `failures` calls answer with `fail_status`, later calls succeed.
    async fn spawn_fake_groq(failures: u32, fail_status: StatusCode) -> (String, Arc<AtomicU32>) {
        let hits = Arc::new(AtomicU32::new(0));

        async fn handler(
            State((hits, failures, fail_status)): State<(Arc<AtomicU32>, u32, StatusCode)>,
            Json(body): Json<Value>,
        ) -> (StatusCode, Json<Value>) {
            let n = hits.fetch_add(1, Ordering::SeqCst);
            if n < failures {
                return (
                    fail_status,
                    Json(json!({"error": {"message": "Invalid API Key"}})),
                );
            }
            let echoed = body["messages"][0]["content"].as_str().unwrap_or("").to_string();
            (
                StatusCode::OK,
                Json(json!({
                    "choices": [{"message": {"role": "assistant", "content": echoed}, "finish_reason": "stop"}],
                    "usage": {"prompt_tokens": 5, "completion_tokens": 2}
                })),
            )
        }

        let app = Router::new()
            .route("/chat", post(handler))
            .with_state((hits.clone(), failures, fail_status));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/chat"), hits)
    }

    /// Stand-in endpoint that always answers 200 with `body`.
    async fn spawn_fixed_groq(body: Value) -> String {
        let app = Router::new().route(
            "/chat",
            post(move || {
                let body = body.clone();
                async move { Json(body) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/chat")
    }

    fn client(url: String) -> LlmClient {
        LlmClient::new("gsk_test".to_string(), url)
            .unwrap()
            .with_backoff(Duration::from_millis(1))
    }

    fn request(text: &str) -> CompletionRequest {
        CompletionRequest {
            temperature: 0.0,
            max_tokens: 10,
            turns: vec![ChatTurn::user(text)],
        }
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice_text() {
        let (url, hits) = spawn_fake_groq(0, StatusCode::OK).await;
        let text = client(url).complete(&request("Anxiety")).await.unwrap();
        assert_eq!(text, "Anxiety");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let (url, hits) = spawn_fake_groq(2, StatusCode::SERVICE_UNAVAILABLE).await;
        let text = client(url).complete(&request("hello")).await.unwrap();
        assert_eq!(text, "hello");
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let (url, hits) = spawn_fake_groq(10, StatusCode::TOO_MANY_REQUESTS).await;
        let err = client(url).complete(&request("hello")).await.unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 429, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), MAX_RETRIES);
    }

    #[tokio::test]
    async fn test_auth_error_is_not_retried() {
        let (url, hits) = spawn_fake_groq(1, StatusCode::UNAUTHORIZED).await;
        let err = client(url).complete(&request("hello")).await.unwrap_err();
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API Key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_connection_errors_are_retried_then_surface() {
        // Bind then drop a listener so the port refuses connections.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let start = std::time::Instant::now();
        let llm = LlmClient::new("gsk_test".to_string(), format!("http://{addr}/chat"))
            .unwrap()
            .with_backoff(Duration::from_millis(20));
        let err = llm.complete(&request("hello")).await.unwrap_err();

        assert!(matches!(err, LlmError::Http(_)), "unexpected error: {err:?}");
        // Two backoff sleeps (20ms + 40ms) prove all attempts were made.
        assert!(start.elapsed() >= Duration::from_millis(60));
    }

    #[tokio::test]
    async fn test_empty_choices_is_an_error() {
        let url = spawn_fixed_groq(json!({ "choices": [] })).await;
        let err = client(url).complete(&request("hello")).await.unwrap_err();
        assert!(matches!(err, LlmError::NoChoices), "unexpected error: {err:?}");
    }

    #[tokio::test]
    async fn test_null_content_completes_as_empty_string() {
        let url = spawn_fixed_groq(json!({
            "choices": [{"message": {"role": "assistant", "content": null}, "finish_reason": "stop"}]
        }))
        .await;
        let text = client(url).complete(&request("hello")).await.unwrap();
        assert_eq!(text, "");
    }

    #[test]
    fn test_null_content_reads_as_empty() {
        let completion: ChatCompletion = serde_json::from_value(json!({
            "choices": [{"message": {"content": null}, "finish_reason": "stop"}]
        }))
        .unwrap();
        assert_eq!(completion.text(), Some(""));
    }

    #[test]
    fn test_no_choices_reads_as_none() {
        let completion: ChatCompletion =
            serde_json::from_value(json!({ "choices": [] })).unwrap();
        assert!(completion.text().is_none());
    }

    #[test]
    fn test_request_serializes_role_tagged_turns() {
        let turns = vec![ChatTurn::system("persona"), ChatTurn::user("hi")];
        let body = GroqRequest {
            model: MODEL,
            temperature: 0.7,
            max_tokens: 500,
            messages: &turns,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "llama-3.1-8b-instant");
        assert_eq!(value["max_tokens"], 500);
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["messages"][1]["content"], "hi");
    }
}
