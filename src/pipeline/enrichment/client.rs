//! Model service client: an OpenAI-compatible chat-completions call with
//! structured outputs, behind a trait so tests can substitute a mock.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::config::API_KEY_ENV;

use super::schema::response_schema;
use super::EnrichmentError;

/// One schema-constrained completion call. The returned string is the raw
/// message content; parsing into the typed payload happens in the caller.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete_structured(
        &self,
        system: &str,
        user: &str,
    ) -> Result<String, EnrichmentError>;
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: Value,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// OpenRouter chat-completions client with strict JSON-schema output.
#[derive(Debug)]
pub struct OpenRouterClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenRouterClient {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    /// Build a client with the API key read from the environment.
    pub fn from_env(base_url: &str, model: &str) -> Result<Self, EnrichmentError> {
        let api_key =
            std::env::var(API_KEY_ENV).map_err(|_| EnrichmentError::MissingApiKey(API_KEY_ENV))?;
        Ok(Self::new(base_url, &api_key, model))
    }

    fn response_format() -> Value {
        json!({
            "type": "json_schema",
            "json_schema": {
                "name": "paper_analysis",
                "description": "Structured paper information extraction",
                "schema": response_schema(),
                "strict": true
            }
        })
    }
}

#[async_trait]
impl ModelClient for OpenRouterClient {
    async fn complete_structured(
        &self,
        system: &str,
        user: &str,
    ) -> Result<String, EnrichmentError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user.to_string(),
                },
            ],
            response_format: Self::response_format(),
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!(url = %url, model = %self.model, "Sending completion request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| EnrichmentError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EnrichmentError::ServiceStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| EnrichmentError::Http(format!("malformed response body: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| EnrichmentError::Http("response contained no choices".into()))
    }
}

// ── Mock for testing ──────────────────────────────────────

/// Scriptable mock client: returns a fixed response, optionally failing the
/// first N calls, and records the last user prompt it saw.
pub struct MockModelClient {
    response: String,
    fail_first: u32,
    calls: std::sync::atomic::AtomicU32,
    last_user_prompt: std::sync::Mutex<Option<String>>,
}

impl MockModelClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            fail_first: 0,
            calls: std::sync::atomic::AtomicU32::new(0),
            last_user_prompt: std::sync::Mutex::new(None),
        }
    }

    pub fn failing_first(response: &str, failures: u32) -> Self {
        Self {
            fail_first: failures,
            ..Self::new(response)
        }
    }

    pub fn always_failing() -> Self {
        Self::failing_first("", u32::MAX)
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn last_user_prompt(&self) -> Option<String> {
        self.last_user_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    async fn complete_structured(
        &self,
        _system: &str,
        user: &str,
    ) -> Result<String, EnrichmentError> {
        let call = self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        *self.last_user_prompt.lock().unwrap() = Some(user.to_string());
        if call < self.fail_first {
            return Err(EnrichmentError::ServiceStatus {
                status: 503,
                body: "simulated outage".into(),
            });
        }
        Ok(self.response.clone())
    }
}
