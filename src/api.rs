//! Chat-completions client for the Groq API.
//!
//! Groq exposes an OpenAI-compatible `/chat/completions` endpoint, so this is
//! a thin `reqwest` wrapper: one system message, one user message, one text
//! reply. Enrichment and search both talk to the model through [`AskAsync`],
//! which keeps them testable against canned replies.
//!
//! Calls are attempted exactly once with a bounded timeout; there is no
//! retry or backoff.

use crate::error::LlmError;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// A single-turn chat request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Trait for async LLM interaction.
///
/// Implementors send a prompt to a model and return its raw text reply.
pub trait AskAsync {
    async fn ask(&self, prompt: &ChatPrompt) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

/// [`AskAsync`] implementation for Groq's OpenAI-compatible endpoint.
#[derive(Clone)]
pub struct GroqChat {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl std::fmt::Debug for GroqChat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqChat")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GroqChat {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Build a client only when a non-blank credential is present.
    pub fn from_credential(
        api_key: Option<&str>,
        model: &str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Option<Self>, LlmError> {
        match api_key.map(str::trim).filter(|k| !k.is_empty()) {
            Some(key) => Self::new(key, model, base_url, timeout).map(Some),
            None => Ok(None),
        }
    }

    fn headers(&self) -> Result<HeaderMap, LlmError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

impl AskAsync for GroqChat {
    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn ask(&self, prompt: &ChatPrompt) -> Result<String, LlmError> {
        let t0 = Instant::now();
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                WireMessage {
                    role: "system",
                    content: &prompt.system,
                },
                WireMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: prompt.temperature,
            max_tokens: prompt.max_tokens,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "Chat API call failed"
            );
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let reply: ChatResponse = response.json().await?;
        let text = reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(LlmError::EmptyResponse)?;

        debug!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            chars = text.len(),
            "Chat API call succeeded"
        );
        Ok(text)
    }
}

#[cfg(test)]
pub(crate) mod stub {
    use super::*;
    use std::cell::RefCell;

    /// Replies with a fixed result and records every prompt it receives.
    pub struct StubChat {
        reply: Result<String, u16>,
        pub prompts: RefCell<Vec<ChatPrompt>>,
    }

    impl StubChat {
        pub fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                prompts: RefCell::default(),
            }
        }

        pub fn failing(status: u16) -> Self {
            Self {
                reply: Err(status),
                prompts: RefCell::default(),
            }
        }
    }

    impl AskAsync for StubChat {
        async fn ask(&self, prompt: &ChatPrompt) -> Result<String, LlmError> {
            self.prompts.borrow_mut().push(prompt.clone());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(LlmError::Api {
                    status: *status,
                    body: "stubbed failure".to_string(),
                }),
            }
        }
    }
}
