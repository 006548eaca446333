//! Chat capability seam and the Ollama-backed implementation.
//!
//! Grounded QA and keyword extraction both go through [`ChatClient`], a
//! thin `chat(model, messages) → content` contract. The concrete client
//! calls the local Ollama `/api/chat` endpoint with `stream: false`. As
//! with embeddings there is no retry and no timeout (known gap).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::OllamaConfig;
use crate::error::{Error, Result};

pub const ROLE_SYSTEM: &str = "system";
pub const ROLE_USER: &str = "user";

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ROLE_SYSTEM.to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ROLE_USER.to_string(),
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// One synchronous round trip; the model id selects between the
    /// reasoning model and the lighter keyword model.
    async fn chat(&self, model: &str, messages: &[ChatMessage]) -> Result<String>;
}

/// Chat via a local Ollama instance.
pub struct OllamaChat {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaChat {
    pub fn new(config: &OllamaConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[async_trait]
impl ChatClient for OllamaChat {
    async fn chat(&self, model: &str, messages: &[ChatMessage]) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&ChatRequest {
                model,
                messages,
                stream: false,
            })
            .send()
            .await
            .map_err(|e| Error::ModelUnavailable(format!("chat request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::ModelUnavailable(format!(
                "chat failed: HTTP {} - {}",
                status, body
            )));
        }

        let decoded: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::ModelUnavailable(format!("bad chat response: {}", e)))?;
        Ok(decoded.message.content)
    }
}
