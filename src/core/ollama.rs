//! Ollama AI Integration
//!
//! The pipeline talks to a language model only through [`Reasoner`], so the
//! model can be swapped or mocked. [`OllamaReasoner`] is the local Ollama
//! implementation over its `/api/chat` endpoint.

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::Retry;
use tracing::{debug, warn};

/// One chat turn sent to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Language-model collaborator
#[async_trait]
pub trait Reasoner: Send + Sync {
    /// Send the conversation and return the model's raw reply text
    async fn reason(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// Ollama chat response (non-streaming)
#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

/// Reasoner backed by a local Ollama server
#[derive(Clone)]
pub struct OllamaReasoner {
    client: reqwest::Client,
    url: String,
    model: String,
    enabled: bool,
    retries: usize,
}

impl OllamaReasoner {
    /// Create new Ollama reasoner from config
    pub fn new(config: &crate::config::Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: config.ollama_url.trim_end_matches('/').to_string(),
            model: config.ollama_model.clone(),
            enabled: config.ollama_enabled,
            retries: config.ai_retries,
        }
    }

    /// Check if Ollama is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Health check - verify Ollama is reachable
    pub async fn health_check(&self) -> bool {
        if !self.enabled {
            return false;
        }

        match self
            .client
            .get(format!("{}/api/tags", self.url))
            .timeout(Duration::from_secs(2))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    async fn chat_once(&self, messages: &[ChatMessage]) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/api/chat", self.url))
            .json(&serde_json::json!({
                "model": self.model,
                "messages": messages,
                "stream": false,
                "options": {
                    "temperature": 0.1
                }
            }))
            .timeout(Duration::from_secs(30))
            .send()
            .await?;

        let status = response.status();
        let body_text = response.text().await?;

        if !status.is_success() {
            warn!("❌ Ollama API Error ({}): {}", status, body_text);
            bail!("Ollama returned {}", status);
        }

        debug!("🧠 Ollama raw body: {}", body_text);

        let chat: ChatResponse = serde_json::from_str(&body_text)?;
        Ok(chat.message.content)
    }
}

#[async_trait]
impl Reasoner for OllamaReasoner {
    async fn reason(&self, messages: &[ChatMessage]) -> Result<String> {
        if !self.enabled {
            bail!("Ollama is disabled");
        }

        let strategy = ExponentialBackoff::from_millis(200)
            .max_delay(Duration::from_secs(2))
            .map(jitter)
            .take(self.retries);

        Retry::spawn(strategy, || async move {
            self.chat_once(messages).await.map_err(|e| {
                warn!("⚠️ Ollama request failed: {}", e);
                e
            })
        })
        .await
    }
}

/// Slice out the first `{` .. last `}` of a model reply
///
/// Models often wrap JSON in prose or code fences.
pub fn extract_json(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (start < end).then(|| &reply[start..=end])
}
