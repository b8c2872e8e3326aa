//! Mock Reasoner for Testing
//!
//! Replays scripted replies and records every prompt it receives.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use studymate::core::ollama::{ChatMessage, Reasoner};

/// Mock language model that answers from a script
#[derive(Debug, Clone)]
pub struct MockReasoner {
    /// Last user message of every call
    pub prompts: Arc<Mutex<Vec<String>>>,
    /// Replies handed out in order; `None` simulates a failed call
    pub replies: Arc<Mutex<VecDeque<Option<String>>>>,
    /// Returned once the script runs out
    pub fallback: Option<String>,
}

impl MockReasoner {
    pub fn new() -> Self {
        Self {
            prompts: Arc::new(Mutex::new(Vec::new())),
            replies: Arc::new(Mutex::new(VecDeque::new())),
            fallback: None,
        }
    }

    /// Always fails, like an unreachable server
    pub fn offline() -> Self {
        Self::new()
    }

    /// Always answers with the same reply
    pub fn always(reply: &str) -> Self {
        Self {
            fallback: Some(reply.to_string()),
            ..Self::new()
        }
    }

    pub fn push_reply(&self, reply: &str) {
        self.replies.lock().unwrap().push_back(Some(reply.to_string()));
    }

    pub fn push_failure(&self) {
        self.replies.lock().unwrap().push_back(None);
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Default for MockReasoner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Reasoner for MockReasoner {
    async fn reason(&self, messages: &[ChatMessage]) -> Result<String> {
        let prompt = messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.prompts.lock().unwrap().push(prompt);

        let scripted = self.replies.lock().unwrap().pop_front();
        match scripted {
            Some(Some(reply)) => Ok(reply),
            Some(None) => Err(anyhow::anyhow!("Mock reasoner failure")),
            None => self
                .fallback
                .clone()
                .ok_or_else(|| anyhow::anyhow!("Mock reasoner offline")),
        }
    }
}
