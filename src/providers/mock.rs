use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::Notify;

use crate::errors::{ChatError, ChatResult};
use crate::providers::base::Provider;

/// A mock provider that returns pre-configured replies for testing
pub struct MockProvider {
    replies: Mutex<VecDeque<ChatResult<String>>>,
    questions: Mutex<Vec<String>>,
    configured: bool,
    gate: Option<Notify>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of replies
    pub fn new(replies: Vec<ChatResult<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            questions: Mutex::new(Vec::new()),
            configured: true,
            gate: None,
        }
    }

    /// A provider whose credential is missing.
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new(Vec::new())
        }
    }

    /// Every `generate` call waits until [`MockProvider::release`] is called.
    pub fn gated(replies: Vec<ChatResult<String>>) -> Self {
        Self {
            gate: Some(Notify::new()),
            ..Self::new(replies)
        }
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    /// Questions received so far, in call order.
    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn check_config(&self) -> ChatResult<()> {
        if self.configured {
            Ok(())
        } else {
            Err(ChatError::MissingApiKey)
        }
    }

    async fn generate(&self, question: &str) -> ChatResult<String> {
        self.questions.lock().unwrap().push(question.to_string());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(String::new()))
    }
}
