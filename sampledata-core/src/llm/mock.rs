//! Mock completion provider for testing
//!
//! Replies and errors are queued up front and handed out in order; every
//! prompt is recorded.

use super::errors::LLMError;
use super::provider::{CompletionProvider, ModelProfile};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct MockProvider {
    replies: Arc<Mutex<VecDeque<Result<String, LLMError>>>>,
    call_history: Arc<Mutex<Vec<(String, ModelProfile)>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider that answers every call in turn with the given texts
    pub fn with_replies(replies: &[&str]) -> Self {
        let provider = Self::new();
        for reply in replies {
            provider.add_reply(*reply);
        }
        provider
    }

    pub fn add_reply(&self, reply: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(reply.into()));
    }

    pub fn add_error(&self, error: LLMError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn calls(&self) -> Vec<(String, ModelProfile)> {
        self.call_history.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, prompt: &str, profile: &ModelProfile) -> Result<String, LLMError> {
        self.call_history.lock().unwrap().push((prompt.to_string(), *profile));
        self.replies.lock().unwrap().pop_front().unwrap_or(Err(LLMError::EmptyResponse))
    }
}
