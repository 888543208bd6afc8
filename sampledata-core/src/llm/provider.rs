//! Completion provider trait and fixed model profiles

use super::errors::LLMResult;
use async_trait::async_trait;

/// Model identifier and sampling settings for one kind of request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelProfile {
    pub model: &'static str,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Used when asking for the CSV table directly
pub const TABLE_PROFILE: ModelProfile =
    ModelProfile { model: "claude-3-5-sonnet-20241022", max_tokens: 1000, temperature: 0.7 };

/// Used when asking for the generator script; scripts need more room than a table
pub const SCRIPT_PROFILE: ModelProfile =
    ModelProfile { model: "claude-3-5-sonnet-20241022", max_tokens: 4000, temperature: 0.7 };

/// Anything that can turn a single user prompt into reply text
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &str;

    /// Send one user-role message and return the text of the reply
    async fn complete(&self, prompt: &str, profile: &ModelProfile) -> LLMResult<String>;
}
