//! Model client
//!
//! A single synchronous-looking call per request: build the message, await
//! the reply, hand back its text.

pub mod anthropic;
pub mod errors;
pub mod provider;

#[cfg(test)]
pub mod mock;

pub use anthropic::AnthropicProvider;
pub use errors::{LLMError, LLMResult};
pub use provider::{CompletionProvider, ModelProfile, SCRIPT_PROFILE, TABLE_PROFILE};
