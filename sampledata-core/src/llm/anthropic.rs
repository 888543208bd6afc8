//! Anthropic Messages API provider
//!
//! One request per call and no retry. Failures go back to the caller as
//! [`LLMError`].

use super::errors::{LLMError, LLMResult};
use super::provider::{CompletionProvider, ModelProfile};
use crate::config::ApiConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Provider backed by `POST /v1/messages`
pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    endpoint: String,
    version: String,
    timeout: Option<Duration>,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>, config: &ApiConfig) -> LLMResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LLMError::config("API key is empty"));
        }

        let timeout = config.timeout_secs.map(Duration::from_secs);
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| LLMError::config(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            endpoint: messages_endpoint(&config.base_url),
            version: config.anthropic_version.clone(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, prompt: &str, profile: &ModelProfile) -> LLMResult<String> {
        let request = MessageRequest::single_user(prompt, profile);
        info!("Requesting completion from {} ({})", profile.model, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.version)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        debug!("Response status {} with {} bytes", status, body.len());

        if !status.is_success() {
            return Err(status_error(status.as_u16(), &body));
        }

        reply_text(&body)
    }
}

impl AnthropicProvider {
    fn transport_error(&self, err: reqwest::Error) -> LLMError {
        match self.timeout {
            Some(duration) if err.is_timeout() => LLMError::timeout(duration),
            _ => LLMError::network(err.to_string()),
        }
    }
}

fn messages_endpoint(base_url: &str) -> String {
    format!("{}/v1/messages", base_url.trim_end_matches('/'))
}

/// Map a non-success status to an error, preferring the API's own message
fn status_error(status: u16, body: &str) -> LLMError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    match status {
        401 | 403 => LLMError::auth(message),
        _ => LLMError::api(status, message),
    }
}

/// Text of the first content block
fn reply_text(body: &str) -> LLMResult<String> {
    let response: MessageResponse = serde_json::from_str(body)?;
    match response.content.into_iter().next() {
        Some(Content::Text { text }) => Ok(text),
        _ => Err(LLMError::EmptyResponse),
    }
}

/// Message structure for the API
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

/// API request
#[derive(Debug, Serialize)]
struct MessageRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

impl MessageRequest {
    fn single_user(prompt: &str, profile: &ModelProfile) -> Self {
        Self {
            model: profile.model.to_string(),
            messages: vec![Message { role: "user".to_string(), content: prompt.to_string() }],
            max_tokens: profile.max_tokens,
            temperature: profile.temperature,
        }
    }
}

/// API response
#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Vec<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Content {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::{SCRIPT_PROFILE, TABLE_PROFILE};

    #[test]
    fn test_request_body() {
        let request = MessageRequest::single_user("make rows", &TABLE_PROFILE);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "claude-3-5-sonnet-20241022");
        assert_eq!(json["max_tokens"], 1000);
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "make rows");
        assert!((json["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);

        let request = MessageRequest::single_user("script", &SCRIPT_PROFILE);
        assert_eq!(request.max_tokens, 4000);
    }

    #[test]
    fn test_reply_text_reads_first_block() {
        let body = r#"{"id":"msg_1","type":"message","role":"assistant",
            "content":[{"type":"text","text":"a,b\n1,2"},{"type":"text","text":"ignored"}],
            "stop_reason":"end_turn"}"#;
        assert_eq!(reply_text(body).unwrap(), "a,b\n1,2");
    }

    #[test]
    fn test_reply_without_text() {
        assert!(matches!(reply_text(r#"{"content":[]}"#), Err(LLMError::EmptyResponse)));
        assert!(matches!(
            reply_text(r#"{"content":[{"type":"tool_use","id":"x"}]}"#),
            Err(LLMError::EmptyResponse)
        ));
        assert!(matches!(reply_text("<html>"), Err(LLMError::ParseError { .. })));
    }

    #[test]
    fn test_status_error_mapping() {
        let body = r#"{"type":"error","error":{"type":"authentication_error","message":"invalid x-api-key"}}"#;
        match status_error(401, body) {
            LLMError::AuthenticationError { message } => assert_eq!(message, "invalid x-api-key"),
            other => panic!("unexpected error: {:?}", other),
        }

        match status_error(500, "upstream failure\n") {
            LLMError::ApiError { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "upstream failure");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_provider_construction() {
        let config = ApiConfig { base_url: "http://localhost:9999/".to_string(), ..ApiConfig::default() };
        let provider = AnthropicProvider::new("sk-test", &config).unwrap();
        assert_eq!(provider.endpoint(), "http://localhost:9999/v1/messages");
        assert_eq!(provider.name(), "anthropic");

        assert!(matches!(
            AnthropicProvider::new("  ", &config),
            Err(LLMError::ConfigurationError { .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let config =
            ApiConfig { base_url: "http://127.0.0.1:9".to_string(), ..ApiConfig::default() };
        let provider = AnthropicProvider::new("sk-test", &config).unwrap();
        let result = provider.complete("hello", &TABLE_PROFILE).await;
        assert!(matches!(result, Err(LLMError::NetworkError { .. })));
    }
}
