//! OpenAI-compatible chat-completions transport.

use super::{BackendError, ModelBackend};
use crate::config::ModelConfig;
use crate::error::{CodeGuardError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Sends each prompt as a single user message and returns the first choice.
pub struct OpenAiBackend {
    client: reqwest::Client,
    config: ModelConfig,
}

impl OpenAiBackend {
    pub fn new(config: ModelConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("code-guard/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.api_key))
                .map_err(|e| CodeGuardError::HttpClient(format!("invalid API key header: {}", e)))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| CodeGuardError::HttpClient(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }
}

/// Text of the first choice, empty when the backend sent none.
fn first_choice_text(body: &str) -> std::result::Result<String, BackendError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| BackendError::transport(format!("failed to parse completion: {}", e)))?;
    Ok(response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_default())
}

#[async_trait]
impl ModelBackend for OpenAiBackend {
    async fn complete(&self, prompt: &str) -> std::result::Result<String, BackendError> {
        let response = self
            .client
            .post(self.endpoint())
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| BackendError::transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::transport(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(BackendError::http(status.as_u16(), body));
        }

        first_choice_text(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config() -> ModelConfig {
        ModelConfig {
            api_key: "sk-test".to_string(),
            base_url: "http://localhost:9999/v1".to_string(),
            model: "gpt-4".to_string(),
            max_tokens: 2000,
            temperature: 0.1,
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_request_body_shape() {
        let backend = OpenAiBackend::new(config()).unwrap();
        let body = serde_json::to_value(backend.request_body("Rate this code")).unwrap();

        assert_eq!(body["model"], "gpt-4");
        assert_eq!(body["max_tokens"], 2000);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Rate this code");
        assert!((body["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
        assert_eq!(backend.endpoint(), "http://localhost:9999/v1/chat/completions");
    }

    #[test]
    fn test_first_choice_text() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"{\"score\":80}"}},
                      {"message":{"role":"assistant","content":"ignored"}}]}"#;
        assert_eq!(first_choice_text(body).unwrap(), "{\"score\":80}");
    }

    #[test]
    fn test_no_choices_is_empty_text() {
        assert_eq!(first_choice_text(r#"{"choices":[]}"#).unwrap(), "");
        assert_eq!(
            first_choice_text(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap(),
            ""
        );
    }

    #[test]
    fn test_garbage_body_is_transport_error() {
        let err = first_choice_text("<html>gateway</html>").unwrap_err();
        assert_eq!(err.status, None);
    }
}
