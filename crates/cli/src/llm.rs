//! Chat-completion client for an OpenAI-compatible endpoint (Groq by default).

use deck_core::{Error, Result, TextGenerator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default completion endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Default model name.
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default completion budget.
pub const DEFAULT_MAX_TOKENS: u32 = 8000;

/// Connection settings for the completion service.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl GeneratorConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    /// Content of the first choice, or an empty string.
    fn into_text(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default()
    }
}

/// Blocking chat-completion client.
pub struct ChatClient {
    http: reqwest::blocking::Client,
    config: GeneratorConfig,
}

impl ChatClient {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::GenerationError(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { http, config })
    }
}

impl TextGenerator for ChatClient {
    fn generate(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
            max_tokens,
        };

        log::debug!(
            "Requesting completion from {} (model {})",
            self.config.endpoint,
            self.config.model
        );

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .map_err(|e| Error::GenerationError(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::GenerationError(format!(
                "Service returned {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| Error::GenerationError(format!("Invalid response body: {}", e)))?;
        let text = parsed.into_text();
        log::debug!("Received {} characters", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: DEFAULT_MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: 0.5,
            max_tokens: 10,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], DEFAULT_MODEL);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["max_tokens"], 10);
    }

    #[test]
    fn test_response_text() {
        let body = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"SLIDE 1:"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.into_text(), "SLIDE 1:");
    }

    #[test]
    fn test_response_without_content_is_empty() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(parsed.into_text(), "");

        let parsed: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert_eq!(parsed.into_text(), "");
    }

    #[test]
    fn test_config_defaults() {
        let config = GeneratorConfig::new("key").with_model("mixtral");
        assert_eq!(config.model, "mixtral");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }
}
