use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use wayfarer_core::config::GeneratorConfig;
use wayfarer_core::error::{AdapterFailure, AdapterResult};
use wayfarer_core::traits::TextGenerator;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const REQUEST_TIMEOUT_SECS: u64 = 120;
const CAPABILITY: &str = "generation";

/// Non-streaming chat-completions client. Works with OpenAI, Ollama, vLLM,
/// Groq, OpenRouter, and anything else speaking the same wire format.
pub struct HttpTextGenerator {
    http: Client,
    base_url: String,
    model_id: String,
    api_key: Option<String>,
    max_tokens: u32,
    temperature: f32,
}

impl HttpTextGenerator {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model_id: config.model_id.clone(),
            api_key: config.api_key.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

// Request types
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

// Response types
#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

impl TextGenerator for HttpTextGenerator {
    fn generate(&self, system: &str, user: &str) -> BoxFuture<'_, AdapterResult<String>> {
        let request = ChatRequest {
            model: self.model_id.clone(),
            messages: vec![
                WireMessage {
                    role: "system",
                    content: system.to_string(),
                },
                WireMessage {
                    role: "user",
                    content: user.to_string(),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        Box::pin(async move {
            let mut builder = self
                .http
                .post(self.endpoint())
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .json(&request);
            if let Some(key) = &self.api_key {
                builder = builder.bearer_auth(key);
            }

            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    AdapterFailure::timeout(CAPABILITY, e.to_string())
                } else {
                    AdapterFailure::transport(CAPABILITY, e.to_string())
                }
            })?;

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                return Err(AdapterFailure::transport(
                    CAPABILITY,
                    format!("HTTP {}", status),
                ));
            }
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(AdapterFailure::refused(
                    CAPABILITY,
                    format!("HTTP {}: {}", status, truncate(&body)),
                ));
            }

            let parsed: ChatResponse = response
                .json()
                .await
                .map_err(|e| AdapterFailure::malformed(CAPABILITY, e.to_string()))?;
            let text = parsed
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .unwrap_or_default();
            if text.trim().is_empty() {
                return Err(AdapterFailure::malformed(CAPABILITY, "empty completion"));
            }

            debug!(chars = text.len(), "generation complete");
            Ok(text)
        })
    }
}

fn truncate(body: &str) -> String {
    if body.chars().count() > 200 {
        let head: String = body.chars().take(200).collect();
        format!("{}...", head)
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_strips_trailing_slash() {
        let config = GeneratorConfig {
            base_url: Some("http://localhost:11434/v1/".into()),
            ..Default::default()
        };
        let client = HttpTextGenerator::new(&config);
        assert_eq!(client.endpoint(), "http://localhost:11434/v1/chat/completions");
    }

    #[test]
    fn endpoint_defaults_to_public_api() {
        let client = HttpTextGenerator::new(&GeneratorConfig::default());
        assert_eq!(
            client.endpoint(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn truncate_caps_long_bodies() {
        let body = "x".repeat(500);
        let shortened = truncate(&body);
        assert!(shortened.len() < body.len());
        assert!(shortened.ends_with("..."));
    }
}
