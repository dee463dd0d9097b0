// OpenAI-compatible chat completions client (Cerebras by default)

use super::{ClientFactory, LlmError, ModelClient, StructuredSchema};
use crate::config::ModelSettings;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// General instructions sent as the system message on every call
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant. Provide a direct, clear response without showing your thinking process. Respond directly without using <think> tags or showing internal reasoning.";

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Blocking client for `/chat/completions` endpoints
pub struct ChatCompletionsClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl ChatCompletionsClient {
    /// Create a client for the configured provider using the given API key
    pub fn new(settings: &ModelSettings, api_key: &str) -> Result<Self, LlmError> {
        if api_key.trim().is_empty() {
            return Err(LlmError::Configuration("API key is empty".to_string()));
        }

        let base_url = settings.resolved_base_url().map_err(LlmError::Configuration)?;
        let model = settings.resolved_model().map_err(LlmError::Configuration)?;

        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.trim().to_string(),
            model,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        })
    }

    fn send(&self, prompt: &str, response_format: Option<Value>) -> Result<String, LlmError> {
        let mut body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": prompt},
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });
        if let Some(format) = response_format {
            body["response_format"] = format;
        }

        log::debug!("[llm] POST {} (model {})", self.endpoint, self.model);

        let res = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = res.json().map_err(|e| LlmError::Decode(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

impl ModelClient for ChatCompletionsClient {
    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.send(prompt, None)
    }

    fn complete_structured(
        &self,
        prompt: &str,
        schema: &StructuredSchema,
    ) -> Result<Value, LlmError> {
        let format = json!({
            "type": "json_schema",
            "json_schema": {
                "name": schema.name,
                "schema": schema.schema,
            }
        });
        let content = self.send(prompt, Some(format))?;

        // Leave unparsable text for the caller's normalization pipeline
        Ok(serde_json::from_str(&content).unwrap_or(Value::String(content)))
    }
}

/// Factory producing [`ChatCompletionsClient`]s for one provider configuration
#[derive(Debug, Clone)]
pub struct ChatClientFactory {
    settings: ModelSettings,
}

impl ChatClientFactory {
    pub fn new(settings: ModelSettings) -> Self {
        Self { settings }
    }
}

impl ClientFactory for ChatClientFactory {
    fn build(&self, api_key: &str) -> Result<Box<dyn ModelClient>, LlmError> {
        Ok(Box::new(ChatCompletionsClient::new(&self.settings, api_key)?))
    }
}
