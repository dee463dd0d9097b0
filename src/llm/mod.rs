//! Language model client adapter
//!
//! The research workflow only needs two blocking calls: a free-text completion
//! and a completion constrained by a JSON schema. Everything else about the
//! provider (endpoint, headers, model name) stays behind [`ModelClient`].

mod chat_client;
pub mod scripted;

pub use chat_client::{ChatClientFactory, ChatCompletionsClient, SYSTEM_PROMPT};
pub use scripted::ScriptedClient;

use serde_json::Value;
use thiserror::Error;

/// Errors raised by a model client call
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Model client is misconfigured: {0}")]
    Configuration(String),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("API returned error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode model response: {0}")]
    Decode(String),

    #[error("Model returned an empty response")]
    EmptyResponse,
}

/// JSON schema handed to a structured completion
#[derive(Debug, Clone)]
pub struct StructuredSchema {
    /// Schema name, sent as the `json_schema.name` field
    pub name: &'static str,
    pub schema: Value,
}

/// A blocking language model client
pub trait ModelClient: Send + Sync {
    /// Complete a prompt and return the raw text
    fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Complete a prompt constrained by a schema.
    ///
    /// The returned value is whatever the provider produced: usually an object
    /// matching the schema, but callers must be ready for strings, wrappers or
    /// malformed content.
    fn complete_structured(
        &self,
        prompt: &str,
        schema: &StructuredSchema,
    ) -> Result<Value, LlmError>;
}

/// Builds a fresh client for each research run from the caller's credentials
pub trait ClientFactory: Send + Sync {
    fn build(&self, api_key: &str) -> Result<Box<dyn ModelClient>, LlmError>;
}
