//! Deterministic [`ModelClient`] that replays queued responses.
//!
//! Used by the test suites. Structured and free-text calls
//! have separate queues; when a queue is empty the client falls back to a
//! configured default, or fails with a transport error.

use super::{LlmError, ModelClient, StructuredSchema};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
pub struct ScriptedClient {
    structured: Mutex<VecDeque<Result<Value, LlmError>>>,
    completions: Mutex<VecDeque<Result<String, LlmError>>>,
    fallback_structured: Option<Value>,
    fallback_completion: Option<String>,
    structured_prompts: Mutex<Vec<String>>,
    completion_prompts: Mutex<Vec<String>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a structured response
    pub fn with_structured(self, value: Value) -> Self {
        lock(&self.structured).push_back(Ok(value));
        self
    }

    /// Queue a structured call failure
    pub fn with_structured_error(self, error: LlmError) -> Self {
        lock(&self.structured).push_back(Err(error));
        self
    }

    /// Value returned by every structured call once the queue is drained
    pub fn with_fallback_structured(mut self, value: Value) -> Self {
        self.fallback_structured = Some(value);
        self
    }

    /// Queue a free-text completion
    pub fn with_completion(self, text: impl Into<String>) -> Self {
        lock(&self.completions).push_back(Ok(text.into()));
        self
    }

    /// Queue a free-text completion failure
    pub fn with_completion_error(self, error: LlmError) -> Self {
        lock(&self.completions).push_back(Err(error));
        self
    }

    /// Text returned by every completion once the queue is drained
    pub fn with_fallback_completion(mut self, text: impl Into<String>) -> Self {
        self.fallback_completion = Some(text.into());
        self
    }

    /// Prompts received by `complete`, in call order
    pub fn completion_prompts(&self) -> Vec<String> {
        lock(&self.completion_prompts).clone()
    }

    /// Prompts received by `complete_structured`, in call order
    pub fn structured_prompts(&self) -> Vec<String> {
        lock(&self.structured_prompts).clone()
    }

    pub fn structured_call_count(&self) -> usize {
        lock(&self.structured_prompts).len()
    }
}

impl ModelClient for ScriptedClient {
    fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        lock(&self.completion_prompts).push(prompt.to_string());

        match lock(&self.completions).pop_front() {
            Some(next) => next,
            None => self
                .fallback_completion
                .clone()
                .ok_or_else(|| LlmError::Transport("completion script exhausted".to_string())),
        }
    }

    fn complete_structured(
        &self,
        prompt: &str,
        _schema: &StructuredSchema,
    ) -> Result<Value, LlmError> {
        lock(&self.structured_prompts).push(prompt.to_string());

        match lock(&self.structured).pop_front() {
            Some(next) => next,
            None => self
                .fallback_structured
                .clone()
                .ok_or_else(|| LlmError::Transport("structured script exhausted".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> StructuredSchema {
        StructuredSchema {
            name: "test",
            schema: json!({}),
        }
    }

    #[test]
    fn test_replays_queue_then_fallback() {
        let client = ScriptedClient::new()
            .with_completion("first")
            .with_fallback_completion("again");

        assert_eq!(client.complete("a").unwrap(), "first");
        assert_eq!(client.complete("b").unwrap(), "again");
        assert_eq!(client.complete("c").unwrap(), "again");
        assert_eq!(client.completion_prompts(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_exhausted_script_is_transport_error() {
        let client = ScriptedClient::new().with_structured(json!({"ok": true}));

        assert_eq!(
            client.complete_structured("p", &schema()).unwrap(),
            json!({"ok": true})
        );
        assert!(matches!(
            client.complete_structured("p", &schema()),
            Err(LlmError::Transport(_))
        ));
        assert_eq!(client.structured_call_count(), 2);
    }
}
