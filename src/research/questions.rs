// Interview question generation
//
// A single structured call with no retry. The returned count is not enforced:
// a mismatch is reported as a warning and the list is used as-is.

use super::error::{GenerationError, WorkflowError};
use super::observer::WorkflowObserver;
use super::prompts::build_question_prompt;
use crate::llm::{ModelClient, StructuredSchema};
use crate::parsers::normalize_structured_payload;
use serde_json::{json, Value};

pub fn question_schema() -> StructuredSchema {
    StructuredSchema {
        name: "questions",
        schema: json!({
            "type": "object",
            "properties": {
                "questions": {"type": "array", "items": {"type": "string"}}
            },
            "required": ["questions"]
        }),
    }
}

fn question_text(item: Value) -> Option<String> {
    let text = match item {
        Value::String(s) => s,
        Value::Object(map) => match map.get("question").or_else(|| map.get("text")) {
            Some(Value::String(s)) => s.clone(),
            _ => Value::Object(map).to_string(),
        },
        Value::Null => return None,
        other => other.to_string(),
    };
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Accept `{questions: [...]}` or a bare list; render non-strings as text
pub fn normalize_question_payload(raw: Value) -> Result<Vec<String>, GenerationError> {
    let items = match normalize_structured_payload(raw) {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("questions") {
            Some(Value::Array(items)) => items,
            Some(_) | None => return Err(GenerationError::MissingKey("questions")),
        },
        Value::Null => return Err(GenerationError::EmptyPayload),
        Value::String(_) => return Err(GenerationError::UnparsableOutput),
        _ => return Err(GenerationError::MissingKey("questions")),
    };

    Ok(items.into_iter().filter_map(question_text).collect())
}

pub struct QuestionGenerator<'a> {
    client: &'a dyn ModelClient,
}

impl<'a> QuestionGenerator<'a> {
    pub fn new(client: &'a dyn ModelClient) -> Self {
        Self { client }
    }

    pub fn generate(
        &self,
        count: u32,
        research_question: &str,
        observer: &dyn WorkflowObserver,
    ) -> Result<Vec<String>, WorkflowError> {
        let prompt = build_question_prompt(count, research_question);

        let raw = self
            .client
            .complete_structured(&prompt, &question_schema())
            .map_err(|e| WorkflowError::QuestionGeneration(e.into()))?;
        let questions =
            normalize_question_payload(raw).map_err(WorkflowError::QuestionGeneration)?;

        if questions.len() != count as usize {
            observer.on_warning(&format!(
                "Requested {} questions but the model returned {}; continuing",
                count,
                questions.len()
            ));
        }

        Ok(questions)
    }
}
