//! Persona generation and validation
//!
//! One structured call per attempt. The raw response goes through
//! [`normalize_structured_payload`] before a field-by-field check against the
//! persona schema; any shape or count problem fails the attempt and the
//! generator tries again, up to the policy's budget.

use super::error::{GenerationError, WorkflowError};
use super::observer::WorkflowObserver;
use super::prompts::build_persona_prompt;
use super::retry::{with_retry, RetryPolicy};
use crate::llm::{ModelClient, StructuredSchema};
use crate::models::Persona;
use crate::parsers::{normalize_structured_payload, StructuredOutputError};
use serde_json::{json, Map, Value};

const PERSONAS_KEY: &str = "personas";

/// JSON schema requested from the model
pub fn persona_schema() -> StructuredSchema {
    StructuredSchema {
        name: "personas_list",
        schema: json!({
            "type": "object",
            "properties": {
                "personas": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": {"type": "string"},
                            "age": {"type": "integer"},
                            "job": {"type": "string"},
                            "traits": {"type": "array", "items": {"type": "string"}},
                            "communication_style": {"type": "string"},
                            "background": {"type": "string"}
                        },
                        "required": ["name", "age", "job", "traits", "communication_style", "background"]
                    }
                }
            },
            "required": ["personas"]
        }),
    }
}

/// Normalize a raw structured response and pull out the persona list
pub fn normalize_persona_payload(raw: Value) -> Result<Vec<Value>, GenerationError> {
    if raw.is_null() {
        return Err(GenerationError::EmptyPayload);
    }

    match normalize_structured_payload(raw) {
        Value::Object(mut map) => match map.remove(PERSONAS_KEY) {
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(GenerationError::Invalid(StructuredOutputError::new(format!(
                "'personas' must be a list, got {}",
                json_type(&other)
            )))),
            None => Err(GenerationError::MissingKey(PERSONAS_KEY)),
        },
        Value::String(_) => Err(GenerationError::UnparsableOutput),
        Value::Null => Err(GenerationError::EmptyPayload),
        _ => Err(GenerationError::MissingKey(PERSONAS_KEY)),
    }
}

/// Validate persona objects against the schema and the expected count
pub fn validate_personas(items: Vec<Value>, expected: usize) -> Result<Vec<Persona>, GenerationError> {
    let personas = items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_persona(i, item))
        .collect::<Result<Vec<_>, _>>()?;

    if personas.len() != expected {
        return Err(GenerationError::CountMismatch {
            expected,
            actual: personas.len(),
        });
    }

    Ok(personas)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

fn parse_persona(index: usize, item: &Value) -> Result<Persona, StructuredOutputError> {
    let map = item.as_object().ok_or_else(|| {
        StructuredOutputError::at(index, format!("expected an object, got {}", json_type(item)))
    })?;

    let name = required_string(index, map, &["name"])?;
    if name.is_empty() {
        return Err(StructuredOutputError::at(index, "'name' must not be empty"));
    }

    Ok(Persona {
        name,
        age: parse_age(index, map)?,
        job: required_string(index, map, &["job", "occupation"])?,
        traits: parse_traits(index, map)?,
        communication_style: required_string(
            index,
            map,
            &["communication_style", "communicationstyle"],
        )?,
        background: required_string(index, map, &["background"])?,
    })
}

fn field<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| map.get(*k))
}

fn required_string(
    index: usize,
    map: &Map<String, Value>,
    keys: &[&str],
) -> Result<String, StructuredOutputError> {
    match field(map, keys) {
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(other) => Err(StructuredOutputError::at(
            index,
            format!("'{}' must be a string, got {}", keys[0], json_type(other)),
        )),
        None => Err(StructuredOutputError::at(
            index,
            format!("missing field '{}'", keys[0]),
        )),
    }
}

fn parse_age(index: usize, map: &Map<String, Value>) -> Result<u32, StructuredOutputError> {
    let invalid = |detail: String| StructuredOutputError::at(index, detail);

    let age = match map.get("age") {
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| invalid(format!("'age' must be a whole number, got {}", n)))?,
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid(format!("'age' must be a whole number, got '{}'", s)))?,
        Some(other) => {
            return Err(invalid(format!(
                "'age' must be a whole number, got {}",
                json_type(other)
            )))
        }
        None => return Err(invalid("missing field 'age'".to_string())),
    };

    if age <= 0 {
        return Err(invalid(format!("'age' must be positive, got {}", age)));
    }
    u32::try_from(age).map_err(|_| invalid(format!("'age' out of range: {}", age)))
}

fn parse_traits(index: usize, map: &Map<String, Value>) -> Result<Vec<String>, StructuredOutputError> {
    match map.get("traits") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|t| {
                t.as_str().map(|s| s.trim().to_string()).ok_or_else(|| {
                    StructuredOutputError::at(index, "'traits' must contain only strings")
                })
            })
            .collect(),
        Some(other) => Err(StructuredOutputError::at(
            index,
            format!("'traits' must be a list, got {}", json_type(other)),
        )),
        None => Err(StructuredOutputError::at(index, "missing field 'traits'")),
    }
}

/// Generates a validated persona panel with bounded retries
pub struct PersonaGenerator<'a> {
    client: &'a dyn ModelClient,
    policy: RetryPolicy,
}

impl<'a> PersonaGenerator<'a> {
    pub fn new(client: &'a dyn ModelClient, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// One attempt: call, normalize, validate
    fn attempt(&self, prompt: &str, count: usize) -> Result<Vec<Persona>, GenerationError> {
        let raw = self.client.complete_structured(prompt, &persona_schema())?;
        let items = normalize_persona_payload(raw)?;
        validate_personas(items, count)
    }

    /// Produce exactly `count` personas for `demographic`
    pub fn generate(
        &self,
        count: u32,
        demographic: &str,
        observer: &dyn WorkflowObserver,
    ) -> Result<Vec<Persona>, WorkflowError> {
        let prompt = build_persona_prompt(count, demographic);
        let expected = count as usize;

        let outcome = with_retry(
            &self.policy,
            |_| self.attempt(&prompt, expected),
            GenerationError::is_retryable,
            |attempt, error, will_retry| {
                observer.on_attempt_failed(
                    "personas",
                    attempt,
                    self.policy.max_attempts,
                    &error.to_string(),
                    will_retry,
                )
            },
        );

        match outcome.result {
            Ok(personas) => {
                log::info!(
                    "[personas] Generated {} personas in {} attempt(s)",
                    personas.len(),
                    outcome.attempts
                );
                Ok(personas)
            }
            Err(cause) if outcome.exhausted => Err(WorkflowError::PersonaGenerationExhausted {
                attempts: outcome.attempts,
                cause,
            }),
            Err(cause) => Err(WorkflowError::PersonaGeneration(cause)),
        }
    }
}
