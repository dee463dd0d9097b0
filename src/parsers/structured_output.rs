// Structured output parser - recovers JSON payloads from model responses
//
// Providers do not always honor the requested response format. A structured
// call may come back as the expected object, an object wrapped in a "dump" or
// "parsed" member, a `{content: "..."}` text payload, or a bare JSON string,
// sometimes inside a markdown code fence. `normalize_structured_payload`
// reduces all of those to one plain value with normalized keys.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Error type for structured output validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredOutputError {
    pub message: String,
    pub item_index: Option<usize>,
}

impl StructuredOutputError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            item_index: None,
        }
    }

    pub fn at(item_index: usize, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            item_index: Some(item_index),
        }
    }
}

impl std::fmt::Display for StructuredOutputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(idx) = self.item_index {
            write!(f, "Item {}: {}", idx, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for StructuredOutputError {}

/// Member names under which a client library nests the parsed object
const WRAPPER_KEYS: &[&str] = &["model_dump", "dump", "parsed"];

/// Member names carrying a raw text payload
const TEXT_PAYLOAD_KEYS: &[&str] = &["content", "text"];

static CODE_FENCE_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_code_fence_regex() -> &'static Regex {
    CODE_FENCE_REGEX.get_or_init(|| Regex::new(r"```(?:json|JSON)?\s*\n([\s\S]*?)```").unwrap())
}

/// Extract fenced code blocks from markdown content
/// Returns the bodies of all ``` ... ``` and ```json ... ``` blocks found
pub fn extract_json_blocks(content: &str) -> Vec<String> {
    get_code_fence_regex()
        .captures_iter(content)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().trim().to_string()))
        .collect()
}

/// Parse JSON out of free text.
///
/// Tries the whole text, then each fenced block, then the widest `{...}` or
/// `[...]` slice.
pub fn parse_json_payload(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    for block in extract_json_blocks(trimmed) {
        if let Ok(value) = serde_json::from_str::<Value>(&block) {
            return Some(value);
        }
    }

    for (open, close) in [('{', '}'), ('[', ']')] {
        if let (Some(start), Some(end)) = (trimmed.find(open), trimmed.rfind(close)) {
            if start < end {
                if let Ok(value) = serde_json::from_str::<Value>(&trimmed[start..=end]) {
                    return Some(value);
                }
            }
        }
    }

    None
}

/// Normalize one mapping key: trim, drop stray quotes, lowercase, and turn
/// spaces and hyphens into underscores
pub fn normalize_key(key: &str) -> String {
    key.trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '`')
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Recursively normalize every mapping key in a value
pub fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (normalize_key(&k), normalize_keys(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

/// Reduce a raw structured response to a plain value with normalized keys.
///
/// Steps, in order:
/// 1. flatten a lone "dump"/"parsed" wrapper member,
/// 2. parse a `content`/`text` string payload,
/// 3. parse a bare string as JSON,
/// 4. normalize mapping keys.
///
/// A string that does not parse is returned as-is, with nothing to normalize.
pub fn normalize_structured_payload(raw: Value) -> Value {
    let mut value = raw;

    if let Value::Object(map) = &value {
        let wrapped = map
            .iter()
            .find(|(k, v)| WRAPPER_KEYS.contains(&normalize_key(k).as_str()) && v.is_object());
        if let Some((_, inner)) = wrapped {
            if map.len() == 1 {
                value = inner.clone();
            }
        }
    }

    if let Value::Object(map) = &value {
        let text_payload = map.iter().find_map(|(k, v)| {
            if TEXT_PAYLOAD_KEYS.contains(&normalize_key(k).as_str()) {
                v.as_str()
            } else {
                None
            }
        });
        if let Some(parsed) = text_payload.and_then(parse_json_payload) {
            value = parsed;
        }
    }

    if let Value::String(text) = &value {
        if let Some(parsed) = parse_json_payload(text) {
            value = parsed;
        }
    }

    normalize_keys(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_json_blocks_single() {
        let content = "Here you go:\n\n```json\n{\"a\": 1}\n```\n";
        let blocks = extract_json_blocks(content);
        assert_eq!(blocks, vec!["{\"a\": 1}"]);
    }

    #[test]
    fn test_extract_json_blocks_untagged_fence() {
        let content = "```\n[1, 2]\n```";
        assert_eq!(extract_json_blocks(content), vec!["[1, 2]"]);
    }

    #[test]
    fn test_parse_json_payload_with_prose() {
        let text = "Sure! {\"personas\": []} Hope this helps.";
        assert_eq!(parse_json_payload(text), Some(json!({"personas": []})));
    }

    #[test]
    fn test_parse_json_payload_rejects_prose() {
        assert_eq!(parse_json_payload("no json here"), None);
        assert_eq!(parse_json_payload("   "), None);
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("  \"Personas\" "), "personas");
        assert_eq!(normalize_key("Communication Style"), "communication_style");
        assert_eq!(normalize_key("communication-style"), "communication_style");
    }

    #[test]
    fn test_flattens_dump_wrapper() {
        let raw = json!({"model_dump": {"Personas": [{"Name": "Ada"}]}});
        assert_eq!(
            normalize_structured_payload(raw),
            json!({"personas": [{"name": "Ada"}]})
        );
    }

    #[test]
    fn test_parses_text_payload() {
        let raw = json!({"content": "```json\n{\"personas\": []}\n```"});
        assert_eq!(normalize_structured_payload(raw), json!({"personas": []}));
    }

    #[test]
    fn test_parses_bare_string() {
        let raw = Value::String("{\" personas \": [1]}".to_string());
        assert_eq!(normalize_structured_payload(raw), json!({"personas": [1]}));
    }

    #[test]
    fn test_leaves_unparsable_string() {
        let raw = Value::String("I cannot do that".to_string());
        assert_eq!(normalize_structured_payload(raw.clone()), raw);
    }

    #[test]
    fn test_error_display_includes_index() {
        let err = StructuredOutputError::at(2, "missing field 'age'");
        assert_eq!(err.to_string(), "Item 2: missing field 'age'");
        assert_eq!(StructuredOutputError::new("bad").to_string(), "bad");
    }
}
