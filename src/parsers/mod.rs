// Parsers for model output

pub mod structured_output;

pub use structured_output::{
    extract_json_blocks, normalize_key, normalize_keys, normalize_structured_payload,
    parse_json_payload, StructuredOutputError,
};
