// Error taxonomy for research runs

use crate::llm::LlmError;
use crate::models::StageTransitionError;
use crate::parsers::StructuredOutputError;
use thiserror::Error;

/// A request that cannot start a run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Missing credentials: provide an API key")]
    MissingCredentials,

    #[error("Research question must not be empty")]
    EmptyQuestion,

    #[error("Target audience must not be empty")]
    EmptyAudience,

    #[error("{field} must be between 1 and {max}, got {value}")]
    InvalidCount {
        field: &'static str,
        value: i64,
        max: u32,
    },

    #[error("Malformed request: {0}")]
    Malformed(String),
}

/// One failed structured generation attempt
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Model returned no structured payload")]
    EmptyPayload,

    #[error("Structured output could not be parsed as JSON")]
    UnparsableOutput,

    #[error("Structured output has no '{0}' key")]
    MissingKey(&'static str),

    #[error("Structured output failed validation: {0}")]
    Invalid(StructuredOutputError),

    #[error("Expected {expected} items, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    Model(#[from] LlmError),
}

impl GenerationError {
    /// Validation failures are retried; model transport failures are not
    pub fn is_retryable(&self) -> bool {
        !matches!(self, GenerationError::Model(_))
    }
}

impl From<StructuredOutputError> for GenerationError {
    fn from(err: StructuredOutputError) -> Self {
        GenerationError::Invalid(err)
    }
}

/// A fatal run error
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("Failed to generate personas after {attempts} attempts: {cause}")]
    PersonaGenerationExhausted {
        attempts: u32,
        cause: GenerationError,
    },

    #[error("Persona generation failed: {0}")]
    PersonaGeneration(GenerationError),

    #[error("Question generation failed: {0}")]
    QuestionGeneration(GenerationError),

    #[error("Interview with {persona} failed at question {}: {source}", .question_index + 1)]
    Interview {
        persona: String,
        question_index: usize,
        source: LlmError,
    },

    #[error(transparent)]
    Transition(#[from] StageTransitionError),
}

impl WorkflowError {
    /// Input errors are the caller's fault; everything else is a run failure
    pub fn is_input_error(&self) -> bool {
        matches!(self, WorkflowError::Input(_))
    }
}
