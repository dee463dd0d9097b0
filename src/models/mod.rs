// Data models shared by the research workflow and the HTTP surface

pub mod state_machine;

pub use state_machine::{
    can_transition, is_terminal_stage, next_stage, transition_stage, StageTransitionError,
};

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A synthetic interview subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub name: String,
    pub age: u32,
    pub job: String,
    /// Personality traits, usually 3-4
    pub traits: Vec<String>,
    pub communication_style: String,
    /// One background detail shaping their perspective
    pub background: String,
}

impl Persona {
    /// Traits rendered as a comma-separated list
    pub fn traits_display(&self) -> String {
        self.traits.join(", ")
    }
}

/// One question/answer pair in a transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub question: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_followup: bool,
}

impl TranscriptEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            is_followup: false,
        }
    }

    pub fn followup(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            is_followup: true,
            ..Self::new(question, answer)
        }
    }
}

/// A completed interview with one persona
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interview {
    pub persona: Persona,
    pub responses: Vec<TranscriptEntry>,
}

/// Categorized findings extracted from the synthesis text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightSummary {
    pub key_insights: String,
    pub observations: String,
    pub takeaways: String,
}

/// Stages of the research workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    /// Generating the interview questions
    Configuring,
    /// Generating and validating the persona panel
    GeneratingPersonas,
    /// One (persona, question) step per visit
    Interviewing,
    /// Summarizing every transcript and extracting insights
    Synthesizing,
    Done,
}

impl WorkflowStage {
    pub fn display_name(&self) -> &'static str {
        match self {
            WorkflowStage::Configuring => "Configuring",
            WorkflowStage::GeneratingPersonas => "Generating personas",
            WorkflowStage::Interviewing => "Interviewing",
            WorkflowStage::Synthesizing => "Synthesizing",
            WorkflowStage::Done => "Done",
        }
    }
}

/// Kind of milestone recorded on the run timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineEventKind {
    QuestionsGenerated,
    PersonasGenerated,
    AnswerRecorded,
    InterviewCompleted,
    SynthesisGenerated,
}

/// Append-only diagnostic record of a workflow milestone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub kind: TimelineEventKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persona_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_index: Option<usize>,
    /// RFC 3339 UTC timestamp
    pub timestamp: String,
}

impl TimelineEvent {
    pub fn new(kind: TimelineEventKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            persona_index: None,
            question_index: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    pub fn at(mut self, persona_index: usize, question_index: Option<usize>) -> Self {
        self.persona_index = Some(persona_index);
        self.question_index = question_index;
        self
    }
}
