//! Simulated user research
//!
//! Given a research question and a target audience, the workflow generates
//! interview questions and a panel of personas, interviews every persona on
//! every question in the persona's voice, and synthesizes the transcripts into
//! categorized insights.
//!
//! All model calls are blocking and go through a per-run [`ModelClient`].
//!
//! [`ModelClient`]: crate::llm::ModelClient

pub mod engine;
pub mod error;
pub mod insights;
pub mod interview;
pub mod observer;
pub mod personas;
pub mod prompts;
pub mod questions;
pub mod report;
pub mod retry;
pub mod state;
pub mod synthesis;

#[cfg(test)]
mod tests;

pub use engine::{execute_research, ResearchWorkflow};
pub use error::{GenerationError, InputError, WorkflowError};
pub use insights::{extract_insights, InsightBucket};
pub use observer::{LogObserver, NoopObserver, WorkflowObserver};
pub use report::{ParticipantRow, ReportMetadata, ResearchReport};
pub use retry::RetryPolicy;
pub use state::{validate_count, InterviewTurn, ResearchConfig, RunState};
