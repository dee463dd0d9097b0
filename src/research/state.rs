//! Run configuration and the state threaded through the workflow
//!
//! `RunState` is only changed through the consuming transition methods below,
//! each of which takes the state by value and returns the next one. The
//! engine is the only caller.

use super::error::InputError;
use crate::config::ResearchSettings;
use crate::models::{
    InsightSummary, Interview, Persona, TimelineEvent, TimelineEventKind, TranscriptEntry,
};

/// Immutable input for one research run
#[derive(Clone)]
pub struct ResearchConfig {
    pub research_question: String,
    pub target_demographic: String,
    pub num_interviews: u32,
    pub num_questions: u32,
    /// API key for the model provider
    pub credentials: String,
    /// Ask one follow-up question at the end of each interview
    pub follow_up: bool,
}

impl std::fmt::Debug for ResearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchConfig")
            .field("research_question", &self.research_question)
            .field("target_demographic", &self.target_demographic)
            .field("num_interviews", &self.num_interviews)
            .field("num_questions", &self.num_questions)
            .field("credentials", &"<redacted>")
            .field("follow_up", &self.follow_up)
            .finish()
    }
}

impl ResearchConfig {
    pub fn new(
        research_question: impl Into<String>,
        target_demographic: impl Into<String>,
        num_interviews: u32,
        num_questions: u32,
        credentials: impl Into<String>,
    ) -> Self {
        Self {
            research_question: research_question.into(),
            target_demographic: target_demographic.into(),
            num_interviews,
            num_questions,
            credentials: credentials.into(),
            follow_up: false,
        }
    }

    pub fn with_follow_up(mut self, follow_up: bool) -> Self {
        self.follow_up = follow_up;
        self
    }

    /// Reject configurations that must not start a run
    pub fn validate(&self, limits: &ResearchSettings) -> Result<(), InputError> {
        if self.credentials.trim().is_empty() {
            return Err(InputError::MissingCredentials);
        }
        if self.research_question.trim().is_empty() {
            return Err(InputError::EmptyQuestion);
        }
        if self.target_demographic.trim().is_empty() {
            return Err(InputError::EmptyAudience);
        }
        validate_count("numInterviews", self.num_interviews as i64, limits.max_interviews)?;
        validate_count("numQuestions", self.num_questions as i64, limits.max_questions)?;
        Ok(())
    }
}

/// Check a requested count against `1..=max`
pub fn validate_count(field: &'static str, value: i64, max: u32) -> Result<u32, InputError> {
    if value < 1 || value > max as i64 {
        return Err(InputError::InvalidCount { field, value, max });
    }
    Ok(value as u32)
}

/// Transcript entries produced by one interview step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewTurn {
    /// The main answer, optionally followed by one follow-up exchange
    pub entries: Vec<TranscriptEntry>,
}

/// Mutable aggregate of one research run
#[derive(Debug, Clone)]
pub struct RunState {
    pub(crate) config: ResearchConfig,
    pub(crate) question_set: Vec<String>,
    pub(crate) personas: Vec<Persona>,
    pub(crate) current_persona_index: usize,
    pub(crate) current_question_index: usize,
    pub(crate) current_transcript: Vec<TranscriptEntry>,
    pub(crate) completed_interviews: Vec<Interview>,
    pub(crate) synthesis_text: String,
    pub(crate) insights: Option<InsightSummary>,
    pub(crate) timeline: Vec<TimelineEvent>,
}

impl RunState {
    /// Fresh state with empty collections
    pub fn new(config: ResearchConfig) -> Self {
        Self {
            config,
            question_set: Vec::new(),
            personas: Vec::new(),
            current_persona_index: 0,
            current_question_index: 0,
            current_transcript: Vec::new(),
            completed_interviews: Vec::new(),
            synthesis_text: String::new(),
            insights: None,
            timeline: Vec::new(),
        }
    }

    pub fn config(&self) -> &ResearchConfig {
        &self.config
    }

    pub fn question_set(&self) -> &[String] {
        &self.question_set
    }

    pub fn personas(&self) -> &[Persona] {
        &self.personas
    }

    pub fn current_persona_index(&self) -> usize {
        self.current_persona_index
    }

    pub fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    pub fn current_transcript(&self) -> &[TranscriptEntry] {
        &self.current_transcript
    }

    pub fn completed_interviews(&self) -> &[Interview] {
        &self.completed_interviews
    }

    pub fn synthesis_text(&self) -> &str {
        &self.synthesis_text
    }

    pub fn insights(&self) -> Option<&InsightSummary> {
        self.insights.as_ref()
    }

    pub fn timeline(&self) -> &[TimelineEvent] {
        &self.timeline
    }

    /// The (persona, question) pair the next interview step will visit
    pub fn current_pair(&self) -> Option<(&Persona, &str)> {
        let persona = self.personas.get(self.current_persona_index)?;
        let question = self.question_set.get(self.current_question_index)?;
        Some((persona, question.as_str()))
    }

    /// True when no interview step remains
    pub fn interviews_complete(&self) -> bool {
        self.question_set.is_empty() || self.current_persona_index >= self.personas.len()
    }

    fn record(&mut self, event: TimelineEvent) {
        self.timeline.push(event);
    }

    pub(crate) fn with_questions(mut self, questions: Vec<String>) -> Self {
        let message = format!("Generated {} interview questions", questions.len());
        self.question_set = questions;
        self.record(TimelineEvent::new(TimelineEventKind::QuestionsGenerated, message));
        self
    }

    /// Install the persona panel and reset the interview cursor
    pub(crate) fn with_personas(mut self, personas: Vec<Persona>) -> Self {
        let message = format!("Generated {} personas", personas.len());
        self.personas = personas;
        self.current_persona_index = 0;
        self.current_question_index = 0;
        self.current_transcript.clear();
        self.completed_interviews.clear();
        self.record(TimelineEvent::new(TimelineEventKind::PersonasGenerated, message));
        self
    }

    /// Record one interview step and advance the cursor in row-major order
    pub(crate) fn apply_turn(mut self, turn: InterviewTurn) -> Self {
        let persona_index = self.current_persona_index;
        let question_index = self.current_question_index;
        let persona_name = self
            .personas
            .get(persona_index)
            .map(|p| p.name.clone())
            .unwrap_or_default();

        for entry in turn.entries {
            let event = if entry.is_followup {
                TimelineEvent::new(
                    TimelineEventKind::AnswerRecorded,
                    format!("{} answered a follow-up question", persona_name),
                )
                .at(persona_index, None)
            } else {
                TimelineEvent::new(
                    TimelineEventKind::AnswerRecorded,
                    format!("{} answered question {}", persona_name, question_index + 1),
                )
                .at(persona_index, Some(question_index))
            };
            self.current_transcript.push(entry);
            self.record(event);
        }

        if question_index + 1 >= self.question_set.len() {
            if let Some(persona) = self.personas.get(persona_index).cloned() {
                let responses = std::mem::take(&mut self.current_transcript);
                self.completed_interviews.push(Interview { persona, responses });
                self.record(
                    TimelineEvent::new(
                        TimelineEventKind::InterviewCompleted,
                        format!("Completed interview with {}", persona_name),
                    )
                    .at(persona_index, None),
                );
            }
            self.current_question_index = 0;
            self.current_persona_index += 1;
        } else {
            self.current_question_index += 1;
        }

        self
    }

    pub(crate) fn with_synthesis(mut self, synthesis: String, insights: InsightSummary) -> Self {
        self.synthesis_text = synthesis;
        self.insights = Some(insights);
        self.record(TimelineEvent::new(
            TimelineEventKind::SynthesisGenerated,
            format!(
                "Synthesized {} interviews",
                self.completed_interviews.len()
            ),
        ));
        self
    }
}
