// Interview conductor: one (persona, question) step per call

use super::error::WorkflowError;
use super::prompts::{
    build_followup_answer_prompt, build_followup_question_prompt, build_interview_prompt,
};
use super::state::{InterviewTurn, RunState};
use crate::llm::{LlmError, ModelClient};
use crate::models::{Persona, TranscriptEntry};

pub struct InterviewConductor<'a> {
    client: &'a dyn ModelClient,
    follow_up: bool,
}

impl<'a> InterviewConductor<'a> {
    pub fn new(client: &'a dyn ModelClient, follow_up: bool) -> Self {
        Self { client, follow_up }
    }

    /// Ask the current question in the current persona's voice.
    ///
    /// On the persona's last question, and when follow-ups are enabled, one
    /// follow-up exchange is appended to the turn. Returns `None` when no pair
    /// is left to visit.
    pub fn conduct(&self, state: &RunState) -> Result<Option<InterviewTurn>, WorkflowError> {
        let Some((persona, question)) = state.current_pair() else {
            return Ok(None);
        };
        let question_index = state.current_question_index();
        let fail = |source: LlmError| WorkflowError::Interview {
            persona: persona.name.clone(),
            question_index,
            source,
        };

        log::debug!(
            "[interview] {} / question {}: {}",
            persona.name,
            question_index + 1,
            question
        );

        let answer = self
            .client
            .complete(&build_interview_prompt(persona, question))
            .map_err(fail)?;
        let answer = answer.trim().to_string();

        let mut entries = vec![TranscriptEntry::new(question, answer.clone())];

        let is_last_question = question_index + 1 >= state.question_set().len();
        let already_followed_up = state.current_transcript().iter().any(|e| e.is_followup);
        if self.follow_up && is_last_question && !already_followed_up {
            entries.push(self.follow_up_on(persona, &answer).map_err(fail)?);
        }

        Ok(Some(InterviewTurn { entries }))
    }

    fn follow_up_on(&self, persona: &Persona, answer: &str) -> Result<TranscriptEntry, LlmError> {
        let followup_question = self
            .client
            .complete(&build_followup_question_prompt(persona, answer))?;
        let followup_question = followup_question.trim();

        let followup_answer = self
            .client
            .complete(&build_followup_answer_prompt(persona, followup_question))?;

        Ok(TranscriptEntry::followup(
            followup_question,
            followup_answer.trim(),
        ))
    }
}
