//! Research workflow engine
//!
//! Drives a run through `Configuring -> GeneratingPersonas -> Interviewing* ->
//! Synthesizing -> Done`. Each stage is a transition that consumes the
//! `RunState` and returns the next one together with the stage to enter;
//! every move is checked against the stage transition table.

use super::error::WorkflowError;
use super::insights::extract_insights;
use super::interview::InterviewConductor;
use super::observer::WorkflowObserver;
use super::personas::PersonaGenerator;
use super::questions::QuestionGenerator;
use super::report::ResearchReport;
use super::retry::RetryPolicy;
use super::state::{ResearchConfig, RunState};
use super::synthesis::synthesize;
use crate::config::ResearchSettings;
use crate::llm::ModelClient;
use crate::models::{
    is_terminal_stage, next_stage, transition_stage, StageTransitionError, WorkflowStage,
};
use std::time::Instant;
use uuid::Uuid;

pub struct ResearchWorkflow<'a> {
    client: &'a dyn ModelClient,
    observer: &'a dyn WorkflowObserver,
    persona_policy: RetryPolicy,
}

impl<'a> ResearchWorkflow<'a> {
    pub fn new(client: &'a dyn ModelClient, observer: &'a dyn WorkflowObserver) -> Self {
        Self {
            client,
            observer,
            persona_policy: RetryPolicy::default(),
        }
    }

    pub fn with_persona_policy(mut self, policy: RetryPolicy) -> Self {
        self.persona_policy = policy;
        self
    }

    /// Generate the question set
    pub fn configure(&self, state: RunState) -> Result<RunState, WorkflowError> {
        let questions = QuestionGenerator::new(self.client).generate(
            state.config.num_questions,
            &state.config.research_question,
            self.observer,
        )?;
        Ok(state.with_questions(questions))
    }

    /// Generate the persona panel and reset the interview cursor
    pub fn generate_personas(&self, state: RunState) -> Result<RunState, WorkflowError> {
        let personas = PersonaGenerator::new(self.client, self.persona_policy).generate(
            state.config.num_interviews,
            &state.config.target_demographic,
            self.observer,
        )?;
        Ok(state.with_personas(personas))
    }

    /// Run exactly one (persona, question) step
    pub fn interview(&self, state: RunState) -> Result<RunState, WorkflowError> {
        let conductor = InterviewConductor::new(self.client, state.config.follow_up);
        match conductor.conduct(&state)? {
            Some(turn) => Ok(state.apply_turn(turn)),
            None => Ok(state),
        }
    }

    /// Summarize every transcript and extract insights; never fails
    pub fn synthesize(&self, state: RunState) -> RunState {
        let synthesis = synthesize(
            self.client,
            &state.config.research_question,
            &state.config.target_demographic,
            &state.completed_interviews,
        );
        let insights = extract_insights(&synthesis, &state.config.research_question);
        state.with_synthesis(synthesis, insights)
    }

    /// Continue interviewing or move on to synthesis
    pub fn route_interviews(state: &RunState) -> WorkflowStage {
        if state.interviews_complete() {
            WorkflowStage::Synthesizing
        } else {
            WorkflowStage::Interviewing
        }
    }

    /// Run one stage and decide the next one
    pub fn step(
        &self,
        stage: WorkflowStage,
        state: RunState,
    ) -> Result<(WorkflowStage, RunState), WorkflowError> {
        self.observer.on_stage_entered(stage);

        let (routed, state) = match stage {
            WorkflowStage::Configuring => (None, self.configure(state)?),
            WorkflowStage::GeneratingPersonas => {
                let state = self.generate_personas(state)?;
                (Some(Self::route_interviews(&state)), state)
            }
            WorkflowStage::Interviewing => {
                let state = self.interview(state)?;
                (Some(Self::route_interviews(&state)), state)
            }
            WorkflowStage::Synthesizing => (None, self.synthesize(state)),
            WorkflowStage::Done => return Ok((WorkflowStage::Done, state)),
        };

        let next = routed
            .or_else(|| next_stage(stage))
            .ok_or(StageTransitionError::AlreadyTerminal(stage))?;
        Ok((transition_stage(stage, next)?, state))
    }

    /// Drive a run from start to `Done`
    pub fn run(&self, config: ResearchConfig) -> Result<RunState, WorkflowError> {
        log::info!(
            "[workflow] Starting research: {} interviews x {} questions",
            config.num_interviews,
            config.num_questions
        );

        let mut stage = WorkflowStage::Configuring;
        let mut state = RunState::new(config);

        while !is_terminal_stage(stage) {
            let seen = state.timeline.len();
            let (next, next_state) = self.step(stage, state)?;
            for event in &next_state.timeline[seen..] {
                self.observer.on_event(event);
            }
            stage = next;
            state = next_state;
        }

        Ok(state)
    }
}

/// Validate, run and report one research request
pub fn execute_research(
    client: &dyn ModelClient,
    config: ResearchConfig,
    limits: &ResearchSettings,
    observer: &dyn WorkflowObserver,
) -> Result<ResearchReport, WorkflowError> {
    config.validate(limits)?;

    let run_id = Uuid::new_v4().to_string();
    log::info!("[workflow] Run {} accepted", run_id);

    let started = Instant::now();
    let state = ResearchWorkflow::new(client, observer)
        .with_persona_policy(RetryPolicy::new(limits.max_persona_attempts))
        .run(config)?;
    let elapsed = started.elapsed();

    log::info!(
        "[workflow] Run {} completed {} interviews in {:.1}s",
        run_id,
        state.completed_interviews.len(),
        elapsed.as_secs_f64()
    );

    Ok(ResearchReport::from_state(state, &run_id, elapsed))
}
