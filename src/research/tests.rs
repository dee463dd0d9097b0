//! Workflow-level tests for the research module

use super::*;
use crate::config::ResearchSettings;
use crate::llm::{LlmError, ScriptedClient};
use crate::models::{TimelineEvent, TimelineEventKind, WorkflowStage};
use serde_json::{json, Value};
use std::sync::Mutex;

fn persona_json(i: usize) -> Value {
    json!({
        "name": format!("P{}", i),
        "age": 25 + i,
        "job": "Developer",
        "traits": ["curious", "impatient", "practical"],
        "communication_style": "short sentences",
        "background": format!("Background {}", i)
    })
}

fn personas_payload(count: usize) -> Value {
    json!({ "personas": (0..count).map(persona_json).collect::<Vec<_>>() })
}

fn questions_payload(questions: &[&str]) -> Value {
    json!({ "questions": questions })
}

fn config(interviews: u32, questions: u32) -> ResearchConfig {
    ResearchConfig::new("AI assistants", "developers", interviews, questions, "sk-test")
}

#[derive(Default)]
struct RecordingObserver {
    stages: Mutex<Vec<WorkflowStage>>,
    events: Mutex<Vec<TimelineEvent>>,
    failures: Mutex<Vec<(u32, bool)>>,
}

impl WorkflowObserver for RecordingObserver {
    fn on_stage_entered(&self, stage: WorkflowStage) {
        self.stages.lock().unwrap().push(stage);
    }

    fn on_attempt_failed(
        &self,
        _step: &str,
        attempt: u32,
        _max_attempts: u32,
        _error: &str,
        will_retry: bool,
    ) {
        self.failures.lock().unwrap().push((attempt, will_retry));
    }

    fn on_event(&self, event: &TimelineEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

#[test]
fn test_end_to_end_two_by_two() {
    let client = ScriptedClient::new()
        .with_structured(questions_payload(&["Q1?", "Q2?"]))
        .with_structured(personas_payload(2))
        .with_completion("p0 q0")
        .with_completion("p0 q1")
        .with_completion("p1 q0")
        .with_completion("p1 q1")
        .with_completion(
            "KEY THEMES: Users like speed.\nDIVERSE PERSPECTIVES: Some worry about cost.\nACTIONABLE RECOMMENDATIONS: Lower the price.",
        );

    let report = execute_research(
        &client,
        config(2, 2),
        &ResearchSettings::default(),
        &NoopObserver,
    )
    .unwrap();

    assert_eq!(report.participants.len(), 2);
    assert_eq!(report.all_interviews.len(), 2);
    assert!(report.all_interviews.iter().all(|i| i.responses.len() == 2));
    assert_eq!(report.interview_questions, vec!["Q1?", "Q2?"]);
    assert_eq!(report.num_interviews, 2);
    assert_eq!(report.num_questions, 2);

    assert_eq!(report.insights.key_insights, "Users like speed.");
    assert_eq!(report.insights.observations, "Some worry about cost.");
    assert_eq!(report.insights.takeaways, "Lower the price.");

    let row = &report.participants[1];
    assert_eq!(row.header, "P1");
    assert_eq!(row.kind, "developers");
    assert_eq!(row.target, "26");
    assert_eq!(
        row.interview.as_ref().map(|i| i.persona.name.as_str()),
        Some("P1")
    );
    assert_eq!(report.metadata.workflow, report::WORKFLOW_NAME);
}

#[test]
fn test_interviews_visit_pairs_row_major() {
    let client = ScriptedClient::new()
        .with_structured(questions_payload(&["Q0", "Q1", "Q2"]))
        .with_structured(personas_payload(3))
        .with_fallback_completion("fine");

    let observer = NoopObserver;
    let state = ResearchWorkflow::new(&client, &observer)
        .run(config(3, 3))
        .unwrap();

    let visited: Vec<(usize, usize)> = state
        .timeline()
        .iter()
        .filter(|e| e.kind == TimelineEventKind::AnswerRecorded)
        .map(|e| (e.persona_index.unwrap(), e.question_index.unwrap()))
        .collect();
    let expected: Vec<(usize, usize)> = (0..3).flat_map(|p| (0..3).map(move |q| (p, q))).collect();
    assert_eq!(visited, expected);

    // Same order in the prompts actually sent: 9 interviews, then synthesis
    let prompts = client.completion_prompts();
    assert_eq!(prompts.len(), 10);
    for (prompt, (p, q)) in prompts.iter().zip(expected.iter()) {
        assert!(prompt.contains(&format!("You are P{},", p)));
        assert!(prompt.contains(&format!("Question: Q{}", q)));
    }

    assert_eq!(state.completed_interviews().len(), 3);
    assert_eq!(state.current_persona_index(), 3);
    assert_eq!(state.current_question_index(), 0);
    assert!(state.current_transcript().is_empty());
}

#[test]
fn test_short_persona_list_fails_after_five_attempts() {
    let client = ScriptedClient::new()
        .with_structured(questions_payload(&["Q1?"]))
        .with_fallback_structured(personas_payload(2));
    let observer = RecordingObserver::default();

    let err = execute_research(
        &client,
        config(3, 1),
        &ResearchSettings::default(),
        &observer,
    )
    .unwrap_err();

    match err {
        WorkflowError::PersonaGenerationExhausted { attempts, cause } => {
            assert_eq!(attempts, 5);
            assert!(matches!(
                cause,
                GenerationError::CountMismatch {
                    expected: 3,
                    actual: 2
                }
            ));
        }
        other => panic!("unexpected error: {}", other),
    }

    // One question call plus five persona attempts, no interviews
    assert_eq!(client.structured_call_count(), 6);
    assert!(client.completion_prompts().is_empty());
    assert_eq!(
        *observer.failures.lock().unwrap(),
        vec![(1, true), (2, true), (3, true), (4, true), (5, false)]
    );
}

#[test]
fn test_persona_retry_recovers_from_malformed_output() {
    let client = ScriptedClient::new()
        .with_structured(questions_payload(&["Q1?"]))
        .with_structured(json!("I'm sorry, I can't format that."))
        .with_structured(json!({"model_dump": personas_payload(1)}))
        .with_fallback_completion("ok");

    let report = execute_research(
        &client,
        config(1, 1),
        &ResearchSettings::default(),
        &NoopObserver,
    )
    .unwrap();

    assert_eq!(report.personas.len(), 1);
    assert_eq!(client.structured_call_count(), 3);
}

#[test]
fn test_interview_transport_error_is_fatal() {
    let client = ScriptedClient::new()
        .with_structured(questions_payload(&["Q1?", "Q2?"]))
        .with_structured(personas_payload(1))
        .with_completion("first answer")
        .with_completion_error(LlmError::Transport("connection reset".to_string()));

    let err = execute_research(
        &client,
        config(1, 2),
        &ResearchSettings::default(),
        &NoopObserver,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        WorkflowError::Interview {
            question_index: 1,
            ..
        }
    ));
}

#[test]
fn test_follow_up_added_once_per_persona() {
    let client = ScriptedClient::new()
        .with_structured(questions_payload(&["Q1?", "Q2?"]))
        .with_structured(personas_payload(2))
        .with_fallback_completion("answer");

    let report = execute_research(
        &client,
        config(2, 2).with_follow_up(true),
        &ResearchSettings::default(),
        &NoopObserver,
    )
    .unwrap();

    for interview in &report.all_interviews {
        assert_eq!(interview.responses.len(), 3);
        let followups: Vec<_> = interview.responses.iter().filter(|r| r.is_followup).collect();
        assert_eq!(followups.len(), 1);
        assert!(interview.responses[2].is_followup);
    }
    // 4 main answers, 2 x (follow-up question + answer), synthesis
    assert_eq!(client.completion_prompts().len(), 9);
}

#[test]
fn test_zero_questions_goes_straight_to_synthesis() {
    let client = ScriptedClient::new()
        .with_structured(questions_payload(&[]))
        .with_structured(personas_payload(2))
        .with_completion("Overall nothing to report.");
    let observer = RecordingObserver::default();

    let state = ResearchWorkflow::new(&client, &observer)
        .run(config(2, 1))
        .unwrap();

    assert!(state.completed_interviews().is_empty());
    assert_eq!(state.synthesis_text(), "Overall nothing to report.");
    assert_eq!(
        *observer.stages.lock().unwrap(),
        vec![
            WorkflowStage::Configuring,
            WorkflowStage::GeneratingPersonas,
            WorkflowStage::Synthesizing,
        ]
    );
}

#[test]
fn test_synthesis_failure_degrades() {
    let client = ScriptedClient::new()
        .with_structured(questions_payload(&["Q1?"]))
        .with_structured(personas_payload(1))
        .with_completion("answer")
        .with_completion_error(LlmError::EmptyResponse);

    let report = execute_research(
        &client,
        config(1, 1),
        &ResearchSettings::default(),
        &NoopObserver,
    )
    .unwrap();

    assert!(report
        .synthesis
        .starts_with("Error during synthesis: Model returned an empty response"));
    assert!(report
        .insights
        .key_insights
        .starts_with("Error during synthesis"));
    assert!(!report.insights.observations.is_empty());
    assert!(!report.insights.takeaways.is_empty());
}

#[test]
fn test_invalid_input_never_calls_model() {
    let client = ScriptedClient::new();
    let mut cfg = config(2, 2);
    cfg.credentials = String::new();

    let err = execute_research(&client, cfg, &ResearchSettings::default(), &NoopObserver)
        .unwrap_err();

    assert!(matches!(
        err,
        WorkflowError::Input(InputError::MissingCredentials)
    ));
    assert_eq!(client.structured_call_count(), 0);
}

#[test]
fn test_observer_sees_every_timeline_event() {
    let client = ScriptedClient::new()
        .with_structured(questions_payload(&["Q1?"]))
        .with_structured(personas_payload(2))
        .with_fallback_completion("answer");
    let observer = RecordingObserver::default();

    let state = ResearchWorkflow::new(&client, &observer)
        .run(config(2, 1))
        .unwrap();

    let events = observer.events.lock().unwrap();
    assert_eq!(events.as_slice(), state.timeline());

    let kinds: Vec<_> = events.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TimelineEventKind::QuestionsGenerated,
            TimelineEventKind::PersonasGenerated,
            TimelineEventKind::AnswerRecorded,
            TimelineEventKind::InterviewCompleted,
            TimelineEventKind::AnswerRecorded,
            TimelineEventKind::InterviewCompleted,
            TimelineEventKind::SynthesisGenerated,
        ]
    );
}

#[test]
fn test_step_from_done_is_noop() {
    let client = ScriptedClient::new();
    let observer = NoopObserver;
    let workflow = ResearchWorkflow::new(&client, &observer);

    let (stage, state) = workflow
        .step(WorkflowStage::Done, RunState::new(config(1, 1)))
        .unwrap();
    assert_eq!(stage, WorkflowStage::Done);
    assert!(state.timeline().is_empty());
}

#[test]
fn test_step_follows_fixed_successors() {
    let client = ScriptedClient::new()
        .with_structured(questions_payload(&["Q1?"]))
        .with_completion("KEY THEMES: Nothing yet.");
    let observer = NoopObserver;
    let workflow = ResearchWorkflow::new(&client, &observer);

    let (stage, state) = workflow
        .step(WorkflowStage::Configuring, RunState::new(config(1, 1)))
        .unwrap();
    assert_eq!(stage, WorkflowStage::GeneratingPersonas);
    assert_eq!(state.question_set, vec!["Q1?"]);

    let (stage, state) = workflow.step(WorkflowStage::Synthesizing, state).unwrap();
    assert_eq!(stage, WorkflowStage::Done);
    assert_eq!(state.synthesis_text(), "KEY THEMES: Nothing yet.");
}
