// Serialized result of a research run

use super::insights::extract_insights;
use super::state::RunState;
use crate::models::{InsightSummary, Interview, Persona, TimelineEvent};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Name reported in the run metadata
pub const WORKFLOW_NAME: &str = "persona-interviews";

/// Dashboard table row for one persona
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRow {
    pub id: usize,
    /// Persona name
    pub header: String,
    /// Target audience
    #[serde(rename = "type")]
    pub kind: String,
    /// Traits joined by ", "
    pub status: String,
    /// Age as a string
    pub target: String,
    /// Job
    pub limit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview: Option<Interview>,
}

impl ParticipantRow {
    pub fn new(index: usize, persona: &Persona, audience: &str, interview: Option<Interview>) -> Self {
        Self {
            id: index + 1,
            header: persona.name.clone(),
            kind: audience.to_string(),
            status: persona.traits_display(),
            target: persona.age.to_string(),
            limit: persona.job.clone(),
            interview,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub run_id: String,
    /// Wall-clock duration, e.g. "12.3s"
    pub execution_time: String,
    pub workflow: String,
}

/// Everything a caller gets back from a successful run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchReport {
    #[serde(flatten)]
    pub insights: InsightSummary,
    pub research_question: String,
    pub target_demographic: String,
    /// RFC 3339 UTC completion time
    pub timestamp: String,
    /// Requested interview count
    pub num_interviews: u32,
    /// Requested question count
    pub num_questions: u32,
    pub interview_questions: Vec<String>,
    pub personas: Vec<Persona>,
    pub all_interviews: Vec<Interview>,
    pub synthesis: String,
    pub timeline: Vec<TimelineEvent>,
    pub participants: Vec<ParticipantRow>,
    pub metadata: ReportMetadata,
}

impl ResearchReport {
    /// Build the report from a finished run
    pub fn from_state(state: RunState, run_id: &str, elapsed: Duration) -> Self {
        let RunState {
            config,
            question_set,
            personas,
            completed_interviews,
            synthesis_text,
            insights,
            timeline,
            ..
        } = state;

        let insights = insights
            .unwrap_or_else(|| extract_insights(&synthesis_text, &config.research_question));

        let participants = personas
            .iter()
            .enumerate()
            .map(|(i, persona)| {
                ParticipantRow::new(
                    i,
                    persona,
                    &config.target_demographic,
                    completed_interviews.get(i).cloned(),
                )
            })
            .collect();

        Self {
            insights,
            research_question: config.research_question,
            target_demographic: config.target_demographic,
            timestamp: Utc::now().to_rfc3339(),
            num_interviews: config.num_interviews,
            num_questions: config.num_questions,
            interview_questions: question_set,
            personas,
            all_interviews: completed_interviews,
            synthesis: synthesis_text,
            timeline,
            participants,
            metadata: ReportMetadata {
                run_id: run_id.to_string(),
                execution_time: format!("{:.1}s", elapsed.as_secs_f64()),
                workflow: WORKFLOW_NAME.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persona() -> Persona {
        Persona {
            name: "Ada".to_string(),
            age: 41,
            job: "Teacher".to_string(),
            traits: vec!["calm".to_string(), "wry".to_string()],
            communication_style: "measured".to_string(),
            background: "Public schools".to_string(),
        }
    }

    #[test]
    fn test_participant_row_shape() {
        let row = ParticipantRow::new(0, &persona(), "teachers", None);
        let json = serde_json::to_value(&row).unwrap();

        assert_eq!(json["id"], 1);
        assert_eq!(json["header"], "Ada");
        assert_eq!(json["type"], "teachers");
        assert_eq!(json["status"], "calm, wry");
        assert_eq!(json["target"], "41");
        assert_eq!(json["limit"], "Teacher");
        assert!(json.get("interview").is_none());
    }
}
