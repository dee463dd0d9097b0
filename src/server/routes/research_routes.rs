//! Research run endpoint
//!
//! `POST /api/run-uxr` runs one full research workflow and returns the report
//! wrapped in the standard response envelope. The workflow itself is blocking,
//! so it runs on the blocking pool.

use crate::research::{
    execute_research, validate_count, InputError, LogObserver, ResearchConfig, ResearchReport,
};
use crate::server::response::{ApiError, ApiResponse, ErrorContext};
use crate::server::ServerAppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

/// Request body. Every field is optional; missing counts fall back to the
/// configured defaults and missing credentials to the configured API key.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResearchRequest {
    pub question: Option<String>,
    pub audience: Option<String>,
    /// Integer or numeric string
    pub num_interviews: Option<Value>,
    /// Integer or numeric string
    pub num_questions: Option<Value>,
    pub credentials: Option<String>,
    pub follow_up: Option<bool>,
}

/// Read a count that may arrive as a JSON number or a numeric string
fn parse_count(field: &'static str, value: Option<&Value>, default: u32) -> Result<i64, InputError> {
    match value {
        None | Some(Value::Null) => Ok(default as i64),
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| InputError::Malformed(format!("{} must be an integer", field))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| InputError::Malformed(format!("{} must be an integer", field))),
        Some(_) => Err(InputError::Malformed(format!(
            "{} must be an integer",
            field
        ))),
    }
}

/// Run a research workflow
pub async fn run_research_handler(
    State(state): State<ServerAppState>,
    payload: Result<Json<RunResearchRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ResearchReport>>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        log::warn!("[run-uxr] Rejected request body: {}", rejection.body_text());
        ApiError::from(InputError::Malformed(rejection.body_text()))
    })?;

    let limits = state.settings.research.clone();
    let question = request.question.unwrap_or_default();
    let audience = request.audience.unwrap_or_default();

    let mut context = ErrorContext {
        question_length: question.len(),
        audience_length: audience.len(),
        num_interviews: limits.default_interviews as i64,
        num_questions: limits.default_questions as i64,
    };

    let num_interviews = parse_count(
        "numInterviews",
        request.num_interviews.as_ref(),
        limits.default_interviews,
    )
    .map_err(|e| ApiError::from(e).with_context(context.clone()))?;
    context.num_interviews = num_interviews;

    let num_questions = parse_count(
        "numQuestions",
        request.num_questions.as_ref(),
        limits.default_questions,
    )
    .map_err(|e| ApiError::from(e).with_context(context.clone()))?;
    context.num_questions = num_questions;

    let num_interviews = validate_count("numInterviews", num_interviews, limits.max_interviews)
        .map_err(|e| ApiError::from(e).with_context(context.clone()))?;
    let num_questions = validate_count("numQuestions", num_questions, limits.max_questions)
        .map_err(|e| ApiError::from(e).with_context(context.clone()))?;

    let credentials = request
        .credentials
        .filter(|c| !c.trim().is_empty())
        .or_else(|| state.settings.model.resolved_api_key())
        .unwrap_or_default();

    let config = ResearchConfig::new(question, audience, num_interviews, num_questions, credentials)
        .with_follow_up(request.follow_up.unwrap_or(false));
    config
        .validate(&limits)
        .map_err(|e| ApiError::from(e).with_context(context.clone()))?;

    log::info!(
        "[run-uxr] Starting research: {} interviews, {} questions, audience {} chars",
        num_interviews,
        num_questions,
        context.audience_length
    );

    // The blocking HTTP client must be created and dropped off the async runtime
    let factory = state.client_factory.clone();
    let guard = state.shutdown_state.begin_run();
    let run_context = context.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let _guard = guard;
        let client = factory.build(&config.credentials).map_err(|e| {
            log::error!("[run-uxr] Failed to build model client: {}", e);
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
                .with_context(run_context.clone())
        })?;
        execute_research(client.as_ref(), config, &limits, &LogObserver).map_err(|e| {
            log::error!("[run-uxr] Research failed: {}", e);
            ApiError::from(e).with_context(run_context)
        })
    })
    .await
    .map_err(|e| {
        log::error!("[run-uxr] Research task panicked: {}", e);
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Research task failed: {}", e),
        )
        .with_context(context)
    })?;

    Ok(Json(ApiResponse::ok(outcome?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_count_accepts_numbers_and_strings() {
        assert_eq!(parse_count("n", Some(&json!(4)), 5), Ok(4));
        assert_eq!(parse_count("n", Some(&json!(" 7 ")), 5), Ok(7));
        assert_eq!(parse_count("n", None, 5), Ok(5));
        assert_eq!(parse_count("n", Some(&Value::Null), 3), Ok(3));
    }

    #[test]
    fn test_parse_count_rejects_other_shapes() {
        assert!(matches!(
            parse_count("numQuestions", Some(&json!("many")), 5),
            Err(InputError::Malformed(_))
        ));
        assert!(matches!(
            parse_count("numQuestions", Some(&json!(2.5)), 5),
            Err(InputError::Malformed(_))
        ));
        assert!(matches!(
            parse_count("numQuestions", Some(&json!([1])), 5),
            Err(InputError::Malformed(_))
        ));
    }

    #[test]
    fn test_request_uses_camel_case() {
        let request: RunResearchRequest = serde_json::from_value(json!({
            "question": "Why?",
            "numInterviews": 2,
            "followUp": true
        }))
        .unwrap();
        assert_eq!(request.question.as_deref(), Some("Why?"));
        assert_eq!(request.num_interviews, Some(json!(2)));
        assert_eq!(request.follow_up, Some(true));
        assert!(request.audience.is_none());
    }
}
