//! Response envelope shared by every JSON endpoint
//!
//! Success: `{success: true, data}`. Failure: `{success: false, error,
//! context?}` where `context` carries request sizes, never request content.

use crate::research::{InputError, WorkflowError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request succeeded
    pub success: bool,
    /// Result data (on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Request sizing info (on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }
}

/// Sizes of the original request, for debugging failed runs
#[derive(Debug, Clone, Default, Serialize)]
pub struct ErrorContext {
    pub question_length: usize,
    pub audience_length: usize,
    pub num_interviews: i64,
    pub num_questions: i64,
}

/// Error type for JSON handlers
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    context: Option<ErrorContext>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<InputError> for ApiError {
    fn from(err: InputError) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, err.to_string())
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        let status = if err.is_input_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        ApiError::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(self.message),
            context: self.context,
        };
        (self.status, Json(body)).into_response()
    }
}
