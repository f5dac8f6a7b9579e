use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::lifecycle::AssignerError;

#[derive(Debug)]
pub struct ErrorResponse {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "error": { "code": self.code, "message": self.message } })),
        )
            .into_response()
    }
}

impl From<AssignerError> for ErrorResponse {
    fn from(error: AssignerError) -> Self {
        match error {
            AssignerError::TeamNotFound => {
                ErrorResponse::new(StatusCode::NOT_FOUND, "NOT_FOUND", "team not found")
            }
            AssignerError::TeamExists => ErrorResponse::new(
                StatusCode::BAD_REQUEST,
                "TEAM_EXISTS",
                "team_name already exists",
            ),
            AssignerError::PrExists => {
                ErrorResponse::new(StatusCode::CONFLICT, "PR_EXISTS", "PR id already exists")
            }
            AssignerError::PrMerged => ErrorResponse::new(
                StatusCode::CONFLICT,
                "PR_MERGED",
                "cannot reassign on merged PR",
            ),
            AssignerError::NotAssigned => ErrorResponse::new(
                StatusCode::CONFLICT,
                "NOT_ASSIGNED",
                "reviewer is not assigned to this PR",
            ),
            AssignerError::NoCandidate => ErrorResponse::new(
                StatusCode::CONFLICT,
                "NO_CANDIDATE",
                "no active replacement candidate in team",
            ),
            AssignerError::NotFound(entity) => ErrorResponse::new(
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{entity} not found"),
            ),
            AssignerError::Cancelled => ErrorResponse::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "CANCELLED",
                "request cancelled",
            ),
            AssignerError::TimedOut => ErrorResponse::new(
                StatusCode::GATEWAY_TIMEOUT,
                "TIMEOUT",
                "request timed out",
            ),
            AssignerError::Internal(error) => {
                tracing::error!(?error, "storage failure");
                ErrorResponse::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "internal server error",
                )
            }
        }
    }
}
