use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::PlannerError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// A [`PlannerError`] on its way out of a handler
#[derive(Debug)]
pub struct ApiError(pub PlannerError);

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            PlannerError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            PlannerError::NotReady { .. } => StatusCode::CONFLICT,
            PlannerError::SessionNotFound { .. } => StatusCode::NOT_FOUND,
            PlannerError::Engine { .. } => StatusCode::BAD_GATEWAY,
            PlannerError::Config { .. } | PlannerError::General { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<PlannerError> for ApiError {
    fn from(err: PlannerError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        } else {
            tracing::debug!("Request rejected: {}", self.0);
        }

        let body = ErrorBody {
            code: self.0.code(),
            message: self.0.user_message(),
        };
        (status, Json(body)).into_response()
    }
}

/// Malformed JSON bodies are reported like any other invalid input
pub fn reject_body(rejection: JsonRejection) -> ApiError {
    ApiError(PlannerError::validation(rejection.body_text()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (PlannerError::validation("x"), StatusCode::UNPROCESSABLE_ENTITY),
            (PlannerError::not_ready("x"), StatusCode::CONFLICT),
            (PlannerError::session_not_found("x"), StatusCode::NOT_FOUND),
            (
                EngineError::Transport("refused".into()).into(),
                StatusCode::BAD_GATEWAY,
            ),
            (PlannerError::general("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).status(), status);
        }
    }

    #[test]
    fn test_response_carries_status() {
        let response = ApiError(PlannerError::validation("bad")).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
