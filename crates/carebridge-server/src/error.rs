use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use carebridge_orchestrator::SubmissionError;
use carebridge_types::CarebridgeError;
use carebridge_verification::VerifierError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error("{0}")]
    BadRequest(String),

    /// Request body was not a JSON object of the expected shape.
    #[error(transparent)]
    Body(#[from] JsonRejection),

    #[error(transparent)]
    Path(#[from] PathRejection),

    #[error("Please sign in")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] CarebridgeError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Submission(e) => match e {
                SubmissionError::Validation(_) => StatusCode::BAD_REQUEST,
                SubmissionError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
                SubmissionError::Verification(VerifierError::RateLimited(_)) => {
                    StatusCode::TOO_MANY_REQUESTS
                }
                SubmissionError::Verification(VerifierError::PaymentRequired(_)) => {
                    StatusCode::PAYMENT_REQUIRED
                }
                SubmissionError::Verification(VerifierError::Failed(_)) => StatusCode::BAD_GATEWAY,
                SubmissionError::Storage(_) | SubmissionError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::BadRequest(_) | ApiError::Body(_) | ApiError::Path(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn user_message(&self) -> String {
        match self {
            ApiError::Submission(e) => e.user_message(),
            ApiError::Body(e) => e.body_text(),
            ApiError::Path(e) => e.body_text(),
            ApiError::Store(_) => "Something went wrong".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = serde_json::json!({ "error": self.user_message() });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carebridge_validation::ValidationError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ApiError::from(SubmissionError::from(ValidationError::NameRequired)),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(SubmissionError::AuthenticationRequired),
                StatusCode::UNAUTHORIZED,
            ),
            (
                ApiError::from(SubmissionError::from(VerifierError::RateLimited(429))),
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                ApiError::from(SubmissionError::from(VerifierError::PaymentRequired(402))),
                StatusCode::PAYMENT_REQUIRED,
            ),
            (
                ApiError::from(SubmissionError::from(VerifierError::Failed("x".into()))),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApiError::from(CarebridgeError::Storage("x".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.status(), status);
        }
    }

    #[test]
    fn test_store_errors_are_not_leaked() {
        let err = ApiError::from(CarebridgeError::Storage("table resources missing".into()));
        assert_eq!(err.user_message(), "Something went wrong");
    }
}
