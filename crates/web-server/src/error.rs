use analyzer::error::AnalyzerError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Analysis error: {0}")]
    Analyzer(#[from] AnalyzerError),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Converts our custom `AppError` into an HTTP response.
///
/// Rejected payloads become 400 with the message as-is. Anything else is a 500
/// whose message is prefixed with "Internal server error: ".
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Analyzer(analyzer_err) => {
                tracing::warn!(error = %analyzer_err, "Rejected portfolio request.");
                (StatusCode::BAD_REQUEST, analyzer_err.to_string())
            }
            AppError::BadRequest(message) => {
                tracing::warn!(error = %message, "Rejected portfolio request.");
                (StatusCode::BAD_REQUEST, message)
            }
            AppError::Internal(message) => {
                tracing::error!(error = %message, "Unhandled error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Internal server error: {}", message),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
