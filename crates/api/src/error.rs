//! API error types with HTTP response mapping.

use application::CommandError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::DomainError;
use queries::QueryError;

const INTERNAL_MESSAGE: &str = "internal server error";

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// A command failed.
    Command(CommandError),
    /// A query failed.
    Query(QueryError),
    /// Internal server error. The message is logged, never returned.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Command(err) => command_error_to_response(err),
            ApiError::Query(err) => query_error_to_response(err),
            ApiError::Internal(msg) => internal(msg),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    if err.is_invalid_argument() {
        (StatusCode::BAD_REQUEST, err.to_string())
    } else {
        (StatusCode::CONFLICT, err.to_string())
    }
}

fn command_error_to_response(err: CommandError) -> (StatusCode, String) {
    match err {
        CommandError::Domain(domain) => domain_error_to_response(domain),
        CommandError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        CommandError::Apply(source) => {
            tracing::warn!(error = %source, "commit plan not applied");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "storage temporarily unavailable".to_string(),
            )
        }
        other => internal(other.to_string()),
    }
}

fn query_error_to_response(err: QueryError) -> (StatusCode, String) {
    match err {
        QueryError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        other => internal(other.to_string()),
    }
}

fn internal(detail: String) -> (StatusCode, String) {
    tracing::error!(error = %detail, "internal server error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        INTERNAL_MESSAGE.to_string(),
    )
}

impl From<CommandError> for ApiError {
    fn from(err: CommandError) -> Self {
        ApiError::Command(err)
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        ApiError::Query(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
