use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

use crate::db::RepoError;

/// One entry of the list returned when the store rejects a write on a
/// uniqueness constraint.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConstraintError {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub path: &'static str,
    pub value: String,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(Vec<String>),

    #[error("{0}")]
    MalformedBody(String),

    #[error("unique constraint violated")]
    UniqueConstraint(Vec<ConstraintError>),

    #[error("Access Denied")]
    Unauthenticated,

    #[error("Forbidden: you do not have permission to modify this course")]
    Forbidden,

    #[error("Course not found for ID {0}")]
    CourseNotFound(String),

    #[error("Route Not Found")]
    RouteNotFound,

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::UniqueViolation { field, value } => {
                ApiError::UniqueConstraint(vec![ConstraintError {
                    message: format!("{field} must be unique"),
                    kind: "unique violation",
                    path: field,
                    value,
                }])
            }
            RepoError::Database(e) => ApiError::Internal(e.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(messages) => {
                (StatusCode::BAD_REQUEST, Json(messages)).into_response()
            }
            ApiError::UniqueConstraint(errors) => {
                (StatusCode::BAD_REQUEST, Json(errors)).into_response()
            }
            ApiError::MalformedBody(_) => envelope(StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Unauthenticated => envelope(StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::Forbidden => message(StatusCode::FORBIDDEN, self.to_string()),
            ApiError::CourseNotFound(_) | ApiError::RouteNotFound => {
                message(StatusCode::NOT_FOUND, self.to_string())
            }
            ApiError::Internal(ref e) => {
                error!(error = %e, "request failed");
                debug!(error = ?e, "request failure detail");
                envelope(StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        }
    }
}

fn message(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn envelope(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "message": message, "error": {} }))).into_response()
}
