//! Unified error types for the habit tracker.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use utoipa::ToSchema;

use crate::metrics;

/// Startup and configuration errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but holds an unusable value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Broad class of a rejected request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid field.
    Validation,
    /// Duplicate name.
    Conflict,
    /// Unknown user or habit.
    NotFound,
}

/// Errors raised by store operations and surfaced to HTTP clients.
///
/// The display text is the exact `error` message sent in the response body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// `name` missing or empty.
    #[error("Name is required")]
    NameRequired,

    /// Another user already has this name.
    #[error("Name is already taken")]
    NameTaken,

    /// `frequency` present but empty.
    #[error("Frequency is required")]
    FrequencyRequired,

    /// `frequency` not one of the accepted values.
    #[error("Frequency must be daily, weekly or monthly")]
    InvalidFrequency,

    /// No user with the requested id.
    #[error("User not found")]
    UserNotFound,

    /// The user has habits but none with the requested id.
    #[error("Habit not found")]
    HabitNotFound,

    /// The user never had a habits list. Answered with 200, see [`ApiError::status`].
    #[error("Habit not found")]
    MissingHabitList,

    /// Body is not valid JSON or has wrongly typed fields.
    #[error("{0}")]
    MalformedBody(String),
}

impl ApiError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::NameRequired
            | ApiError::FrequencyRequired
            | ApiError::InvalidFrequency
            | ApiError::MalformedBody(_) => ErrorKind::Validation,
            ApiError::NameTaken => ErrorKind::Conflict,
            ApiError::UserNotFound | ApiError::HabitNotFound | ApiError::MissingHabitList => {
                ErrorKind::NotFound
            }
        }
    }

    /// HTTP status for the error.
    ///
    /// A delete against a user without a habits list keeps the default 200.
    pub fn status(&self) -> StatusCode {
        if *self == ApiError::MissingHabitList {
            return StatusCode::OK;
        }
        match self.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
        }
    }

    /// Metric label for the rejection.
    pub fn reason(&self) -> &'static str {
        match self {
            ApiError::MalformedBody(_) => "malformed_body",
            _ => match self.kind() {
                ErrorKind::Validation => "validation",
                ErrorKind::Conflict => "conflict",
                ErrorKind::NotFound => "not_found",
            },
        }
    }

    /// Collapse [`ApiError::MissingHabitList`] into a plain 404.
    pub fn strict(self) -> Self {
        match self {
            ApiError::MissingHabitList => ApiError::HabitNotFound,
            other => other,
        }
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Human readable message.
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        debug!(status = %self.status(), error = %self, "request rejected");
        metrics::inc_requests_rejected(self.reason());
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_kind() {
        assert_eq!(ApiError::NameRequired.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InvalidFrequency.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::MalformedBody("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NameTaken.status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::UserNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::HabitNotFound.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn missing_habit_list_answers_ok_unless_strict() {
        assert_eq!(ApiError::MissingHabitList.status(), StatusCode::OK);
        assert_eq!(ApiError::MissingHabitList.to_string(), "Habit not found");

        let strict = ApiError::MissingHabitList.strict();
        assert_eq!(strict, ApiError::HabitNotFound);
        assert_eq!(strict.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::NameTaken.strict(), ApiError::NameTaken);
    }

    #[test]
    fn messages_match_wire_format() {
        assert_eq!(ApiError::NameRequired.to_string(), "Name is required");
        assert_eq!(ApiError::NameTaken.to_string(), "Name is already taken");
        assert_eq!(ApiError::FrequencyRequired.to_string(), "Frequency is required");
        assert_eq!(
            ApiError::InvalidFrequency.to_string(),
            "Frequency must be daily, weekly or monthly"
        );
        assert_eq!(ApiError::UserNotFound.to_string(), "User not found");
    }

    #[test]
    fn reasons_label_rejections() {
        assert_eq!(ApiError::NameRequired.reason(), "validation");
        assert_eq!(ApiError::MalformedBody("x".into()).reason(), "malformed_body");
        assert_eq!(ApiError::NameTaken.reason(), "conflict");
        assert_eq!(ApiError::MissingHabitList.reason(), "not_found");
    }
}
