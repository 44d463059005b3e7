//! Service error types with HTTP status code mapping.
//!
//! [`MileageError`] is the central error type for the service. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::persistence::StoreError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "success": false,
///   "error": {
///     "code": 1001,
///     "message": "userId must be provided"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false` for error responses.
    pub success: bool,
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details, such as the rejected value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category         | HTTP Status                              |
/// |-----------|------------------|------------------------------------------|
/// | 1000–1999 | Validation       | 400 Bad Request                          |
/// | 2000–2999 | Review state     | 404 Not Found / 403 Forbidden / 409 Conflict |
/// | 3000–3999 | Server           | 500 Internal Server Error                |
#[derive(Debug, thiserror::Error)]
pub enum MileageError {
    /// A required field was absent from the event.
    #[error("{0} must be provided")]
    MissingField(&'static str),

    /// A field was present but its value is not acceptable.
    #[error("{field} {reason}")]
    InvalidValue {
        /// Offending field name as it appears on the wire.
        field: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },

    /// Event `type` is missing or not supported.
    #[error("invalid type")]
    UnknownType(Option<String>),

    /// Event `action` is not one of `ADD`, `MOD`, `DELETE`.
    #[error("invalid action")]
    UnknownAction(String),

    /// No review exists with the requested id.
    #[error("review does not exist")]
    ReviewNotFound,

    /// The caller is not the author of the review.
    #[error("only the author of the review can modify or delete it")]
    NotAuthor,

    /// The user already has a review for this place.
    #[error("review already exists")]
    DuplicateReview,

    /// Storage layer failure.
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl MileageError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::MissingField(_) => 1001,
            Self::InvalidValue { .. } => 1002,
            Self::UnknownType(_) => 1003,
            Self::UnknownAction(_) => 1004,
            Self::ReviewNotFound => 2001,
            Self::NotAuthor => 2002,
            Self::DuplicateReview => 2003,
            Self::Persistence(_) => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingField(_)
            | Self::InvalidValue { .. }
            | Self::UnknownType(_)
            | Self::UnknownAction(_) => StatusCode::BAD_REQUEST,
            Self::ReviewNotFound => StatusCode::NOT_FOUND,
            Self::NotAuthor => StatusCode::FORBIDDEN,
            Self::DuplicateReview => StatusCode::CONFLICT,
            Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the rejected input, if the variant carries one.
    #[must_use]
    pub fn details(&self) -> Option<String> {
        match self {
            Self::UnknownType(value) => value.clone(),
            Self::UnknownAction(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// Returns `true` for failures the caller can correct by changing the
    /// request.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

impl From<StoreError> for MileageError {
    fn from(err: StoreError) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl IntoResponse for MileageError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.is_client_error() {
            tracing::debug!(error = %self, code = self.error_code(), "request rejected");
        } else {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            success: false,
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: self.details(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_message_names_the_field() {
        let err = MileageError::MissingField("userId");
        assert_eq!(err.to_string(), "userId must be provided");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn invalid_value_message() {
        let err = MileageError::InvalidValue {
            field: "content",
            reason: "must not be empty",
        };
        assert_eq!(err.to_string(), "content must not be empty");
        assert_eq!(err.error_code(), 1002);
    }

    #[test]
    fn state_errors_map_to_distinct_statuses() {
        assert_eq!(
            MileageError::ReviewNotFound.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(MileageError::NotAuthor.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            MileageError::DuplicateReview.status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn store_errors_become_server_errors() {
        let err = MileageError::from(StoreError::Database("connection reset".to_string()));
        assert!(!err.is_client_error());
        assert_eq!(err.error_code(), 3001);
    }

    #[test]
    fn unknown_action_carries_details() {
        let err = MileageError::UnknownAction("UPSERT".to_string());
        assert_eq!(err.to_string(), "invalid action");
        assert_eq!(err.details().as_deref(), Some("UPSERT"));
    }
}
