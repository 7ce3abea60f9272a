//! Error types for eventhub.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, FixedOffset};
use serde_json::json;
use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The requested slot overlaps an approved booking in the same venue.
    #[error("Booking conflict: this venue is already booked from {start_time} to {end_time}")]
    BookingConflict {
        /// Event of the approved booking that occupies the slot.
        event_id: String,
        /// Start of the occupied slot.
        start_time: DateTime<FixedOffset>,
        /// End of the occupied slot.
        end_time: DateTime<FixedOffset>,
    },

    #[error("Already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Capacity reached: {0}")]
    CapacityReached(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    // === Server Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_)
            | Self::BookingConflict { .. }
            | Self::AlreadyRegistered(_)
            | Self::CapacityReached(_)
            | Self::InvalidState(_) => StatusCode::CONFLICT,

            // 5xx Server Errors
            Self::Database(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::BookingConflict { .. } => "BOOKING_CONFLICT",
            Self::AlreadyRegistered(_) => "ALREADY_REGISTERED",
            Self::CapacityReached(_) => "CAPACITY_REACHED",
            Self::InvalidState(_) => "INVALID_STATE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Extra structured data for the client, if any.
    #[must_use]
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::BookingConflict {
                event_id,
                start_time,
                end_time,
            } => Some(json!({
                "conflictingBooking": {
                    "event": event_id,
                    "startTime": start_time.to_rfc3339(),
                    "endTime": end_time.to_rfc3339(),
                }
            })),
            _ => None,
        }
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Log server errors
        if self.is_server_error() {
            tracing::error!(error = %self, code = code, "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = code, "Client error occurred");
        }

        let mut error = json!({
            "code": code,
            "message": self.to_string(),
        });
        if let Some(details) = self.details() {
            error["details"] = details;
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::NotFound("x".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Forbidden("x".to_string()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::CapacityReached("x".to_string()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Database("x".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_booking_conflict_details() {
        let offset = FixedOffset::east_opt(0).unwrap();
        let err = AppError::BookingConflict {
            event_id: "event1".to_string(),
            start_time: offset.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap(),
            end_time: offset.with_ymd_and_hms(2025, 1, 10, 11, 0, 0).unwrap(),
        };

        assert_eq!(err.error_code(), "BOOKING_CONFLICT");
        let details = err.details().unwrap();
        assert_eq!(details["conflictingBooking"]["event"], "event1");
        assert_eq!(
            details["conflictingBooking"]["startTime"],
            "2025-01-10T09:00:00+00:00"
        );
    }

    #[test]
    fn test_plain_errors_have_no_details() {
        assert!(AppError::AlreadyRegistered("x".to_string()).details().is_none());
        assert!(!AppError::Validation("x".to_string()).is_server_error());
        assert!(AppError::Internal("x".to_string()).is_server_error());
    }
}
