//! Error types for the asset booking server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::rules::{AccessViolation, Violation};

/// Machine-readable error codes returned alongside the message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NotFound = 4,
    Duplicate = 5,
    BadValue = 6,
    InUse = 7,
    DateOrder = 10,
    BookingOverlap = 11,
    PrematureReturn = 12,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Row still referenced by another table
    #[error("In use: {0}")]
    InUse(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Booking rejected: {0}")]
    Booking(#[from] Violation),

    #[error("Booking not allowed: {0}")]
    Access(#[from] AccessViolation),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl AppError {
    fn parts(&self) -> (StatusCode, ErrorCode, String) {
        match self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::Authorization(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorCode::NotFound, msg.clone()),
            AppError::Validation(msg) | AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ErrorCode::Duplicate, msg.clone()),
            AppError::InUse(msg) => (StatusCode::CONFLICT, ErrorCode::InUse, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
            AppError::Booking(v) => {
                let (status, code) = match v {
                    Violation::DateOrder => (StatusCode::BAD_REQUEST, ErrorCode::DateOrder),
                    Violation::Overlap { .. } => (StatusCode::CONFLICT, ErrorCode::BookingOverlap),
                    Violation::PrematureReturn { .. } => {
                        (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::PrematureReturn)
                    }
                };
                (status, code, v.to_string())
            }
            AppError::Access(v) => (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, v.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

/// Translate unique / foreign-key violations into client errors.
pub fn map_constraint(e: sqlx::Error, what: &str) -> AppError {
    if let Some(db) = e.as_database_error() {
        match db.code().as_deref() {
            Some("23505") => return AppError::Conflict(format!("{} already exists", what)),
            Some("23503") => {
                return AppError::InUse(format!("{} is referenced by other records", what))
            }
            _ => {}
        }
    }
    AppError::Database(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_violation_status_codes() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();

        let (status, code, _) = AppError::from(Violation::DateOrder).parts();
        assert_eq!((status, code), (StatusCode::BAD_REQUEST, ErrorCode::DateOrder));

        let overlap = Violation::Overlap {
            conflicting_id: 12,
            date_from: day,
            date_to: day,
        };
        let (status, code, message) = AppError::from(overlap).parts();
        assert_eq!((status, code), (StatusCode::CONFLICT, ErrorCode::BookingOverlap));
        assert!(message.contains("#12"));

        let (status, _, _) = AppError::from(Violation::PrematureReturn { date_to: day }).parts();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _, _) = AppError::from(AccessViolation::AssignOther).parts();
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
