//!
//! # Error Handling
//!
//! Defines the `AppError` type used throughout the application: a tagged set
//! of error kinds, each carrying a message and mapping to an HTTP status.
//! `AppError` implements `actix_web::error::ResponseError`, so handlers and
//! middleware can propagate errors with `?` and every failure reaches the
//! client as the same JSON envelope `{"success": false, "message": ...}`.
//!
//! `From` implementations cover the error types of the crates this service
//! leans on (`sqlx`, `validator`, `bcrypt`, `reqwest`). Server-side failures
//! are logged in full and reported to the client as a generic message.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

#[derive(Debug)]
pub enum AppError {
    /// Authentication is missing, invalid, or insufficient (HTTP 401).
    Unauthorized(String),
    /// Malformed or otherwise unprocessable request (HTTP 400).
    BadRequest(String),
    /// A uniqueness constraint was violated, e.g. a duplicate sign-up email.
    /// Maps to HTTP 400; the API contract predates this rewrite and the
    /// frontend matches on 400 for duplicate registrations.
    Conflict(String),
    /// A requested resource does not exist (HTTP 404).
    NotFound(String),
    /// Input failed payload validation (HTTP 400).
    ValidationError(String),
    /// Storage-layer failure (HTTP 500, generic client message).
    DatabaseError(String),
    /// Any other unexpected server-side failure (HTTP 500, generic message).
    InternalServerError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_)
            | AppError::Conflict(_)
            | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            // Server-side detail stays in the logs.
            AppError::DatabaseError(msg) | AppError::InternalServerError(msg) => {
                log::error!("internal error: {}", msg);
                "Server Error".to_string()
            }
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::Conflict(msg)
            | AppError::NotFound(msg)
            | AppError::ValidationError(msg) => msg.clone(),
        };

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "message": message
        }))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` maps to `NotFound`; unique-constraint violations map to
/// `Conflict` so the loser of a concurrent duplicate insert gets the same
/// response as one caught by the explicit existence check. Everything else
/// becomes `DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                AppError::Conflict("Duplicate field value entered".into())
            }
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Hashing failures are fatal to the calling operation.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

/// Transport failures while talking to an OAuth provider.
impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> AppError {
        AppError::InternalServerError(format!("Provider request failed: {}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        let error = AppError::Unauthorized("Invalid token".into());
        assert_eq!(error.error_response().status(), 401);

        let error = AppError::BadRequest("Invalid input".into());
        assert_eq!(error.error_response().status(), 400);

        // Duplicate email keeps the deployed 400 contract.
        let error = AppError::Conflict("Email is already in use".into());
        assert_eq!(error.error_response().status(), 400);

        let error = AppError::ValidationError("name too short".into());
        assert_eq!(error.error_response().status(), 400);

        let error = AppError::NotFound("Resource not found".into());
        assert_eq!(error.error_response().status(), 404);

        let error = AppError::InternalServerError("Server error".into());
        assert_eq!(error.error_response().status(), 500);

        let error = AppError::DatabaseError("connection refused".into());
        assert_eq!(error.error_response().status(), 500);
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let error = AppError::from(sqlx::Error::RowNotFound);
        assert!(matches!(error, AppError::NotFound(_)));
    }
}
