//! Caller-facing error taxonomy.
//!
//! Authentication-class failures carry fixed, generic messages so a caller can
//! never tell which credential was wrong. Storage and internal failures are
//! logged in full and answered with a generic 500.

use axum::{
    extract::rejection::PathRejection,
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Message for any failed login (unknown login, inactive worker, wrong password).
pub const INVALID_CREDENTIALS: &str = "Invalid login or password";

/// Message for a failed current-password check during a password change.
pub const CURRENT_PASSWORD_INCORRECT: &str = "Current password is incorrect";

pub const INVALID_TOKEN: &str = "Invalid or expired token";

// PostgreSQL SQLSTATE for a reference to a column that does not exist
const UNDEFINED_COLUMN: &str = "42703";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Authentication(&'static str),

    #[error("{}", INVALID_TOKEN)]
    InvalidToken,

    #[error("Not allowed to access another worker's resources")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Schema(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn invalid_credentials() -> Self {
        AppError::Authentication(INVALID_CREDENTIALS)
    }

    pub fn current_password_incorrect() -> Self {
        AppError::Authentication(CURRENT_PASSWORD_INCORRECT)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Authentication(_) | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Schema(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNDEFINED_COLUMN) => {
                AppError::Schema(db_err.message().to_string())
            }
            _ => AppError::Database(err),
        }
    }
}

// Malformed path segments (e.g. a non-numeric id) are the caller's fault;
// anything else points at the route table and stays a 500
impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        if rejection.status().is_server_error() {
            AppError::Internal(anyhow::Error::new(rejection))
        } else {
            AppError::BadRequest(rejection.body_text())
        }
    }
}

// Same body shape the worker frontend already parses
#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let detail = match &self {
            AppError::Database(e) => {
                error!("Database error: {}", e);
                "Internal server error".to_string()
            }
            AppError::Internal(e) => {
                error!("Internal error: {:#}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let mut response = (status, Json(ErrorBody { detail })).into_response();

        // [security] 401 on a protected route tells the client which scheme to use
        if matches!(self, AppError::InvalidToken) {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::invalid_credentials().status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::not_found("Worker not found").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Schema("bad field".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_invalid_token_carries_bearer_challenge() {
        let response = AppError::InvalidToken.into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers().get(WWW_AUTHENTICATE).unwrap(), "Bearer");
    }

    #[test]
    fn test_authentication_messages_are_generic() {
        assert_eq!(AppError::invalid_credentials().to_string(), INVALID_CREDENTIALS);
        assert_eq!(
            AppError::current_password_incorrect().to_string(),
            CURRENT_PASSWORD_INCORRECT
        );
        assert!(AppError::invalid_credentials()
            .into_response()
            .headers()
            .get(WWW_AUTHENTICATE)
            .is_none());
    }

    #[test]
    fn test_non_database_sqlx_errors_stay_database() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::Database(_)));
    }
}
