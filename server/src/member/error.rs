//! Member session error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use super::session::DirectoryError;

/// Member-facing session errors.
///
/// Each variant maps to a distinct machine-readable code because the user
/// remediation differs: fix the email, use the purchase email, or retry
/// later.
#[derive(Debug, Error)]
pub enum MemberError {
    /// Malformed email supplied to login.
    #[error("Invalid email address")]
    InvalidEmail,

    /// Email is not in the buyer store.
    #[error("Email not registered to a purchase")]
    NotFound,

    /// Profile mutation attempted without a signed-in session.
    #[error("Sign in as a member to do this")]
    NotAMember,

    /// Blank display name supplied to the profile update.
    #[error("Name must not be empty")]
    InvalidName,

    /// Buyer store lookup failed.
    #[error("Access verification failed, try again later")]
    Lookup(#[from] DirectoryError),

    /// Buyer store write failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Error response body for JSON responses.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

impl IntoResponse for MemberError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::InvalidEmail => (StatusCode::BAD_REQUEST, "EMAIL_INVALID"),
            Self::NotFound => (StatusCode::NOT_FOUND, "EMAIL_NOT_FOUND"),
            Self::NotAMember => (StatusCode::UNAUTHORIZED, "NOT_A_MEMBER"),
            Self::InvalidName => (StatusCode::BAD_REQUEST, "NAME_INVALID"),
            Self::Lookup(_) => (StatusCode::INTERNAL_SERVER_ERROR, "LOOKUP_FAILED"),
            Self::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = Json(ErrorResponse {
            error: code.to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}
