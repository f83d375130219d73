//! Admin gate for back-office routes.
//!
//! Authorization is a single bearer secret from configuration; there are no
//! per-admin accounts at this layer.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::warn;

use super::AppState;

#[derive(Debug, thiserror::Error)]
pub enum AdminAuthError {
    #[error("Missing Authorization header")]
    MissingAuthHeader,
    #[error("Authorization header must be 'Bearer <token>'")]
    InvalidAuthHeader,
    #[error("Invalid admin token")]
    InvalidToken,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl IntoResponse for AdminAuthError {
    fn into_response(self) -> Response {
        let code = match &self {
            Self::MissingAuthHeader => "MISSING_AUTH_HEADER",
            Self::InvalidAuthHeader => "INVALID_AUTH_HEADER",
            Self::InvalidToken => "INVALID_ADMIN_TOKEN",
        };
        let body = Json(ErrorBody {
            error: code.to_string(),
            message: self.to_string(),
        });
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

/// Middleware requiring the admin bearer token.
///
/// Apply to back-office routes:
/// ```ignore
/// Router::new()
///     .nest("/api/admin", admin_routes)
///     .layer(axum::middleware::from_fn_with_state(state, require_admin))
/// ```
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AdminAuthError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AdminAuthError::MissingAuthHeader)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AdminAuthError::InvalidAuthHeader)?;

    if token != state.config.admin_token {
        warn!("Admin request rejected: bad token");
        return Err(AdminAuthError::InvalidToken);
    }

    Ok(next.run(request).await)
}
