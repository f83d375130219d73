//! Member session endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::access::{can_access, AccessTier, ResourceAccessLevel};
use crate::api::AppState;

use super::error::MemberError;
use super::middleware::{request_store, CookieSessionStorage};
use super::session::SessionState;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateProfileRequest {
    pub name: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProfileResponse {
    pub email: String,
    pub name: String,
    pub access_tier: AccessTier,
}

/// Trim the submitted display name, rejecting blank input.
fn normalized_name(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SessionResponse {
    pub authenticated: bool,
    pub email: Option<String>,
    pub access_tier: Option<AccessTier>,
    pub has_basic_access: bool,
    pub has_pro_access: bool,
}

impl From<SessionState> for SessionResponse {
    fn from(state: SessionState) -> Self {
        match state {
            SessionState::Anonymous => Self {
                authenticated: false,
                email: None,
                access_tier: None,
                has_basic_access: false,
                has_pro_access: false,
            },
            SessionState::Authenticated { email, tier } => Self {
                authenticated: true,
                email: Some(email),
                access_tier: Some(tier),
                has_basic_access: can_access(Some(tier), ResourceAccessLevel::Basic),
                has_pro_access: can_access(Some(tier), ResourceAccessLevel::Pro),
            },
        }
    }
}

/// POST /api/member/login - establish a session from a purchase email.
#[utoipa::path(
    post,
    path = "/api/member/login",
    tag = "member",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session established", body = SessionResponse),
        (status = 400, description = "Malformed email"),
        (status = 404, description = "Email not registered to a purchase"),
    ),
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>), MemberError> {
    let storage = Arc::new(CookieSessionStorage::from_jar(&jar));
    let store = request_store(&state, storage.clone());

    let session = store.login(&req.email).await?;

    let jar = storage.apply_to(jar, Duration::days(state.config.session_days));
    Ok((jar, Json(SessionResponse::from(session))))
}

/// POST /api/member/logout - clear the session. Unconditional.
#[utoipa::path(
    post,
    path = "/api/member/logout",
    tag = "member",
    responses((status = 204, description = "Session cleared")),
)]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    let storage = Arc::new(CookieSessionStorage::from_jar(&jar));
    let store = request_store(&state, storage.clone());

    store.logout();

    let jar = storage.apply_to(jar, Duration::days(state.config.session_days));
    (jar, StatusCode::NO_CONTENT)
}

/// GET /api/member/session - revalidate and report the current session.
///
/// This is the fresh-load pass: an expired pair is cleared without a buyer
/// lookup, a valid one is revalidated and its tier re-derived from the store.
#[utoipa::path(
    get,
    path = "/api/member/session",
    tag = "member",
    responses((status = 200, description = "Current session state", body = SessionResponse)),
)]
pub async fn current_session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<SessionResponse>) {
    let storage = Arc::new(CookieSessionStorage::from_jar(&jar));
    let store = request_store(&state, storage.clone());

    let session = store.restore().await;

    let jar = storage.apply_to(jar, Duration::days(state.config.session_days));
    (jar, Json(SessionResponse::from(session)))
}

/// PUT /api/member/profile - update the signed-in member's display name.
///
/// The only buyer field the member surface may change; everything else stays
/// admin-owned.
#[utoipa::path(
    put,
    path = "/api/member/profile",
    tag = "member",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 400, description = "Blank name"),
        (status = 401, description = "Not signed in"),
    ),
)]
pub async fn update_profile(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<(CookieJar, Json<ProfileResponse>), MemberError> {
    let storage = Arc::new(CookieSessionStorage::from_jar(&jar));
    let store = request_store(&state, storage.clone());

    let SessionState::Authenticated { email, tier } = store.restore().await else {
        return Err(MemberError::NotAMember);
    };
    let name = normalized_name(&req.name).ok_or(MemberError::InvalidName)?;

    let row = crate::buyers::update_buyer_name(&state.db, &email, name)
        .await?
        .ok_or(MemberError::NotFound)?;

    let jar = storage.apply_to(jar, Duration::days(state.config.session_days));
    Ok((
        jar,
        Json(ProfileResponse {
            email: row.email,
            name: row.name,
            access_tier: tier,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::normalized_name;

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(normalized_name("  Budi Santoso "), Some("Budi Santoso"));
    }

    #[test]
    fn rejects_blank_name() {
        assert_eq!(normalized_name(""), None);
        assert_eq!(normalized_name("   "), None);
    }
}
