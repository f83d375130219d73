//! Member announcements.
//!
//! Admins publish announcements; members see published ones newest first and
//! an unread badge count. Reads are tracked per normalized buyer email, since
//! a buyer record is the member identity here.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::api::AppState;
use crate::member::MemberIdentity;

#[derive(Debug, Clone, FromRow, Serialize, utoipa::ToSchema)]
pub struct Announcement {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub link_url: Option<String>,
    pub link_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateAnnouncementRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    #[serde(default)]
    pub is_published: bool,
    pub link_url: Option<String>,
    pub link_text: Option<String>,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateAnnouncementRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    pub is_published: Option<bool>,
    pub link_url: Option<String>,
    pub link_text: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UnreadCount {
    pub unread: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum AnnouncementError {
    #[error("Announcement not found")]
    NotFound,
    #[error("Sign in as a member to do this")]
    NotAMember,
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl IntoResponse for AnnouncementError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::NotFound => (StatusCode::NOT_FOUND, "ANNOUNCEMENT_NOT_FOUND"),
            Self::NotAMember => (StatusCode::UNAUTHORIZED, "NOT_A_MEMBER"),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };
        let body = Json(ErrorBody {
            error: code.to_string(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

type AnnouncementResult<T> = Result<T, AnnouncementError>;

const COLUMNS: &str =
    "id, title, content, is_published, published_at, link_url, link_text, created_at, updated_at";

// ============================================================================
// Queries
// ============================================================================

async fn list_published(pool: &PgPool) -> Result<Vec<Announcement>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM announcements WHERE is_published ORDER BY published_at DESC"
    ))
    .fetch_all(pool)
    .await
}

async fn list_all(pool: &PgPool) -> Result<Vec<Announcement>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM announcements ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

async fn count_unread(pool: &PgPool, email: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM announcements a
         WHERE a.is_published
           AND NOT EXISTS (
               SELECT 1 FROM announcement_reads r
               WHERE r.announcement_id = a.id AND r.buyer_email = $1
           )",
    )
    .bind(email)
    .fetch_one(pool)
    .await
}

// ============================================================================
// Member surface
// ============================================================================

/// Published announcements, newest first.
#[utoipa::path(
    get,
    path = "/api/announcements",
    tag = "announcements",
    responses(
        (status = 200, description = "Published announcements", body = Vec<Announcement>),
    ),
)]
pub async fn list_published_announcements(
    State(state): State<AppState>,
) -> AnnouncementResult<Json<Vec<Announcement>>> {
    Ok(Json(list_published(&state.db).await?))
}

/// Unread badge count for the signed-in member.
#[utoipa::path(
    get,
    path = "/api/announcements/unread-count",
    tag = "announcements",
    responses(
        (status = 200, description = "Unread count", body = UnreadCount),
        (status = 401, description = "Not signed in"),
    ),
)]
pub async fn unread_count(
    State(state): State<AppState>,
    identity: MemberIdentity,
) -> AnnouncementResult<Json<UnreadCount>> {
    let email = identity.email().ok_or(AnnouncementError::NotAMember)?;
    let unread = count_unread(&state.db, email).await?;
    Ok(Json(UnreadCount { unread }))
}

/// Mark an announcement read for the signed-in member. Marking twice is a
/// no-op, not an error.
#[utoipa::path(
    post,
    path = "/api/announcements/{id}/read",
    tag = "announcements",
    params(("id" = Uuid, Path, description = "Announcement id")),
    responses(
        (status = 204, description = "Marked read"),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "Announcement not found"),
    ),
)]
pub async fn mark_read(
    State(state): State<AppState>,
    identity: MemberIdentity,
    Path(id): Path<Uuid>,
) -> AnnouncementResult<StatusCode> {
    let email = identity.email().ok_or(AnnouncementError::NotAMember)?;

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM announcements WHERE id = $1)")
            .bind(id)
            .fetch_one(&state.db)
            .await?;
    if !exists {
        return Err(AnnouncementError::NotFound);
    }

    sqlx::query(
        "INSERT INTO announcement_reads (announcement_id, buyer_email)
         VALUES ($1, $2)
         ON CONFLICT (announcement_id, buyer_email) DO NOTHING",
    )
    .bind(id)
    .bind(email)
    .execute(&state.db)
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Admin surface
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/admin/announcements",
    tag = "announcements",
    responses(
        (status = 200, description = "All announcements", body = Vec<Announcement>),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn list_announcements(
    State(state): State<AppState>,
) -> AnnouncementResult<Json<Vec<Announcement>>> {
    Ok(Json(list_all(&state.db).await?))
}

/// Create an announcement; publishing at creation stamps `published_at`.
#[utoipa::path(
    post,
    path = "/api/admin/announcements",
    tag = "announcements",
    request_body = CreateAnnouncementRequest,
    responses(
        (status = 201, description = "Announcement created", body = Announcement),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn create_announcement(
    State(state): State<AppState>,
    Json(request): Json<CreateAnnouncementRequest>,
) -> AnnouncementResult<(StatusCode, Json<Announcement>)> {
    request
        .validate()
        .map_err(|e| AnnouncementError::Validation(e.to_string()))?;

    let announcement: Announcement = sqlx::query_as(&format!(
        "INSERT INTO announcements (title, content, is_published, published_at, link_url, link_text)
         VALUES ($1, $2, $3, CASE WHEN $3 THEN NOW() END, $4, $5)
         RETURNING {COLUMNS}"
    ))
    .bind(request.title.trim())
    .bind(&request.content)
    .bind(request.is_published)
    .bind(request.link_url.as_deref())
    .bind(request.link_text.as_deref())
    .fetch_one(&state.db)
    .await?;

    info!(title = %announcement.title, "Created announcement");
    Ok((StatusCode::CREATED, Json(announcement)))
}

/// Update an announcement. Setting `is_published` to true restamps
/// `published_at`, moving it to the top of the member list.
#[utoipa::path(
    put,
    path = "/api/admin/announcements/{id}",
    tag = "announcements",
    params(("id" = Uuid, Path, description = "Announcement id")),
    request_body = UpdateAnnouncementRequest,
    responses(
        (status = 200, description = "Announcement updated", body = Announcement),
        (status = 404, description = "Announcement not found"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn update_announcement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAnnouncementRequest>,
) -> AnnouncementResult<Json<Announcement>> {
    request
        .validate()
        .map_err(|e| AnnouncementError::Validation(e.to_string()))?;

    let announcement: Option<Announcement> = sqlx::query_as(&format!(
        "UPDATE announcements SET
             title = COALESCE($2, title),
             content = COALESCE($3, content),
             is_published = COALESCE($4, is_published),
             published_at = CASE WHEN $4 THEN NOW() ELSE published_at END,
             link_url = COALESCE($5, link_url),
             link_text = COALESCE($6, link_text),
             updated_at = NOW()
         WHERE id = $1
         RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(request.title.as_deref())
    .bind(request.content.as_deref())
    .bind(request.is_published)
    .bind(request.link_url.as_deref())
    .bind(request.link_text.as_deref())
    .fetch_optional(&state.db)
    .await?;

    announcement.map(Json).ok_or(AnnouncementError::NotFound)
}

#[utoipa::path(
    delete,
    path = "/api/admin/announcements/{id}",
    tag = "announcements",
    params(("id" = Uuid, Path, description = "Announcement id")),
    responses(
        (status = 204, description = "Announcement deleted"),
        (status = 404, description = "Announcement not found"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn delete_announcement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AnnouncementResult<StatusCode> {
    let result = sqlx::query("DELETE FROM announcements WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AnnouncementError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Routers
// ============================================================================

/// Member routes (mounted at `/api/announcements`). The member identity
/// middleware is layered in by the caller.
pub fn member_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_published_announcements))
        .route("/unread-count", get(unread_count))
        .route("/{id}/read", post(mark_read))
}

/// Admin routes (mounted at `/api/admin/announcements`).
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_announcements))
        .route("/", post(create_announcement))
        .route("/{id}", put(update_announcement))
        .route("/{id}", delete(delete_announcement))
}
