//! Course enrollments.
//!
//! Members opt into courses they want on their "my courses" shelf. An
//! enrollment is a (buyer email, course id) pair; enrolling grants no access
//! by itself, the tier gate still applies when the course is opened.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::info;
use uuid::Uuid;

use crate::api::AppState;
use crate::buyers::is_unique_violation;
use crate::catalog::{CatalogError, Course, CourseRow};
use crate::member::MemberIdentity;

#[derive(Debug, Clone, FromRow, Serialize, utoipa::ToSchema)]
pub struct Enrollment {
    pub id: Uuid,
    pub buyer_email: String,
    pub course_id: Uuid,
    pub enrolled_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct EnrollRequest {
    pub course_id: Uuid,
}

#[derive(Debug, FromRow)]
struct EnrolledCourseRow {
    #[sqlx(flatten)]
    course: CourseRow,
    enrolled_at: DateTime<Utc>,
}

/// A course on the member's shelf, newest enrollment first.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct EnrolledCourse {
    #[serde(flatten)]
    pub course: Course,
    pub enrolled_at: DateTime<Utc>,
}

impl TryFrom<EnrolledCourseRow> for EnrolledCourse {
    type Error = EnrollmentError;

    fn try_from(row: EnrolledCourseRow) -> Result<Self, Self::Error> {
        let course = Course::try_from(row.course).map_err(|e| match e {
            CatalogError::CorruptRecord(level) => EnrollmentError::CorruptRecord(level),
            other => EnrollmentError::CorruptRecord(other.to_string()),
        })?;
        Ok(Self {
            course,
            enrolled_at: row.enrolled_at,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EnrollmentError {
    #[error("Sign in as a member to do this")]
    NotAMember,
    #[error("Course not found")]
    CourseNotFound,
    #[error("Already enrolled in this course")]
    AlreadyEnrolled,
    #[error("Course record carries unrecognized access level '{0}'")]
    CorruptRecord(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl IntoResponse for EnrollmentError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::NotAMember => (StatusCode::UNAUTHORIZED, "NOT_A_MEMBER"),
            Self::CourseNotFound => (StatusCode::NOT_FOUND, "COURSE_NOT_FOUND"),
            Self::AlreadyEnrolled => (StatusCode::CONFLICT, "ALREADY_ENROLLED"),
            Self::CorruptRecord(_) | Self::Database(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };
        let body = Json(ErrorBody {
            error: code.to_string(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

type EnrollmentResult<T> = Result<T, EnrollmentError>;

const COLUMNS: &str = "id, buyer_email, course_id, enrolled_at, created_at, updated_at";

// ============================================================================
// Member surface
// ============================================================================

/// The member's enrolled published courses, newest enrollment first.
#[utoipa::path(
    get,
    path = "/api/enrollments",
    tag = "enrollments",
    responses(
        (status = 200, description = "Enrolled courses", body = Vec<EnrolledCourse>),
        (status = 401, description = "Not signed in"),
    ),
)]
pub async fn list_my_courses(
    State(state): State<AppState>,
    identity: MemberIdentity,
) -> EnrollmentResult<Json<Vec<EnrolledCourse>>> {
    let email = identity.email().ok_or(EnrollmentError::NotAMember)?;

    let rows: Vec<EnrolledCourseRow> = sqlx::query_as(
        "SELECT c.id, c.title, c.description, c.thumbnail_url, c.is_published,
                c.access_level, c.order_index, c.created_at, c.updated_at,
                e.enrolled_at
         FROM enrollments e
         JOIN courses c ON c.id = e.course_id
         WHERE e.buyer_email = $1 AND c.is_published
         ORDER BY e.enrolled_at DESC",
    )
    .bind(email)
    .fetch_all(&state.db)
    .await?;

    let courses = rows
        .into_iter()
        .map(EnrolledCourse::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(courses))
}

/// Enroll the signed-in member in a course. Enrolling twice is a conflict.
#[utoipa::path(
    post,
    path = "/api/enrollments",
    tag = "enrollments",
    request_body = EnrollRequest,
    responses(
        (status = 201, description = "Enrolled", body = Enrollment),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "Course not found"),
        (status = 409, description = "Already enrolled"),
    ),
)]
pub async fn enroll(
    State(state): State<AppState>,
    identity: MemberIdentity,
    Json(request): Json<EnrollRequest>,
) -> EnrollmentResult<(StatusCode, Json<Enrollment>)> {
    let email = identity.email().ok_or(EnrollmentError::NotAMember)?;

    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM courses WHERE id = $1)")
        .bind(request.course_id)
        .fetch_one(&state.db)
        .await?;
    if !exists {
        return Err(EnrollmentError::CourseNotFound);
    }

    let enrollment: Enrollment = sqlx::query_as(&format!(
        "INSERT INTO enrollments (buyer_email, course_id)
         VALUES ($1, $2)
         RETURNING {COLUMNS}"
    ))
    .bind(email)
    .bind(request.course_id)
    .fetch_one(&state.db)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            EnrollmentError::AlreadyEnrolled
        } else {
            EnrollmentError::Database(e)
        }
    })?;

    info!(email = %email, course_id = %request.course_id, "Member enrolled");
    Ok((StatusCode::CREATED, Json(enrollment)))
}

/// Drop a course from the member's shelf. Unenrolling twice is a no-op, not
/// an error.
#[utoipa::path(
    delete,
    path = "/api/enrollments/{course_id}",
    tag = "enrollments",
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 204, description = "Unenrolled"),
        (status = 401, description = "Not signed in"),
    ),
)]
pub async fn unenroll(
    State(state): State<AppState>,
    identity: MemberIdentity,
    Path(course_id): Path<Uuid>,
) -> EnrollmentResult<StatusCode> {
    let email = identity.email().ok_or(EnrollmentError::NotAMember)?;

    sqlx::query("DELETE FROM enrollments WHERE buyer_email = $1 AND course_id = $2")
        .bind(email)
        .bind(course_id)
        .execute(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Router
// ============================================================================

/// Member routes (mounted at `/api/enrollments`). The member identity
/// middleware is layered in by the caller.
pub fn member_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_my_courses))
        .route("/", post(enroll))
        .route("/{course_id}", delete(unenroll))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn course_row(access_level: &str) -> CourseRow {
        let now = Utc::now();
        CourseRow {
            id: Uuid::new_v4(),
            title: "Kelas Dasar".to_string(),
            description: None,
            thumbnail_url: None,
            is_published: true,
            access_level: access_level.to_string(),
            order_index: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn enrolled_course_serializes_course_fields_flat() {
        let row = EnrolledCourseRow {
            course: course_row("basic"),
            enrolled_at: Utc::now(),
        };
        let enrolled = EnrolledCourse::try_from(row).unwrap();

        let json = serde_json::to_value(&enrolled).unwrap();
        assert_eq!(json["title"], "Kelas Dasar");
        assert_eq!(json["access_level"], "basic");
        assert!(json.get("enrolled_at").is_some());
        assert!(json.get("course").is_none());
    }

    #[test]
    fn corrupt_access_level_is_rejected() {
        let row = EnrolledCourseRow {
            course: course_row("platinum"),
            enrolled_at: Utc::now(),
        };
        assert!(matches!(
            EnrolledCourse::try_from(row),
            Err(EnrollmentError::CorruptRecord(level)) if level == "platinum"
        ));
    }

    #[test]
    fn duplicate_enrollment_maps_to_conflict() {
        let response = EnrollmentError::AlreadyEnrolled.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn anonymous_enrollment_maps_to_unauthorized() {
        let response = EnrollmentError::NotAMember.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
