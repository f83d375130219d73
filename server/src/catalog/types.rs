//! Types for the course catalog.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::access::ResourceAccessLevel;
use crate::ordering::{Ordered, PartialFailure, ReorderError};

use super::video::VideoRef;

/// What a material renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MaterialKind {
    Video,
    Image,
    Text,
    Button,
}

impl MaterialKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Image => "image",
            Self::Text => "text",
            Self::Button => "button",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "video" => Some(Self::Video),
            "image" => Some(Self::Image),
            "text" => Some(Self::Text),
            "button" => Some(Self::Button),
            _ => None,
        }
    }
}

/// A course as stored; `access_level` is a text column.
#[derive(Debug, Clone, FromRow)]
pub struct CourseRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub is_published: bool,
    pub access_level: String,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub is_published: bool,
    pub access_level: ResourceAccessLevel,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<CourseRow> for Course {
    type Error = CatalogError;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        let access_level = ResourceAccessLevel::parse(&row.access_level)
            .ok_or_else(|| CatalogError::CorruptRecord(row.access_level.clone()))?;
        Ok(Self {
            id: row.id,
            title: row.title,
            description: row.description,
            thumbnail_url: row.thumbnail_url,
            is_published: row.is_published,
            access_level,
            order_index: row.order_index,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl Ordered for Course {
    fn entity_id(&self) -> Uuid {
        self.id
    }
}

/// A course in the public listing, annotated with whether the requesting
/// member's tier can open it.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ListedCourse {
    #[serde(flatten)]
    pub course: Course,
    pub locked: bool,
}

#[derive(Debug, Clone, FromRow, Serialize, utoipa::ToSchema)]
pub struct Module {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ordered for Module {
    fn entity_id(&self) -> Uuid {
        self.id
    }
}

/// A material as stored; `kind` is a text column.
#[derive(Debug, Clone, FromRow)]
pub struct MaterialRow {
    pub id: Uuid,
    pub module_id: Uuid,
    pub kind: String,
    pub title: String,
    pub content: Option<String>,
    pub media_url: Option<String>,
    pub button_text: Option<String>,
    pub button_url: Option<String>,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct Material {
    pub id: Uuid,
    pub module_id: Uuid,
    pub kind: MaterialKind,
    pub title: String,
    pub content: Option<String>,
    pub media_url: Option<String>,
    pub button_text: Option<String>,
    pub button_url: Option<String>,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Provider, id and embed URL parsed from `media_url` for video
    /// materials, so the client never re-parses share URLs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoEmbed>,
}

/// The embeddable form of a video material's `media_url`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct VideoEmbed {
    #[serde(flatten)]
    pub source: VideoRef,
    pub embed_url: String,
}

impl TryFrom<MaterialRow> for Material {
    type Error = CatalogError;

    fn try_from(row: MaterialRow) -> Result<Self, Self::Error> {
        let kind = MaterialKind::parse(&row.kind)
            .ok_or_else(|| CatalogError::CorruptRecord(row.kind.clone()))?;
        let video = match (kind, row.media_url.as_deref()) {
            (MaterialKind::Video, Some(url)) => {
                super::video::extract_video_ref(url).map(|source| VideoEmbed {
                    embed_url: source.embed_url(),
                    source,
                })
            }
            _ => None,
        };
        Ok(Self {
            id: row.id,
            module_id: row.module_id,
            kind,
            title: row.title,
            content: row.content,
            media_url: row.media_url,
            button_text: row.button_text,
            button_url: row.button_url,
            order_index: row.order_index,
            created_at: row.created_at,
            updated_at: row.updated_at,
            video,
        })
    }
}

impl Ordered for Material {
    fn entity_id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CourseWithModules {
    #[serde(flatten)]
    pub course: Course,
    pub modules: Vec<Module>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ModuleWithMaterials {
    #[serde(flatten)]
    pub module: Module,
    pub materials: Vec<Material>,
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    pub access_level: ResourceAccessLevel,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateCourseRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub is_published: Option<bool>,
    pub access_level: Option<ResourceAccessLevel>,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateModuleRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateModuleRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateMaterialRequest {
    pub kind: MaterialKind,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub content: Option<String>,
    pub media_url: Option<String>,
    pub button_text: Option<String>,
    pub button_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateMaterialRequest {
    pub kind: Option<MaterialKind>,
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub content: Option<String>,
    pub media_url: Option<String>,
    pub button_text: Option<String>,
    pub button_url: Option<String>,
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Course not found")]
    CourseNotFound,
    #[error("Module not found")]
    ModuleNotFound,
    #[error("Material not found")]
    MaterialNotFound,
    #[error("Your access tier does not include this course")]
    Locked,
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Invalid reorder request: {0}")]
    Reorder(#[from] ReorderError),
    #[error(transparent)]
    ReorderPartial(#[from] PartialFailure),
    #[error("Record carries unrecognized enum value '{0}'")]
    CorruptRecord(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
    /// Set only for partially applied reorders; the client must refetch the
    /// authoritative order instead of trusting its local state.
    #[serde(skip_serializing_if = "Option::is_none")]
    failed_ids: Option<Vec<Uuid>>,
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::CourseNotFound => (StatusCode::NOT_FOUND, "COURSE_NOT_FOUND"),
            Self::ModuleNotFound => (StatusCode::NOT_FOUND, "MODULE_NOT_FOUND"),
            Self::MaterialNotFound => (StatusCode::NOT_FOUND, "MATERIAL_NOT_FOUND"),
            Self::Locked => (StatusCode::FORBIDDEN, "COURSE_LOCKED"),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::Reorder(_) => (StatusCode::BAD_REQUEST, "INVALID_REORDER"),
            Self::ReorderPartial(_) => (StatusCode::INTERNAL_SERVER_ERROR, "REORDER_PARTIAL"),
            Self::CorruptRecord(_) | Self::Database(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let failed_ids = match &self {
            Self::ReorderPartial(partial) => Some(partial.failed.clone()),
            _ => None,
        };

        let body = Json(ErrorBody {
            error: code.to_string(),
            message: self.to_string(),
            failed_ids,
        });

        (status, body).into_response()
    }
}
