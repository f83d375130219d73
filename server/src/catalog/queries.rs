//! Database queries for the course catalog.
//!
//! Runtime queries to avoid a compile-time `DATABASE_URL` requirement.
//! New rows are appended: `order_index` is assigned as the current sibling
//! count at insert time.

use sqlx::PgPool;
use uuid::Uuid;

use crate::access::ResourceAccessLevel;

use super::types::{CourseRow, MaterialKind, MaterialRow, Module};

const COURSE_COLUMNS: &str =
    "id, title, description, thumbnail_url, is_published, access_level, order_index, created_at, updated_at";
const MODULE_COLUMNS: &str =
    "id, course_id, title, description, order_index, created_at, updated_at";
const MATERIAL_COLUMNS: &str =
    "id, module_id, kind, title, content, media_url, button_text, button_url, order_index, created_at, updated_at";

// ============================================================================
// Courses
// ============================================================================

pub async fn list_courses(
    pool: &PgPool,
    published_only: bool,
) -> Result<Vec<CourseRow>, sqlx::Error> {
    if published_only {
        sqlx::query_as(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE is_published ORDER BY order_index"
        ))
        .fetch_all(pool)
        .await
    } else {
        sqlx::query_as(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses ORDER BY order_index"
        ))
        .fetch_all(pool)
        .await
    }
}

pub async fn get_course(pool: &PgPool, id: Uuid) -> Result<Option<CourseRow>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create_course(
    pool: &PgPool,
    title: &str,
    description: Option<&str>,
    thumbnail_url: Option<&str>,
    is_published: bool,
    access_level: ResourceAccessLevel,
) -> Result<CourseRow, sqlx::Error> {
    sqlx::query_as(&format!(
        "INSERT INTO courses (title, description, thumbnail_url, is_published, access_level, order_index)
         VALUES ($1, $2, $3, $4, $5, (SELECT COUNT(*) FROM courses))
         RETURNING {COURSE_COLUMNS}"
    ))
    .bind(title)
    .bind(description)
    .bind(thumbnail_url)
    .bind(is_published)
    .bind(access_level.as_str())
    .fetch_one(pool)
    .await
}

/// Partial update; absent fields keep their value. Nullable text fields are
/// overwritten when present, so an explicit empty string clears them upstream.
pub async fn update_course(
    pool: &PgPool,
    id: Uuid,
    title: Option<&str>,
    description: Option<&str>,
    thumbnail_url: Option<&str>,
    is_published: Option<bool>,
    access_level: Option<ResourceAccessLevel>,
) -> Result<Option<CourseRow>, sqlx::Error> {
    sqlx::query_as(&format!(
        "UPDATE courses SET
             title = COALESCE($2, title),
             description = COALESCE($3, description),
             thumbnail_url = COALESCE($4, thumbnail_url),
             is_published = COALESCE($5, is_published),
             access_level = COALESCE($6, access_level),
             updated_at = NOW()
         WHERE id = $1
         RETURNING {COURSE_COLUMNS}"
    ))
    .bind(id)
    .bind(title)
    .bind(description)
    .bind(thumbnail_url)
    .bind(is_published)
    .bind(access_level.map(ResourceAccessLevel::as_str))
    .fetch_optional(pool)
    .await
}

/// Delete a course; modules and materials cascade via foreign keys.
pub async fn delete_course(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM courses WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ============================================================================
// Modules
// ============================================================================

pub async fn list_modules(pool: &PgPool, course_id: Uuid) -> Result<Vec<Module>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {MODULE_COLUMNS} FROM modules WHERE course_id = $1 ORDER BY order_index"
    ))
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub async fn get_module(pool: &PgPool, id: Uuid) -> Result<Option<Module>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {MODULE_COLUMNS} FROM modules WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create_module(
    pool: &PgPool,
    course_id: Uuid,
    title: &str,
    description: Option<&str>,
) -> Result<Module, sqlx::Error> {
    sqlx::query_as(&format!(
        "INSERT INTO modules (course_id, title, description, order_index)
         VALUES ($1, $2, $3, (SELECT COUNT(*) FROM modules WHERE course_id = $1))
         RETURNING {MODULE_COLUMNS}"
    ))
    .bind(course_id)
    .bind(title)
    .bind(description)
    .fetch_one(pool)
    .await
}

pub async fn update_module(
    pool: &PgPool,
    id: Uuid,
    title: Option<&str>,
    description: Option<&str>,
) -> Result<Option<Module>, sqlx::Error> {
    sqlx::query_as(&format!(
        "UPDATE modules SET
             title = COALESCE($2, title),
             description = COALESCE($3, description),
             updated_at = NOW()
         WHERE id = $1
         RETURNING {MODULE_COLUMNS}"
    ))
    .bind(id)
    .bind(title)
    .bind(description)
    .fetch_optional(pool)
    .await
}

pub async fn delete_module(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM modules WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ============================================================================
// Materials
// ============================================================================

pub async fn list_materials(
    pool: &PgPool,
    module_id: Uuid,
) -> Result<Vec<MaterialRow>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {MATERIAL_COLUMNS} FROM materials WHERE module_id = $1 ORDER BY order_index"
    ))
    .bind(module_id)
    .fetch_all(pool)
    .await
}

pub async fn get_material(pool: &PgPool, id: Uuid) -> Result<Option<MaterialRow>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {MATERIAL_COLUMNS} FROM materials WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

#[allow(clippy::too_many_arguments)]
pub async fn create_material(
    pool: &PgPool,
    module_id: Uuid,
    kind: MaterialKind,
    title: &str,
    content: Option<&str>,
    media_url: Option<&str>,
    button_text: Option<&str>,
    button_url: Option<&str>,
) -> Result<MaterialRow, sqlx::Error> {
    sqlx::query_as(&format!(
        "INSERT INTO materials (module_id, kind, title, content, media_url, button_text, button_url, order_index)
         VALUES ($1, $2, $3, $4, $5, $6, $7, (SELECT COUNT(*) FROM materials WHERE module_id = $1))
         RETURNING {MATERIAL_COLUMNS}"
    ))
    .bind(module_id)
    .bind(kind.as_str())
    .bind(title)
    .bind(content)
    .bind(media_url)
    .bind(button_text)
    .bind(button_url)
    .fetch_one(pool)
    .await
}

#[allow(clippy::too_many_arguments)]
pub async fn update_material(
    pool: &PgPool,
    id: Uuid,
    kind: Option<MaterialKind>,
    title: Option<&str>,
    content: Option<&str>,
    media_url: Option<&str>,
    button_text: Option<&str>,
    button_url: Option<&str>,
) -> Result<Option<MaterialRow>, sqlx::Error> {
    sqlx::query_as(&format!(
        "UPDATE materials SET
             kind = COALESCE($2, kind),
             title = COALESCE($3, title),
             content = COALESCE($4, content),
             media_url = COALESCE($5, media_url),
             button_text = COALESCE($6, button_text),
             button_url = COALESCE($7, button_url),
             updated_at = NOW()
         WHERE id = $1
         RETURNING {MATERIAL_COLUMNS}"
    ))
    .bind(id)
    .bind(kind.map(MaterialKind::as_str))
    .bind(title)
    .bind(content)
    .bind(media_url)
    .bind(button_text)
    .bind(button_url)
    .fetch_optional(pool)
    .await
}

pub async fn delete_material(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM materials WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
