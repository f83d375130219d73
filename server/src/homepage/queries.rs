//! Database queries for homepage sections and elements.
//!
//! Runtime queries to avoid a compile-time `DATABASE_URL` requirement.

use sqlx::PgPool;
use uuid::Uuid;

use super::types::{Background, ElementRow, SectionRow};

const SECTION_COLUMNS: &str =
    "id, name, title, subtitle, background, order_index, is_visible, created_at, updated_at";
const ELEMENT_COLUMNS: &str =
    "id, section_id, content, order_index, is_visible, created_at, updated_at";

// ============================================================================
// Sections
// ============================================================================

pub async fn list_sections(
    pool: &PgPool,
    visible_only: bool,
) -> Result<Vec<SectionRow>, sqlx::Error> {
    if visible_only {
        sqlx::query_as(&format!(
            "SELECT {SECTION_COLUMNS} FROM homepage_sections WHERE is_visible ORDER BY order_index"
        ))
        .fetch_all(pool)
        .await
    } else {
        sqlx::query_as(&format!(
            "SELECT {SECTION_COLUMNS} FROM homepage_sections ORDER BY order_index"
        ))
        .fetch_all(pool)
        .await
    }
}

pub async fn get_section(pool: &PgPool, id: Uuid) -> Result<Option<SectionRow>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {SECTION_COLUMNS} FROM homepage_sections WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn create_section(
    pool: &PgPool,
    name: &str,
    title: Option<&str>,
    subtitle: Option<&str>,
    background: Background,
    is_visible: bool,
) -> Result<SectionRow, sqlx::Error> {
    sqlx::query_as(&format!(
        "INSERT INTO homepage_sections (name, title, subtitle, background, is_visible, order_index)
         VALUES ($1, $2, $3, $4, $5, (SELECT COUNT(*) FROM homepage_sections))
         RETURNING {SECTION_COLUMNS}"
    ))
    .bind(name)
    .bind(title)
    .bind(subtitle)
    .bind(background.as_str())
    .bind(is_visible)
    .fetch_one(pool)
    .await
}

pub async fn update_section(
    pool: &PgPool,
    id: Uuid,
    name: Option<&str>,
    title: Option<&str>,
    subtitle: Option<&str>,
    background: Option<Background>,
    is_visible: Option<bool>,
) -> Result<Option<SectionRow>, sqlx::Error> {
    sqlx::query_as(&format!(
        "UPDATE homepage_sections SET
             name = COALESCE($2, name),
             title = COALESCE($3, title),
             subtitle = COALESCE($4, subtitle),
             background = COALESCE($5, background),
             is_visible = COALESCE($6, is_visible),
             updated_at = NOW()
         WHERE id = $1
         RETURNING {SECTION_COLUMNS}"
    ))
    .bind(id)
    .bind(name)
    .bind(title)
    .bind(subtitle)
    .bind(background.map(Background::as_str))
    .bind(is_visible)
    .fetch_optional(pool)
    .await
}

/// Delete a section; its elements cascade via foreign key.
pub async fn delete_section(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM homepage_sections WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ============================================================================
// Elements
// ============================================================================

pub async fn list_elements(
    pool: &PgPool,
    section_id: Uuid,
    visible_only: bool,
) -> Result<Vec<ElementRow>, sqlx::Error> {
    if visible_only {
        sqlx::query_as(&format!(
            "SELECT {ELEMENT_COLUMNS} FROM homepage_elements
             WHERE section_id = $1 AND is_visible ORDER BY order_index"
        ))
        .bind(section_id)
        .fetch_all(pool)
        .await
    } else {
        sqlx::query_as(&format!(
            "SELECT {ELEMENT_COLUMNS} FROM homepage_elements
             WHERE section_id = $1 ORDER BY order_index"
        ))
        .bind(section_id)
        .fetch_all(pool)
        .await
    }
}

pub async fn get_element(pool: &PgPool, id: Uuid) -> Result<Option<ElementRow>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {ELEMENT_COLUMNS} FROM homepage_elements WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn create_element(
    pool: &PgPool,
    section_id: Uuid,
    content: &serde_json::Value,
    is_visible: bool,
) -> Result<ElementRow, sqlx::Error> {
    sqlx::query_as(&format!(
        "INSERT INTO homepage_elements (section_id, content, is_visible, order_index)
         VALUES ($1, $2, $3, (SELECT COUNT(*) FROM homepage_elements WHERE section_id = $1))
         RETURNING {ELEMENT_COLUMNS}"
    ))
    .bind(section_id)
    .bind(content)
    .bind(is_visible)
    .fetch_one(pool)
    .await
}

pub async fn update_element(
    pool: &PgPool,
    id: Uuid,
    content: Option<&serde_json::Value>,
    is_visible: Option<bool>,
) -> Result<Option<ElementRow>, sqlx::Error> {
    sqlx::query_as(&format!(
        "UPDATE homepage_elements SET
             content = COALESCE($2, content),
             is_visible = COALESCE($3, is_visible),
             updated_at = NOW()
         WHERE id = $1
         RETURNING {ELEMENT_COLUMNS}"
    ))
    .bind(id)
    .bind(content)
    .bind(is_visible)
    .fetch_optional(pool)
    .await
}

pub async fn delete_element(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM homepage_elements WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
