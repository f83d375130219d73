//! Types for the dynamic homepage.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::ordering::{Ordered, PartialFailure, ReorderError};

/// Section background treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Background {
    Default,
    Muted,
    Gradient,
}

impl Background {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Muted => "muted",
            Self::Gradient => "gradient",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "default" => Some(Self::Default),
            "muted" => Some(Self::Muted),
            "gradient" => Some(Self::Gradient),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ButtonVariant {
    Default,
    Outline,
    Ghost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ButtonSize {
    Default,
    Sm,
    Lg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub enum CardLayout {
    #[serde(rename = "2-col")]
    TwoCol,
    #[serde(rename = "3-col")]
    ThreeCol,
}

/// A card, used standalone and inside card groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CardContent {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
}

/// Element content, dispatched on the `type` tag. Each variant's fields are
/// statically known, so no runtime field-presence checks are needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementContent {
    Heading {
        level: u8,
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        gradient: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        centered: Option<bool>,
    },
    Paragraph {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        centered: Option<bool>,
        #[serde(rename = "maxWidth", skip_serializing_if = "Option::is_none")]
        max_width: Option<String>,
    },
    Button {
        text: String,
        link: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        variant: Option<ButtonVariant>,
        #[serde(skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        size: Option<ButtonSize>,
    },
    Card(CardContent),
    Video {
        youtube_url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    CardGroup {
        layout: CardLayout,
        items: Vec<CardContent>,
    },
}

impl ElementContent {
    /// Content rules the tag dispatch cannot express.
    pub fn validate(&self) -> Result<(), HomepageError> {
        match self {
            Self::Heading { level, .. } if !(1..=6).contains(level) => Err(
                HomepageError::Validation(format!("Heading level must be 1-6, got {level}")),
            ),
            Self::CardGroup { items, .. } if items.is_empty() => Err(HomepageError::Validation(
                "Card group needs at least one card".into(),
            )),
            _ => Ok(()),
        }
    }
}

/// A section as stored; `background` is a text column.
#[derive(Debug, Clone, FromRow)]
pub struct SectionRow {
    pub id: Uuid,
    pub name: String,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub background: String,
    pub order_index: i32,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct Section {
    pub id: Uuid,
    pub name: String,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub background: Background,
    pub order_index: i32,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<SectionRow> for Section {
    type Error = HomepageError;

    fn try_from(row: SectionRow) -> Result<Self, Self::Error> {
        let background = Background::parse(&row.background)
            .ok_or_else(|| HomepageError::CorruptRecord(row.background.clone()))?;
        Ok(Self {
            id: row.id,
            name: row.name,
            title: row.title,
            subtitle: row.subtitle,
            background,
            order_index: row.order_index,
            is_visible: row.is_visible,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl Ordered for Section {
    fn entity_id(&self) -> Uuid {
        self.id
    }
}

/// An element as stored; `content` is a JSONB column holding the tagged
/// union.
#[derive(Debug, Clone, FromRow)]
pub struct ElementRow {
    pub id: Uuid,
    pub section_id: Uuid,
    pub content: serde_json::Value,
    pub order_index: i32,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct Element {
    pub id: Uuid,
    pub section_id: Uuid,
    pub content: ElementContent,
    pub order_index: i32,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ElementRow> for Element {
    type Error = HomepageError;

    fn try_from(row: ElementRow) -> Result<Self, Self::Error> {
        let content = serde_json::from_value(row.content)
            .map_err(|e| HomepageError::CorruptRecord(e.to_string()))?;
        Ok(Self {
            id: row.id,
            section_id: row.section_id,
            content,
            order_index: row.order_index,
            is_visible: row.is_visible,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl Ordered for Element {
    fn entity_id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct SectionWithElements {
    #[serde(flatten)]
    pub section: Section,
    pub elements: Vec<Element>,
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateSectionRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub background: Background,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateSectionRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub background: Option<Background>,
    pub is_visible: Option<bool>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateElementRequest {
    pub content: ElementContent,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateElementRequest {
    pub content: Option<ElementContent>,
    pub is_visible: Option<bool>,
}

const fn default_visible() -> bool {
    true
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum HomepageError {
    #[error("Section not found")]
    SectionNotFound,
    #[error("Element not found")]
    ElementNotFound,
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Invalid reorder request: {0}")]
    Reorder(#[from] ReorderError),
    #[error(transparent)]
    ReorderPartial(#[from] PartialFailure),
    #[error("Stored element content does not parse: {0}")]
    CorruptRecord(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    failed_ids: Option<Vec<Uuid>>,
}

impl IntoResponse for HomepageError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::SectionNotFound => (StatusCode::NOT_FOUND, "SECTION_NOT_FOUND"),
            Self::ElementNotFound => (StatusCode::NOT_FOUND, "ELEMENT_NOT_FOUND"),
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn heading_round_trips_through_tagged_json() {
        let content = ElementContent::Heading {
            level: 2,
            text: "Belajar Bersama".into(),
            gradient: Some(true),
            centered: None,
        };
        let value = serde_json::to_value(&content).unwrap();
        assert_eq!(
            value,
            json!({"type": "heading", "level": 2, "text": "Belajar Bersama", "gradient": true})
        );
        let back: ElementContent = serde_json::from_value(value).unwrap();
        assert_eq!(back, content);
    }

    #[test]
    fn card_group_uses_snake_case_tag_and_hyphenated_layout() {
        let value = json!({
            "type": "card_group",
            "layout": "3-col",
            "items": [{"title": "A", "description": "B"}],
        });
        let content: ElementContent = serde_json::from_value(value).unwrap();
        let ElementContent::CardGroup { layout, items } = content else {
            panic!("expected card group");
        };
        assert_eq!(layout, CardLayout::ThreeCol);
        assert_eq!(items[0].title, "A");
    }

    #[test]
    fn paragraph_keeps_camel_case_max_width_key() {
        let value = json!({"type": "paragraph", "text": "Halo", "maxWidth": "42rem"});
        let content: ElementContent = serde_json::from_value(value).unwrap();
        assert_eq!(
            content,
            ElementContent::Paragraph {
                text: "Halo".into(),
                centered: None,
                max_width: Some("42rem".into()),
            }
        );
    }

    #[test]
    fn unknown_type_tag_is_rejected() {
        let value = json!({"type": "carousel", "images": []});
        assert!(serde_json::from_value::<ElementContent>(value).is_err());
    }

    #[test]
    fn missing_variant_field_is_rejected() {
        let value = json!({"type": "button", "text": "Daftar"});
        assert!(serde_json::from_value::<ElementContent>(value).is_err());
    }

    #[test]
    fn heading_level_bounds_are_enforced() {
        let content = ElementContent::Heading {
            level: 7,
            text: "x".into(),
            gradient: None,
            centered: None,
        };
        assert!(content.validate().is_err());

        let content = ElementContent::Heading {
            level: 6,
            text: "x".into(),
            gradient: None,
            centered: None,
        };
        assert!(content.validate().is_ok());
    }

    #[test]
    fn empty_card_group_is_rejected() {
        let content = ElementContent::CardGroup {
            layout: CardLayout::TwoCol,
            items: vec![],
        };
        assert!(content.validate().is_err());
    }
}
