//! Types for buyer records.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::access::AccessTier;

/// A buyer as stored. The tier column is text in the database; converting a
/// row surfaces any value outside the closed set instead of defaulting.
#[derive(Debug, Clone, FromRow)]
pub struct BuyerRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub product_title: String,
    pub access_type: String,
    pub amount: Option<String>,
    pub ref_id: Option<String>,
    pub purchased_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A buyer record.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct Buyer {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub product_title: String,
    pub access_type: AccessTier,
    pub amount: Option<String>,
    pub ref_id: Option<String>,
    pub purchased_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<BuyerRow> for Buyer {
    type Error = BuyersError;

    fn try_from(row: BuyerRow) -> Result<Self, Self::Error> {
        let access_type = AccessTier::parse(&row.access_type)
            .ok_or_else(|| BuyersError::CorruptTier(row.access_type.clone()))?;
        Ok(Self {
            id: row.id,
            email: row.email,
            name: row.name,
            product_title: row.product_title,
            access_type,
            amount: row.amount,
            ref_id: row.ref_id,
            purchased_at: row.purchased_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Request body for creating a buyer by hand.
///
/// Admin entry names the tier explicitly; product classification only runs
/// for automated webhook ingestion.
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateBuyerRequest {
    #[validate(email)]
    pub email: String,
    pub name: String,
    pub product_title: String,
    pub access_type: AccessTier,
    pub amount: Option<String>,
    pub ref_id: Option<String>,
    pub purchased_at: Option<DateTime<Utc>>,
}

/// Request body for updating a buyer. Absent fields are left unchanged.
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateBuyerRequest {
    #[validate(email)]
    pub email: Option<String>,
    pub name: Option<String>,
    pub product_title: Option<String>,
    pub access_type: Option<AccessTier>,
    pub amount: Option<String>,
    pub ref_id: Option<String>,
    pub purchased_at: Option<DateTime<Utc>>,
}

/// One row accepted by CSV import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyerImport {
    pub email: String,
    pub name: String,
    pub product_title: String,
    pub access_type: AccessTier,
    pub amount: Option<String>,
    pub ref_id: Option<String>,
    pub purchased_at: Option<DateTime<Utc>>,
}

/// Import summary returned to the admin.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ImportReport {
    pub imported: usize,
    pub errors: Vec<super::csv::RowError>,
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BuyersError {
    #[error("Buyer not found")]
    NotFound,
    #[error("A buyer with this email already exists")]
    EmailTaken,
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Buyer record carries unrecognized access tier '{0}'")]
    CorruptTier(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl IntoResponse for BuyersError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::NotFound => (StatusCode::NOT_FOUND, "BUYER_NOT_FOUND"),
            Self::EmailTaken => (StatusCode::CONFLICT, "EMAIL_TAKEN"),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::CorruptTier(_) | Self::Database(_) => {
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
