//! Database queries for buyer records.
//!
//! Runtime queries to avoid a compile-time `DATABASE_URL` requirement.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::access::AccessTier;

use super::types::BuyerRow;

const BUYER_COLUMNS: &str =
    "id, email, name, product_title, access_type, amount, ref_id, purchased_at, created_at, updated_at";

/// Parameters for inserting or upserting a buyer.
#[derive(Debug)]
pub struct BuyerParams<'a> {
    /// Already normalized (lowercased, trimmed).
    pub email: &'a str,
    pub name: &'a str,
    pub product_title: &'a str,
    pub access_type: AccessTier,
    pub amount: Option<&'a str>,
    pub ref_id: Option<&'a str>,
    pub purchased_at: Option<DateTime<Utc>>,
}

/// List buyers, newest purchase first, optionally filtered by an email/name
/// substring.
pub async fn list_buyers(
    pool: &PgPool,
    search: Option<&str>,
) -> Result<Vec<BuyerRow>, sqlx::Error> {
    match search {
        Some(term) => {
            let pattern = format!("%{term}%");
            sqlx::query_as(&format!(
                "SELECT {BUYER_COLUMNS} FROM buyers
                 WHERE email ILIKE $1 OR name ILIKE $1
                 ORDER BY purchased_at DESC"
            ))
            .bind(pattern)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as(&format!(
                "SELECT {BUYER_COLUMNS} FROM buyers ORDER BY purchased_at DESC"
            ))
            .fetch_all(pool)
            .await
        }
    }
}

pub async fn get_buyer(pool: &PgPool, id: Uuid) -> Result<Option<BuyerRow>, sqlx::Error> {
    sqlx::query_as(&format!("SELECT {BUYER_COLUMNS} FROM buyers WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Insert a new buyer. Fails on a duplicate email (unique key).
pub async fn create_buyer(pool: &PgPool, params: &BuyerParams<'_>) -> Result<BuyerRow, sqlx::Error> {
    sqlx::query_as(&format!(
        "INSERT INTO buyers (email, name, product_title, access_type, amount, ref_id, purchased_at)
         VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, NOW()))
         RETURNING {BUYER_COLUMNS}"
    ))
    .bind(params.email)
    .bind(params.name)
    .bind(params.product_title)
    .bind(params.access_type.as_str())
    .bind(params.amount)
    .bind(params.ref_id)
    .bind(params.purchased_at)
    .fetch_one(pool)
    .await
}

/// Insert-or-update keyed on the email conflict column. Used by webhook
/// ingestion and CSV import.
pub async fn upsert_buyer(pool: &PgPool, params: &BuyerParams<'_>) -> Result<BuyerRow, sqlx::Error> {
    sqlx::query_as(&format!(
        "INSERT INTO buyers (email, name, product_title, access_type, amount, ref_id, purchased_at)
         VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, NOW()))
         ON CONFLICT (email) DO UPDATE SET
             name = EXCLUDED.name,
             product_title = EXCLUDED.product_title,
             access_type = EXCLUDED.access_type,
             amount = EXCLUDED.amount,
             ref_id = EXCLUDED.ref_id,
             purchased_at = EXCLUDED.purchased_at,
             updated_at = NOW()
         RETURNING {BUYER_COLUMNS}"
    ))
    .bind(params.email)
    .bind(params.name)
    .bind(params.product_title)
    .bind(params.access_type.as_str())
    .bind(params.amount)
    .bind(params.ref_id)
    .bind(params.purchased_at)
    .fetch_one(pool)
    .await
}

/// Partial update; absent fields keep their value.
pub async fn update_buyer(
    pool: &PgPool,
    id: Uuid,
    email: Option<&str>,
    name: Option<&str>,
    product_title: Option<&str>,
    access_type: Option<AccessTier>,
    amount: Option<&str>,
    ref_id: Option<&str>,
    purchased_at: Option<DateTime<Utc>>,
) -> Result<Option<BuyerRow>, sqlx::Error> {
    sqlx::query_as(&format!(
        "UPDATE buyers SET
             email = COALESCE($2, email),
             name = COALESCE($3, name),
             product_title = COALESCE($4, product_title),
             access_type = COALESCE($5, access_type),
             amount = COALESCE($6, amount),
             ref_id = COALESCE($7, ref_id),
             purchased_at = COALESCE($8, purchased_at),
             updated_at = NOW()
         WHERE id = $1
         RETURNING {BUYER_COLUMNS}"
    ))
    .bind(id)
    .bind(email)
    .bind(name)
    .bind(product_title)
    .bind(access_type.map(AccessTier::as_str))
    .bind(amount)
    .bind(ref_id)
    .bind(purchased_at)
    .fetch_optional(pool)
    .await
}

/// Update the display name only, keyed on the normalized email. The one
/// buyer mutation the member surface is allowed to make.
pub async fn update_buyer_name(
    pool: &PgPool,
    email: &str,
    name: &str,
) -> Result<Option<BuyerRow>, sqlx::Error> {
    sqlx::query_as(&format!(
        "UPDATE buyers SET name = $2, updated_at = NOW()
         WHERE email = $1
         RETURNING {BUYER_COLUMNS}"
    ))
    .bind(email)
    .bind(name)
    .fetch_optional(pool)
    .await
}

/// Delete a buyer. Returns whether a row was removed.
pub async fn delete_buyer(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM buyers WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Whether an error is a unique-constraint violation (duplicate email).
#[must_use]
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .and_then(|db| db.code())
        .as_deref()
        == Some("23505")
}
