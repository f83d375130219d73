//! Buyer directory backed by the buyers table.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::error;

use crate::access::AccessTier;

use super::session::{BuyerAccess, BuyerDirectory, DirectoryError};

/// `PostgreSQL` implementation of the buyer lookup port.
#[derive(Clone)]
pub struct PgBuyerDirectory {
    pool: PgPool,
}

impl PgBuyerDirectory {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct AccessRow {
    email: String,
    access_type: String,
}

#[async_trait]
impl BuyerDirectory for PgBuyerDirectory {
    async fn lookup_by_email(&self, email: &str) -> Result<Option<BuyerAccess>, DirectoryError> {
        let row: Option<AccessRow> =
            sqlx::query_as("SELECT email, access_type FROM buyers WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DirectoryError(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        // The tier column is constrained to the closed set; anything else is
        // data corruption and must not silently default.
        let tier = AccessTier::parse(&row.access_type).ok_or_else(|| {
            error!(email = %row.email, value = %row.access_type, "Unrecognized access tier in buyer record");
            DirectoryError(format!("unrecognized access tier '{}'", row.access_type))
        })?;

        Ok(Some(BuyerAccess {
            email: row.email,
            tier,
        }))
    }
}
