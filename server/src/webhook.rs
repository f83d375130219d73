//! Buyer sync webhook.
//!
//! Payment and marketing automations push completed purchases here. The
//! endpoint is authenticated by a shared secret in the `x-webhook-secret`
//! header, and the access tier is derived from the purchased product's title
//! rather than trusted from the caller.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use crate::access::classify_product;
use crate::api::AppState;
use crate::buyers::{upsert_buyer, Buyer, BuyerParams, BuyersError};
use crate::member::normalize_email;

const SECRET_HEADER: &str = "x-webhook-secret";

/// Gate on the shared-secret header. A missing or mismatched secret is
/// indistinguishable to the caller.
fn check_secret(headers: &HeaderMap, expected: &str) -> Result<(), WebhookError> {
    let secret = headers
        .get(SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(WebhookError::Unauthorized)?;
    if secret != expected {
        warn!("Buyer sync rejected: webhook secret mismatch");
        return Err(WebhookError::Unauthorized);
    }
    Ok(())
}

/// The stored identity for an ingested purchase: normalized email plus the
/// tier derived from the product title.
fn ingested_identity(payload: &BuyerSyncPayload) -> (String, crate::access::AccessTier) {
    (
        normalize_email(&payload.email),
        classify_product(&payload.product_title),
    )
}

/// Incoming purchase notification.
#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct BuyerSyncPayload {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub product_title: String,
    pub ref_id: Option<String>,
    pub amount: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct BuyerSyncResponse {
    pub buyer: Buyer,
}

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("Missing or invalid webhook secret")]
    Unauthorized,
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
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

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "WEBHOOK_UNAUTHORIZED"),
            Self::InvalidPayload(_) => (StatusCode::BAD_REQUEST, "INVALID_PAYLOAD"),
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

/// Ingest a purchase pushed by an external automation.
#[utoipa::path(
    post,
    path = "/webhook/buyer-sync",
    tag = "webhook",
    request_body = BuyerSyncPayload,
    responses(
        (status = 200, description = "Buyer upserted", body = BuyerSyncResponse),
        (status = 400, description = "Missing required fields"),
        (status = 401, description = "Missing or invalid webhook secret"),
    ),
)]
pub async fn buyer_sync(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<BuyerSyncPayload>,
) -> Result<Json<BuyerSyncResponse>, WebhookError> {
    check_secret(&headers, &state.config.webhook_secret)?;

    payload
        .validate()
        .map_err(|e| WebhookError::InvalidPayload(e.to_string()))?;

    let (email, access_type) = ingested_identity(&payload);
    let params = BuyerParams {
        email: &email,
        name: payload.name.trim(),
        product_title: payload.product_title.trim(),
        access_type,
        amount: payload.amount.as_deref(),
        ref_id: payload.ref_id.as_deref(),
        purchased_at: None,
    };

    let row = upsert_buyer(&state.db, &params).await?;
    info!(email = %email, tier = %access_type, "Buyer synced from webhook");

    let buyer = Buyer::try_from(row).map_err(|e| match e {
        BuyersError::CorruptTier(tier) => WebhookError::CorruptTier(tier),
        other => WebhookError::InvalidPayload(other.to_string()),
    })?;
    Ok(Json(BuyerSyncResponse { buyer }))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use crate::access::AccessTier;

    use super::*;

    fn headers_with_secret(secret: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            SECRET_HEADER,
            HeaderValue::from_str(secret).unwrap(),
        );
        headers
    }

    fn payload(email: &str, product_title: &str) -> BuyerSyncPayload {
        BuyerSyncPayload {
            name: "Budi".to_string(),
            email: email.to_string(),
            product_title: product_title.to_string(),
            ref_id: None,
            amount: None,
        }
    }

    #[test]
    fn missing_secret_header_is_unauthorized() {
        let result = check_secret(&HeaderMap::new(), "hush");
        assert!(matches!(result, Err(WebhookError::Unauthorized)));
    }

    #[test]
    fn mismatched_secret_is_unauthorized() {
        let result = check_secret(&headers_with_secret("wrong"), "hush");
        assert!(matches!(result, Err(WebhookError::Unauthorized)));
    }

    #[test]
    fn matching_secret_passes() {
        assert!(check_secret(&headers_with_secret("hush"), "hush").is_ok());
    }

    #[test]
    fn ingest_normalizes_email_and_classifies_title() {
        let (email, tier) = ingested_identity(&payload(" X@Y.com ", "Tools PRO Upgrade"));
        assert_eq!(email, "x@y.com");
        assert_eq!(tier, AccessTier::Pro);
    }

    #[test]
    fn ingest_defaults_unmatched_title_to_basic() {
        let (_, tier) = ingested_identity(&payload("a@b.com", "Kelas Dasar"));
        assert_eq!(tier, AccessTier::Basic);
    }
}
