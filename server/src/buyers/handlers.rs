//! Admin API handlers for buyer records.

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::Json;
use serde::Deserialize;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::api::AppState;
use crate::buyers::csv::{buyers_to_csv, parse_buyers_csv, RowError};
use crate::buyers::{queries, Buyer, BuyerParams, BuyersError, CreateBuyerRequest, ImportReport, UpdateBuyerRequest};
use crate::member::normalize_email;

type BuyersResult<T> = Result<T, BuyersError>;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListBuyersQuery {
    /// Substring match against email or name.
    pub search: Option<String>,
}

/// List buyers, newest purchase first.
#[utoipa::path(
    get,
    path = "/api/admin/buyers",
    tag = "buyers",
    params(ListBuyersQuery),
    responses(
        (status = 200, description = "List of buyers", body = Vec<Buyer>),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn list_buyers(
    State(state): State<AppState>,
    Query(query): Query<ListBuyersQuery>,
) -> BuyersResult<Json<Vec<Buyer>>> {
    let rows = queries::list_buyers(&state.db, query.search.as_deref()).await?;
    let buyers = rows
        .into_iter()
        .map(Buyer::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(buyers))
}

/// Get a single buyer by id.
#[utoipa::path(
    get,
    path = "/api/admin/buyers/{id}",
    tag = "buyers",
    params(("id" = Uuid, Path, description = "Buyer id")),
    responses(
        (status = 200, description = "Buyer", body = Buyer),
        (status = 404, description = "Buyer not found"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn get_buyer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> BuyersResult<Json<Buyer>> {
    let row = queries::get_buyer(&state.db, id)
        .await?
        .ok_or(BuyersError::NotFound)?;
    Ok(Json(Buyer::try_from(row)?))
}

/// Create a buyer by hand. The tier is named explicitly; no product
/// classification runs here.
#[utoipa::path(
    post,
    path = "/api/admin/buyers",
    tag = "buyers",
    request_body = CreateBuyerRequest,
    responses(
        (status = 201, description = "Buyer created", body = Buyer),
        (status = 409, description = "Email already registered"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn create_buyer(
    State(state): State<AppState>,
    Json(request): Json<CreateBuyerRequest>,
) -> BuyersResult<(StatusCode, Json<Buyer>)> {
    request
        .validate()
        .map_err(|e| BuyersError::Validation(e.to_string()))?;

    let email = normalize_email(&request.email);
    let params = BuyerParams {
        email: &email,
        name: request.name.trim(),
        product_title: request.product_title.trim(),
        access_type: request.access_type,
        amount: request.amount.as_deref(),
        ref_id: request.ref_id.as_deref(),
        purchased_at: request.purchased_at,
    };

    let row = queries::create_buyer(&state.db, &params)
        .await
        .map_err(|e| {
            if queries::is_unique_violation(&e) {
                BuyersError::EmailTaken
            } else {
                BuyersError::Database(e)
            }
        })?;

    info!(email = %email, "Created buyer");
    Ok((StatusCode::CREATED, Json(Buyer::try_from(row)?)))
}

/// Update a buyer. Absent fields are left unchanged.
#[utoipa::path(
    put,
    path = "/api/admin/buyers/{id}",
    tag = "buyers",
    params(("id" = Uuid, Path, description = "Buyer id")),
    request_body = UpdateBuyerRequest,
    responses(
        (status = 200, description = "Buyer updated", body = Buyer),
        (status = 404, description = "Buyer not found"),
        (status = 409, description = "Email already registered"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn update_buyer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBuyerRequest>,
) -> BuyersResult<Json<Buyer>> {
    request
        .validate()
        .map_err(|e| BuyersError::Validation(e.to_string()))?;

    let email = request.email.as_deref().map(normalize_email);
    let row = queries::update_buyer(
        &state.db,
        id,
        email.as_deref(),
        request.name.as_deref(),
        request.product_title.as_deref(),
        request.access_type,
        request.amount.as_deref(),
        request.ref_id.as_deref(),
        request.purchased_at,
    )
    .await
    .map_err(|e| {
        if queries::is_unique_violation(&e) {
            BuyersError::EmailTaken
        } else {
            BuyersError::Database(e)
        }
    })?
    .ok_or(BuyersError::NotFound)?;

    Ok(Json(Buyer::try_from(row)?))
}

/// Delete a buyer.
#[utoipa::path(
    delete,
    path = "/api/admin/buyers/{id}",
    tag = "buyers",
    params(("id" = Uuid, Path, description = "Buyer id")),
    responses(
        (status = 204, description = "Buyer deleted"),
        (status = 404, description = "Buyer not found"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn delete_buyer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> BuyersResult<StatusCode> {
    let removed = queries::delete_buyer(&state.db, id).await?;
    if !removed {
        return Err(BuyersError::NotFound);
    }
    info!(buyer_id = %id, "Deleted buyer");
    Ok(StatusCode::NO_CONTENT)
}

/// Export all buyers as a CSV download.
#[utoipa::path(
    get,
    path = "/api/admin/buyers/export",
    tag = "buyers",
    responses(
        (status = 200, description = "CSV file of all buyers", content_type = "text/csv"),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn export_buyers(State(state): State<AppState>) -> BuyersResult<(HeaderMap, String)> {
    let rows = queries::list_buyers(&state.db, None).await?;
    let buyers = rows
        .into_iter()
        .map(Buyer::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=\"buyers.csv\""),
    );
    Ok((headers, buyers_to_csv(&buyers)))
}

/// Import buyers from an uploaded CSV body.
///
/// Rows are upserted keyed on email, so re-importing an export refreshes
/// records instead of failing on duplicates. Bad rows are reported by file
/// line number; the rest of the file still imports.
#[utoipa::path(
    post,
    path = "/api/admin/buyers/import",
    tag = "buyers",
    request_body(content = String, content_type = "text/csv"),
    responses(
        (status = 200, description = "Import report", body = ImportReport),
    ),
    security(("bearer_auth" = [])),
)]
pub async fn import_buyers(
    State(state): State<AppState>,
    body: String,
) -> BuyersResult<Json<ImportReport>> {
    let outcome = parse_buyers_csv(&body);
    let mut errors = outcome.errors;
    let mut imported = 0usize;

    for row in &outcome.rows {
        let params = BuyerParams {
            email: &row.buyer.email,
            name: &row.buyer.name,
            product_title: &row.buyer.product_title,
            access_type: row.buyer.access_type,
            amount: row.buyer.amount.as_deref(),
            ref_id: row.buyer.ref_id.as_deref(),
            purchased_at: row.buyer.purchased_at,
        };
        match queries::upsert_buyer(&state.db, &params).await {
            Ok(_) => imported += 1,
            Err(e) => {
                error!(line = row.line, email = %row.buyer.email, "Failed to import buyer row: {e}");
                errors.push(RowError {
                    row: row.line,
                    message: format!("Database error: {e}"),
                });
            }
        }
    }

    if !errors.is_empty() {
        warn!(
            imported,
            rejected = errors.len(),
            "CSV import finished with rejected rows"
        );
    } else {
        info!(imported, "CSV import finished");
    }

    Ok(Json(ImportReport { imported, errors }))
}
