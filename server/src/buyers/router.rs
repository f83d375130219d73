//! Router configuration for buyer administration.

use axum::routing::{delete, get, post, put};
use axum::Router;

use super::handlers;
use crate::api::AppState;

/// Router for buyer admin endpoints (mounted at `/api/admin/buyers`).
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_buyers))
        .route("/", post(handlers::create_buyer))
        .route("/export", get(handlers::export_buyers))
        .route("/import", post(handlers::import_buyers))
        .route("/{id}", get(handlers::get_buyer))
        .route("/{id}", put(handlers::update_buyer))
        .route("/{id}", delete(handlers::delete_buyer))
}
