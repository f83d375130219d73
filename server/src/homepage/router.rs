//! Router configuration for the dynamic homepage.

use axum::routing::{delete, get, post, put};
use axum::Router;

use super::handlers;
use crate::api::AppState;

/// Public route (mounted at `/api`).
pub fn public_router() -> Router<AppState> {
    Router::new().route("/homepage", get(handlers::get_homepage))
}

/// Admin routes (mounted at `/api/admin/homepage`).
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/sections", get(handlers::list_sections))
        .route("/sections", post(handlers::create_section))
        .route("/sections/reorder", post(handlers::reorder_sections))
        .route("/sections/{id}", put(handlers::update_section))
        .route("/sections/{id}", delete(handlers::delete_section))
        .route(
            "/sections/{section_id}/elements",
            get(handlers::list_elements),
        )
        .route(
            "/sections/{section_id}/elements",
            post(handlers::create_element),
        )
        .route(
            "/sections/{section_id}/elements/reorder",
            post(handlers::reorder_elements),
        )
        .route("/elements/{id}", get(handlers::get_element))
        .route("/elements/{id}", put(handlers::update_element))
        .route("/elements/{id}", delete(handlers::delete_element))
}
