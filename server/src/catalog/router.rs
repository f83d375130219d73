//! Router configuration for the course catalog.

use axum::routing::{delete, get, post, put};
use axum::Router;

use super::handlers;
use crate::api::AppState;

/// Public/member routes (mounted at `/api`). The member identity middleware
/// is layered in by the caller.
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/courses", get(handlers::list_published_courses))
        .route("/courses/{id}", get(handlers::get_published_course))
        .route("/modules/{id}", get(handlers::get_module_with_materials))
}

/// Admin routes (mounted at `/api/admin`).
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/courses", get(handlers::list_courses))
        .route("/courses", post(handlers::create_course))
        .route("/courses/reorder", post(handlers::reorder_courses))
        .route("/courses/{id}", put(handlers::update_course))
        .route("/courses/{id}", delete(handlers::delete_course))
        .route("/courses/{course_id}/modules", get(handlers::list_modules))
        .route("/courses/{course_id}/modules", post(handlers::create_module))
        .route(
            "/courses/{course_id}/modules/reorder",
            post(handlers::reorder_modules),
        )
        .route("/modules/{id}", put(handlers::update_module))
        .route("/modules/{id}", delete(handlers::delete_module))
        .route(
            "/modules/{module_id}/materials",
            get(handlers::list_materials),
        )
        .route(
            "/modules/{module_id}/materials",
            post(handlers::create_material),
        )
        .route(
            "/modules/{module_id}/materials/reorder",
            post(handlers::reorder_materials),
        )
        .route("/materials/{id}", get(handlers::get_material))
        .route("/materials/{id}", put(handlers::update_material))
        .route("/materials/{id}", delete(handlers::delete_material))
}
