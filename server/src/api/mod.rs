//! API Router and Application State
//!
//! Central routing configuration and shared state.

mod admin;

pub use admin::{require_admin, AdminAuthError};

use std::sync::Arc;

use axum::extract::State;
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use sqlx::PgPool;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::{announcements, buyers, catalog, enrollments, homepage, member, webhook};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,
    /// Server configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    // Public catalog, homepage and announcement routes resolve the member
    // identity from the session cookie pair; the member session router
    // manages that pair itself and must not be wrapped.
    let content_routes = Router::new()
        .merge(catalog::public_router())
        .merge(homepage::public_router())
        .nest("/announcements", announcements::member_router())
        .nest("/enrollments", enrollments::member_router())
        .layer(from_fn_with_state(state.clone(), member::resolve_member));

    let admin_routes = Router::new()
        .merge(catalog::admin_router())
        .nest("/buyers", buyers::admin_router())
        .nest("/homepage", homepage::admin_router())
        .nest("/announcements", announcements::admin_router())
        .layer(from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/member", member::router())
        .nest("/api", content_routes)
        .nest("/api/admin", admin_routes)
        .route("/webhook/buyer-sync", axum::routing::post(webhook::buyer_sync))
        .merge(api_docs())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// CORS policy: locked to the configured frontend origin (with credentials,
/// since member sessions ride on cookies), or permissive when none is set.
fn cors_layer(config: &Config) -> CorsLayer {
    match config.cors_origin.as_deref() {
        Some(origin) => match origin.parse::<HeaderValue>() {
            Ok(origin) => CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT])
                .allow_credentials(true),
            Err(_) => {
                warn!(origin, "CORS_ORIGIN is not a valid header value; allowing any origin");
                permissive_cors()
            }
        },
        None => permissive_cors(),
    }
}

fn permissive_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    /// Service status
    status: &'static str,
}

/// Health check endpoint.
async fn health_check(State(_state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(OpenApi)]
#[openapi(
    paths(
        member::handlers::login,
        member::handlers::logout,
        member::handlers::current_session,
        member::handlers::update_profile,
        catalog::handlers::list_published_courses,
        catalog::handlers::get_published_course,
        catalog::handlers::get_module_with_materials,
        catalog::handlers::list_courses,
        catalog::handlers::create_course,
        catalog::handlers::update_course,
        catalog::handlers::delete_course,
        catalog::handlers::reorder_courses,
        catalog::handlers::list_modules,
        catalog::handlers::create_module,
        catalog::handlers::update_module,
        catalog::handlers::delete_module,
        catalog::handlers::reorder_modules,
        catalog::handlers::list_materials,
        catalog::handlers::create_material,
        catalog::handlers::get_material,
        catalog::handlers::update_material,
        catalog::handlers::delete_material,
        catalog::handlers::reorder_materials,
        homepage::handlers::get_homepage,
        homepage::handlers::list_sections,
        homepage::handlers::create_section,
        homepage::handlers::update_section,
        homepage::handlers::delete_section,
        homepage::handlers::reorder_sections,
        homepage::handlers::list_elements,
        homepage::handlers::create_element,
        homepage::handlers::get_element,
        homepage::handlers::update_element,
        homepage::handlers::delete_element,
        homepage::handlers::reorder_elements,
        buyers::handlers::list_buyers,
        buyers::handlers::get_buyer,
        buyers::handlers::create_buyer,
        buyers::handlers::update_buyer,
        buyers::handlers::delete_buyer,
        buyers::handlers::export_buyers,
        buyers::handlers::import_buyers,
        announcements::list_published_announcements,
        announcements::unread_count,
        announcements::mark_read,
        announcements::list_announcements,
        announcements::create_announcement,
        announcements::update_announcement,
        announcements::delete_announcement,
        enrollments::list_my_courses,
        enrollments::enroll,
        enrollments::unenroll,
        webhook::buyer_sync,
    ),
    tags(
        (name = "member", description = "Member sessions"),
        (name = "enrollments", description = "Member course enrollments"),
        (name = "catalog", description = "Courses, modules and materials"),
        (name = "homepage", description = "Dynamic homepage sections"),
        (name = "buyers", description = "Buyer administration"),
        (name = "announcements", description = "Member announcements"),
        (name = "webhook", description = "External ingestion"),
    )
)]
struct ApiDoc;

/// API documentation routes.
fn api_docs() -> Router<AppState> {
    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
