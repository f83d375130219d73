//! Member access module.
//!
//! Members authenticate with the email they purchased under; there is no
//! password at this layer. The session is a `{email, established_at}` pair
//! held by the client as a cookie pair and revalidated against the buyer
//! store, with the access tier always re-derived from the authoritative
//! record rather than trusted from the client.

mod directory;
mod error;
pub(crate) mod handlers;
mod middleware;
mod session;

use axum::routing::{get, post, put};
use axum::Router;

use crate::api::AppState;

pub use directory::PgBuyerDirectory;
pub use error::MemberError;
pub use middleware::{resolve_member, CookieSessionStorage, MemberIdentity};
pub use session::{
    normalize_email, BuyerAccess, BuyerDirectory, Clock, DirectoryError, PersistedSession,
    SessionState, SessionStorage, SessionStore, SystemClock,
};

/// Member session router (mounted at /api/member).
///
/// - POST /login - establish a session from a purchase email
/// - POST /logout - clear the session
/// - GET /session - current session state
/// - PUT /profile - update the signed-in member's display name
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/session", get(handlers::current_session))
        .route("/profile", put(handlers::update_profile))
}
