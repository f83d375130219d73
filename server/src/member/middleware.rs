//! Member identity middleware.
//!
//! Resolves the cookie-held session pair into a `MemberIdentity` request
//! extension so catalog and announcement handlers can make authorization
//! decisions without touching cookies themselves.

use std::sync::{Arc, Mutex};

use axum::extract::{Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Duration, Utc};

use crate::access::AccessTier;
use crate::api::AppState;

use super::directory::PgBuyerDirectory;
use super::session::{PersistedSession, SessionState, SessionStorage, SessionStore};

/// Cookie holding the normalized purchase email.
pub const EMAIL_COOKIE: &str = "member_email";
/// Cookie holding the session establishment time, unix milliseconds.
pub const TS_COOKIE: &str = "member_ts";

/// Resolved member identity injected into request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberIdentity {
    Anonymous,
    Member { email: String, tier: AccessTier },
}

impl MemberIdentity {
    /// The tier to evaluate resource access against, if any.
    #[must_use]
    pub const fn tier(&self) -> Option<AccessTier> {
        match self {
            Self::Anonymous => None,
            Self::Member { tier, .. } => Some(*tier),
        }
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::Member { email, .. } => Some(email),
        }
    }
}

impl<S> axum::extract::FromRequestParts<S> for MemberIdentity
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Fail closed: no middleware pass means anonymous
        Ok(parts
            .extensions
            .get::<Self>()
            .cloned()
            .unwrap_or(Self::Anonymous))
    }
}

/// Pending mutation recorded by the storage adapter during a request.
#[derive(Debug, Clone)]
enum Change {
    Persisted(PersistedSession),
    Cleared,
}

/// Session storage adapter over the request's cookie pair.
///
/// Reads come from the incoming jar; writes are recorded and applied to the
/// response afterwards, so the pair always travels together.
pub struct CookieSessionStorage {
    initial: Option<PersistedSession>,
    change: Mutex<Option<Change>>,
}

impl CookieSessionStorage {
    #[must_use]
    pub fn from_jar(jar: &CookieJar) -> Self {
        let email = jar.get(EMAIL_COOKIE).map(|c| c.value().to_string());
        let established_at = jar
            .get(TS_COOKIE)
            .and_then(|c| c.value().parse::<i64>().ok())
            .and_then(DateTime::<Utc>::from_timestamp_millis);

        // A half-present pair reads as absent
        let initial = match (email, established_at) {
            (Some(email), Some(established_at)) => Some(PersistedSession {
                email,
                established_at,
            }),
            _ => None,
        };

        Self {
            initial,
            change: Mutex::new(None),
        }
    }

    /// Apply any recorded mutation to the jar for the response.
    #[must_use]
    pub fn apply_to(&self, jar: CookieJar, lifetime: Duration) -> CookieJar {
        let change = self.change.lock().expect("cookie storage poisoned").clone();
        match change {
            None => jar,
            Some(Change::Cleared) => jar
                .remove(removal_cookie(EMAIL_COOKIE))
                .remove(removal_cookie(TS_COOKIE)),
            Some(Change::Persisted(session)) => {
                let max_age = time::Duration::seconds(lifetime.num_seconds());
                jar.add(session_cookie(EMAIL_COOKIE, session.email.clone(), max_age))
                    .add(session_cookie(
                        TS_COOKIE,
                        session.established_at.timestamp_millis().to_string(),
                        max_age,
                    ))
            }
        }
    }
}

fn session_cookie(name: &'static str, value: String, max_age: time::Duration) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(max_age)
        .build()
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, "")).path("/").build()
}

impl SessionStorage for CookieSessionStorage {
    fn read(&self) -> Option<PersistedSession> {
        match &*self.change.lock().expect("cookie storage poisoned") {
            Some(Change::Persisted(session)) => Some(session.clone()),
            Some(Change::Cleared) => None,
            None => self.initial.clone(),
        }
    }

    fn persist(&self, session: &PersistedSession) {
        *self.change.lock().expect("cookie storage poisoned") =
            Some(Change::Persisted(session.clone()));
    }

    fn clear(&self) {
        *self.change.lock().expect("cookie storage poisoned") = Some(Change::Cleared);
    }
}

/// Build the session store for one request.
pub(super) fn request_store(state: &AppState, storage: Arc<CookieSessionStorage>) -> SessionStore {
    SessionStore::new(
        storage,
        Arc::new(PgBuyerDirectory::new(state.db.clone())),
        Duration::days(state.config.session_days),
    )
}

/// Middleware resolving the member identity for gated content routes.
///
/// Always injects an identity (anonymous on any failure). An expired pair is
/// cleared on the response without a buyer lookup.
pub async fn resolve_member(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let storage = Arc::new(CookieSessionStorage::from_jar(&jar));
    let store = request_store(&state, storage.clone());

    let identity = match store.restore().await {
        SessionState::Anonymous => MemberIdentity::Anonymous,
        SessionState::Authenticated { email, tier } => MemberIdentity::Member { email, tier },
    };
    request.extensions_mut().insert(identity);

    let response = next.run(request).await;
    let jar = storage.apply_to(jar, Duration::days(state.config.session_days));
    (jar, response).into_response()
}
