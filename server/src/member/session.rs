//! Member session state machine.
//!
//! Three states: unknown (fresh load, before `restore` runs), anonymous, and
//! authenticated. The persisted pair is only an email and a timestamp; the
//! access tier is never persisted and is re-derived from the buyer store on
//! every restore, so a tier change lands on the next fresh load.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use validator::ValidateEmail;

use crate::access::AccessTier;

use super::error::MemberError;

/// The client-held session pair. Both fields persist together or not at all;
/// a half-present pair must be read back as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSession {
    pub email: String,
    pub established_at: DateTime<Utc>,
}

/// Durable key-value storage for the session pair (cookies in production,
/// in-memory in tests).
pub trait SessionStorage: Send + Sync {
    fn read(&self) -> Option<PersistedSession>;
    fn persist(&self, session: &PersistedSession);
    fn clear(&self);
}

/// The slice of a buyer record the session layer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyerAccess {
    pub email: String,
    pub tier: AccessTier,
}

/// Backend lookup failure. Always treated as transient by the session layer.
#[derive(Debug, Error)]
#[error("Buyer directory unavailable: {0}")]
pub struct DirectoryError(pub String);

/// Authoritative buyer lookup, keyed by normalized email.
#[async_trait]
pub trait BuyerDirectory: Send + Sync {
    async fn lookup_by_email(&self, email: &str) -> Result<Option<BuyerAccess>, DirectoryError>;
}

/// Time source, injectable so expiry is testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Resolved session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticated { email: String, tier: AccessTier },
}

/// Normalize an email for use as the identity key.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// The session state machine.
///
/// Owns no ambient state: storage, buyer lookup and clock are all injected,
/// and each client session gets its own instance.
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    directory: Arc<dyn BuyerDirectory>,
    clock: Arc<dyn Clock>,
    lifetime: Duration,
    /// Bumped by `logout`. A restore or login that was in flight when the
    /// logout happened observes the bump and discards its result instead of
    /// resurrecting the session.
    epoch: AtomicU64,
}

impl SessionStore {
    pub fn new(
        storage: Arc<dyn SessionStorage>,
        directory: Arc<dyn BuyerDirectory>,
        lifetime: Duration,
    ) -> Self {
        Self::with_clock(storage, directory, lifetime, Arc::new(SystemClock))
    }

    pub fn with_clock(
        storage: Arc<dyn SessionStorage>,
        directory: Arc<dyn BuyerDirectory>,
        lifetime: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            storage,
            directory,
            clock,
            lifetime,
            epoch: AtomicU64::new(0),
        }
    }

    /// Resolve the unknown state on a fresh load.
    ///
    /// An expired pair is cleared without a backend call. A valid pair is
    /// revalidated against the buyer store; a miss clears it, a backend
    /// failure leaves it untouched and resolves anonymous for this pass.
    pub async fn restore(&self) -> SessionState {
        let Some(persisted) = self.storage.read() else {
            return SessionState::Anonymous;
        };

        if self.clock.now() - persisted.established_at >= self.lifetime {
            self.storage.clear();
            return SessionState::Anonymous;
        }

        let epoch = self.epoch.load(Ordering::SeqCst);
        match self.directory.lookup_by_email(&persisted.email).await {
            _ if self.epoch.load(Ordering::SeqCst) != epoch => {
                // A logout raced this revalidation; logout wins.
                SessionState::Anonymous
            }
            Ok(Some(buyer)) => SessionState::Authenticated {
                email: buyer.email,
                tier: buyer.tier,
            },
            Ok(None) => {
                self.storage.clear();
                SessionState::Anonymous
            }
            Err(e) => {
                tracing::warn!("Session revalidation lookup failed: {}", e);
                SessionState::Anonymous
            }
        }
    }

    /// Establish a session from a purchase email.
    pub async fn login(&self, email: &str) -> Result<SessionState, MemberError> {
        let normalized = normalize_email(email);
        if !normalized.validate_email() {
            return Err(MemberError::InvalidEmail);
        }

        let epoch = self.epoch.load(Ordering::SeqCst);
        let buyer = self
            .directory
            .lookup_by_email(&normalized)
            .await
            .map_err(MemberError::Lookup)?
            .ok_or(MemberError::NotFound)?;

        if self.epoch.load(Ordering::SeqCst) != epoch {
            // Logged out while the lookup was in flight; do not persist.
            return Ok(SessionState::Anonymous);
        }

        self.storage.persist(&PersistedSession {
            email: normalized,
            established_at: self.clock.now(),
        });

        Ok(SessionState::Authenticated {
            email: buyer.email,
            tier: buyer.tier,
        })
    }

    /// Clear the session. Unconditional and terminal for this tick.
    pub fn logout(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.storage.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    struct MemoryStorage {
        slot: Mutex<Option<PersistedSession>>,
    }

    impl MemoryStorage {
        fn new(initial: Option<PersistedSession>) -> Arc<Self> {
            Arc::new(Self {
                slot: Mutex::new(initial),
            })
        }
    }

    impl SessionStorage for MemoryStorage {
        fn read(&self) -> Option<PersistedSession> {
            self.slot.lock().unwrap().clone()
        }

        fn persist(&self, session: &PersistedSession) {
            *self.slot.lock().unwrap() = Some(session.clone());
        }

        fn clear(&self) {
            *self.slot.lock().unwrap() = None;
        }
    }

    #[derive(Default)]
    struct FakeDirectory {
        buyers: HashMap<String, AccessTier>,
        fail: bool,
        lookups: AtomicUsize,
    }

    impl FakeDirectory {
        fn with_buyer(email: &str, tier: AccessTier) -> Arc<Self> {
            let mut buyers = HashMap::new();
            buyers.insert(email.to_string(), tier);
            Arc::new(Self {
                buyers,
                ..Self::default()
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                fail: true,
                ..Self::default()
            })
        }
    }

    #[async_trait]
    impl BuyerDirectory for FakeDirectory {
        async fn lookup_by_email(
            &self,
            email: &str,
        ) -> Result<Option<BuyerAccess>, DirectoryError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DirectoryError("backend down".into()));
            }
            Ok(self.buyers.get(email).map(|tier| BuyerAccess {
                email: email.to_string(),
                tier: *tier,
            }))
        }
    }

    struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        fn at(now: DateTime<Utc>) -> Arc<Self> {
            Arc::new(Self {
                now: Mutex::new(now),
            })
        }

        fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }

    fn seven_days() -> Duration {
        Duration::days(7)
    }

    #[tokio::test]
    async fn test_login_normalizes_and_persists_pair() {
        let storage = MemoryStorage::new(None);
        let directory = FakeDirectory::with_buyer("alice@x.com", AccessTier::Pro);
        let clock = ManualClock::at(Utc::now());
        let store = SessionStore::with_clock(
            storage.clone(),
            directory,
            seven_days(),
            clock.clone(),
        );

        let state = store.login("  Alice@X.com ").await.unwrap();

        assert_eq!(
            state,
            SessionState::Authenticated {
                email: "alice@x.com".into(),
                tier: AccessTier::Pro,
            }
        );
        let persisted = storage.read().unwrap();
        assert_eq!(persisted.email, "alice@x.com");
        assert_eq!(persisted.established_at, clock.now());
    }

    #[tokio::test]
    async fn test_login_miss_reports_not_found_and_stays_anonymous() {
        let storage = MemoryStorage::new(None);
        let directory = FakeDirectory::with_buyer("alice@x.com", AccessTier::Basic);
        let store = SessionStore::new(storage.clone(), directory, seven_days());

        let err = store.login("bob@x.com").await.unwrap_err();

        assert!(matches!(err, MemberError::NotFound));
        assert!(storage.read().is_none());
    }

    #[tokio::test]
    async fn test_login_backend_failure_is_transient() {
        let storage = MemoryStorage::new(None);
        let store = SessionStore::new(storage.clone(), FakeDirectory::failing(), seven_days());

        let err = store.login("alice@x.com").await.unwrap_err();

        assert!(matches!(err, MemberError::Lookup(_)));
        assert!(storage.read().is_none());
    }

    #[tokio::test]
    async fn test_login_rejects_malformed_email() {
        let storage = MemoryStorage::new(None);
        let directory = FakeDirectory::with_buyer("alice@x.com", AccessTier::Basic);
        let store = SessionStore::new(storage, directory.clone(), seven_days());

        let err = store.login("not-an-email").await.unwrap_err();

        assert!(matches!(err, MemberError::InvalidEmail));
        // Rejected before any backend call
        assert_eq!(directory.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_restore_revalidates_against_authoritative_store() {
        let now = Utc::now();
        let storage = MemoryStorage::new(Some(PersistedSession {
            email: "alice@x.com".into(),
            established_at: now,
        }));
        // The tier comes from the store, never from anything cached client-side
        let directory = FakeDirectory::with_buyer("alice@x.com", AccessTier::Ebook);
        let clock = ManualClock::at(now);
        let store =
            SessionStore::with_clock(storage, directory, seven_days(), clock);

        let state = store.restore().await;

        assert_eq!(
            state,
            SessionState::Authenticated {
                email: "alice@x.com".into(),
                tier: AccessTier::Ebook,
            }
        );
    }

    #[tokio::test]
    async fn test_restore_expired_clears_without_backend_call() {
        let now = Utc::now();
        let storage = MemoryStorage::new(Some(PersistedSession {
            email: "alice@x.com".into(),
            established_at: now,
        }));
        let directory = FakeDirectory::with_buyer("alice@x.com", AccessTier::Basic);
        let clock = ManualClock::at(now);
        let store = SessionStore::with_clock(
            storage.clone(),
            directory.clone(),
            seven_days(),
            clock.clone(),
        );

        clock.advance(seven_days() + Duration::milliseconds(1));
        let state = store.restore().await;

        assert_eq!(state, SessionState::Anonymous);
        assert!(storage.read().is_none());
        assert_eq!(directory.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_restore_just_inside_window_still_valid() {
        let now = Utc::now();
        let storage = MemoryStorage::new(Some(PersistedSession {
            email: "alice@x.com".into(),
            established_at: now,
        }));
        let directory = FakeDirectory::with_buyer("alice@x.com", AccessTier::Basic);
        let clock = ManualClock::at(now);
        let store = SessionStore::with_clock(storage, directory, seven_days(), clock.clone());

        clock.advance(seven_days() - Duration::milliseconds(1));
        let state = store.restore().await;

        assert!(matches!(state, SessionState::Authenticated { .. }));
    }

    #[tokio::test]
    async fn test_restore_backend_failure_leaves_pair_intact() {
        let now = Utc::now();
        let storage = MemoryStorage::new(Some(PersistedSession {
            email: "alice@x.com".into(),
            established_at: now,
        }));
        let clock = ManualClock::at(now);
        let store = SessionStore::with_clock(
            storage.clone(),
            FakeDirectory::failing(),
            seven_days(),
            clock,
        );

        let state = store.restore().await;

        // Anonymous for this pass, but the pair survives for a retry
        assert_eq!(state, SessionState::Anonymous);
        assert!(storage.read().is_some());
    }

    #[tokio::test]
    async fn test_restore_miss_clears_pair() {
        let now = Utc::now();
        let storage = MemoryStorage::new(Some(PersistedSession {
            email: "gone@x.com".into(),
            established_at: now,
        }));
        let directory = FakeDirectory::with_buyer("alice@x.com", AccessTier::Basic);
        let clock = ManualClock::at(now);
        let store =
            SessionStore::with_clock(storage.clone(), directory, seven_days(), clock);

        let state = store.restore().await;

        assert_eq!(state, SessionState::Anonymous);
        assert!(storage.read().is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_storage() {
        let storage = MemoryStorage::new(Some(PersistedSession {
            email: "alice@x.com".into(),
            established_at: Utc::now(),
        }));
        let directory = FakeDirectory::with_buyer("alice@x.com", AccessTier::Basic);
        let store = SessionStore::new(storage.clone(), directory, seven_days());

        store.logout();

        assert!(storage.read().is_none());
    }

    /// Directory that blocks until released, so a logout can be interleaved
    /// mid-lookup.
    struct GatedDirectory {
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl BuyerDirectory for GatedDirectory {
        async fn lookup_by_email(
            &self,
            email: &str,
        ) -> Result<Option<BuyerAccess>, DirectoryError> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(Some(BuyerAccess {
                email: email.to_string(),
                tier: AccessTier::Pro,
            }))
        }
    }

    #[tokio::test]
    async fn test_logout_wins_over_in_flight_revalidation() {
        let now = Utc::now();
        let storage = MemoryStorage::new(Some(PersistedSession {
            email: "alice@x.com".into(),
            established_at: now,
        }));
        let directory = Arc::new(GatedDirectory {
            started: Notify::new(),
            release: Notify::new(),
        });
        let clock = ManualClock::at(now);
        let store = Arc::new(SessionStore::with_clock(
            storage.clone(),
            directory.clone(),
            seven_days(),
            clock,
        ));

        let restoring = tokio::spawn({
            let store = store.clone();
            async move { store.restore().await }
        });

        directory.started.notified().await;
        store.logout();
        directory.release.notify_one();

        let state = restoring.await.unwrap();
        assert_eq!(state, SessionState::Anonymous);
        assert!(storage.read().is_none());
    }
}
