//! Session state: stored credentials, the in-flight refresh, and the
//! unauthorized callback.

use crate::storage::{StorageError, TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use alphadesk_core::{ClientError, TokenPair};
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Hook invoked when credentials are found to be permanently invalid.
pub type UnauthorizedCallback = Arc<dyn Fn() + Send + Sync>;

type RefreshFuture = Shared<BoxFuture<'static, bool>>;

/// Exchanges a refresh token for a new credential pair.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Call the refresh endpoint.
    ///
    /// Any error, network or HTTP, means the refresh failed.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ClientError>;
}

/// Session state shared by every request.
///
/// Cloning is cheap and every clone observes the same credentials, the same
/// in-flight refresh, and the same callback slot. Build one per application
/// and hand clones to whoever needs them.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn TokenStore>,
    in_flight: Mutex<Option<RefreshFuture>>,
    on_unauthorized: RwLock<Option<UnauthorizedCallback>>,
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("store", &self.inner.store)
            .field("refreshing", &self.is_refreshing())
            .field("has_callback", &self.inner.on_unauthorized.read().is_some())
            .finish()
    }
}

impl SessionManager {
    /// Create a session over the given store.
    pub fn new(store: impl TokenStore + 'static) -> Self {
        Self::with_store(Arc::new(store))
    }

    /// Create a session over a shared store.
    pub fn with_store(store: Arc<dyn TokenStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                in_flight: Mutex::new(None),
                on_unauthorized: RwLock::new(None),
            }),
        }
    }

    /// Create a session backed by a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(crate::storage::MemoryTokenStore::new())
    }

    /// Current access token.
    pub fn access_token(&self) -> Option<String> {
        self.inner.access_token()
    }

    /// Current refresh token.
    pub fn refresh_token(&self) -> Option<String> {
        self.inner.refresh_token()
    }

    /// Whether either credential is stored.
    pub fn has_credentials(&self) -> bool {
        self.access_token().is_some() || self.refresh_token().is_some()
    }

    /// Replace both credentials.
    pub fn set_tokens(&self, tokens: &TokenPair) {
        self.inner.set_tokens(tokens);
    }

    /// Replace only the access token.
    ///
    /// Used when login returns no refresh token; the existing refresh token,
    /// if any, is kept.
    pub fn set_access_token(&self, token: &str) {
        log_storage(self.inner.store.set(ACCESS_TOKEN_KEY, token));
    }

    /// Delete both credentials.
    pub fn clear_tokens(&self) {
        self.inner.clear_tokens();
    }

    /// Install or clear the unauthorized callback. The last call wins.
    pub fn set_on_unauthorized(&self, callback: Option<UnauthorizedCallback>) {
        *self.inner.on_unauthorized.write() = callback;
    }

    /// Install the unauthorized callback from a closure.
    pub fn on_unauthorized<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.set_on_unauthorized(Some(Arc::new(callback)));
    }

    /// Purge credentials and fire the unauthorized callback.
    pub fn expire(&self) {
        self.inner.expire();
    }

    /// Whether a refresh is in flight.
    pub fn is_refreshing(&self) -> bool {
        self.inner.in_flight.lock().is_some()
    }

    /// Refresh the credentials, joining the in-flight refresh if there is one.
    ///
    /// Only one call to `refresher` is made no matter how many callers
    /// arrive while it is pending; they all receive its outcome. The refresh
    /// runs on its own task, so it settles even when every caller stops
    /// waiting. The marker is cleared as soon as it settles, and the next
    /// call after that starts a new refresh.
    ///
    /// Returns `false` when no refresh token is stored or the refresher
    /// fails. In that case the session has already been expired, exactly once
    /// for the whole group of waiting callers. If new credentials were stored
    /// while the refresh was pending, they are left untouched and the call
    /// returns `true`.
    ///
    /// Must be called inside a tokio runtime.
    pub async fn refresh(&self, refresher: Arc<dyn TokenRefresher>) -> bool {
        let pending = {
            let mut slot = self.inner.in_flight.lock();
            match slot.as_ref() {
                Some(pending) => {
                    debug!("Joining in-flight token refresh");
                    pending.clone()
                }
                None => {
                    let inner = Arc::clone(&self.inner);
                    // the task cannot clear the slot before it is filled: we hold the lock
                    let task = tokio::spawn(async move {
                        let outcome = inner.run_refresh(refresher.as_ref()).await;
                        inner.in_flight.lock().take();
                        match outcome {
                            RefreshOutcome::Refreshed => true,
                            RefreshOutcome::Superseded => {
                                debug!("Credentials replaced during refresh, keeping them");
                                true
                            }
                            RefreshOutcome::Failed => {
                                inner.expire();
                                false
                            }
                        }
                    });
                    let pending = task
                        .map(|joined| {
                            joined.unwrap_or_else(|error| {
                                warn!(error = %error, "Token refresh task failed");
                                false
                            })
                        })
                        .boxed()
                        .shared();
                    *slot = Some(pending.clone());
                    pending
                }
            }
        };

        pending.await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefreshOutcome {
    Refreshed,
    Failed,
    /// Someone stored a different refresh token while the request was out.
    Superseded,
}

impl Inner {
    fn access_token(&self) -> Option<String> {
        self.store.get(ACCESS_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    fn refresh_token(&self) -> Option<String> {
        self.store.get(REFRESH_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    fn set_tokens(&self, tokens: &TokenPair) {
        log_storage(self.store.set(ACCESS_TOKEN_KEY, &tokens.access_token));
        log_storage(self.store.set(REFRESH_TOKEN_KEY, &tokens.refresh_token));
    }

    fn clear_tokens(&self) {
        log_storage(self.store.remove(ACCESS_TOKEN_KEY));
        log_storage(self.store.remove(REFRESH_TOKEN_KEY));
    }

    fn expire(&self) {
        info!("Session expired, clearing credentials");
        self.clear_tokens();
        // clone out so the callback may re-enter the session
        let callback = self.on_unauthorized.read().clone();
        if let Some(callback) = callback {
            callback();
        }
    }

    async fn run_refresh(&self, refresher: &dyn TokenRefresher) -> RefreshOutcome {
        let Some(refresh_token) = self.refresh_token() else {
            debug!("No refresh token stored, cannot refresh");
            return RefreshOutcome::Failed;
        };

        info!("Refreshing access token");
        let result = refresher.refresh(&refresh_token).await;
        match self.refresh_token() {
            Some(current) if current != refresh_token => return RefreshOutcome::Superseded,
            None => return RefreshOutcome::Failed,
            Some(_) => {}
        }

        match result {
            Ok(tokens) => {
                self.set_tokens(&tokens);
                debug!("Access token refreshed");
                RefreshOutcome::Refreshed
            }
            Err(error) => {
                warn!(error = %error, "Token refresh failed");
                RefreshOutcome::Failed
            }
        }
    }
}

fn log_storage(result: Result<(), StorageError>) {
    if let Err(error) = result {
        warn!(error = %error, "Credential storage failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    struct CountingRefresher {
        calls: AtomicU32,
        delay: Duration,
        succeed: bool,
    }

    impl CountingRefresher {
        fn new(succeed: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                delay: Duration::from_millis(20),
                succeed,
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenRefresher for CountingRefresher {
        async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ClientError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::time::sleep(self.delay).await;
            if self.succeed {
                Ok(TokenPair::new(
                    format!("access-{n}"),
                    format!("{refresh_token}-rotated"),
                ))
            } else {
                Err(ClientError::api(500, "refresh rejected"))
            }
        }
    }

    fn logged_in() -> SessionManager {
        let session = SessionManager::in_memory();
        session.set_tokens(&TokenPair::new("stale", "r0"));
        session
    }

    fn counting_callback(session: &SessionManager) -> Arc<AtomicU32> {
        let fired = Arc::new(AtomicU32::new(0));
        let counter = fired.clone();
        session.on_unauthorized(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        fired
    }

    #[test]
    fn test_token_accessors() {
        let session = SessionManager::in_memory();
        assert!(!session.has_credentials());

        session.set_access_token("a1");
        assert_eq!(session.access_token().as_deref(), Some("a1"));
        assert!(session.refresh_token().is_none());
        assert!(session.has_credentials());

        session.set_tokens(&TokenPair::new("a2", "r2"));
        assert_eq!(session.access_token().as_deref(), Some("a2"));
        assert_eq!(session.refresh_token().as_deref(), Some("r2"));

        session.clear_tokens();
        assert!(!session.has_credentials());
    }

    #[test]
    fn test_clones_share_state() {
        let session = SessionManager::in_memory();
        let other = session.clone();
        session.set_tokens(&TokenPair::new("a", "r"));
        assert_eq!(other.access_token().as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_concurrent_refresh_is_single_flight() {
        let session = logged_in();
        let refresher = CountingRefresher::new(true);

        let results = join_all((0..8).map(|_| {
            let session = session.clone();
            let refresher: Arc<dyn TokenRefresher> = refresher.clone();
            async move { session.refresh(refresher).await }
        }))
        .await;

        assert!(results.iter().all(|ok| *ok));
        assert_eq!(refresher.calls(), 1);
        assert_eq!(session.access_token().as_deref(), Some("access-1"));
        assert_eq!(session.refresh_token().as_deref(), Some("r0-rotated"));
        assert!(!session.is_refreshing());
    }

    #[tokio::test]
    async fn test_concurrent_refresh_across_tasks() {
        let session = logged_in();
        let refresher = CountingRefresher::new(true);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let session = session.clone();
                let refresher: Arc<dyn TokenRefresher> = refresher.clone();
                tokio::spawn(async move { session.refresh(refresher).await })
            })
            .collect();

        for handle in handles {
            assert!(handle.await.unwrap());
        }
        assert_eq!(refresher.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_expires_once() {
        let session = logged_in();
        let fired = counting_callback(&session);
        let refresher = CountingRefresher::new(false);

        let results = join_all((0..5).map(|_| {
            let session = session.clone();
            let refresher: Arc<dyn TokenRefresher> = refresher.clone();
            async move { session.refresh(refresher).await }
        }))
        .await;

        assert!(results.iter().all(|ok| !*ok));
        assert_eq!(refresher.calls(), 1);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!session.has_credentials());
    }

    #[tokio::test]
    async fn test_missing_refresh_token_skips_network() {
        let session = SessionManager::in_memory();
        session.set_access_token("only-access");
        let fired = counting_callback(&session);
        let refresher = CountingRefresher::new(true);

        assert!(!session.refresh(refresher.clone()).await);
        assert_eq!(refresher.calls(), 0);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(session.access_token().is_none());
    }

    #[tokio::test]
    async fn test_marker_cleared_without_cooldown() {
        let session = logged_in();
        let refresher = CountingRefresher::new(true);

        assert!(session.refresh(refresher.clone()).await);
        assert!(!session.is_refreshing());
        assert!(session.refresh(refresher.clone()).await);

        assert_eq!(refresher.calls(), 2);
        assert_eq!(session.access_token().as_deref(), Some("access-2"));
    }

    /// Accepts only one refresh token and records every token it is sent.
    struct SelectiveRefresher {
        accepted: &'static str,
        seen: Mutex<Vec<String>>,
    }

    impl SelectiveRefresher {
        fn new(accepted: &'static str) -> Arc<Self> {
            Arc::new(Self {
                accepted,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().clone()
        }
    }

    #[async_trait]
    impl TokenRefresher for SelectiveRefresher {
        async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ClientError> {
            self.seen.lock().push(refresh_token.to_string());
            tokio::time::sleep(Duration::from_millis(50)).await;
            if refresh_token == self.accepted {
                Ok(TokenPair::new(format!("access-{refresh_token}"), "rotated"))
            } else {
                Err(ClientError::api(401, "refresh token revoked"))
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_refresh_settles_and_next_call_starts_fresh() {
        let session = SessionManager::in_memory();
        session.set_tokens(&TokenPair::new("a-old", "r-old"));
        let fired = counting_callback(&session);
        let refresher = SelectiveRefresher::new("r-new");

        let abandoned =
            tokio::time::timeout(Duration::from_millis(10), session.refresh(refresher.clone()))
                .await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!session.is_refreshing());
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        session.set_tokens(&TokenPair::new("a-new", "r-new"));
        assert!(session.refresh(refresher.clone()).await);

        assert_eq!(refresher.seen(), vec!["r-old".to_string(), "r-new".to_string()]);
        assert_eq!(session.access_token().as_deref(), Some("access-r-new"));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_during_refresh_is_not_purged() {
        let session = SessionManager::in_memory();
        session.set_tokens(&TokenPair::new("a-old", "r-old"));
        let fired = counting_callback(&session);
        let refresher = SelectiveRefresher::new("r-new");

        let pending = {
            let session = session.clone();
            let refresher: Arc<dyn TokenRefresher> = refresher.clone();
            tokio::spawn(async move { session.refresh(refresher).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(session.is_refreshing());
        session.set_tokens(&TokenPair::new("a-new", "r-new"));

        assert!(pending.await.unwrap());
        assert!(!session.is_refreshing());
        assert_eq!(refresher.seen(), vec!["r-old".to_string()]);
        assert_eq!(session.access_token().as_deref(), Some("a-new"));
        assert_eq!(session.refresh_token().as_deref(), Some("r-new"));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_last_callback_wins() {
        let session = logged_in();
        let first = counting_callback(&session);
        let second = counting_callback(&session);

        session.expire();
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);

        session.set_on_unauthorized(None);
        session.expire();
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_callback_may_reenter_session() {
        let session = logged_in();
        let observer = session.clone();
        let saw_tokens = Arc::new(AtomicU32::new(0));
        let flag = saw_tokens.clone();
        session.on_unauthorized(move || {
            if observer.has_credentials() {
                flag.fetch_add(1, Ordering::SeqCst);
            }
            observer.set_on_unauthorized(None);
        });

        session.expire();
        assert_eq!(saw_tokens.load(Ordering::SeqCst), 0);
    }
}
