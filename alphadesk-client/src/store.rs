//! Session lifecycle owner.
//!
//! [`AuthStore`] keeps the signed-in user for the UI and owns the
//! unauthorized callback: when the session is lost anywhere in the client,
//! the store resets itself.

use crate::client::ApiClient;
use alphadesk_core::types::{AuthResponse, AuthUser, ProfileResponse, RegisterRequest};
use alphadesk_core::{ClientError, Result};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Snapshot of the authentication state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    /// Signed-in user.
    pub user: Option<AuthUser>,
    /// Whether a user is signed in.
    pub is_authenticated: bool,
    /// Whether an auth operation is running.
    pub is_loading: bool,
}

impl AuthState {
    fn signed_in(user: AuthUser) -> Self {
        Self {
            user: Some(user),
            is_authenticated: true,
            is_loading: false,
        }
    }
}

/// Owner of the session lifecycle.
#[derive(Debug, Clone)]
pub struct AuthStore {
    client: ApiClient,
    state: Arc<RwLock<AuthState>>,
    login_in_progress: Arc<AtomicBool>,
    register_in_progress: Arc<AtomicBool>,
}

impl AuthStore {
    /// Create a store and install its unauthorized callback on the
    /// client's session, replacing any previous one.
    pub fn new(client: ApiClient) -> Self {
        let state = Arc::new(RwLock::new(AuthState::default()));

        let on_lost = Arc::clone(&state);
        client.session().on_unauthorized(move || {
            info!("Session lost, resetting auth state");
            *on_lost.write() = AuthState::default();
        });

        Self {
            client,
            state,
            login_in_progress: Arc::new(AtomicBool::new(false)),
            register_in_progress: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get the client.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Current state.
    pub fn state(&self) -> AuthState {
        self.state.read().clone()
    }

    /// Signed-in user.
    pub fn user(&self) -> Option<AuthUser> {
        self.state.read().user.clone()
    }

    /// Whether a user is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_authenticated
    }

    /// Sign in.
    ///
    /// # Errors
    ///
    /// A second call while one is running fails immediately with
    /// [`ClientError::Configuration`]. Otherwise errors from
    /// [`ApiClient::login`].
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse> {
        let _guard = InProgress::acquire(&self.login_in_progress, "login already in progress")?;
        self.set_loading(true);

        let outcome = self.client.login(username, password).await;
        self.apply(&outcome);
        outcome
    }

    /// Create an account and sign in.
    ///
    /// # Errors
    ///
    /// A second call while one is running fails immediately with
    /// [`ClientError::Configuration`]. Otherwise errors from
    /// [`ApiClient::register`].
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        let _guard =
            InProgress::acquire(&self.register_in_progress, "registration already in progress")?;
        self.set_loading(true);

        let outcome = self.client.register(request).await;
        self.apply(&outcome);
        outcome
    }

    /// Sign out. Local state is cleared whatever the backend answers.
    pub async fn logout(&self) {
        self.set_loading(true);
        self.client.logout().await;
        self.clear_auth_state();
    }

    /// Restore the signed-in user from stored credentials.
    ///
    /// With any token stored, loads the profile; a failure clears everything.
    /// Without tokens, resets the state. `silent` leaves the loading flag
    /// alone, for background re-checks.
    pub async fn check_auth(&self, silent: bool) {
        if !silent {
            self.set_loading(true);
        }

        if !self.client.session().has_credentials() {
            debug!("No stored credentials");
            *self.state.write() = AuthState::default();
            return;
        }

        match self.client.profile().await {
            Ok(profile) => {
                debug!(user = %profile.username, "Session restored");
                *self.state.write() = AuthState::signed_in(user_from_profile(profile));
            }
            Err(error) => {
                debug!(error = %error, "Session check failed, clearing credentials");
                self.clear_auth_state();
            }
        }
    }

    /// Drop credentials and reset the state.
    pub fn clear_auth_state(&self) {
        self.client.session().clear_tokens();
        *self.state.write() = AuthState::default();
    }

    fn set_loading(&self, loading: bool) {
        self.state.write().is_loading = loading;
    }

    fn apply(&self, outcome: &Result<AuthResponse>) {
        match outcome {
            Ok(auth) => *self.state.write() = AuthState::signed_in(auth.user.clone()),
            Err(_) => self.set_loading(false),
        }
    }
}

fn user_from_profile(profile: ProfileResponse) -> AuthUser {
    AuthUser {
        id: profile.id,
        username: profile.username,
        email: profile.email,
        tier: profile.tier,
        email_verified: profile.email_verified,
    }
}

/// Clears its flag on drop, so a cancelled call releases the guard too.
struct InProgress<'a>(&'a AtomicBool);

impl<'a> InProgress<'a> {
    fn acquire(flag: &'a AtomicBool, message: &str) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ClientError::Configuration(message.to_string()))?;
        Ok(Self(flag))
    }
}

impl Drop for InProgress<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
