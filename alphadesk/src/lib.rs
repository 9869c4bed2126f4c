//! # alphadesk
//!
//! Client SDK for the alphadesk trading assistant.
//!
//! This crate wires the workspace together: a [`SessionManager`] over a
//! [`TokenStore`], an [`ApiClient`] that refreshes expired credentials once
//! for all concurrent callers, and an [`AuthStore`] that tracks the signed-in
//! user and resets itself when the session is lost.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use alphadesk::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let desk = Alphadesk::new(ClientConfig::from_env()?, MemoryTokenStore::new())?;
//!
//!     desk.auth().login("satoshi", "hunter2").await?;
//!     let quota = desk.client().ai_quota().await?;
//!     println!("{} of {} analyses left", quota.remaining, quota.limit);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description | Default |
//! |---------|-------------|--------|
//! | `plexus` | Procedural background animation | ✅ |

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

use std::sync::Arc;
use tracing::debug;

// ============================================================================
// Crate Re-exports
// ============================================================================

/// Core types and error handling.
pub use alphadesk_core as core;

/// Retry with per-attempt timeouts.
pub use alphadesk_retries as retries;

/// Credential storage and single-flight refresh.
pub use alphadesk_session as session;

/// Authenticated HTTP client.
pub use alphadesk_client as client;

/// Background animation.
#[cfg(feature = "plexus")]
#[cfg_attr(docsrs, doc(cfg(feature = "plexus")))]
pub use alphadesk_plexus as plexus;

// ============================================================================
// Type Re-exports (Flat)
// ============================================================================

// Errors
pub use alphadesk_core::{ClientError, NetworkErrorKind, Result};

// Credentials
pub use alphadesk_core::TokenPair;
pub use alphadesk_session::{
    FileTokenStore, MemoryTokenStore, SessionManager, StorageError, TokenRefresher, TokenStore,
};

// Client
pub use alphadesk_client::{
    ApiClient, AuthState, AuthStore, ClientConfig, HttpRefresher, PollConfig, RequestOptions,
};

// Retries
pub use alphadesk_retries::{with_retry, RetryConfig, WaitStrategy};

#[cfg(feature = "plexus")]
#[cfg_attr(docsrs, doc(cfg(feature = "plexus")))]
pub use alphadesk_plexus::{FrameLoop, PlexusView, Scene, Surface};

// ============================================================================
// Composition
// ============================================================================

/// A ready-to-use client: session, API client and auth store sharing one
/// credential store.
///
/// Cloning is cheap; clones share everything.
#[derive(Debug, Clone)]
pub struct Alphadesk {
    session: SessionManager,
    client: ApiClient,
    auth: AuthStore,
}

impl Alphadesk {
    /// Compose a client over `store`.
    ///
    /// The auth store's unauthorized callback is installed on the session,
    /// so a lost session resets [`AuthStore::state`].
    pub fn new(config: ClientConfig, store: impl TokenStore + 'static) -> Result<Self> {
        Self::with_session(config, SessionManager::new(store))
    }

    /// Compose a client over a shared store.
    pub fn with_shared_store(config: ClientConfig, store: Arc<dyn TokenStore>) -> Result<Self> {
        Self::with_session(config, SessionManager::with_store(store))
    }

    /// Compose a client whose credentials live only in memory.
    pub fn in_memory(config: ClientConfig) -> Result<Self> {
        Self::with_session(config, SessionManager::in_memory())
    }

    /// Compose a client persisting credentials under the platform data
    /// directory.
    pub fn with_default_store(config: ClientConfig) -> Result<Self> {
        let store = FileTokenStore::open_default()?;
        Self::new(config, store)
    }

    fn with_session(config: ClientConfig, session: SessionManager) -> Result<Self> {
        debug!(base_url = %config.base_url, "Composing alphadesk client");
        let client = ApiClient::new(config, session.clone())?;
        let auth = AuthStore::new(client.clone());
        Ok(Self {
            session,
            client,
            auth,
        })
    }

    /// The session.
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// The API client.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// The auth store.
    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }
}

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient prelude for common imports.
///
/// ```ignore
/// use alphadesk::prelude::*;
/// ```
pub mod prelude {
    pub use crate::Alphadesk;

    // Core types
    pub use crate::core::{ClientError, Result, TokenPair};

    // Session
    pub use crate::session::{FileTokenStore, MemoryTokenStore, SessionManager, TokenStore};

    // Client
    pub use crate::client::{ApiClient, AuthState, AuthStore, ClientConfig, PollConfig};

    // Retries
    pub use crate::retries::{RetryConfig, WaitStrategy};

    // Plexus
    #[cfg(feature = "plexus")]
    pub use crate::plexus::{FrameLoop, PlexusView, Scene, Surface};
}

// ============================================================================
// Version Information
// ============================================================================

/// Returns the current version of alphadesk.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
