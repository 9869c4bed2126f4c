//! # alphadesk-session
//!
//! Credential storage and single-flight token refresh.
//!
//! A [`SessionManager`] owns the stored access and refresh tokens, the
//! in-flight refresh, and the callback fired when the session is lost. Every
//! request that sees a 401 calls [`SessionManager::refresh`]; however many of
//! them arrive together, the refresh endpoint is called once.
//!
//! ## Example
//!
//! ```rust
//! use alphadesk_core::TokenPair;
//! use alphadesk_session::SessionManager;
//!
//! let session = SessionManager::in_memory();
//! session.set_tokens(&TokenPair::new("access", "refresh"));
//! session.on_unauthorized(|| println!("signed out"));
//!
//! session.expire();
//! assert!(!session.has_credentials());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod session;
pub mod storage;

pub use session::{SessionManager, TokenRefresher, UnauthorizedCallback};
pub use storage::{
    FileTokenStore, MemoryTokenStore, StorageError, TokenStore, ACCESS_TOKEN_KEY,
    REFRESH_TOKEN_KEY,
};
