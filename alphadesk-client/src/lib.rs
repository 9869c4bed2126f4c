//! # alphadesk-client
//!
//! Authenticated HTTP client for the alphadesk backend.
//!
//! Every authenticated call goes through [`ApiClient::request`]: the stored
//! access token is attached, a 401 triggers one shared credential refresh and
//! exactly one retry, and a session that cannot be saved is purged before
//! [`ClientError::Unauthorized`](alphadesk_core::ClientError::Unauthorized)
//! is returned. Login and registration instead run under a
//! timeout-and-backoff retry policy, since the backend may be cold-starting.
//!
//! ## Core Concepts
//!
//! - **[`ClientConfig`]**: base URL, timeouts, login retry policy
//! - **[`ApiClient`]**: the request pipeline plus typed endpoint methods
//! - **[`AuthFlow`]**: the refresh-and-retry-once state machine
//! - **[`AuthStore`]**: signed-in user and session lifecycle
//!
//! ## Example
//!
//! ```ignore
//! use alphadesk_client::{ApiClient, ClientConfig};
//! use alphadesk_session::SessionManager;
//!
//! let client = ApiClient::new(ClientConfig::from_env()?, SessionManager::in_memory())?;
//! client.login("satoshi", "hunter2").await?;
//! let quota = client.ai_quota().await?;
//! println!("{} analyses left today", quota.remaining);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod endpoints;
pub mod flow;
pub mod store;

pub use client::{
    envelope_data, json_any_status, json_or_error, ApiClient, HttpRefresher, RequestOptions,
};
pub use config::{ClientConfig, BASE_URL_ENV, DEFAULT_BASE_URL};
pub use endpoints::arena::DEFAULT_CYCLE_SYMBOL;
pub use endpoints::PollConfig;
pub use flow::{AuthAction, AuthEvent, AuthFlow, FlowError, FlowState};
pub use store::{AuthState, AuthStore};
