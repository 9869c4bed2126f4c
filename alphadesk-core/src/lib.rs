//! # alphadesk-core
//!
//! Core types and error handling for the alphadesk client.
//!
//! This crate provides the foundational pieces shared by every other crate in
//! the workspace:
//!
//! - **Errors**: [`ClientError`] separates network failures, authentication
//!   rejections, terminal session loss, and ordinary API failures
//! - **Types**: serde DTOs for the auth, AI analysis, simulated trading, and
//!   arena endpoints
//!
//! ## Example
//!
//! ```rust
//! use alphadesk_core::{ClientError, types::TriggerAnalyzeRequest};
//!
//! let request = TriggerAnalyzeRequest::new("BTCUSDT");
//! assert_eq!(request.provider, "deepseek");
//!
//! let err = ClientError::from_status(401, r#"{"message":"bad password","remainingAttempts":1}"#);
//! assert!(err.is_auth());
//! assert_eq!(err.user_message(), "bad password (remaining attempts: 1)");
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod errors;
pub mod types;

pub use errors::{ClientError, ErrorBody, NetworkErrorKind, Result};
pub use types::{Envelope, TokenPair};
