//! # alphadesk-retries
//!
//! Timeout-aware retry wrapper for alphadesk requests.
//!
//! Login and registration hit a backend that may be cold-starting, so those
//! calls run under a per-attempt deadline and are retried on network-class
//! failures with a fixed backoff. Authentication rejections are never retried.
//!
//! ## Core Concepts
//!
//! - **[`RetryConfig`]**: attempt budget, per-attempt deadline, wait strategy
//! - **[`WaitStrategy`]**: how long to wait between attempts
//! - **[`with_retry`]**: execute an operation under the config
//!
//! ## Example
//!
//! ```ignore
//! use alphadesk_retries::{with_retry, RetryConfig};
//! use std::time::Duration;
//!
//! let config = RetryConfig::new()
//!     .max_attempts(3)
//!     .attempt_timeout(Duration::from_secs(15))
//!     .fixed(Duration::from_millis(1500));
//!
//! let result = with_retry(&config, || async {
//!     // Your async operation
//!     Ok::<_, alphadesk_core::ClientError>("success")
//! }).await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod executor;

// Re-exports
pub use config::{RetryConfig, WaitStrategy};
pub use executor::{with_retry, with_retry_state, AttemptInfo, Retry, RetryState};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{with_retry, Retry, RetryConfig, WaitStrategy};
}
