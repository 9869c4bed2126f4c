//! Typed wrappers over the backend endpoints.
//!
//! Each submodule adds an `impl ApiClient` block for one area of the API.

pub mod analysis;
pub mod arena;
pub mod auth;
pub mod sim_trade;

pub use analysis::PollConfig;
