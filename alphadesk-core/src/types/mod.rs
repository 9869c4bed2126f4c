//! Wire types for the alphadesk backend.
//!
//! Field names follow the backend exactly: token fields are snake_case,
//! everything else is camelCase. Records that the backend extends over time
//! keep unknown fields in a flattened `extra` map.

pub mod analysis;
pub mod arena;
pub mod auth;
pub mod sim_trade;

use serde::{Deserialize, Serialize};

pub use analysis::*;
pub use arena::*;
pub use auth::*;
pub use sim_trade::*;

/// `{ success, data }` envelope used by most list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Success flag.
    #[serde(default)]
    pub success: Option<bool>,
    /// Payload; a missing field deserializes as `None`.
    pub data: Option<T>,
}

impl<T: Default> Envelope<T> {
    /// The payload, or `T::default()` when the backend sent none.
    pub fn into_data(self) -> T {
        self.data.unwrap_or_default()
    }
}
