//! Simulated trading account types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Account balance. Amounts are decimal strings as sent by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimTradeBalance {
    /// Owner.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Available margin.
    pub available: String,
    /// Margin locked in orders.
    pub frozen: String,
    /// Total equity.
    pub total_equity: String,
    /// Epoch milliseconds.
    #[serde(default)]
    pub updated_at: Option<i64>,
}

/// Position direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionSide {
    /// Long.
    Long,
    /// Short.
    Short,
}

/// Open position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimTradePosition {
    /// Symbol.
    pub symbol: String,
    /// Side.
    pub side: PositionSide,
    /// Size.
    pub size: String,
    /// Entry price.
    pub entry_price: String,
    /// Leverage.
    #[serde(default)]
    pub leverage: Option<u32>,
    /// Unrealized PnL.
    #[serde(default)]
    pub unrealized_pnl: Option<String>,
    /// Mark price.
    #[serde(default)]
    pub mark_price: Option<String>,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Order direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    /// Buy.
    Buy,
    /// Sell.
    Sell,
}

/// Working order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimTradeOrder {
    /// Order ID.
    pub id: String,
    /// Symbol.
    pub symbol: String,
    /// Side.
    pub side: OrderSide,
    /// Order type (LIMIT, STOP_MARKET, ...).
    #[serde(rename = "type")]
    pub order_type: String,
    /// Quantity.
    pub quantity: String,
    /// Limit price.
    #[serde(default)]
    pub price: Option<String>,
    /// Trigger price.
    #[serde(default)]
    pub stop_price: Option<String>,
    /// Order status.
    pub status: String,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
