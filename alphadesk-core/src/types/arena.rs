//! AI trader arena types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::sim_trade::PositionSide;

/// Arena overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArenaStatus {
    /// Scheduler status.
    pub status: String,
    /// Number of active AI traders.
    pub active_participants_count: u32,
    /// Server time.
    pub timestamp: String,
}

/// An AI trader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArenaParticipant {
    /// Participant ID.
    #[serde(rename = "_id")]
    pub id: String,
    /// Backing account.
    pub user_id: String,
    /// Model ID.
    pub model_id: String,
    /// Provider.
    pub provider: String,
    /// Display name.
    pub name: String,
    /// Trading personality prompt.
    pub personality: String,
    /// Starting balance.
    #[serde(default)]
    pub initial_balance: f64,
    /// Status.
    pub status: String,
    /// Last self-review.
    #[serde(default)]
    pub last_reflection: Option<String>,
    /// Free-form metadata.
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

/// Position state of one participant on one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArenaSymbolStatus {
    /// Symbol.
    pub symbol: String,
    /// Whether a position is open.
    pub has_position: bool,
    /// Side.
    #[serde(default)]
    pub side: Option<PositionSide>,
    /// Quantity.
    pub quantity: String,
    /// Entry price.
    pub entry_price: String,
    /// Current price.
    pub current_price: String,
    /// Unrealized PnL.
    pub unrealized_pnl: f64,
    /// Notional value.
    pub position_value: f64,
    /// Leverage.
    #[serde(default)]
    pub leverage: Option<u32>,
    /// Take-profit price.
    #[serde(default)]
    pub take_profit_price: Option<String>,
    /// Stop price.
    #[serde(default)]
    pub stop_price: Option<String>,
}

/// Win/loss statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeStats {
    /// Closed trades.
    pub total_trades: u32,
    /// Fraction of winning trades.
    pub win_rate: f64,
    /// Realized PnL.
    pub total_pnl: f64,
}

/// Most recent decision of a participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastDecision {
    /// Action taken.
    pub action: String,
    /// Symbol.
    pub symbol: String,
    /// Reasoning.
    pub reason: String,
    /// Decision time.
    pub created_at: String,
}

/// Live view of one participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArenaLiveParticipant {
    /// Participant summary.
    pub participant: ArenaParticipantSummary,
    /// Per-symbol state.
    pub symbol_statuses: Vec<ArenaSymbolStatus>,
    /// Open positions.
    pub active_position_count: u32,
    /// Total notional.
    pub total_position_value: f64,
    /// Total unrealized PnL.
    pub total_unrealized_pnl: f64,
    /// Last decision.
    #[serde(default)]
    pub last_decision: Option<LastDecision>,
    /// Statistics.
    pub stats: TradeStats,
}

/// Participant fields included in the live view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArenaParticipantSummary {
    /// Participant ID.
    #[serde(rename = "_id")]
    pub id: String,
    /// Backing account.
    pub user_id: String,
    /// Display name.
    pub name: String,
    /// Model ID.
    pub model_id: String,
    /// Provider.
    pub provider: String,
    /// Trading personality prompt.
    pub personality: String,
    /// Last self-review.
    #[serde(default)]
    pub last_reflection: Option<String>,
    /// Status.
    pub status: String,
}

/// Live arena state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArenaLiveStatus {
    /// Symbols the arena trades.
    pub monitored_symbols: Vec<String>,
    /// Participants.
    pub participants: Vec<ArenaLiveParticipant>,
}

/// Action suggested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedAction {
    /// Action.
    pub action: String,
    /// Reason.
    #[serde(default)]
    pub reason: Option<String>,
    /// Quantity.
    #[serde(default)]
    pub quantity: Option<String>,
}

/// Directional signal produced by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedSignal {
    /// Bias from -1 (short) to 1 (long).
    pub bias_score: f64,
    /// Confidence.
    pub confidence: f64,
    /// Summary.
    #[serde(default)]
    pub summary: Option<String>,
}

/// Action actually executed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutedAction {
    /// Execution type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Reason.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Entry of the recent-activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArenaRecentActivity {
    /// Record ID.
    #[serde(rename = "_id")]
    pub id: String,
    /// Backing account.
    pub user_id: String,
    /// Participant.
    pub participant_id: String,
    /// Symbol.
    pub symbol: String,
    /// Participant name.
    pub participant_name: String,
    /// Participant provider.
    pub participant_provider: String,
    /// Reasoning.
    #[serde(default)]
    pub reasoning: Option<String>,
    /// Suggested action.
    #[serde(default)]
    pub suggested_action: Option<SuggestedAction>,
    /// Suggested signal.
    #[serde(default)]
    pub suggested_signal: Option<SuggestedSignal>,
    /// Executed action.
    #[serde(default)]
    pub executed_action: Option<ExecutedAction>,
    /// Realized PnL.
    #[serde(default)]
    pub pnl: Option<f64>,
    /// Status.
    pub status: String,
    /// Creation time.
    pub created_at: String,
}

/// Entry of a participant's decision log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArenaDecisionLog {
    /// Record ID.
    #[serde(rename = "_id")]
    pub id: String,
    /// Backing account.
    pub user_id: String,
    /// Participant.
    pub participant_id: String,
    /// Symbol.
    pub symbol: String,
    /// Reasoning.
    #[serde(default)]
    pub reasoning: Option<String>,
    /// Suggested action.
    #[serde(default)]
    pub suggested_action: Option<SuggestedAction>,
    /// Suggested signal.
    #[serde(default)]
    pub suggested_signal: Option<SuggestedSignal>,
    /// Executed action.
    #[serde(default)]
    pub executed_action: Option<ExecutedAction>,
    /// Realized PnL.
    #[serde(default)]
    pub pnl: Option<f64>,
    /// Status.
    pub status: String,
    /// Analysis time.
    pub analyzed_at: String,
    /// Creation time.
    pub created_at: String,
}

/// Account snapshot attached to a performance report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArenaAccount {
    /// Available margin.
    pub available: String,
    /// Locked margin.
    pub frozen: String,
    /// Total equity.
    pub total_equity: String,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Performance report of a participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaParticipantPerformance {
    /// Participant.
    pub participant: ArenaParticipant,
    /// Account.
    pub account: ArenaAccount,
    /// Statistics.
    pub stats: TradeStats,
}

/// Admin request to create an AI trader.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateParticipantRequest {
    /// Backing account.
    pub user_id: String,
    /// Model ID.
    pub model_id: String,
    /// Provider.
    pub provider: String,
    /// Display name.
    pub name: String,
    /// Trading personality prompt.
    pub personality: String,
    /// Starting balance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_balance: Option<f64>,
}

/// Message returned by admin actions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminMessage {
    /// Success flag.
    #[serde(default)]
    pub success: Option<bool>,
    /// Message.
    #[serde(default)]
    pub message: String,
    /// Extra payload.
    #[serde(default)]
    pub data: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_status_null_side() {
        let status: ArenaSymbolStatus = serde_json::from_str(
            r#"{"symbol":"BTCUSDT","hasPosition":false,"side":null,"quantity":"0",
                "entryPrice":"0","currentPrice":"61000","unrealizedPnl":0,"positionValue":0,
                "takeProfitPrice":null}"#,
        )
        .unwrap();
        assert!(!status.has_position);
        assert!(status.side.is_none());
        assert!(status.take_profit_price.is_none());
    }

    #[test]
    fn test_live_status_without_decision() {
        let live: ArenaLiveStatus = serde_json::from_str(
            r#"{"monitoredSymbols":["BTCUSDT"],"participants":[{
                "participant":{"_id":"p1","userId":"u1","name":"Turtle","modelId":"m",
                               "provider":"deepseek","personality":"calm","status":"active"},
                "symbolStatuses":[],"activePositionCount":0,"totalPositionValue":0,
                "totalUnrealizedPnl":0,"lastDecision":null,
                "stats":{"totalTrades":3,"winRate":0.66,"totalPnl":12.5}}]}"#,
        )
        .unwrap();
        let p = &live.participants[0];
        assert_eq!(p.participant.name, "Turtle");
        assert!(p.last_decision.is_none());
        assert_eq!(p.stats.total_trades, 3);
    }

    #[test]
    fn test_create_participant_omits_balance() {
        let json = serde_json::to_value(CreateParticipantRequest {
            user_id: "u".into(),
            model_id: "m".into(),
            provider: "p".into(),
            name: "n".into(),
            personality: "x".into(),
            initial_balance: None,
        })
        .unwrap();
        assert!(json.get("initialBalance").is_none());
        assert_eq!(json["modelId"], "m");
    }
}
