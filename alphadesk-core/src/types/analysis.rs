//! AI analysis types: quota, macro events, history, jobs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// AI analysis quota for the current period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiQuota {
    /// Analyses used.
    pub used: u32,
    /// Analyses remaining.
    pub remaining: u32,
    /// Period limit.
    pub limit: u32,
    /// When the quota resets.
    pub reset_at: String,
}

/// Kind of macro event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MacroEventKind {
    /// Recurring data series.
    Series,
    /// One-off event.
    Event,
}

/// Macro event that can be attached to an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroEvent {
    /// Event ID.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Kind.
    #[serde(rename = "type")]
    pub kind: MacroEventKind,
    /// Series ID.
    #[serde(default)]
    pub series_id: Option<String>,
    /// Slug.
    #[serde(default)]
    pub slug: Option<String>,
    /// Description.
    pub description: String,
    /// Related trading symbol.
    #[serde(default)]
    pub reference_symbol: Option<String>,
}

/// Direction and entry suggested by an analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDetails {
    /// Direction.
    #[serde(default)]
    pub direction: Option<String>,
    /// Entry price.
    #[serde(default)]
    pub entry_price: Option<String>,
}

/// Analysis result payload. Unknown fields are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Suggested action.
    #[serde(default)]
    pub action: Option<String>,
    /// Summary text.
    #[serde(default)]
    pub summary: Option<String>,
    /// Action details.
    #[serde(default)]
    pub action_details: Option<ActionDetails>,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of the analysis history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisHistoryItem {
    /// Record ID.
    #[serde(rename = "_id")]
    pub id: String,
    /// Owner.
    pub user_id: String,
    /// Symbol analyzed.
    pub symbol: String,
    /// Result, absent on failure.
    #[serde(default)]
    pub analysis_result: Option<AnalysisResult>,
    /// Failure message.
    #[serde(default)]
    pub error: Option<String>,
    /// AI provider.
    #[serde(default)]
    pub provider: Option<String>,
    /// AI model.
    #[serde(default)]
    pub model: Option<String>,
    /// Analysis time.
    pub analyzed_at: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

/// Analysis strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    /// Low risk.
    Conservative,
    /// Indicator driven.
    #[default]
    Quantitative,
    /// High risk.
    Aggressive,
}

/// Request to start an analysis job.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerAnalyzeRequest {
    /// Symbol to analyze.
    pub symbol: String,
    /// Strategy.
    pub strategy: Strategy,
    /// Output language.
    pub language: String,
    /// AI provider.
    pub provider: String,
    /// Macro events to include.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macro_event_ids: Option<Vec<String>>,
}

impl TriggerAnalyzeRequest {
    /// Create a request with the backend's default strategy, language, and provider.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            strategy: Strategy::default(),
            language: "Chinese-Simplified".to_string(),
            provider: "deepseek".to_string(),
            macro_event_ids: None,
        }
    }

    /// Set the strategy.
    #[must_use]
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the output language.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the AI provider.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    /// Attach macro events.
    #[must_use]
    pub fn macro_events(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.macro_event_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }
}

/// Response to a trigger request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerAnalyzeResponse {
    /// Whether the job was queued.
    pub success: bool,
    /// Job ID to poll.
    #[serde(default)]
    pub job_id: Option<String>,
    /// Session ID.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Failure message.
    #[serde(default)]
    pub error: Option<String>,
    /// Quota after this request.
    #[serde(default)]
    pub quota: Option<AiQuota>,
}

/// Analysis job state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Waiting for a worker.
    Queued,
    /// In progress.
    Running,
    /// Finished successfully.
    Completed,
    /// Finished with an error.
    Failed,
    /// Unknown job.
    NotFound,
}

impl JobStatus {
    /// Whether polling should stop.
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Job progress; the queue reports it either bare or nested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Progress {
    /// Bare percentage.
    Value(f64),
    /// `{ progress }` object.
    Nested {
        /// Percentage.
        #[serde(default)]
        progress: Option<f64>,
    },
}

impl Progress {
    /// The percentage, if reported.
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            Self::Nested { progress } => *progress,
        }
    }
}

/// Status of an analysis job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisStatus {
    /// Job ID.
    pub id: String,
    /// State.
    pub status: JobStatus,
    /// Progress.
    #[serde(default)]
    pub progress: Option<Progress>,
    /// Failure reason.
    #[serde(default)]
    pub failed_reason: Option<String>,
}

/// Latest analysis for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastAnalysis {
    /// Whether an analysis exists.
    pub success: bool,
    /// Session ID.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Raw analysis payload.
    #[serde(default)]
    pub data: Option<Value>,
    /// Failure message.
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_trigger_defaults_on_the_wire() {
        let json = serde_json::to_value(TriggerAnalyzeRequest::new("BTCUSDT")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "symbol": "BTCUSDT",
                "strategy": "QUANTITATIVE",
                "language": "Chinese-Simplified",
                "provider": "deepseek"
            })
        );
    }

    #[test]
    fn test_trigger_with_macro_events() {
        let req = TriggerAnalyzeRequest::new("ETHUSDT")
            .strategy(Strategy::Aggressive)
            .macro_events(["cpi", "fomc"]);
        let json = serde_json::to_value(req).unwrap();
        assert_eq!(json["strategy"], "AGGRESSIVE");
        assert_eq!(json["macroEventIds"], serde_json::json!(["cpi", "fomc"]));
    }

    #[test]
    fn test_progress_shapes() {
        let bare: AnalysisStatus =
            serde_json::from_str(r#"{"id":"j","status":"running","progress":40}"#).unwrap();
        assert_eq!(bare.progress.and_then(|p| p.value()), Some(40.0));

        let nested: AnalysisStatus = serde_json::from_str(
            r#"{"id":"j","status":"queued","progress":{"progress":5}}"#,
        )
        .unwrap();
        assert_eq!(nested.progress.and_then(|p| p.value()), Some(5.0));
    }

    #[test]
    fn test_job_status_finished() {
        assert!(JobStatus::Completed.is_finished());
        assert!(JobStatus::Failed.is_finished());
        assert!(!JobStatus::Running.is_finished());
        assert!(!JobStatus::NotFound.is_finished());
    }

    #[test]
    fn test_history_item_keeps_unknown_result_fields() {
        let item: AnalysisHistoryItem = serde_json::from_str(
            r#"{"_id":"h1","userId":"u","symbol":"BTCUSDT",
                "analysisResult":{"action":"BUY","confidence":0.8},
                "analyzedAt":"2026-01-01T00:00:00Z","timestamp":1}"#,
        )
        .unwrap();
        let result = item.analysis_result.unwrap();
        assert_eq!(result.action.as_deref(), Some("BUY"));
        assert_eq!(result.extra["confidence"], serde_json::json!(0.8));
    }
}
