//! AI analysis endpoints.

use crate::client::{envelope_data, json_any_status, json_or_error, ApiClient, RequestOptions};
use alphadesk_core::types::{
    AiQuota, AnalysisHistoryItem, AnalysisStatus, LastAnalysis, MacroEvent, TriggerAnalyzeRequest,
    TriggerAnalyzeResponse,
};
use alphadesk_core::{ClientError, Result};
use reqwest::Method;
use std::time::Duration;
use tracing::{debug, info};

/// Polling schedule for [`ApiClient::wait_for_analysis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay before each poll.
    pub interval: Duration,
    /// Polls before giving up.
    pub max_polls: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2500),
            max_polls: 120,
        }
    }
}

impl PollConfig {
    /// Create the default schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the delay between polls.
    #[must_use]
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the poll budget.
    #[must_use]
    pub fn max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = max_polls;
        self
    }
}

impl ApiClient {
    /// `GET /ai-analysis-graph/quota`.
    pub async fn ai_quota(&self) -> Result<AiQuota> {
        let response = self
            .request(Method::GET, "/ai-analysis-graph/quota", RequestOptions::new())
            .await?;
        json_or_error(response).await
    }

    /// `GET /ai-analysis-graph/macro-events`.
    pub async fn macro_events(&self) -> Result<Vec<MacroEvent>> {
        let response = self
            .request(Method::GET, "/ai-analysis-graph/macro-events", RequestOptions::new())
            .await?;
        envelope_data(response).await
    }

    /// `GET /ai-analysis-graph/history`, newest first.
    ///
    /// The backend defaults are `limit = 20`, `skip = 0`.
    pub async fn analysis_history(
        &self,
        symbol: &str,
        limit: u32,
        skip: u32,
    ) -> Result<Vec<AnalysisHistoryItem>> {
        let url = self.config().endpoint_url(
            ["ai-analysis-graph", "history"],
            &[
                ("symbol", symbol.to_string()),
                ("limit", limit.to_string()),
                ("skip", skip.to_string()),
            ],
        )?;
        let response = self.request(Method::GET, url.as_str(), RequestOptions::new()).await?;
        envelope_data(response).await
    }

    /// `POST /ai-analysis-graph/analyze`.
    ///
    /// Returns the job handle; poll it with [`analysis_status`] or
    /// [`wait_for_analysis`].
    ///
    /// [`analysis_status`]: ApiClient::analysis_status
    /// [`wait_for_analysis`]: ApiClient::wait_for_analysis
    pub async fn trigger_analysis(
        &self,
        request: &TriggerAnalyzeRequest,
    ) -> Result<TriggerAnalyzeResponse> {
        let response = self
            .request(
                Method::POST,
                "/ai-analysis-graph/analyze",
                RequestOptions::json(request)?,
            )
            .await?;
        let triggered: TriggerAnalyzeResponse = json_or_error(response).await?;
        info!(
            symbol = %request.symbol,
            job_id = triggered.job_id.as_deref().unwrap_or("-"),
            "Analysis triggered"
        );
        Ok(triggered)
    }

    /// `GET /ai-analysis-graph/status/{job_id}`.
    ///
    /// The body is decoded whatever the status, so an unknown job comes back
    /// as `not_found` rather than an error.
    pub async fn analysis_status(&self, job_id: &str) -> Result<AnalysisStatus> {
        let url = self
            .config()
            .endpoint_url(["ai-analysis-graph", "status", job_id], &[])?;
        let response = self.request(Method::GET, url.as_str(), RequestOptions::new()).await?;
        json_any_status(response).await
    }

    /// `GET /ai-analysis-graph/last-analysis`.
    pub async fn last_analysis(&self, symbol: &str) -> Result<LastAnalysis> {
        let url = self.config().endpoint_url(
            ["ai-analysis-graph", "last-analysis"],
            &[("symbol", symbol.to_string())],
        )?;
        let response = self.request(Method::GET, url.as_str(), RequestOptions::new()).await?;
        json_any_status(response).await
    }

    /// Poll a job until it completes or fails.
    ///
    /// Waits `interval` before every poll. Errors from individual polls are
    /// ignored, except a terminated session, which ends the wait. Returns the
    /// finished status, or a network timeout once the budget is spent.
    pub async fn wait_for_analysis(&self, job_id: &str, poll: PollConfig) -> Result<AnalysisStatus> {
        for attempt in 1..=poll.max_polls {
            tokio::time::sleep(poll.interval).await;

            match self.analysis_status(job_id).await {
                Ok(status) if status.status.is_finished() => {
                    info!(job_id, status = ?status.status, "Analysis finished");
                    return Ok(status);
                }
                Ok(status) => {
                    debug!(job_id, attempt, status = ?status.status, "Analysis still pending");
                }
                Err(ClientError::Unauthorized) => return Err(ClientError::Unauthorized),
                Err(error) => {
                    debug!(job_id, attempt, error = %error, "Status poll failed, continuing");
                }
            }
        }

        Err(ClientError::timeout(format!(
            "analysis {job_id} did not finish after {} polls",
            poll.max_polls
        )))
    }
}
