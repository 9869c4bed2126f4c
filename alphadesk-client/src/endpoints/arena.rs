//! AI trader arena endpoints.
//!
//! Read endpoints are open to every signed-in user. The admin actions answer
//! 403 for everyone else, reported as
//! `ClientError::Api { status: 403, message: "admin privileges required" }`.

use crate::client::{json_or_error, ApiClient, RequestOptions};
use alphadesk_core::types::{
    AdminMessage, ArenaDecisionLog, ArenaLiveStatus, ArenaParticipant,
    ArenaParticipantPerformance, ArenaRecentActivity, ArenaStatus, CreateParticipantRequest,
};
use alphadesk_core::{ClientError, Result};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::info;

/// Symbol used by [`ApiClient::trigger_arena_cycle`] callers without a preference.
pub const DEFAULT_CYCLE_SYMBOL: &str = "BTCUSDT";

impl ApiClient {
    /// `GET /arena/status`.
    pub async fn arena_status(&self) -> Result<ArenaStatus> {
        self.arena_get(&["arena", "status"], &[]).await
    }

    /// `GET /arena/participants`.
    pub async fn arena_participants(&self) -> Result<Vec<ArenaParticipant>> {
        self.arena_get(&["arena", "participants"], &[]).await
    }

    /// `GET /arena/live-status`.
    pub async fn arena_live_status(&self) -> Result<ArenaLiveStatus> {
        self.arena_get(&["arena", "live-status"], &[]).await
    }

    /// `GET /arena/recent-activities`. The dashboard asks for 10.
    pub async fn arena_recent_activities(&self, limit: u32) -> Result<Vec<ArenaRecentActivity>> {
        self.arena_get(&["arena", "recent-activities"], &[("limit", limit.to_string())])
            .await
    }

    /// `GET /arena/participants/{id}/performance`.
    pub async fn arena_participant_performance(
        &self,
        participant_id: &str,
    ) -> Result<ArenaParticipantPerformance> {
        self.arena_get(&["arena", "participants", participant_id, "performance"], &[])
            .await
    }

    /// `GET /arena/logs/{id}`. The detail view asks for 20.
    pub async fn arena_participant_logs(
        &self,
        participant_id: &str,
        limit: u32,
    ) -> Result<Vec<ArenaDecisionLog>> {
        self.arena_get(
            &["arena", "logs", participant_id],
            &[("limit", limit.to_string())],
        )
        .await
    }

    /// `POST /arena/participants` (admin).
    pub async fn create_arena_participant(
        &self,
        request: &CreateParticipantRequest,
    ) -> Result<ArenaParticipant> {
        let participant: ArenaParticipant = self
            .arena_admin(&["arena", "participants"], RequestOptions::json(request)?)
            .await?;
        info!(participant = %participant.name, "Arena participant created");
        Ok(participant)
    }

    /// `POST /arena/trigger` (admin): run one decision cycle for `symbol`.
    pub async fn trigger_arena_cycle(&self, symbol: &str) -> Result<AdminMessage> {
        self.arena_admin(
            &["arena", "trigger"],
            RequestOptions::json(&json!({ "symbol": symbol }))?,
        )
        .await
    }

    /// `POST /arena/trigger-reflection` (admin).
    pub async fn trigger_arena_reflection(&self) -> Result<AdminMessage> {
        self.arena_admin(&["arena", "trigger-reflection"], empty_body()?)
            .await
    }

    /// `POST /arena/participants/{id}/reset` (admin).
    pub async fn reset_arena_participant(&self, participant_id: &str) -> Result<AdminMessage> {
        self.arena_admin(&["arena", "participants", participant_id, "reset"], empty_body()?)
            .await
    }

    /// `POST /arena/reset-all` (admin).
    pub async fn reset_all_arena_participants(&self) -> Result<AdminMessage> {
        self.arena_admin(&["arena", "reset-all"], empty_body()?).await
    }

    /// `POST /arena/hard-reset` (admin).
    pub async fn arena_hard_reset(&self) -> Result<AdminMessage> {
        self.arena_admin(&["arena", "hard-reset"], empty_body()?).await
    }

    async fn arena_get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.config().endpoint_url(segments.iter().copied(), query)?;
        let response = self.request(Method::GET, url.as_str(), RequestOptions::new()).await?;
        json_or_error(response).await
    }

    async fn arena_admin<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        options: RequestOptions,
    ) -> Result<T> {
        let url = self.config().endpoint_url(segments.iter().copied(), &[])?;
        let response = self.request(Method::POST, url.as_str(), options).await?;
        admin_json(response).await
    }
}

fn empty_body() -> Result<RequestOptions> {
    RequestOptions::json(&json!({}))
}

async fn admin_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    if response.status() == StatusCode::FORBIDDEN {
        return Err(ClientError::api(403, "admin privileges required"));
    }
    json_or_error(response).await
}
