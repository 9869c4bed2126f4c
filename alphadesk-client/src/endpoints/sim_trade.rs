//! Simulated trading endpoints.

use crate::client::{envelope_data, ApiClient, RequestOptions};
use alphadesk_core::types::{SimTradeBalance, SimTradeOrder, SimTradePosition};
use alphadesk_core::Result;
use reqwest::Method;

impl ApiClient {
    /// `GET /sim-trade/account/balance`.
    pub async fn sim_trade_balance(&self) -> Result<SimTradeBalance> {
        let response = self
            .request(Method::GET, "/sim-trade/account/balance", RequestOptions::new())
            .await?;
        envelope_data(response).await
    }

    /// `GET /sim-trade/positions`.
    pub async fn sim_trade_positions(&self) -> Result<Vec<SimTradePosition>> {
        let response = self
            .request(Method::GET, "/sim-trade/positions", RequestOptions::new())
            .await?;
        envelope_data(response).await
    }

    /// `GET /sim-trade/orders/active`.
    pub async fn sim_trade_active_orders(&self) -> Result<Vec<SimTradeOrder>> {
        let response = self
            .request(Method::GET, "/sim-trade/orders/active", RequestOptions::new())
            .await?;
        envelope_data(response).await
    }
}
