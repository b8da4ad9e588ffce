//! HTTP client for the quant analysis server.

mod types;
#[cfg(test)]
mod tests;

use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::models::ModelId;

pub use types::{
    ChartImage, ChartPoint, ChartRequest, ChatRequest, ChatResponse, IndexQuote, Indicators,
    MarketOverview, SectorQuote, Signals, StockAnalysis, StockAnalysisRequest, StockQuote,
};
use types::SwitchModelRequest;

#[derive(Clone)]
pub struct QuantClient {
    client: Client,
    base_url: String,
}

impl QuantClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        debug!(path, "POST");
        let response = self.client.post(self.url(path)).json(body).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("API request failed with status: {}", response.status()));
        }

        Ok(response.json().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!(path, "GET");
        let response = self.client.get(self.url(path)).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("API request failed with status: {}", response.status()));
        }

        Ok(response.json().await?)
    }

    /// Ask the server to route subsequent chats to `model`. Any 2xx is success;
    /// the body is not inspected.
    pub async fn switch_model(&self, model: ModelId) -> Result<()> {
        let request = SwitchModelRequest {
            model_type: model.as_str(),
        };
        debug!(model = model.as_str(), "switching model");
        let response = self
            .client
            .post(self.url("/llm/switch_model"))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("Model switch failed with status: {}", response.status()));
        }
        Ok(())
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.post_json("/llm/chat/simple", request).await
    }

    pub async fn analyze_stock(&self, request: &StockAnalysisRequest) -> Result<StockAnalysis> {
        self.post_json("/analysis/stock", request).await
    }

    pub async fn render_chart(&self, request: &ChartRequest) -> Result<ChartImage> {
        self.post_json("/analysis/chart", request).await
    }

    pub async fn market_overview(&self) -> Result<MarketOverview> {
        self.get_json("/analysis/market_overview").await
    }

    /// Reachability check: any 2xx from `/api/status` counts as connected.
    pub async fn status(&self) -> Result<()> {
        let response = self.client.get(self.url("/api/status")).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("Status check failed with status: {}", response.status()));
        }
        Ok(())
    }
}
