use serde::{Deserialize, Serialize};
use crate::state::ChatMessage;

#[derive(Serialize)]
pub(crate) struct SwitchModelRequest<'a> {
    pub model_type: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub model: String,
    pub history: Vec<ChatMessage>,
}

/// Reply from `/llm/chat/simple`. Every field is optional; the server signals
/// failure through `success: false` rather than the HTTP status.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockAnalysisRequest {
    pub code: String,
    pub period: u32,
    pub analysis_type: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StockAnalysis {
    pub code: String,
    pub latest_price: f64,
    pub change_pct: f64,
    #[serde(default)]
    pub indicators: Indicators,
    #[serde(default)]
    pub signals: Signals,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Indicators {
    #[serde(rename = "MA5", default)]
    pub ma5: Option<f64>,
    #[serde(rename = "MA20", default)]
    pub ma20: Option<f64>,
    #[serde(rename = "RSI", default)]
    pub rsi: Option<f64>,
    #[serde(rename = "MACD", default)]
    pub macd: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Signals {
    #[serde(default)]
    pub trend: Option<String>,
    #[serde(default)]
    pub rsi_signal: Option<String>,
    #[serde(default)]
    pub macd_signal: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: u32,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRequest {
    pub data: Vec<ChartPoint>,
    pub chart_type: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChartImage {
    /// Image source string, normally a `data:image/png;base64,...` URL.
    pub image: String,
}

/// `/analysis/market_overview`. The three lists are required so that a
/// malformed body fails as a whole instead of half-replacing the panel.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MarketOverview {
    pub indices: Vec<IndexQuote>,
    pub sectors: Vec<SectorQuote>,
    pub hot_stocks: Vec<StockQuote>,
    #[serde(default)]
    pub market_sentiment: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndexQuote {
    pub name: String,
    pub code: String,
    pub price: f64,
    pub change: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SectorQuote {
    pub name: String,
    pub leader: String,
    pub change: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StockQuote {
    pub name: String,
    pub code: String,
    pub price: f64,
    pub change: f64,
}
