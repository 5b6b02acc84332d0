//! JSON shapes the backend sends. Nothing here is exposed to the view layer;
//! [`crate::convert`] turns these into domain types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use macdscope_core::domain::Timestamp;

/// Common header of every data-bearing response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

// ── Market data ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MarketDataBody {
    pub data: Option<RawMarketData>,
    #[serde(default)]
    pub indicators: RawIndicators,
}

#[derive(Debug, Deserialize)]
pub struct RawMarketData {
    pub timestamps: Vec<Timestamp>,
    pub ohlcv: Vec<RawOhlcv>,
    #[serde(default)]
    pub metadata: Option<MarketMetadata>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RawOhlcv {
    #[serde(rename = "Open", alias = "open")]
    pub open: f64,
    #[serde(rename = "High", alias = "high")]
    pub high: f64,
    #[serde(rename = "Low", alias = "low")]
    pub low: f64,
    #[serde(rename = "Close", alias = "close")]
    pub close: f64,
    #[serde(rename = "Volume", alias = "volume", default)]
    pub volume: Option<f64>,
}

/// Descriptive block attached to a market fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketMetadata {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub interval: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// `{group: {series: {values, timestamps}}}`.
pub type RawIndicators = BTreeMap<String, BTreeMap<String, RawSeries>>;

/// Warm-up points arrive as `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSeries {
    #[serde(default)]
    pub values: Vec<Option<f64>>,
    #[serde(default)]
    pub timestamps: Vec<Timestamp>,
}

// ── Backtest ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct BacktestBody {
    pub results: Option<RawResults>,
}

#[derive(Debug, Deserialize)]
pub struct RawResults {
    #[serde(default)]
    pub trades: Vec<RawTrade>,
    #[serde(default)]
    pub performance: Option<RawPerformance>,
    #[serde(default)]
    pub strategy_name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTrade {
    pub entry_date: Timestamp,
    pub entry_price: f64,
    #[serde(default)]
    pub exit_date: Option<Timestamp>,
    #[serde(default)]
    pub exit_price: Option<f64>,
    #[serde(default)]
    pub return_pct: Option<f64>,
    #[serde(default)]
    pub exit_reason: Option<String>,
    #[serde(default)]
    pub position_size: Option<f64>,
}

/// Every field may be missing (no trades) or `null`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPerformance {
    pub total_trades: Option<u64>,
    pub winning_trades: Option<u64>,
    pub losing_trades: Option<u64>,
    pub win_rate: Option<f64>,
    pub total_return: Option<f64>,
    pub average_return: Option<f64>,
    pub best_trade: Option<f64>,
    pub worst_trade: Option<f64>,
    pub max_drawdown: Option<f64>,
    pub sharpe_ratio: Option<f64>,
    pub take_profit_hits: Option<u64>,
    pub stop_loss_hits: Option<u64>,
}

// ── Metadata ─────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct SymbolsBody {
    #[serde(default)]
    pub symbols: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IntervalsBody {
    #[serde(default)]
    pub intervals: Vec<IntervalOption>,
}

/// One selectable interval as the backend lists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalOption {
    pub value: String,
    pub label: String,
}

/// Health body. Unknown fields are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy") || self.status.eq_ignore_ascii_case("ok")
    }
}

// ── Requests ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamStartBody<'a> {
    pub symbol: &'a str,
    pub interval: &'a str,
    pub timezone: &'a str,
}
