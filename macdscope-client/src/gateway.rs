//! BackendGateway — one blocking call per backend operation.
//!
//! Each data-bearing response is an envelope: `success: false` is a domain
//! failure carrying the backend's message, anything that is not a decodable
//! envelope is a transport or contract failure. Metadata listings degrade to
//! empty results instead of failing.

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use macdscope_core::domain::{
    ConfigModel, IndicatorSet, Interval, MarketDataset, PerformanceSummary, Trade,
};

use crate::convert;
use crate::error::{GatewayError, Operation};
use crate::transport::Transport;
use crate::wire::{
    BacktestBody, Envelope, HealthStatus, IntervalOption, IntervalsBody, MarketDataBody,
    MarketMetadata, StreamStartBody, SymbolsBody,
};

pub const DEFAULT_TIMEZONE: &str = "UTC";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketDataRequest {
    pub symbol: String,
    pub interval: Interval,
    pub days_back: u32,
    pub timezone: String,
}

impl MarketDataRequest {
    pub fn from_config(config: &ConfigModel, timezone: &str) -> Self {
        Self {
            symbol: config.symbol.clone(),
            interval: config.interval,
            days_back: config.days_back,
            timezone: timezone.to_string(),
        }
    }
}

/// POST body of a backtest run. Take-profit and stop-loss are fractions here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestParams {
    pub days_back: u32,
    pub timezone: String,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub fast_length: u32,
    pub slow_length: u32,
    pub signal_smoothing: u32,
}

impl Default for BacktestParams {
    fn default() -> Self {
        Self {
            days_back: 7,
            timezone: DEFAULT_TIMEZONE.to_string(),
            take_profit: 0.02,
            stop_loss: 0.01,
            fast_length: 12,
            slow_length: 26,
            signal_smoothing: 9,
        }
    }
}

impl BacktestParams {
    /// Convert percentage units in `config` to the backend's fractions.
    pub fn from_config(config: &ConfigModel, timezone: &str) -> Self {
        Self {
            days_back: config.days_back,
            timezone: timezone.to_string(),
            take_profit: config.take_profit_fraction(),
            stop_loss: config.stop_loss_fraction(),
            fast_length: config.fast_length,
            slow_length: config.slow_length,
            signal_smoothing: config.signal_smoothing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamRequest {
    pub symbol: String,
    pub interval: Interval,
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketData {
    pub dataset: MarketDataset,
    pub indicators: IndicatorSet,
    pub metadata: Option<MarketMetadata>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestOutcome {
    pub trades: Vec<Trade>,
    /// `None` when the backend omitted the block.
    pub performance: Option<PerformanceSummary>,
    pub strategy_name: Option<String>,
}

impl BacktestOutcome {
    /// Reported performance, or one computed from the trades.
    pub fn performance_or_derived(&self) -> PerformanceSummary {
        self.performance
            .clone()
            .unwrap_or_else(|| PerformanceSummary::from_trades(&self.trades))
    }
}

pub struct BackendGateway<T: Transport> {
    transport: T,
}

impl<T: Transport> BackendGateway<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ── Data-bearing calls ─────────────────────────────────────────────

    pub fn fetch_market_data(&self, req: &MarketDataRequest) -> Result<MarketData, GatewayError> {
        let value = self.transport.get_json(
            &["api", "data", req.symbol.as_str(), req.interval.as_str()],
            &[
                ("days", req.days_back.to_string()),
                ("timezone", req.timezone.clone()),
            ],
        )?;
        let body: MarketDataBody = decode_envelope(value)?;
        let raw = body
            .data
            .ok_or_else(|| GatewayError::Contract("market data response has no data".into()))?;
        let metadata = raw.metadata.clone();
        let dataset = convert::market_dataset(raw)?;
        let indicators = convert::indicator_set(&body.indicators)?;
        debug!("fetched {} bars for {} {}", dataset.len(), req.symbol, req.interval);
        Ok(MarketData {
            dataset,
            indicators,
            metadata,
        })
    }

    pub fn run_backtest(
        &self,
        symbol: &str,
        interval: Interval,
        params: &BacktestParams,
    ) -> Result<BacktestOutcome, GatewayError> {
        let body = serde_json::to_value(params).map_err(|e| GatewayError::Contract(e.to_string()))?;
        let value = self
            .transport
            .post_json(&["api", "backtest", symbol, interval.as_str()], &body)?;
        let body: BacktestBody = decode_envelope(value)?;
        let results = body
            .results
            .ok_or_else(|| GatewayError::Contract("backtest response has no results".into()))?;
        let trades = convert::trades(results.trades)?;
        debug!("backtest {symbol} {interval}: {} trades", trades.len());
        Ok(BacktestOutcome {
            trades,
            performance: results.performance.as_ref().map(convert::performance),
            strategy_name: results.strategy_name,
        })
    }

    pub fn start_stream(&self, req: &StreamRequest) -> Result<(), GatewayError> {
        let body = serde_json::to_value(StreamStartBody {
            symbol: &req.symbol,
            interval: req.interval.as_str(),
            timezone: &req.timezone,
        })
        .map_err(|e| GatewayError::Contract(e.to_string()))?;
        let value = self.transport.post_json(&["api", "stream", "start"], &body)?;
        decode_envelope::<Value>(value).map(|_| ())
    }

    pub fn stop_stream(&self) -> Result<(), GatewayError> {
        let value = self
            .transport
            .post_json(&["api", "stream", "stop"], &Value::Object(Default::default()))?;
        decode_envelope::<Value>(value).map(|_| ())
    }

    // ── Metadata ───────────────────────────────────────────────────────

    /// Health body as the backend defines it. Not an envelope.
    pub fn health(&self) -> Result<HealthStatus, GatewayError> {
        let value = self.transport.get_json(&["api", "health"], &[])?;
        serde_json::from_value(value).map_err(|e| GatewayError::Contract(e.to_string()))
    }

    /// Symbol list, empty on any failure.
    pub fn list_symbols(&self) -> Vec<String> {
        self.metadata::<SymbolsBody>(&["api", "symbols"], Operation::ListSymbols)
            .symbols
    }

    /// Interval options, empty on any failure.
    pub fn list_intervals(&self) -> Vec<IntervalOption> {
        self.metadata::<IntervalsBody>(&["api", "intervals"], Operation::ListIntervals)
            .intervals
    }

    fn metadata<B: DeserializeOwned + Default>(&self, path: &[&str], op: Operation) -> B {
        let result = self
            .transport
            .get_json(path, &[])
            .map_err(GatewayError::from)
            .and_then(|v| serde_json::from_value(v).map_err(|e| GatewayError::Contract(e.to_string())));
        match result {
            Ok(body) => body,
            Err(e) => {
                warn!("{op} failed, using empty list: {e}");
                B::default()
            }
        }
    }
}

/// Check `success`, then decode the rest of the body as `B`.
fn decode_envelope<B: DeserializeOwned>(value: Value) -> Result<B, GatewayError> {
    let envelope: Envelope = serde_json::from_value(value.clone())
        .map_err(|e| GatewayError::Contract(e.to_string()))?;
    if !envelope.success {
        return Err(GatewayError::Domain(envelope.error));
    }
    serde_json::from_value(value).map_err(|e| GatewayError::Contract(e.to_string()))
}
