//! Wire payloads → domain types.
//!
//! Shape violations become [`GatewayError::Contract`].

use std::collections::BTreeMap;

use log::debug;

use macdscope_core::domain::{
    ExitReason, IndicatorSet, LinePoint, LineSeries, MarketDataset, Ohlcv, OscillatorPoint,
    OscillatorSeries, PerformanceSummary, Timestamp, Trade,
};

use crate::error::GatewayError;
use crate::wire::{RawIndicators, RawMarketData, RawPerformance, RawSeries, RawTrade};

/// Series keys that mark an indicator group as the oscillator.
pub const OSCILLATOR_VALUE: &str = "MACD";
pub const OSCILLATOR_SIGNAL: &str = "Signal";

fn contract(msg: impl Into<String>) -> GatewayError {
    GatewayError::Contract(msg.into())
}

pub fn market_dataset(raw: RawMarketData) -> Result<MarketDataset, GatewayError> {
    let bars = raw
        .ohlcv
        .iter()
        .map(|r| Ohlcv {
            open: r.open,
            high: r.high,
            low: r.low,
            close: r.close,
            volume: r.volume.unwrap_or(0.0),
        })
        .collect();
    MarketDataset::new(raw.timestamps, bars).map_err(|e| contract(format!("market data: {e}")))
}

/// Non-null, finite `(timestamp, value)` pairs of a raw series.
fn present_points(name: &str, raw: &RawSeries) -> Result<Vec<(Timestamp, f64)>, GatewayError> {
    if raw.values.len() != raw.timestamps.len() {
        return Err(contract(format!(
            "series {name}: {} values but {} timestamps",
            raw.values.len(),
            raw.timestamps.len()
        )));
    }
    Ok(raw
        .timestamps
        .iter()
        .zip(&raw.values)
        .filter_map(|(t, v)| v.filter(|v| v.is_finite()).map(|v| (*t, v)))
        .collect())
}

/// Group containing both an oscillator value and a signal series becomes the
/// oscillator; every series of every other group becomes a line. The
/// oscillator's histogram is recomputed, not read.
pub fn indicator_set(raw: &RawIndicators) -> Result<IndicatorSet, GatewayError> {
    let mut set = IndicatorSet::default();
    for (group, series) in raw {
        match (series.get(OSCILLATOR_VALUE), series.get(OSCILLATOR_SIGNAL)) {
            (Some(value), Some(signal)) if set.oscillator.is_none() => {
                set.oscillator = Some(oscillator(group, value, signal)?);
            }
            _ => {
                for (name, raw_series) in series {
                    let points = present_points(name, raw_series)?
                        .into_iter()
                        .map(|(timestamp, value)| LinePoint { timestamp, value })
                        .collect();
                    let line = LineSeries::new(name.clone(), points)
                        .map_err(|e| contract(format!("series {name}: {e}")))?;
                    set = set.with_line(line);
                }
            }
        }
    }
    debug!(
        "decoded {} line series, oscillator: {}",
        set.lines.len(),
        set.oscillator.as_ref().map_or(0, |o| o.len())
    );
    Ok(set)
}

fn oscillator(group: &str, value: &RawSeries, signal: &RawSeries) -> Result<OscillatorSeries, GatewayError> {
    let signals: BTreeMap<Timestamp, f64> = present_points(OSCILLATOR_SIGNAL, signal)?
        .into_iter()
        .collect();
    let points = present_points(OSCILLATOR_VALUE, value)?
        .into_iter()
        .filter_map(|(timestamp, value)| {
            signals.get(&timestamp).map(|&signal| OscillatorPoint {
                timestamp,
                value,
                signal,
            })
        })
        .collect();
    OscillatorSeries::new(group, points).map_err(|e| contract(format!("oscillator {group}: {e}")))
}

pub fn trade(index: usize, raw: RawTrade) -> Result<Trade, GatewayError> {
    let (Some(exit_date), Some(exit_price)) = (raw.exit_date, raw.exit_price) else {
        return Err(contract(format!("trade {index} has no exit")));
    };
    if exit_date <= raw.entry_date {
        return Err(contract(format!("trade {index} exits before it enters")));
    }
    let return_pct = raw
        .return_pct
        .unwrap_or_else(|| Trade::implied_return(raw.entry_price, exit_price));
    Ok(Trade {
        entry_date: raw.entry_date,
        exit_date,
        entry_price: raw.entry_price,
        exit_price,
        return_pct,
        exit_reason: raw
            .exit_reason
            .as_deref()
            .map(ExitReason::parse)
            .unwrap_or_else(|| ExitReason::Other("unknown".into())),
        position_size: raw.position_size.unwrap_or(1.0),
    })
}

pub fn trades(raw: Vec<RawTrade>) -> Result<Vec<Trade>, GatewayError> {
    raw.into_iter().enumerate().map(|(i, t)| trade(i, t)).collect()
}

/// Drawdown is stored as a magnitude whatever sign the backend used.
pub fn performance(raw: &RawPerformance) -> PerformanceSummary {
    let count = |v: Option<u64>| v.unwrap_or(0) as usize;
    let pct = |v: Option<f64>| v.filter(|v| v.is_finite()).unwrap_or(0.0);
    PerformanceSummary {
        total_trades: count(raw.total_trades),
        winning_trades: count(raw.winning_trades),
        losing_trades: count(raw.losing_trades),
        win_rate: pct(raw.win_rate),
        total_return: pct(raw.total_return),
        average_return: pct(raw.average_return),
        best_trade: pct(raw.best_trade),
        worst_trade: pct(raw.worst_trade),
        max_drawdown: pct(raw.max_drawdown).abs(),
        sharpe_ratio: pct(raw.sharpe_ratio),
        take_profit_hits: count(raw.take_profit_hits),
        stop_loss_hits: count(raw.stop_loss_hits),
    }
}
