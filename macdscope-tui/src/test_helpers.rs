//! Test helpers for creating mock data

use std::sync::Arc;

use ratatui::buffer::Buffer;
use serde_json::Value;

use macdscope_client::{Settings, Transport, TransportError};
use macdscope_core::domain::{
    ExitReason, IndicatorSet, LinePoint, LineSeries, MarketDataset, Ohlcv, OscillatorPoint,
    OscillatorSeries, Timestamp, Trade,
};

use crate::app::AppState;

/// Every call fails as if the backend were down.
pub struct OfflineTransport;

impl Transport for OfflineTransport {
    fn get_json(&self, _path: &[&str], _query: &[(&str, String)]) -> Result<Value, TransportError> {
        Err(TransportError::Connect("offline".into()))
    }

    fn post_json(&self, _path: &[&str], _body: &Value) -> Result<Value, TransportError> {
        Err(TransportError::Connect("offline".into()))
    }
}

pub fn offline_app() -> AppState {
    AppState::new(Settings::default(), Arc::new(OfflineTransport))
}

/// 2024-01-01T00:00Z plus `minute` minutes.
pub fn ts(minute: usize) -> Timestamp {
    Timestamp::from_millis(1_704_067_200_000 + minute as i64 * 60_000).unwrap()
}

/// `n` five-minute bars, alternating up and down around a rising base.
pub fn sample_dataset(n: usize) -> MarketDataset {
    let stamps = (0..n).map(|i| ts(i * 5)).collect();
    let bars = (0..n)
        .map(|i| {
            let base = 100.0 + i as f64;
            let (open, close) = if i % 2 == 0 {
                (base, base + 0.8)
            } else {
                (base + 0.8, base)
            };
            Ohlcv {
                open,
                high: base + 1.0,
                low: base - 0.5,
                close,
                volume: 1000.0,
            }
        })
        .collect();
    MarketDataset::new(stamps, bars).unwrap()
}

/// An `EMA_200` over every bar and a MACD that crosses zero halfway through.
pub fn sample_indicators(n: usize) -> IndicatorSet {
    let ema = (0..n)
        .map(|i| LinePoint {
            timestamp: ts(i * 5),
            value: 100.0 + i as f64 * 0.9,
        })
        .collect();
    let macd = (0..n)
        .map(|i| OscillatorPoint {
            timestamp: ts(i * 5),
            value: i as f64 - (n / 2) as f64,
            signal: 0.0,
        })
        .collect();
    IndicatorSet::default()
        .with_line(LineSeries::new("EMA_200", ema).unwrap())
        .with_oscillator(OscillatorSeries::new("MACD", macd).unwrap())
}

pub fn sample_trades() -> Vec<Trade> {
    vec![
        Trade {
            entry_date: ts(5),
            exit_date: ts(15),
            entry_price: 101.0,
            exit_price: 103.02,
            return_pct: 0.02,
            exit_reason: ExitReason::TakeProfit,
            position_size: 1.0,
        },
        Trade {
            entry_date: ts(25),
            exit_date: ts(30),
            entry_price: 105.0,
            exit_price: 103.635,
            return_pct: -0.013,
            exit_reason: ExitReason::StopLoss,
            position_size: 1.0,
        },
    ]
}

/// Every cell's symbol, row by row.
pub fn buffer_text(buf: &Buffer) -> String {
    let area = buf.area;
    let mut content = String::new();
    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell((x, y)) {
                content.push_str(cell.symbol());
            }
        }
        content.push('\n');
    }
    content
}
