//! MarketDataset — the candle series a fetch returns.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::timestamp::Timestamp;

/// One OHLCV record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ohlcv {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Ohlcv {
    /// `low <= {open, close} <= high`, all finite and non-negative.
    pub fn is_sane(&self) -> bool {
        let fields = [self.open, self.high, self.low, self.close, self.volume];
        if fields.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return false;
        }
        self.low <= self.open
            && self.low <= self.close
            && self.open <= self.high
            && self.close <= self.high
    }

    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DatasetError {
    #[error("{timestamps} timestamps but {bars} OHLCV rows")]
    LengthMismatch { timestamps: usize, bars: usize },

    #[error("timestamps not strictly increasing at index {index}")]
    NotIncreasing { index: usize },

    #[error("OHLCV row {index} violates low <= open/close <= high")]
    InsaneBar { index: usize },
}

/// Strictly time-ordered candles. Deserialization goes through [`MarketDataset::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDataset")]
pub struct MarketDataset {
    timestamps: Vec<Timestamp>,
    bars: Vec<Ohlcv>,
}

#[derive(Deserialize)]
struct RawDataset {
    timestamps: Vec<Timestamp>,
    bars: Vec<Ohlcv>,
}

impl TryFrom<RawDataset> for MarketDataset {
    type Error = DatasetError;

    fn try_from(raw: RawDataset) -> Result<Self, Self::Error> {
        Self::new(raw.timestamps, raw.bars)
    }
}

impl MarketDataset {
    pub fn new(timestamps: Vec<Timestamp>, bars: Vec<Ohlcv>) -> Result<Self, DatasetError> {
        if timestamps.len() != bars.len() {
            return Err(DatasetError::LengthMismatch {
                timestamps: timestamps.len(),
                bars: bars.len(),
            });
        }
        if let Some(index) = first_non_increasing(&timestamps) {
            return Err(DatasetError::NotIncreasing { index });
        }
        if let Some(index) = bars.iter().position(|b| !b.is_sane()) {
            return Err(DatasetError::InsaneBar { index });
        }
        Ok(Self { timestamps, bars })
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn timestamps(&self) -> &[Timestamp] {
        &self.timestamps
    }

    pub fn bars(&self) -> &[Ohlcv] {
        &self.bars
    }

    pub fn iter(&self) -> impl Iterator<Item = (Timestamp, &Ohlcv)> + '_ {
        self.timestamps.iter().copied().zip(self.bars.iter())
    }

    pub fn first_timestamp(&self) -> Option<Timestamp> {
        self.timestamps.first().copied()
    }

    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.timestamps.last().copied()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    /// (lowest low, highest high) across the dataset.
    pub fn price_range(&self) -> Option<(f64, f64)> {
        if self.bars.is_empty() {
            return None;
        }
        let low = self.bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let high = self.bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        Some((low, high))
    }
}

/// Index of the first element that is not strictly greater than its predecessor.
pub(crate) fn first_non_increasing(stamps: &[Timestamp]) -> Option<usize> {
    stamps
        .windows(2)
        .position(|w| w[1] <= w[0])
        .map(|i| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    fn bar(open: f64, high: f64, low: f64, close: f64) -> Ohlcv {
        Ohlcv { open, high, low, close, volume: 10.0 }
    }

    #[test]
    fn builds_valid_dataset() {
        let ds = MarketDataset::new(
            vec![ts("2024-01-01 00:00:00"), ts("2024-01-01 00:05:00")],
            vec![bar(1.0, 1.2, 0.9, 1.1), bar(1.1, 1.3, 1.0, 1.05)],
        )
        .unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.last_close(), Some(1.05));
        assert_eq!(ds.price_range(), Some((0.9, 1.3)));
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = MarketDataset::new(vec![ts("2024-01-01")], vec![]).unwrap_err();
        assert_eq!(err, DatasetError::LengthMismatch { timestamps: 1, bars: 0 });
    }

    #[test]
    fn rejects_duplicate_timestamps() {
        let err = MarketDataset::new(
            vec![ts("2024-01-01 00:00:00"), ts("2024-01-01 00:00:00")],
            vec![bar(1.0, 1.0, 1.0, 1.0), bar(1.0, 1.0, 1.0, 1.0)],
        )
        .unwrap_err();
        assert_eq!(err, DatasetError::NotIncreasing { index: 1 });
    }

    #[test]
    fn rejects_insane_bar() {
        let err = MarketDataset::new(vec![ts("2024-01-01")], vec![bar(1.0, 0.8, 0.9, 1.0)])
            .unwrap_err();
        assert_eq!(err, DatasetError::InsaneBar { index: 0 });
    }

    #[test]
    fn decoding_validates_like_new() {
        let ok = r#"{"timestamps":["2024-01-01 00:00:00","2024-01-01 00:05:00"],
            "bars":[{"open":1.0,"high":1.2,"low":0.9,"close":1.1,"volume":1.0},
                    {"open":1.1,"high":1.3,"low":1.0,"close":1.05,"volume":1.0}]}"#;
        let ds: MarketDataset = serde_json::from_str(ok).unwrap();
        assert_eq!(ds.len(), 2);

        let unordered = r#"{"timestamps":["2024-01-01 00:05:00","2024-01-01 00:00:00"],
            "bars":[{"open":1.0,"high":1.2,"low":0.9,"close":1.1,"volume":1.0},
                    {"open":1.1,"high":1.3,"low":1.0,"close":1.05,"volume":1.0}]}"#;
        let err = serde_json::from_str::<MarketDataset>(unordered).unwrap_err();
        assert!(err.to_string().contains("not strictly increasing"));

        let short = r#"{"timestamps":["2024-01-01 00:00:00"],"bars":[]}"#;
        let err = serde_json::from_str::<MarketDataset>(short).unwrap_err();
        assert!(err.to_string().contains("1 timestamps but 0 OHLCV rows"));
    }

    #[test]
    fn nan_bar_is_not_sane() {
        assert!(!bar(f64::NAN, 1.0, 1.0, 1.0).is_sane());
    }
}
