//! Domain types for macdscope

pub mod config;
pub mod indicator;
pub mod market;
pub mod performance;
pub mod timestamp;
pub mod trade;

pub use config::{ConfigError, ConfigModel, ConfigPatch, Interval, MAX_DAYS_BACK};
pub use indicator::{IndicatorSet, LinePoint, LineSeries, OscillatorPoint, OscillatorSeries};
pub use market::{DatasetError, MarketDataset, Ohlcv};
pub use performance::PerformanceSummary;
pub use timestamp::{Timestamp, TimestampError};
pub use trade::{ExitReason, Trade};

/// Symbol type alias
pub type Symbol = String;
