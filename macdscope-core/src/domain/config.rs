//! ConfigModel — what to fetch and which strategy parameters to backtest with.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bar durations the backend accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "3m")]
    M3,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "2h")]
    H2,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "6h")]
    H6,
    #[serde(rename = "8h")]
    H8,
    #[serde(rename = "12h")]
    H12,
    #[serde(rename = "1d")]
    D1,
}

impl Interval {
    pub const ALL: [Interval; 12] = [
        Interval::M1,
        Interval::M3,
        Interval::M5,
        Interval::M15,
        Interval::M30,
        Interval::H1,
        Interval::H2,
        Interval::H4,
        Interval::H6,
        Interval::H8,
        Interval::H12,
        Interval::D1,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Interval::M1 => "1m",
            Interval::M3 => "3m",
            Interval::M5 => "5m",
            Interval::M15 => "15m",
            Interval::M30 => "30m",
            Interval::H1 => "1h",
            Interval::H2 => "2h",
            Interval::H4 => "4h",
            Interval::H6 => "6h",
            Interval::H8 => "8h",
            Interval::H12 => "12h",
            Interval::D1 => "1d",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Interval::M1 => "1 Minute",
            Interval::M3 => "3 Minutes",
            Interval::M5 => "5 Minutes",
            Interval::M15 => "15 Minutes",
            Interval::M30 => "30 Minutes",
            Interval::H1 => "1 Hour",
            Interval::H2 => "2 Hours",
            Interval::H4 => "4 Hours",
            Interval::H6 => "6 Hours",
            Interval::H8 => "8 Hours",
            Interval::H12 => "12 Hours",
            Interval::D1 => "1 Day",
        }
    }

    pub fn minutes(self) -> u32 {
        match self {
            Interval::M1 => 1,
            Interval::M3 => 3,
            Interval::M5 => 5,
            Interval::M15 => 15,
            Interval::M30 => 30,
            Interval::H1 => 60,
            Interval::H2 => 120,
            Interval::H4 => 240,
            Interval::H6 => 360,
            Interval::H8 => 480,
            Interval::H12 => 720,
            Interval::D1 => 1440,
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|&i| i == self).unwrap_or(0)
    }

    pub fn next(self) -> Interval {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Interval {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|i| i.as_str() == s.trim())
            .ok_or_else(|| ConfigError::UnknownInterval(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("symbol must not be empty")]
    EmptySymbol,

    #[error("days_back must be within 1..=365, got {0}")]
    DaysBackOutOfRange(u32),

    #[error("{field} must be a positive percentage, got {value}")]
    NonPositivePercent { field: &'static str, value: f64 },

    #[error("{field} must be a positive length")]
    ZeroLength { field: &'static str },

    #[error("unknown interval '{0}'")]
    UnknownInterval(String),
}

pub const MAX_DAYS_BACK: u32 = 365;

/// Fetch and strategy configuration.
///
/// Take-profit and stop-loss are percentages (`2.0` = 2%). The backend expects
/// fractions; use [`ConfigModel::take_profit_fraction`] when building requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigModel {
    pub symbol: String,
    pub interval: Interval,
    pub days_back: u32,
    pub take_profit: f64,
    pub stop_loss: f64,
    pub fast_length: u32,
    pub slow_length: u32,
    pub signal_smoothing: u32,
}

impl Default for ConfigModel {
    fn default() -> Self {
        Self {
            symbol: "ROSEUSDT".to_string(),
            interval: Interval::M5,
            days_back: 7,
            take_profit: 2.0,
            stop_loss: 1.0,
            fast_length: 12,
            slow_length: 26,
            signal_smoothing: 9,
        }
    }
}

impl ConfigModel {
    /// Check field bounds. `fast_length < slow_length` is deliberately not checked.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::EmptySymbol);
        }
        if !(1..=MAX_DAYS_BACK).contains(&self.days_back) {
            return Err(ConfigError::DaysBackOutOfRange(self.days_back));
        }
        for (field, value) in [("take_profit", self.take_profit), ("stop_loss", self.stop_loss)] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::NonPositivePercent { field, value });
            }
        }
        for (field, value) in [
            ("fast_length", self.fast_length),
            ("slow_length", self.slow_length),
            ("signal_smoothing", self.signal_smoothing),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroLength { field });
            }
        }
        Ok(())
    }

    pub fn take_profit_fraction(&self) -> f64 {
        self.take_profit / 100.0
    }

    pub fn stop_loss_fraction(&self) -> f64 {
        self.stop_loss / 100.0
    }

    /// Apply a patch, returning the merged config if it validates.
    pub fn patched(&self, patch: &ConfigPatch) -> Result<ConfigModel, ConfigError> {
        let mut next = self.clone();
        if let Some(symbol) = &patch.symbol {
            next.symbol = symbol.trim().to_uppercase();
        }
        if let Some(interval) = patch.interval {
            next.interval = interval;
        }
        if let Some(days_back) = patch.days_back {
            next.days_back = days_back;
        }
        if let Some(v) = patch.take_profit {
            next.take_profit = v;
        }
        if let Some(v) = patch.stop_loss {
            next.stop_loss = v;
        }
        if let Some(v) = patch.fast_length {
            next.fast_length = v;
        }
        if let Some(v) = patch.slow_length {
            next.slow_length = v;
        }
        if let Some(v) = patch.signal_smoothing {
            next.signal_smoothing = v;
        }
        next.validate()?;
        Ok(next)
    }
}

/// Partial replacement of [`ConfigModel`] fields. Unknown fields fail to decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<Interval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_back: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fast_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slow_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal_smoothing: Option<u32>,
}

impl ConfigPatch {
    pub fn symbol(symbol: impl Into<String>) -> Self {
        Self {
            symbol: Some(symbol.into()),
            ..Self::default()
        }
    }

    pub fn interval(interval: Interval) -> Self {
        Self {
            interval: Some(interval),
            ..Self::default()
        }
    }

    pub fn days_back(days_back: u32) -> Self {
        Self {
            days_back: Some(days_back),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
