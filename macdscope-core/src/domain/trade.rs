//! Trade — one executed round trip reported by a backtest.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::timestamp::Timestamp;

/// Why a position was closed.
///
/// Backend labels vary in case and separators (`Take Profit`, `take-profit`);
/// they are normalized here and anything unrecognized is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
    EndOfPeriod,
    Other(String),
}

impl ExitReason {
    pub fn parse(raw: &str) -> Self {
        let key: String = raw
            .trim()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c.to_ascii_lowercase() })
            .collect();
        match key.as_str() {
            "take_profit" | "tp" => ExitReason::TakeProfit,
            "stop_loss" | "sl" => ExitReason::StopLoss,
            "end_of_period" | "end_of_data" => ExitReason::EndOfPeriod,
            _ => ExitReason::Other(raw.trim().to_string()),
        }
    }

    /// Canonical snake_case label; `Other` keeps the backend's text.
    pub fn label(&self) -> &str {
        match self {
            ExitReason::TakeProfit => "take_profit",
            ExitReason::StopLoss => "stop_loss",
            ExitReason::EndOfPeriod => "end_of_period",
            ExitReason::Other(s) => s,
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for ExitReason {
    fn from(raw: String) -> Self {
        ExitReason::parse(&raw)
    }
}

impl From<ExitReason> for String {
    fn from(reason: ExitReason) -> Self {
        reason.label().to_string()
    }
}

/// A closed long trade. `return_pct` is a signed fraction (`-0.013` = -1.3%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub entry_date: Timestamp,
    pub exit_date: Timestamp,
    pub entry_price: f64,
    pub exit_price: f64,
    pub return_pct: f64,
    pub exit_reason: ExitReason,
    #[serde(default = "default_position_size")]
    pub position_size: f64,
}

fn default_position_size() -> f64 {
    1.0
}

impl Trade {
    /// Long-direction return from entry to exit.
    pub fn implied_return(entry_price: f64, exit_price: f64) -> f64 {
        if entry_price == 0.0 {
            return 0.0;
        }
        (exit_price - entry_price) / entry_price
    }

    pub fn is_winner(&self) -> bool {
        self.return_pct > 0.0
    }

    pub fn is_loser(&self) -> bool {
        self.return_pct < 0.0
    }

    /// Return as a percentage string with sign, e.g. `-1.30%`.
    pub fn return_label(&self) -> String {
        format!("{:+.2}%", self.return_pct * 100.0)
    }

    pub fn holding(&self) -> chrono::Duration {
        self.exit_date.as_datetime() - self.entry_date.as_datetime()
    }
}
