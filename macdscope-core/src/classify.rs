//! MetricClassifier — maps performance figures to a presentation tone.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::PerformanceSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tone::Positive => "positive",
            Tone::Negative => "negative",
            Tone::Neutral => "neutral",
        })
    }
}

/// `value > threshold` is positive, `value < threshold` negative, otherwise neutral.
///
/// NaN compares neither way and is neutral.
pub fn classify(value: f64, threshold: f64) -> Tone {
    if value > threshold {
        Tone::Positive
    } else if value < threshold {
        Tone::Negative
    } else {
        Tone::Neutral
    }
}

/// Statistics shown on the performance panel, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    TotalReturn,
    WinRate,
    TotalTrades,
    WinningTrades,
    LosingTrades,
    AverageReturn,
    BestTrade,
    WorstTrade,
    SharpeRatio,
    MaxDrawdown,
    TakeProfitHits,
    StopLossHits,
}

impl Metric {
    pub const ALL: [Metric; 12] = [
        Metric::TotalReturn,
        Metric::WinRate,
        Metric::TotalTrades,
        Metric::WinningTrades,
        Metric::LosingTrades,
        Metric::AverageReturn,
        Metric::BestTrade,
        Metric::WorstTrade,
        Metric::SharpeRatio,
        Metric::MaxDrawdown,
        Metric::TakeProfitHits,
        Metric::StopLossHits,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Metric::TotalReturn => "Total Return",
            Metric::WinRate => "Win Rate",
            Metric::TotalTrades => "Total Trades",
            Metric::WinningTrades => "Winning Trades",
            Metric::LosingTrades => "Losing Trades",
            Metric::AverageReturn => "Avg Return",
            Metric::BestTrade => "Best Trade",
            Metric::WorstTrade => "Worst Trade",
            Metric::SharpeRatio => "Sharpe Ratio",
            Metric::MaxDrawdown => "Max Drawdown",
            Metric::TakeProfitHits => "Take Profit Hits",
            Metric::StopLossHits => "Stop Loss Hits",
        }
    }

    /// Raw value as presented (percent for return-like metrics).
    pub fn value(self, perf: &PerformanceSummary) -> f64 {
        match self {
            Metric::TotalReturn => perf.total_return,
            Metric::WinRate => perf.win_rate,
            Metric::TotalTrades => perf.total_trades as f64,
            Metric::WinningTrades => perf.winning_trades as f64,
            Metric::LosingTrades => perf.losing_trades as f64,
            Metric::AverageReturn => perf.average_return,
            Metric::BestTrade => perf.best_trade,
            Metric::WorstTrade => perf.worst_trade,
            Metric::SharpeRatio => perf.sharpe_ratio,
            Metric::MaxDrawdown => perf.max_drawdown,
            Metric::TakeProfitHits => perf.take_profit_hits as f64,
            Metric::StopLossHits => perf.stop_loss_hits as f64,
        }
    }

    pub fn tone(self, value: f64) -> Tone {
        match self {
            Metric::TotalReturn | Metric::AverageReturn | Metric::BestTrade | Metric::WorstTrade => {
                classify(value, 0.0)
            }
            Metric::WinRate => classify(value, 50.0),
            Metric::SharpeRatio => classify(value, 1.0),
            // drawdown magnitude below 10% reads as good
            Metric::MaxDrawdown => classify(-value, -10.0),
            Metric::TotalTrades
            | Metric::WinningTrades
            | Metric::LosingTrades
            | Metric::TakeProfitHits
            | Metric::StopLossHits => Tone::Neutral,
        }
    }

    pub fn format(self, value: f64) -> String {
        match self {
            Metric::TotalReturn | Metric::AverageReturn | Metric::BestTrade | Metric::WorstTrade => {
                format!("{value:+.2}%")
            }
            Metric::WinRate => format!("{value:.1}%"),
            Metric::MaxDrawdown => format!("-{:.2}%", value.abs()),
            Metric::SharpeRatio => format!("{value:.2}"),
            _ => format!("{value:.0}"),
        }
    }
}

/// One classified row of the performance panel.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub metric: Metric,
    pub value: f64,
    pub tone: Tone,
}

impl Reading {
    pub fn formatted(&self) -> String {
        self.metric.format(self.value)
    }
}

pub fn readings(perf: &PerformanceSummary) -> Vec<Reading> {
    Metric::ALL
        .iter()
        .map(|&metric| {
            let value = metric.value(perf);
            Reading {
                metric,
                value,
                tone: metric.tone(value),
            }
        })
        .collect()
}
