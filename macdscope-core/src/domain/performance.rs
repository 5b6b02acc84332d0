//! PerformanceSummary — aggregate statistics over a trade list.

use serde::{Deserialize, Serialize};

use super::trade::{ExitReason, Trade};

/// Annualization factor applied to the per-trade Sharpe ratio.
pub const SHARPE_ANNUALIZATION: f64 = 252.0;

/// Aggregate statistics. Percent-valued fields are already scaled by 100.
///
/// `max_drawdown` is a non-negative magnitude (`12.5` = a 12.5% peak-to-trough loss).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceSummary {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    pub total_return: f64,
    pub average_return: f64,
    pub best_trade: f64,
    pub worst_trade: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub take_profit_hits: usize,
    pub stop_loss_hits: usize,
}

impl PerformanceSummary {
    /// Compute the summary the same way the backtester does.
    ///
    /// Breakeven trades count as neither winners nor losers.
    pub fn from_trades(trades: &[Trade]) -> Self {
        if trades.is_empty() {
            return Self::default();
        }

        let returns: Vec<f64> = trades.iter().map(|t| t.return_pct).collect();
        let n = returns.len() as f64;
        let winning = trades.iter().filter(|t| t.is_winner()).count();
        let losing = trades.iter().filter(|t| t.is_loser()).count();

        let sum: f64 = returns.iter().sum();
        let mean = sum / n;
        let best = returns.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let worst = returns.iter().copied().fold(f64::INFINITY, f64::min);

        let std = if returns.len() > 1 {
            (returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n).sqrt()
        } else {
            0.0
        };
        let sharpe = if std > 0.0 {
            mean / std * SHARPE_ANNUALIZATION.sqrt()
        } else {
            0.0
        };

        Self {
            total_trades: trades.len(),
            winning_trades: winning,
            losing_trades: losing,
            win_rate: winning as f64 / n * 100.0,
            total_return: sum * 100.0,
            average_return: mean * 100.0,
            best_trade: best * 100.0,
            worst_trade: worst * 100.0,
            max_drawdown: max_drawdown_pct(&returns),
            sharpe_ratio: sharpe,
            take_profit_hits: count_reason(trades, &ExitReason::TakeProfit),
            stop_loss_hits: count_reason(trades, &ExitReason::StopLoss),
        }
    }

    pub fn breakeven_trades(&self) -> usize {
        self.total_trades
            .saturating_sub(self.winning_trades + self.losing_trades)
    }
}

fn count_reason(trades: &[Trade], reason: &ExitReason) -> usize {
    trades.iter().filter(|t| &t.exit_reason == reason).count()
}

/// Largest peak-to-trough decline of the compounded equity path, in percent.
fn max_drawdown_pct(returns: &[f64]) -> f64 {
    let mut equity = 1.0;
    let mut peak = f64::NEG_INFINITY;
    let mut worst: f64 = 0.0;
    for r in returns {
        equity *= 1.0 + r;
        peak = peak.max(equity);
        if peak > 0.0 {
            worst = worst.min((equity - peak) / peak);
        }
    }
    worst.abs() * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Timestamp;

    fn trade(ret: f64, reason: ExitReason) -> Trade {
        Trade {
            entry_date: Timestamp::parse("2024-01-01 00:00:00").unwrap(),
            exit_date: Timestamp::parse("2024-01-01 01:00:00").unwrap(),
            entry_price: 100.0,
            exit_price: 100.0 * (1.0 + ret),
            return_pct: ret,
            exit_reason: reason,
            position_size: 1.0,
        }
    }

    #[test]
    fn empty_trades_yield_zeroes() {
        let s = PerformanceSummary::from_trades(&[]);
        assert_eq!(s, PerformanceSummary::default());
    }

    #[test]
    fn counts_and_rates() {
        let trades = vec![
            trade(0.02, ExitReason::TakeProfit),
            trade(-0.01, ExitReason::StopLoss),
            trade(0.0, ExitReason::EndOfPeriod),
            trade(0.02, ExitReason::TakeProfit),
        ];
        let s = PerformanceSummary::from_trades(&trades);
        assert_eq!(s.total_trades, 4);
        assert_eq!(s.winning_trades, 2);
        assert_eq!(s.losing_trades, 1);
        assert_eq!(s.breakeven_trades(), 1);
        assert!(s.winning_trades + s.losing_trades <= s.total_trades);
        assert!((s.win_rate - 50.0).abs() < 1e-9);
        assert!((s.total_return - 3.0).abs() < 1e-9);
        assert!((s.average_return - 0.75).abs() < 1e-9);
        assert!((s.best_trade - 2.0).abs() < 1e-9);
        assert!((s.worst_trade + 1.0).abs() < 1e-9);
        assert_eq!(s.take_profit_hits, 2);
        assert_eq!(s.stop_loss_hits, 1);
    }

    #[test]
    fn drawdown_is_positive_magnitude() {
        // 1.10 -> 0.99 -> 0.891: peak 1.10, trough 0.891 => 19%
        let trades = vec![
            trade(0.10, ExitReason::TakeProfit),
            trade(-0.10, ExitReason::StopLoss),
            trade(-0.10, ExitReason::StopLoss),
        ];
        let s = PerformanceSummary::from_trades(&trades);
        assert!((s.max_drawdown - 19.0).abs() < 1e-9);
    }

    #[test]
    fn no_drawdown_is_positive_zero() {
        let trades = vec![
            trade(0.02, ExitReason::TakeProfit),
            trade(0.02, ExitReason::TakeProfit),
        ];
        let s = PerformanceSummary::from_trades(&trades);
        assert_eq!(s.max_drawdown, 0.0);
        assert!(!s.max_drawdown.is_sign_negative());
    }

    #[test]
    fn sharpe_zero_when_no_dispersion() {
        let trades = vec![trade(0.01, ExitReason::TakeProfit); 3];
        assert_eq!(PerformanceSummary::from_trades(&trades).sharpe_ratio, 0.0);
    }

    #[test]
    fn sharpe_annualized() {
        let trades = vec![
            trade(0.02, ExitReason::TakeProfit),
            trade(-0.01, ExitReason::StopLoss),
        ];
        // mean 0.005, population std 0.015
        let expected = 0.005 / 0.015 * 252f64.sqrt();
        let s = PerformanceSummary::from_trades(&trades);
        assert!((s.sharpe_ratio - expected).abs() < 1e-9);
    }
}
