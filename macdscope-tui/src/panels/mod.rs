//! TUI panels for the dashboard views
//!
//! - PriceChart: candles, trend line, entry/exit markers
//! - OscillatorChart: histogram, value/signal lines, crossover markers
//! - TradeTape: list of backtest trades
//! - Performance: classified performance readings
//! - Help: key bindings

pub mod help;
pub mod oscillator_chart;
pub mod performance;
pub mod price_chart;
pub mod trade_tape;

pub use help::HelpPanel;
pub use oscillator_chart::OscillatorChartPanel;
pub use performance::PerformancePanel;
pub use price_chart::PriceChartPanel;
pub use trade_tape::TradeTapePanel;

use macdscope_core::domain::Timestamp;

/// Map a value to a row in the plot area (0 = top).
pub(crate) fn value_to_row(value: f64, lo: f64, hi: f64, plot_height: u16) -> u16 {
    if (hi - lo).abs() < 1e-12 || plot_height == 0 {
        return 0;
    }
    let frac = (value - lo) / (hi - lo);
    let y = plot_height.saturating_sub(1) as f64 * (1.0 - frac);
    y.round().max(0.0).min(plot_height.saturating_sub(1) as f64) as u16
}

/// Column of the first visible bar at or after `t`; `None` when `t` falls outside the window.
pub(crate) fn column(stamps: &[Timestamp], t: &Timestamp) -> Option<usize> {
    if stamps.first().is_some_and(|first| t < first) {
        return None;
    }
    let i = stamps.partition_point(|s| s < t);
    (i < stamps.len()).then_some(i)
}

/// Axis label with precision suited to the magnitude (sub-cent coins need more digits).
pub(crate) fn axis_label(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1000.0 {
        format!("{value:.1}")
    } else if abs >= 1.0 {
        format!("{value:.2}")
    } else {
        format!("{value:.5}")
    }
}

/// Pad a `(lo, hi)` range by 5% (or 1.0 when flat).
pub(crate) fn padded((lo, hi): (f64, f64)) -> (f64, f64) {
    let range = hi - lo;
    let pad = if range > 0.0 { range * 0.05 } else { 1.0 };
    (lo - pad, hi + pad)
}
