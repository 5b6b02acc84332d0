//! Price view — candles, trend overlay, entry and exit markers.

use crate::classify::Tone;
use crate::domain::{IndicatorSet, MarketDataset, Trade};

use super::trace::{LineRole, Marker, MarkerRole, Trace};
use super::OverlayOptions;

/// Build the price view traces.
///
/// Returns `[]` when either the dataset or the indicators are absent.
/// Otherwise: candles, the trend line if it has at least one point, then one
/// entry-marker trace and one exit-marker trace when there are trades.
pub fn build_price_view(
    dataset: Option<&MarketDataset>,
    indicators: Option<&IndicatorSet>,
    trades: &[Trade],
    opts: &OverlayOptions,
) -> Vec<Trace> {
    let (Some(dataset), Some(indicators)) = (dataset, indicators) else {
        return Vec::new();
    };

    let mut traces = Vec::with_capacity(4);
    traces.push(Trace::Candles {
        points: dataset.iter().map(|(t, b)| (t, *b)).collect(),
    });

    if let Some(trend) = indicators.trend(&opts.trend_series) {
        if !trend.is_empty() {
            traces.push(Trace::Line {
                role: LineRole::Trend,
                name: trend.name.clone(),
                points: trend.points().iter().map(|p| (p.timestamp, p.value)).collect(),
            });
        }
    }

    if !trades.is_empty() {
        traces.push(Trace::Markers {
            role: MarkerRole::Entry,
            markers: trades.iter().map(entry_marker).collect(),
        });
        traces.push(Trace::Markers {
            role: MarkerRole::Exit,
            markers: trades.iter().map(exit_marker).collect(),
        });
    }
    traces
}

fn entry_marker(trade: &Trade) -> Marker {
    Marker {
        timestamp: trade.entry_date,
        y: trade.entry_price,
        tone: Tone::Neutral,
        label: Some(format!("entry @ {}", trade.entry_price)),
    }
}

/// Exit marker: profit/loss by `return_pct > 0`, label `"{reason} {return}"`.
pub fn exit_marker(trade: &Trade) -> Marker {
    let tone = if trade.return_pct > 0.0 {
        Tone::Positive
    } else {
        Tone::Negative
    };
    Marker {
        timestamp: trade.exit_date,
        y: trade.exit_price,
        tone,
        label: Some(format!("{} {}", trade.exit_reason, trade.return_label())),
    }
}
