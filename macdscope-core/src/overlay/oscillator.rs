//! Oscillator view — value line, signal line, histogram, crossover markers.
//!
//! A trade's crossover marker lands on the first oscillator bar whose timestamp
//! is at or after the trade's entry. Trades entering after the last bar have no
//! marker.

use crate::classify::{classify, Tone};
use crate::domain::{OscillatorSeries, Timestamp, Trade};

use super::trace::{HistogramBar, LineRole, Marker, MarkerRole, Trace};

/// Index of the first timestamp `>= target`, scanning in order.
///
/// `None` when every timestamp precedes `target`.
pub fn align_index<'a, I>(timestamps: I, target: &Timestamp) -> Option<usize>
where
    I: IntoIterator<Item = &'a Timestamp>,
{
    timestamps.into_iter().position(|t| t >= target)
}

pub fn build_oscillator_view(oscillator: Option<&OscillatorSeries>, trades: &[Trade]) -> Vec<Trace> {
    let Some(osc) = oscillator.filter(|o| !o.is_empty()) else {
        return Vec::new();
    };
    let points = osc.points();

    let mut traces = vec![
        Trace::Line {
            role: LineRole::Oscillator,
            name: osc.name.clone(),
            points: points.iter().map(|p| (p.timestamp, p.value)).collect(),
        },
        Trace::Line {
            role: LineRole::Signal,
            name: "Signal".to_string(),
            points: points.iter().map(|p| (p.timestamp, p.signal)).collect(),
        },
        Trace::Histogram {
            bars: points
                .iter()
                .map(|p| {
                    let value = p.histogram();
                    HistogramBar {
                        timestamp: p.timestamp,
                        value,
                        tone: classify(value, 0.0),
                    }
                })
                .collect(),
        },
    ];

    if !trades.is_empty() {
        let markers = trades
            .iter()
            .filter_map(|trade| {
                let i = align_index(osc.timestamps(), &trade.entry_date)?;
                let p = &points[i];
                Some(Marker {
                    timestamp: p.timestamp,
                    y: p.value,
                    tone: if trade.is_winner() {
                        Tone::Positive
                    } else {
                        Tone::Negative
                    },
                    label: Some(format!("entry @ {}", trade.entry_price)),
                })
            })
            .collect();
        traces.push(Trace::Markers {
            role: MarkerRole::Crossover,
            markers,
        });
    }
    traces
}
