//! Renderable trace geometry. Renderers only read these; they never see the raw domain types.

use serde::Serialize;

use crate::classify::Tone;
use crate::domain::{Ohlcv, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineRole {
    Trend,
    Oscillator,
    Signal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerRole {
    Entry,
    Exit,
    Crossover,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub timestamp: Timestamp,
    pub y: f64,
    pub tone: Tone,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBar {
    pub timestamp: Timestamp,
    pub value: f64,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trace {
    Candles {
        points: Vec<(Timestamp, Ohlcv)>,
    },
    Line {
        role: LineRole,
        name: String,
        points: Vec<(Timestamp, f64)>,
    },
    Markers {
        role: MarkerRole,
        markers: Vec<Marker>,
    },
    Histogram {
        bars: Vec<HistogramBar>,
    },
}

impl Trace {
    /// Number of plotted points.
    pub fn len(&self) -> usize {
        match self {
            Trace::Candles { points } => points.len(),
            Trace::Line { points, .. } => points.len(),
            Trace::Markers { markers, .. } => markers.len(),
            Trace::Histogram { bars } => bars.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn markers(&self, role: MarkerRole) -> Option<&[Marker]> {
        match self {
            Trace::Markers { role: r, markers } if *r == role => Some(markers),
            _ => None,
        }
    }

    pub fn line(&self, role: LineRole) -> Option<&[(Timestamp, f64)]> {
        match self {
            Trace::Line { role: r, points, .. } if *r == role => Some(points),
            _ => None,
        }
    }

    /// (min, max) of every y-value in the trace.
    pub fn y_range(&self) -> Option<(f64, f64)> {
        let values: Vec<f64> = match self {
            Trace::Candles { points } => points
                .iter()
                .flat_map(|(_, b)| [b.low, b.high])
                .collect(),
            Trace::Line { points, .. } => points.iter().map(|(_, v)| *v).collect(),
            Trace::Markers { markers, .. } => markers.iter().map(|m| m.y).collect(),
            Trace::Histogram { bars } => bars.iter().map(|b| b.value).collect(),
        };
        if values.is_empty() {
            return None;
        }
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some((lo, hi))
    }
}

/// Combined y-range over several traces.
pub fn y_range(traces: &[Trace]) -> Option<(f64, f64)> {
    traces
        .iter()
        .filter_map(Trace::y_range)
        .reduce(|(a_lo, a_hi), (b_lo, b_hi)| (a_lo.min(b_lo), a_hi.max(b_hi)))
}
