//! OverlayBuilder — pure transformation of (dataset, indicators, trades) into trace geometry.
//!
//! Builders take borrowed inputs only and hold no state, so they can be called
//! from any thread.

pub mod oscillator;
pub mod price;
pub mod trace;

use serde::{Deserialize, Serialize};

pub use oscillator::{align_index, build_oscillator_view};
pub use price::{build_price_view, exit_marker};
pub use trace::{y_range, HistogramBar, LineRole, Marker, MarkerRole, Trace};

use crate::store::ResultSnapshot;

/// Name of the trend series the price view prefers.
pub const DEFAULT_TREND_SERIES: &str = "EMA_200";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayOptions {
    pub trend_series: String,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            trend_series: DEFAULT_TREND_SERIES.to_string(),
        }
    }
}

/// Both views for one snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    pub price: Vec<Trace>,
    pub oscillator: Vec<Trace>,
}

impl Overlay {
    pub fn from_snapshot(snapshot: &ResultSnapshot, opts: &OverlayOptions) -> Self {
        let trades = snapshot.trades();
        Self {
            price: build_price_view(
                snapshot.dataset.as_ref(),
                snapshot.indicators.as_ref(),
                trades,
                opts,
            ),
            oscillator: build_oscillator_view(
                snapshot
                    .indicators
                    .as_ref()
                    .and_then(|i| i.oscillator.as_ref()),
                trades,
            ),
        }
    }
}
