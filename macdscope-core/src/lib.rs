//! macdscope core — domain types, result store, overlay geometry, metric classification.
//!
//! This crate performs no I/O:
//! - Domain types (config, candles, indicator series, trades, performance)
//! - ResultStore state machine with sequence-guarded request lanes
//! - OverlayBuilder for the price and oscillator views
//! - MetricClassifier for performance presentation

pub mod classify;
pub mod domain;
pub mod overlay;
pub mod store;

pub use classify::{classify, readings, Metric, Reading, Tone};
pub use overlay::{Overlay, OverlayOptions, Trace};
pub use store::{
    IgnoreReason, Lane, ResultSnapshot, ResultStore, SequencePolicy, Stamp, StoreCommand,
    Transition,
};
