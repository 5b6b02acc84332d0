//! macdscope TUI — terminal dashboard over the backtest backend.
//!
//! Provides interactive exploration of one symbol's results with:
//! - Price view (candles, trend line, entry/exit markers)
//! - Oscillator view (histogram, value and signal lines, crossover markers)
//! - Trade tape
//! - Classified performance readings

pub mod app;
pub mod input;
pub mod panels;
pub mod theme;
pub mod ui;

pub use app::{AppState, Panel};
pub use input::handle_key;
pub use theme::Theme;

#[cfg(test)]
mod test_helpers;
