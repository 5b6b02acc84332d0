//! Application state — single-owner, main-thread only.
//!
//! All TUI state lives here. Gateway calls run on dispatcher worker threads and
//! their results are applied to the store in [`AppState::tick`].

use std::sync::Arc;

use log::{debug, info};

use macdscope_client::{
    BackendGateway, BacktestParams, DispatchEvent, Dispatcher, GatewayCommand, HealthStatus,
    IntervalOption, MarketDataRequest, MarketMetadata, Operation, Settings, StreamRequest,
    Transport,
};
use macdscope_core::domain::{ConfigModel, ConfigPatch, Interval, MAX_DAYS_BACK};
use macdscope_core::{IgnoreReason, Overlay, ResultSnapshot, ResultStore, StoreCommand, Transition};

/// Transport shared between the dispatcher's worker threads.
pub type SharedTransport = Arc<dyn Transport>;

/// Which panel is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Price,
    Oscillator,
    Trades,
    Performance,
    Help,
}

impl Panel {
    pub const ALL: [Panel; 5] = [
        Panel::Price,
        Panel::Oscillator,
        Panel::Trades,
        Panel::Performance,
        Panel::Help,
    ];

    pub fn index(self) -> usize {
        match self {
            Panel::Price => 0,
            Panel::Oscillator => 1,
            Panel::Trades => 2,
            Panel::Performance => 3,
            Panel::Help => 4,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Panel::Price => "Price",
            Panel::Oscillator => "Oscillator",
            Panel::Trades => "Trades",
            Panel::Performance => "Performance",
            Panel::Help => "Help",
        }
    }

    pub fn next(self) -> Panel {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Panel {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
}

pub struct AppState {
    pub store: ResultStore,
    pub dispatcher: Dispatcher<SharedTransport>,
    pub settings: Settings,
    /// Traces for the current snapshot, rebuilt whenever the store changes.
    pub overlay: Overlay,
    pub active_panel: Panel,
    pub symbols: Vec<String>,
    pub intervals: Vec<IntervalOption>,
    pub metadata: Option<MarketMetadata>,
    pub health: Option<HealthStatus>,
    pub trade_scroll: usize,
    pub status_message: Option<(String, StatusLevel)>,
    pub running: bool,
}

impl AppState {
    pub fn new(settings: Settings, transport: SharedTransport) -> Self {
        let store = settings.store();
        Self {
            store,
            dispatcher: Dispatcher::new(BackendGateway::new(transport)),
            settings,
            overlay: Overlay::default(),
            active_panel: Panel::Price,
            symbols: Vec::new(),
            intervals: Vec::new(),
            metadata: None,
            health: None,
            trade_scroll: 0,
            status_message: None,
            running: true,
        }
    }

    pub fn config(&self) -> &ConfigModel {
        self.store.config()
    }

    pub fn snapshot(&self) -> &ResultSnapshot {
        self.store.snapshot()
    }

    fn timezone(&self) -> String {
        self.settings.session.timezone.clone()
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }

    fn submit(&mut self, command: GatewayCommand) {
        self.dispatcher.submit(&mut self.store, command);
    }

    // ── Requests ─────────────────────────────────────────────────────

    /// Health, symbol list, interval list and the initial fetch, all in flight at once.
    pub fn startup(&mut self) {
        self.submit(GatewayCommand::Health);
        self.submit(GatewayCommand::ListSymbols);
        self.submit(GatewayCommand::ListIntervals);
        self.refetch();
    }

    pub fn refetch(&mut self) {
        let req = MarketDataRequest::from_config(self.config(), &self.timezone());
        info!("fetch {} {} {}d", req.symbol, req.interval, req.days_back);
        self.submit(GatewayCommand::FetchMarketData(req));
    }

    pub fn run_backtest(&mut self) {
        let config = self.config().clone();
        let params = BacktestParams::from_config(&config, &self.timezone());
        info!("backtest {} {}", config.symbol, config.interval);
        self.submit(GatewayCommand::RunBacktest {
            symbol: config.symbol,
            interval: config.interval,
            params,
        });
    }

    pub fn toggle_stream(&mut self) {
        if self.snapshot().live_trading {
            self.submit(GatewayCommand::StopStream);
        } else {
            let config = self.config();
            let req = StreamRequest {
                symbol: config.symbol.clone(),
                interval: config.interval,
                timezone: self.timezone(),
            };
            self.submit(GatewayCommand::StartStream(req));
        }
    }

    // ── Config changes ───────────────────────────────────────────────

    /// Apply a patch and refetch. Returns false when the patch was rejected.
    ///
    /// Switching symbol or interval drops the previous results so the new candles
    /// are never drawn with another instrument's trade markers.
    pub fn patch_config(&mut self, patch: ConfigPatch) -> bool {
        let before = (self.config().symbol.clone(), self.config().interval);
        match self.store.apply(StoreCommand::ConfigPatched(patch)) {
            Transition::Applied => {
                self.trade_scroll = 0;
                let config = self.config();
                let switched = before != (config.symbol.clone(), config.interval);
                let had_backtest =
                    self.snapshot().trades.is_some() || self.snapshot().performance.is_some();
                if switched && had_backtest {
                    let label = format!("{} {}", config.symbol, config.interval);
                    self.store.apply(StoreCommand::Clear);
                    self.refresh_overlay();
                    self.set_status(format!("Previous backtest cleared for {label}"));
                }
                self.refetch();
                true
            }
            Transition::Ignored(IgnoreReason::InvalidConfig(e)) => {
                self.set_warning(format!("Config rejected: {e}"));
                false
            }
            Transition::Ignored(reason) => {
                debug!("config patch ignored: {reason:?}");
                false
            }
        }
    }

    fn interval_choices(&self) -> Vec<Interval> {
        let listed: Vec<Interval> = self
            .intervals
            .iter()
            .filter_map(|o| o.value.parse().ok())
            .collect();
        if listed.is_empty() {
            Interval::ALL.to_vec()
        } else {
            listed
        }
    }

    pub fn cycle_interval(&mut self, forward: bool) {
        let choices = self.interval_choices();
        if let Some(next) = step(&choices, &self.config().interval, forward) {
            self.patch_config(ConfigPatch::interval(next));
        }
    }

    pub fn cycle_symbol(&mut self, forward: bool) {
        if self.symbols.is_empty() {
            self.set_warning("No symbol list from backend");
            return;
        }
        if let Some(next) = step(&self.symbols, &self.config().symbol, forward) {
            self.patch_config(ConfigPatch::symbol(next));
        }
    }

    pub fn adjust_days(&mut self, delta: i64) {
        let current = i64::from(self.config().days_back);
        let next = (current + delta).clamp(1, i64::from(MAX_DAYS_BACK));
        if next != current {
            if let Ok(days) = u32::try_from(next) {
                self.patch_config(ConfigPatch::days_back(days));
            }
        }
    }

    pub fn clear(&mut self) {
        self.store.apply(StoreCommand::Clear);
        self.trade_scroll = 0;
        self.refresh_overlay();
        self.set_status("Results cleared");
    }

    pub fn scroll_trades(&mut self, down: bool) {
        let len = self.snapshot().trades().len();
        if down {
            if self.trade_scroll + 1 < len {
                self.trade_scroll += 1;
            }
        } else {
            self.trade_scroll = self.trade_scroll.saturating_sub(1);
        }
    }

    // ── Results ──────────────────────────────────────────────────────

    /// Apply everything the workers have finished, without blocking.
    pub fn tick(&mut self) {
        for event in self.dispatcher.drain(&mut self.store) {
            self.handle_event(event);
        }
    }

    pub fn handle_event(&mut self, event: DispatchEvent) {
        match event {
            DispatchEvent::Settled {
                operation,
                transition,
                ..
            } => {
                if !transition.is_applied() {
                    debug!("{operation} result dropped: {transition:?}");
                    return;
                }
                self.refresh_overlay();
                if self.snapshot().error.is_some() {
                    return;
                }
                match operation {
                    Operation::FetchMarketData => {
                        let bars = self.snapshot().dataset.as_ref().map_or(0, |d| d.len());
                        self.set_status(format!("Loaded {bars} bars"));
                    }
                    Operation::RunBacktest => {
                        let trades = self.snapshot().trades().len();
                        self.set_status(format!("Backtest complete: {trades} trades"));
                    }
                    _ => {}
                }
            }
            DispatchEvent::Metadata(metadata) => self.metadata = Some(metadata),
            DispatchEvent::StreamConfirmed { live } => {
                self.store.apply(StoreCommand::LiveTradingChanged(live));
                self.set_status(if live {
                    "Live stream started"
                } else {
                    "Live stream stopped"
                });
            }
            DispatchEvent::Health(health) => self.health = health,
            DispatchEvent::Symbols(symbols) => {
                if !symbols.is_empty() {
                    self.symbols = symbols;
                }
            }
            DispatchEvent::Intervals(intervals) => {
                if !intervals.is_empty() {
                    self.intervals = intervals;
                }
            }
        }
    }

    pub fn refresh_overlay(&mut self) {
        self.overlay = Overlay::from_snapshot(self.store.snapshot(), &self.settings.overlay);
        let len = self.snapshot().trades().len();
        if self.trade_scroll >= len {
            self.trade_scroll = len.saturating_sub(1);
        }
    }
}

/// Neighbour of `current` in `choices`, wrapping. Unknown `current` starts at an end.
fn step<T: PartialEq + Clone>(choices: &[T], current: &T, forward: bool) -> Option<T> {
    if choices.is_empty() {
        return None;
    }
    let n = choices.len();
    let next = match choices.iter().position(|c| c == current) {
        Some(i) if forward => (i + 1) % n,
        Some(i) => (i + n - 1) % n,
        None if forward => 0,
        None => n - 1,
    };
    choices.get(next).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{offline_app, sample_dataset, sample_indicators, sample_trades};
    use macdscope_core::domain::PerformanceSummary;
    use std::time::Duration;

    #[test]
    fn panel_cycle_wraps() {
        assert_eq!(Panel::Help.next(), Panel::Price);
        assert_eq!(Panel::Price.prev(), Panel::Help);
        assert_eq!(Panel::from_index(2), Some(Panel::Trades));
        assert_eq!(Panel::from_index(5), None);
    }

    #[test]
    fn step_wraps_and_handles_unknown() {
        let xs = vec!["a", "b", "c"];
        assert_eq!(step(&xs, &"c", true), Some("a"));
        assert_eq!(step(&xs, &"a", false), Some("c"));
        assert_eq!(step(&xs, &"z", true), Some("a"));
        assert_eq!(step(&xs, &"z", false), Some("c"));
        assert_eq!(step::<&str>(&[], &"a", true), None);
    }

    #[test]
    fn refetch_against_offline_backend_sets_error() {
        let mut app = offline_app();
        app.refetch();
        assert!(app.snapshot().loading);

        app.dispatcher.settle(&mut app.store, Duration::from_secs(5));
        assert!(!app.snapshot().loading);
        assert!(app
            .snapshot()
            .error
            .as_deref()
            .is_some_and(|e| e.starts_with("backend unreachable")));
    }

    #[test]
    fn interval_cycle_patches_config_and_refetches() {
        let mut app = offline_app();
        app.cycle_interval(true);
        assert_eq!(app.config().interval, Interval::M15);
        assert!(app.snapshot().loading);
        assert_eq!(app.dispatcher.in_flight(), 1);
    }

    #[test]
    fn interval_cycle_uses_backend_list() {
        let mut app = offline_app();
        app.intervals = vec![
            IntervalOption { value: "5m".into(), label: "5 Minutes".into() },
            IntervalOption { value: "1h".into(), label: "1 Hour".into() },
        ];
        app.cycle_interval(true);
        assert_eq!(app.config().interval, Interval::H1);
        app.cycle_interval(true);
        assert_eq!(app.config().interval, Interval::M5);
    }

    #[test]
    fn days_adjust_is_clamped() {
        let mut app = offline_app();
        app.adjust_days(-100);
        assert_eq!(app.config().days_back, 1);
        app.adjust_days(1000);
        assert_eq!(app.config().days_back, MAX_DAYS_BACK);
    }

    #[test]
    fn symbol_cycle_without_list_warns() {
        let mut app = offline_app();
        app.cycle_symbol(true);
        assert_eq!(app.config().symbol, "ROSEUSDT");
        assert!(matches!(app.status_message, Some((_, StatusLevel::Warning))));

        app.symbols = vec!["BTCUSDT".into(), "ETHUSDT".into()];
        app.cycle_symbol(true);
        assert_eq!(app.config().symbol, "BTCUSDT");
    }

    #[test]
    fn stream_confirmation_sets_live_flag() {
        let mut app = offline_app();
        app.handle_event(DispatchEvent::StreamConfirmed { live: true });
        assert!(app.snapshot().live_trading);
        app.handle_event(DispatchEvent::StreamConfirmed { live: false });
        assert!(!app.snapshot().live_trading);
    }

    #[test]
    fn empty_metadata_lists_keep_previous() {
        let mut app = offline_app();
        app.handle_event(DispatchEvent::Symbols(vec!["BTCUSDT".into()]));
        app.handle_event(DispatchEvent::Symbols(Vec::new()));
        assert_eq!(app.symbols, vec!["BTCUSDT".to_string()]);
    }

    #[test]
    fn clear_resets_results_and_overlay() {
        let mut app = offline_app();
        app.store.apply(StoreCommand::LoadSucceeded {
            dataset: sample_dataset(10),
            indicators: sample_indicators(10),
        });
        app.store.apply(StoreCommand::TradesUpdated(sample_trades()));
        app.store
            .apply(StoreCommand::PerformanceUpdated(PerformanceSummary::from_trades(
                &sample_trades(),
            )));
        app.refresh_overlay();
        assert!(!app.overlay.price.is_empty());
        app.trade_scroll = 1;

        app.clear();
        assert!(!app.snapshot().has_data());
        assert!(app.overlay.price.is_empty());
        assert_eq!(app.trade_scroll, 0);
    }

    #[test]
    fn switching_instrument_drops_previous_backtest() {
        let mut app = offline_app();
        app.store.apply(StoreCommand::TradesUpdated(sample_trades()));
        app.store
            .apply(StoreCommand::PerformanceUpdated(PerformanceSummary::from_trades(
                &sample_trades(),
            )));
        app.symbols = vec!["ROSEUSDT".into(), "BTCUSDT".into()];

        app.cycle_symbol(true);
        assert_eq!(app.config().symbol, "BTCUSDT");
        assert!(app.snapshot().trades.is_none());
        assert!(app.snapshot().performance.is_none());
        assert!(app.snapshot().loading);
        assert!(app
            .status_message
            .as_ref()
            .is_some_and(|(m, _)| m.contains("BTCUSDT")));
    }

    #[test]
    fn days_change_keeps_backtest() {
        let mut app = offline_app();
        app.store.apply(StoreCommand::TradesUpdated(sample_trades()));
        app.adjust_days(1);
        assert_eq!(app.snapshot().trades().len(), sample_trades().len());
    }

    #[test]
    fn trade_scroll_stays_in_bounds() {
        let mut app = offline_app();
        app.store.apply(StoreCommand::TradesUpdated(sample_trades()));
        for _ in 0..10 {
            app.scroll_trades(true);
        }
        assert_eq!(app.trade_scroll, sample_trades().len() - 1);
        for _ in 0..10 {
            app.scroll_trades(false);
        }
        assert_eq!(app.trade_scroll, 0);
    }
}
