//! ResultStore — the single owner of configuration and fetched results.
//!
//! Every mutation is a [`StoreCommand`]. Commands apply atomically; a batch
//! applied through [`ResultStore::apply_stamped`] is all-or-nothing (a stale
//! stamp or an invalid config patch rejects every command in it), so no
//! intermediate state is observable between, e.g., `trades_updated` and
//! `performance_updated`.
//!
//! Responses from overlapping requests are ordered with per-lane sequence
//! stamps. Under [`SequencePolicy::Guarded`] a response older than the newest
//! request on its lane is discarded; [`SequencePolicy::LastWriteWins`] keeps the
//! unordered overwrite behaviour for callers that want it.

use log::{debug, warn};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{
    ConfigError, ConfigModel, ConfigPatch, IndicatorSet, MarketDataset, PerformanceSummary, Trade,
};

/// Independent request streams. Sequence ordering is enforced within a lane only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    MarketData,
    Backtest,
    Stream,
    Health,
}

impl Lane {
    pub const ALL: [Lane; 4] = [Lane::MarketData, Lane::Backtest, Lane::Stream, Lane::Health];

    fn index(self) -> usize {
        match self {
            Lane::MarketData => 0,
            Lane::Backtest => 1,
            Lane::Stream => 2,
            Lane::Health => 3,
        }
    }
}

/// Issued by [`ResultStore::issue`] when a request starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stamp {
    pub lane: Lane,
    pub seq: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequencePolicy {
    /// Discard responses older than the newest applied stamp on the same lane.
    #[default]
    Guarded,
    /// Apply every response in arrival order.
    LastWriteWins,
}

/// State transitions. Unrecognised triggers decode to [`StoreCommand::Unknown`]
/// and apply as a no-op.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum StoreCommand {
    BeginLoad,
    Fail(String),
    LoadSucceeded {
        dataset: MarketDataset,
        indicators: IndicatorSet,
    },
    /// Closes a load cycle that produced no dataset (a backtest).
    EndLoad,
    IndicatorsUpdated(IndicatorSet),
    TradesUpdated(Vec<Trade>),
    PerformanceUpdated(PerformanceSummary),
    ConnectionChanged(bool),
    LiveTradingChanged(bool),
    ConfigPatched(ConfigPatch),
    Clear,
    Unknown(String),
}

impl StoreCommand {
    pub fn name(&self) -> &str {
        match self {
            StoreCommand::BeginLoad => "begin_load",
            StoreCommand::Fail(_) => "fail",
            StoreCommand::LoadSucceeded { .. } => "load_succeeded",
            StoreCommand::EndLoad => "end_load",
            StoreCommand::IndicatorsUpdated(_) => "indicators_updated",
            StoreCommand::TradesUpdated(_) => "trades_updated",
            StoreCommand::PerformanceUpdated(_) => "performance_updated",
            StoreCommand::ConnectionChanged(_) => "connection_changed",
            StoreCommand::LiveTradingChanged(_) => "live_trading_changed",
            StoreCommand::ConfigPatched(_) => "config_patched",
            StoreCommand::Clear => "clear",
            StoreCommand::Unknown(kind) => kind,
        }
    }
}

#[derive(Deserialize)]
struct RawCommand {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: serde_json::Value,
}

#[derive(Deserialize)]
struct LoadPayload {
    dataset: MarketDataset,
    indicators: IndicatorSet,
}

impl<'de> Deserialize<'de> for StoreCommand {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let raw = RawCommand::deserialize(deserializer)?;
        let payload = raw.payload;
        let cmd = match raw.kind.as_str() {
            "begin_load" => StoreCommand::BeginLoad,
            "end_load" => StoreCommand::EndLoad,
            "clear" => StoreCommand::Clear,
            "fail" => StoreCommand::Fail(serde_json::from_value(payload).map_err(D::Error::custom)?),
            "load_succeeded" => {
                let p: LoadPayload = serde_json::from_value(payload).map_err(D::Error::custom)?;
                StoreCommand::LoadSucceeded {
                    dataset: p.dataset,
                    indicators: p.indicators,
                }
            }
            "indicators_updated" => {
                StoreCommand::IndicatorsUpdated(serde_json::from_value(payload).map_err(D::Error::custom)?)
            }
            "trades_updated" => {
                StoreCommand::TradesUpdated(serde_json::from_value(payload).map_err(D::Error::custom)?)
            }
            "performance_updated" => {
                StoreCommand::PerformanceUpdated(serde_json::from_value(payload).map_err(D::Error::custom)?)
            }
            "connection_changed" => {
                StoreCommand::ConnectionChanged(serde_json::from_value(payload).map_err(D::Error::custom)?)
            }
            "live_trading_changed" => {
                StoreCommand::LiveTradingChanged(serde_json::from_value(payload).map_err(D::Error::custom)?)
            }
            "config_patched" => {
                StoreCommand::ConfigPatched(serde_json::from_value(payload).map_err(D::Error::custom)?)
            }
            other => StoreCommand::Unknown(other.to_string()),
        };
        Ok(cmd)
    }
}

/// Why a command or batch left the store untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum IgnoreReason {
    UnknownTrigger(String),
    Stale { stamp: Stamp, applied: u64 },
    InvalidConfig(ConfigError),
}

/// Outcome of applying a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Applied,
    Ignored(IgnoreReason),
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied)
    }
}

/// Read-only view of the store's results and status flags.
///
/// `loading` and `error.is_some()` are never both true after a transition.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSnapshot {
    pub dataset: Option<MarketDataset>,
    pub indicators: Option<IndicatorSet>,
    pub trades: Option<Vec<Trade>>,
    pub performance: Option<PerformanceSummary>,
    pub loading: bool,
    pub error: Option<String>,
    pub connected: bool,
    pub live_trading: bool,
}

impl ResultSnapshot {
    pub fn trades(&self) -> &[Trade] {
        self.trades.as_deref().unwrap_or(&[])
    }

    pub fn has_data(&self) -> bool {
        self.dataset.is_some()
            || self.indicators.is_some()
            || self.trades.is_some()
            || self.performance.is_some()
    }
}

/// Owns the current [`ConfigModel`] and [`ResultSnapshot`].
///
/// Constructed explicitly and passed to whoever needs it; there is no global
/// instance. Single-owner: results from worker threads are funnelled back to
/// the owning thread and applied there.
#[derive(Debug, Clone)]
pub struct ResultStore {
    config: ConfigModel,
    snapshot: ResultSnapshot,
    policy: SequencePolicy,
    /// Last issued sequence number, shared by all lanes.
    counter: u64,
    /// Highest sequence number applied per lane.
    applied: [u64; 4],
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new(ConfigModel::default(), SequencePolicy::default())
    }
}

impl ResultStore {
    pub fn new(config: ConfigModel, policy: SequencePolicy) -> Self {
        Self {
            config,
            snapshot: ResultSnapshot::default(),
            policy,
            counter: 0,
            applied: [0; 4],
        }
    }

    // ── Public API ─────────────────────────────────────────────────────

    pub fn config(&self) -> &ConfigModel {
        &self.config
    }

    pub fn snapshot(&self) -> &ResultSnapshot {
        &self.snapshot
    }

    pub fn policy(&self) -> SequencePolicy {
        self.policy
    }

    /// Stamp a new request on `lane`.
    pub fn issue(&mut self, lane: Lane) -> Stamp {
        self.counter += 1;
        Stamp {
            lane,
            seq: self.counter,
        }
    }

    /// Highest sequence number applied on `lane` so far (0 if none).
    pub fn applied_seq(&self, lane: Lane) -> u64 {
        self.applied[lane.index()]
    }

    /// Apply a single unstamped command. Local commands always pass the sequence guard.
    pub fn apply(&mut self, command: StoreCommand) -> Transition {
        match &command {
            StoreCommand::Unknown(kind) => {
                warn!("ignoring unknown store trigger '{kind}'");
                return Transition::Ignored(IgnoreReason::UnknownTrigger(kind.clone()));
            }
            StoreCommand::ConfigPatched(patch) => {
                if let Err(e) = self.config.patched(patch) {
                    warn!("rejected config patch: {e}");
                    return Transition::Ignored(IgnoreReason::InvalidConfig(e));
                }
            }
            _ => {}
        }
        debug!("store: {}", command.name());
        self.commit(command);
        Transition::Applied
    }

    /// Apply a batch produced by the request stamped `stamp`.
    ///
    /// The batch is discarded as a whole when the stamp is stale under
    /// [`SequencePolicy::Guarded`] or when any config patch in it is invalid.
    /// Otherwise each command is applied in order; unknown triggers are skipped.
    pub fn apply_stamped(&mut self, stamp: Stamp, commands: Vec<StoreCommand>) -> Transition {
        let applied = self.applied[stamp.lane.index()];
        if self.policy == SequencePolicy::Guarded && stamp.seq < applied {
            warn!(
                "discarding stale {:?} response #{} (newest #{applied})",
                stamp.lane, stamp.seq
            );
            return Transition::Ignored(IgnoreReason::Stale { stamp, applied });
        }
        if let Err(e) = self.check_patches(&commands) {
            warn!("rejected {:?} batch #{}: {e}", stamp.lane, stamp.seq);
            return Transition::Ignored(IgnoreReason::InvalidConfig(e));
        }
        self.applied[stamp.lane.index()] = applied.max(stamp.seq);

        let mut outcome = Transition::Applied;
        for command in commands {
            if let Transition::Ignored(reason) = self.apply(command) {
                outcome = Transition::Ignored(reason);
            }
        }
        outcome
    }

    /// Run every config patch of a batch against a scratch copy, in order.
    fn check_patches(&self, commands: &[StoreCommand]) -> Result<(), ConfigError> {
        let mut scratch = self.config.clone();
        for command in commands {
            if let StoreCommand::ConfigPatched(patch) = command {
                scratch = scratch.patched(patch)?;
            }
        }
        Ok(())
    }

    // ── Transition table ───────────────────────────────────────────────

    fn commit(&mut self, command: StoreCommand) {
        let s = &mut self.snapshot;
        match command {
            StoreCommand::BeginLoad => {
                s.loading = true;
                s.error = None;
            }
            StoreCommand::Fail(message) => {
                s.error = Some(message);
                s.loading = false;
            }
            StoreCommand::LoadSucceeded {
                dataset,
                indicators,
            } => {
                s.dataset = Some(dataset);
                s.indicators = Some(indicators);
                s.loading = false;
                s.error = None;
            }
            StoreCommand::EndLoad => s.loading = false,
            StoreCommand::IndicatorsUpdated(indicators) => s.indicators = Some(indicators),
            StoreCommand::TradesUpdated(trades) => s.trades = Some(trades),
            StoreCommand::PerformanceUpdated(perf) => s.performance = Some(perf),
            StoreCommand::ConnectionChanged(connected) => s.connected = connected,
            StoreCommand::LiveTradingChanged(live) => s.live_trading = live,
            StoreCommand::ConfigPatched(patch) => {
                // validated in `apply`
                if let Ok(next) = self.config.patched(&patch) {
                    self.config = next;
                }
            }
            StoreCommand::Clear => {
                s.dataset = None;
                s.indicators = None;
                s.trades = None;
                s.performance = None;
                s.error = None;
            }
            StoreCommand::Unknown(_) => {}
        }
    }
}
