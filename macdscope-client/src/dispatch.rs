//! Request dispatcher — runs gateway calls on worker threads.
//!
//! Each submitted request gets its own named thread, so overlapping requests
//! genuinely run concurrently. Results come back over an `mpsc` channel and are
//! applied to the [`ResultStore`] on the owner's thread by [`Dispatcher::drain`]
//! or [`Dispatcher::settle`]. The store is never shared across threads.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};

use macdscope_core::domain::Interval;
use macdscope_core::{Lane, ResultStore, Stamp, StoreCommand, Transition};

use crate::error::{GatewayError, Operation};
use crate::gateway::{
    BackendGateway, BacktestOutcome, BacktestParams, MarketData, MarketDataRequest, StreamRequest,
};
use crate::transport::Transport;
use crate::wire::{HealthStatus, IntervalOption, MarketMetadata};

/// Requests the view can submit.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCommand {
    FetchMarketData(MarketDataRequest),
    RunBacktest {
        symbol: String,
        interval: Interval,
        params: BacktestParams,
    },
    StartStream(StreamRequest),
    StopStream,
    Health,
    ListSymbols,
    ListIntervals,
}

impl GatewayCommand {
    pub fn operation(&self) -> Operation {
        match self {
            GatewayCommand::FetchMarketData(_) => Operation::FetchMarketData,
            GatewayCommand::RunBacktest { .. } => Operation::RunBacktest,
            GatewayCommand::StartStream(_) => Operation::StartStream,
            GatewayCommand::StopStream => Operation::StopStream,
            GatewayCommand::Health => Operation::Health,
            GatewayCommand::ListSymbols => Operation::ListSymbols,
            GatewayCommand::ListIntervals => Operation::ListIntervals,
        }
    }

    /// Sequence lane; metadata listings never touch the store and have none.
    pub fn lane(&self) -> Option<Lane> {
        match self {
            GatewayCommand::FetchMarketData(_) => Some(Lane::MarketData),
            GatewayCommand::RunBacktest { .. } => Some(Lane::Backtest),
            GatewayCommand::StartStream(_) | GatewayCommand::StopStream => Some(Lane::Stream),
            GatewayCommand::Health => Some(Lane::Health),
            GatewayCommand::ListSymbols | GatewayCommand::ListIntervals => None,
        }
    }

    /// Whether submitting enters the loading state.
    fn begins_load(&self) -> bool {
        matches!(
            self,
            GatewayCommand::FetchMarketData(_) | GatewayCommand::RunBacktest { .. }
        )
    }
}

/// Raw worker result, before it is mapped onto the store.
#[derive(Debug)]
enum Outcome {
    MarketData(Result<MarketData, GatewayError>),
    Backtest(Result<BacktestOutcome, GatewayError>),
    Stream {
        op: Operation,
        live: bool,
        result: Result<(), GatewayError>,
    },
    Health(Result<HealthStatus, GatewayError>),
    Symbols(Vec<String>),
    Intervals(Vec<IntervalOption>),
}

#[derive(Debug)]
struct Completion {
    stamp: Option<Stamp>,
    outcome: Outcome,
}

/// What the view should know about after a drain, beyond the store itself.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchEvent {
    /// A stamped batch reached the store (or was discarded as stale).
    Settled {
        stamp: Stamp,
        operation: Operation,
        transition: Transition,
    },
    /// Market metadata that accompanied a successful fetch.
    Metadata(MarketMetadata),
    /// The backend confirmed a stream start (`live = true`) or stop.
    StreamConfirmed { live: bool },
    /// Health body, `None` when the check failed.
    Health(Option<HealthStatus>),
    Symbols(Vec<String>),
    Intervals(Vec<IntervalOption>),
}

// ── Result → store mapping ───────────────────────────────────────────

pub fn market_data_commands(result: Result<MarketData, GatewayError>) -> Vec<StoreCommand> {
    match result {
        Ok(data) => vec![StoreCommand::LoadSucceeded {
            dataset: data.dataset,
            indicators: data.indicators,
        }],
        Err(e) => vec![StoreCommand::Fail(e.user_message(Operation::FetchMarketData))],
    }
}

/// A missing performance block is derived from the trades.
pub fn backtest_commands(result: Result<BacktestOutcome, GatewayError>) -> Vec<StoreCommand> {
    match result {
        Ok(outcome) => {
            let performance = outcome.performance_or_derived();
            vec![
                StoreCommand::TradesUpdated(outcome.trades),
                StoreCommand::PerformanceUpdated(performance),
                StoreCommand::EndLoad,
            ]
        }
        Err(e) => vec![StoreCommand::Fail(e.user_message(Operation::RunBacktest))],
    }
}

/// Stream control has no success transition; only failures reach the store.
pub fn stream_commands(op: Operation, result: &Result<(), GatewayError>) -> Vec<StoreCommand> {
    match result {
        Ok(()) => Vec::new(),
        Err(e) => vec![StoreCommand::Fail(e.user_message(op))],
    }
}

pub fn health_commands(result: &Result<HealthStatus, GatewayError>) -> Vec<StoreCommand> {
    vec![StoreCommand::ConnectionChanged(result.is_ok())]
}

// ── Dispatcher ───────────────────────────────────────────────────────

pub struct Dispatcher<T: Transport + 'static> {
    gateway: Arc<BackendGateway<T>>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    in_flight: usize,
}

impl<T: Transport + 'static> Dispatcher<T> {
    pub fn new(gateway: BackendGateway<T>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            gateway: Arc::new(gateway),
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn gateway(&self) -> &BackendGateway<T> {
        &self.gateway
    }

    /// Requests submitted but not yet drained.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Stamp `command`, enter loading if it is data-bearing, and start it on a worker thread.
    pub fn submit(&mut self, store: &mut ResultStore, command: GatewayCommand) -> Option<Stamp> {
        let op = command.operation();
        let stamp = command.lane().map(|lane| store.issue(lane));
        if let Some(stamp) = stamp {
            if command.begins_load() {
                store.apply_stamped(stamp, vec![StoreCommand::BeginLoad]);
            }
        }
        debug!("submit {op} {stamp:?}");

        let gateway = Arc::clone(&self.gateway);
        let tx = self.tx.clone();
        let spawned = thread::Builder::new()
            .name(format!("macdscope-{op}"))
            .spawn(move || {
                let outcome = execute(&gateway, command);
                // receiver gone means the owner shut down
                let _ = tx.send(Completion { stamp, outcome });
            });

        match spawned {
            Ok(_) => self.in_flight += 1,
            Err(e) => {
                warn!("could not start {op} worker: {e}");
                if let Some(stamp) = stamp {
                    if stamp.lane != Lane::Health {
                        store.apply_stamped(
                            stamp,
                            vec![StoreCommand::Fail(op.default_message().to_string())],
                        );
                    }
                }
            }
        }
        stamp
    }

    /// Apply every completed result without blocking.
    pub fn drain(&mut self, store: &mut ResultStore) -> Vec<DispatchEvent> {
        let mut events = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            complete(store, completion, &mut events);
        }
        events
    }

    /// Block until nothing is in flight or `timeout` elapses.
    pub fn settle(&mut self, store: &mut ResultStore, timeout: Duration) -> Vec<DispatchEvent> {
        let deadline = Instant::now() + timeout;
        let mut events = Vec::new();
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(completion) => {
                    self.in_flight -= 1;
                    complete(store, completion, &mut events);
                }
                Err(RecvTimeoutError::Timeout) => {
                    warn!("{} request(s) still in flight after {timeout:?}", self.in_flight);
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        events
    }
}

fn execute<T: Transport>(gateway: &BackendGateway<T>, command: GatewayCommand) -> Outcome {
    match command {
        GatewayCommand::FetchMarketData(req) => Outcome::MarketData(gateway.fetch_market_data(&req)),
        GatewayCommand::RunBacktest {
            symbol,
            interval,
            params,
        } => Outcome::Backtest(gateway.run_backtest(&symbol, interval, &params)),
        GatewayCommand::StartStream(req) => Outcome::Stream {
            op: Operation::StartStream,
            live: true,
            result: gateway.start_stream(&req),
        },
        GatewayCommand::StopStream => Outcome::Stream {
            op: Operation::StopStream,
            live: false,
            result: gateway.stop_stream(),
        },
        GatewayCommand::Health => Outcome::Health(gateway.health()),
        GatewayCommand::ListSymbols => Outcome::Symbols(gateway.list_symbols()),
        GatewayCommand::ListIntervals => Outcome::Intervals(gateway.list_intervals()),
    }
}

fn complete(store: &mut ResultStore, completion: Completion, events: &mut Vec<DispatchEvent>) {
    let Completion { stamp, outcome } = completion;
    let (operation, commands, extra) = match outcome {
        Outcome::Symbols(symbols) => {
            events.push(DispatchEvent::Symbols(symbols));
            return;
        }
        Outcome::Intervals(intervals) => {
            events.push(DispatchEvent::Intervals(intervals));
            return;
        }
        Outcome::MarketData(result) => {
            let metadata = result
                .as_ref()
                .ok()
                .and_then(|d| d.metadata.clone())
                .map(DispatchEvent::Metadata);
            (Operation::FetchMarketData, market_data_commands(result), metadata)
        }
        Outcome::Backtest(result) => (Operation::RunBacktest, backtest_commands(result), None),
        Outcome::Stream { op, live, result } => {
            let confirmed = result.is_ok().then_some(DispatchEvent::StreamConfirmed { live });
            (op, stream_commands(op, &result), confirmed)
        }
        Outcome::Health(result) => {
            let commands = health_commands(&result);
            if let Err(e) = &result {
                warn!("health check failed: {e}");
            }
            (Operation::Health, commands, Some(DispatchEvent::Health(result.ok())))
        }
    };

    let Some(stamp) = stamp else {
        return;
    };
    let transition = store.apply_stamped(stamp, commands);
    let stale = matches!(
        transition,
        Transition::Ignored(macdscope_core::IgnoreReason::Stale { .. })
    );
    debug!("settled {operation} #{}: {transition:?}", stamp.seq);
    events.push(DispatchEvent::Settled {
        stamp,
        operation,
        transition,
    });
    if let Some(event) = extra.filter(|_| !stale) {
        events.push(event);
    }
}
