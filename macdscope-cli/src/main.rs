//! macdscope CLI — one-shot commands against the backtest backend.
//!
//! Commands:
//! - `health` — print the backend health body
//! - `symbols` / `intervals` — list what the backend offers
//! - `fetch` — load candles and indicators, print a dataset summary
//! - `backtest` — run the MACD strategy, print readings and the trade tape
//! - `stream start|stop` — control the backend's live stream

use std::io;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{debug, info};
use serde::Serialize;

use macdscope_client::{
    BackendGateway, BacktestParams, DispatchEvent, Dispatcher, GatewayCommand, HttpTransport,
    MarketDataRequest, Operation, Settings, StreamRequest,
};
use macdscope_core::domain::{ConfigModel, ConfigPatch, Interval, Trade};
use macdscope_core::{readings, Overlay, ResultSnapshot, ResultStore};

/// Extra time on top of the transport timeout before giving up on a worker.
const SETTLE_MARGIN: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(
    name = "macdscope",
    about = "macdscope CLI — MACD strategy backtests against a remote backend"
)]
struct Cli {
    /// Settings file. Defaults to <config dir>/macdscope/settings.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL; wins over the settings file and MACDSCOPE_BACKEND_URL.
    #[arg(long, global = true)]
    backend: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the backend is up.
    Health,
    /// List the symbols the backend can serve.
    Symbols,
    /// List the candle intervals the backend supports.
    Intervals,
    /// Fetch candles and indicators and print a summary.
    Fetch {
        #[command(flatten)]
        market: MarketArgs,
    },
    /// Run a backtest and print its performance and trades.
    Backtest {
        #[command(flatten)]
        market: MarketArgs,

        #[command(flatten)]
        strategy: StrategyArgs,

        /// Also write the trades to this CSV file.
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Start or stop the backend's live stream.
    Stream {
        #[command(subcommand)]
        action: StreamAction,
    },
}

#[derive(Subcommand)]
enum StreamAction {
    Start {
        /// Symbol to stream. Defaults to the configured symbol.
        #[arg(long)]
        symbol: Option<String>,

        #[arg(long)]
        interval: Option<Interval>,

        #[arg(long)]
        timezone: Option<String>,
    },
    Stop,
}

/// Overrides for the `[defaults]` section of the settings file.
#[derive(Args, Debug, Default)]
struct MarketArgs {
    /// Trading pair, e.g. ROSEUSDT.
    #[arg(long)]
    symbol: Option<String>,

    /// Candle interval: 1m 5m 15m 30m 1h 4h 1d.
    #[arg(long)]
    interval: Option<Interval>,

    /// Days of history, 1..=365.
    #[arg(long)]
    days: Option<u32>,

    /// IANA timezone for candle timestamps.
    #[arg(long)]
    timezone: Option<String>,
}

#[derive(Args, Debug, Default)]
struct StrategyArgs {
    /// Take-profit in percent (2.0 = 2%).
    #[arg(long)]
    take_profit: Option<f64>,

    /// Stop-loss in percent.
    #[arg(long)]
    stop_loss: Option<f64>,

    /// MACD fast EMA length.
    #[arg(long)]
    fast: Option<u32>,

    /// MACD slow EMA length.
    #[arg(long)]
    slow: Option<u32>,

    /// MACD signal smoothing length.
    #[arg(long)]
    signal: Option<u32>,
}

impl MarketArgs {
    fn patch(&self) -> ConfigPatch {
        ConfigPatch {
            symbol: self.symbol.clone(),
            interval: self.interval,
            days_back: self.days,
            ..ConfigPatch::default()
        }
    }
}

impl StrategyArgs {
    fn apply_to(&self, patch: ConfigPatch) -> ConfigPatch {
        ConfigPatch {
            take_profit: self.take_profit,
            stop_loss: self.stop_loss,
            fast_length: self.fast,
            slow_length: self.slow,
            signal_smoothing: self.signal,
            ..patch
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::load_or_default(cli.config.as_deref())
        .context("failed to load settings")?;
    if let Some(url) = cli.backend {
        settings.backend.base_url = url;
    }
    let transport = settings
        .backend
        .transport()
        .with_context(|| format!("bad backend URL {}", settings.backend.base_url))?;
    debug!("backend {}", settings.backend.base_url);

    match cli.command {
        Commands::Health => run_health(transport),
        Commands::Symbols => {
            for symbol in BackendGateway::new(transport).list_symbols() {
                println!("{symbol}");
            }
            Ok(())
        }
        Commands::Intervals => {
            for option in BackendGateway::new(transport).list_intervals() {
                println!("{:<6} {}", option.value, option.label);
            }
            Ok(())
        }
        Commands::Fetch { market } => run_fetch(&settings, transport, &market),
        Commands::Backtest {
            market,
            strategy,
            csv,
        } => run_backtest_cmd(&settings, transport, &market, &strategy, csv),
        Commands::Stream { action } => run_stream(&settings, transport, action),
    }
}

fn run_health(transport: HttpTransport) -> Result<()> {
    match BackendGateway::new(transport).health() {
        Ok(status) => {
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e.user_message(Operation::Health));
            process::exit(1);
        }
    }
}

/// Settings defaults with the command-line overrides applied.
fn effective_config(settings: &Settings, patch: &ConfigPatch) -> Result<ConfigModel> {
    settings
        .defaults
        .patched(patch)
        .context("invalid configuration")
}

fn timezone<'a>(settings: &'a Settings, flag: &'a Option<String>) -> &'a str {
    flag.as_deref().unwrap_or(&settings.session.timezone)
}

/// Submit one data-bearing request and wait for it to land in a fresh store.
fn dispatch_once(
    settings: &Settings,
    transport: HttpTransport,
    config: ConfigModel,
    command: GatewayCommand,
) -> Result<(ResultStore, Vec<DispatchEvent>)> {
    let mut store = ResultStore::new(config, settings.session.sequence_policy);
    let mut dispatcher = Dispatcher::new(BackendGateway::new(transport));
    dispatcher.submit(&mut store, command);
    let events = dispatcher.settle(&mut store, settings.backend.timeout() + SETTLE_MARGIN);
    if dispatcher.in_flight() > 0 {
        bail!("timed out waiting for {}", settings.backend.base_url);
    }
    Ok((store, events))
}

fn exit_on_error(snapshot: &ResultSnapshot) {
    if let Some(error) = &snapshot.error {
        eprintln!("Error: {error}");
        process::exit(1);
    }
}

fn run_fetch(settings: &Settings, transport: HttpTransport, market: &MarketArgs) -> Result<()> {
    let config = effective_config(settings, &market.patch())?;
    let tz = timezone(settings, &market.timezone);
    let request = MarketDataRequest::from_config(&config, tz);
    info!("fetching {} {} {}d", config.symbol, config.interval, config.days_back);

    let (store, events) = dispatch_once(
        settings,
        transport,
        config,
        GatewayCommand::FetchMarketData(request),
    )?;
    let snapshot = store.snapshot();
    exit_on_error(snapshot);

    let config = store.config();
    println!();
    println!("=== Market Data ===");
    println!("Symbol:         {}", config.symbol);
    println!("Interval:       {}", config.interval);
    for event in &events {
        if let DispatchEvent::Metadata(meta) = event {
            if let Some(updated) = &meta.last_updated {
                println!("Last updated:   {updated}");
            }
        }
    }

    let Some(dataset) = &snapshot.dataset else {
        println!("Bars:           0");
        return Ok(());
    };
    println!("Bars:           {}", dataset.len());
    if let (Some(first), Some(last)) = (dataset.first_timestamp(), dataset.last_timestamp()) {
        println!("Period:         {first} to {last}");
    }
    if let Some(close) = dataset.last_close() {
        println!("Last close:     {close}");
    }

    if let Some(indicators) = &snapshot.indicators {
        match indicators.trend(&settings.overlay.trend_series) {
            Some(trend) => println!("Trend:          {} ({} points)", trend.name, trend.len()),
            None => println!("Trend:          none"),
        }
        match &indicators.oscillator {
            Some(osc) => println!("Oscillator:     {} ({} points)", osc.name, osc.len()),
            None => println!("Oscillator:     none"),
        }
    }

    let overlay = Overlay::from_snapshot(snapshot, &settings.overlay);
    println!();
    println!("--- Overlay ---");
    println!("Price traces:      {}", overlay.price.len());
    println!("Oscillator traces: {}", overlay.oscillator.len());
    Ok(())
}

fn run_backtest_cmd(
    settings: &Settings,
    transport: HttpTransport,
    market: &MarketArgs,
    strategy: &StrategyArgs,
    csv_path: Option<PathBuf>,
) -> Result<()> {
    let config = effective_config(settings, &strategy.apply_to(market.patch()))?;
    let tz = timezone(settings, &market.timezone);
    let command = GatewayCommand::RunBacktest {
        symbol: config.symbol.clone(),
        interval: config.interval,
        params: BacktestParams::from_config(&config, tz),
    };
    info!(
        "backtest {} {} tp={}% sl={}%",
        config.symbol, config.interval, config.take_profit, config.stop_loss
    );

    let (store, _) = dispatch_once(settings, transport, config, command)?;
    let snapshot = store.snapshot();
    exit_on_error(snapshot);

    let config = store.config();
    println!();
    println!("=== Backtest Result ===");
    println!("Symbol:         {}", config.symbol);
    println!("Interval:       {}", config.interval);
    println!(
        "MACD:           {}/{}/{}",
        config.fast_length, config.slow_length, config.signal_smoothing
    );
    println!(
        "Exits:          TP {}% / SL {}%",
        config.take_profit, config.stop_loss
    );

    if let Some(perf) = &snapshot.performance {
        println!();
        println!("--- Performance ---");
        for reading in readings(perf) {
            println!("{:<16}{}", format!("{}:", reading.metric.label()), reading.formatted());
        }
    }

    let trades = snapshot.trades();
    println!();
    println!("--- Trades ({}) ---", trades.len());
    print_trades(trades);

    if let Some(path) = csv_path {
        let file = std::fs::File::create(&path)
            .with_context(|| format!("failed to create trades CSV {}", path.display()))?;
        write_trades_csv(file, trades)
            .with_context(|| format!("failed to write trades CSV {}", path.display()))?;
        println!("Trades saved to: {}", path.display());
    }
    Ok(())
}

fn print_trades(trades: &[Trade]) {
    if trades.is_empty() {
        println!("(no trades)");
        return;
    }
    println!(
        "{:>4}  {:<12}  {:<12}  {:>12}  {:>12}  {:>8}  reason",
        "#", "entry", "exit", "entry px", "exit px", "return"
    );
    for (i, trade) in trades.iter().enumerate() {
        println!(
            "{:>4}  {:<12}  {:<12}  {:>12.6}  {:>12.6}  {:>8}  {}",
            i + 1,
            trade.entry_date.short(),
            trade.exit_date.short(),
            trade.entry_price,
            trade.exit_price,
            trade.return_label(),
            trade.exit_reason
        );
    }
}

#[derive(Debug, Serialize)]
struct TradeRow<'a> {
    trade: usize,
    entry_date: String,
    exit_date: String,
    entry_price: f64,
    exit_price: f64,
    return_pct: f64,
    exit_reason: &'a str,
    position_size: f64,
}

/// Write the trade tape as CSV with a header row. `return_pct` stays a fraction.
fn write_trades_csv<W: io::Write>(writer: W, trades: &[Trade]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for (i, trade) in trades.iter().enumerate() {
        wtr.serialize(TradeRow {
            trade: i + 1,
            entry_date: trade.entry_date.to_string(),
            exit_date: trade.exit_date.to_string(),
            entry_price: trade.entry_price,
            exit_price: trade.exit_price,
            return_pct: trade.return_pct,
            exit_reason: trade.exit_reason.label(),
            position_size: trade.position_size,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

fn run_stream(settings: &Settings, transport: HttpTransport, action: StreamAction) -> Result<()> {
    let gateway = BackendGateway::new(transport);
    let (op, result) = match action {
        StreamAction::Start {
            symbol,
            interval,
            timezone,
        } => {
            let defaults = &settings.defaults;
            let request = StreamRequest {
                symbol: symbol.unwrap_or_else(|| defaults.symbol.clone()),
                interval: interval.unwrap_or(defaults.interval),
                timezone: timezone.unwrap_or_else(|| settings.session.timezone.clone()),
            };
            info!("starting stream {} {}", request.symbol, request.interval);
            (Operation::StartStream, gateway.start_stream(&request))
        }
        StreamAction::Stop => (Operation::StopStream, gateway.stop_stream()),
    };

    match result {
        Ok(()) => {
            println!(
                "Live stream {}",
                if op == Operation::StartStream { "started" } else { "stopped" }
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e.user_message(op));
            process::exit(1);
        }
    }
}
