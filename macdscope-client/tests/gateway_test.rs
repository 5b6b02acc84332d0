//! BackendGateway against a scripted transport.

mod common;

use serde_json::json;

use common::{backtest_json, failure_json, market_json, ScriptedTransport};
use macdscope_client::{
    BackendGateway, BacktestParams, GatewayError, MarketDataRequest, Operation, StreamRequest,
    TransportError,
};
use macdscope_core::domain::{ExitReason, Interval};

fn request() -> MarketDataRequest {
    MarketDataRequest {
        symbol: "BTCUSDT".into(),
        interval: Interval::M5,
        days_back: 7,
        timezone: "UTC".into(),
    }
}

// ── Market data ──────────────────────────────────────────────────────

#[test]
fn fetch_decodes_dataset_and_indicators() {
    let transport = ScriptedTransport::new();
    transport.on("GET api/data/BTCUSDT/5m", Ok(market_json(3, 2)));
    let gateway = BackendGateway::new(transport.clone());

    let data = gateway.fetch_market_data(&request()).unwrap();

    assert_eq!(data.dataset.len(), 3);
    assert_eq!(data.indicators.lines["EMA_200"].len(), 2);
    assert_eq!(data.indicators.oscillator.as_ref().map(|o| o.len()), Some(3));
    assert_eq!(
        data.metadata.and_then(|m| m.symbol).as_deref(),
        Some("BTCUSDT")
    );

    let sent = &transport.requests()[0];
    assert_eq!(sent.method, "GET");
    assert_eq!(
        sent.query,
        vec![
            ("days".to_string(), "7".to_string()),
            ("timezone".to_string(), "UTC".to_string())
        ]
    );
}

#[test]
fn fetch_domain_failure_keeps_backend_message() {
    let transport = ScriptedTransport::new();
    transport.on("GET api/data/BTCUSDT/5m", Ok(failure_json("No data found for symbol")));
    let gateway = BackendGateway::new(transport);

    let err = gateway.fetch_market_data(&request()).unwrap_err();
    assert_eq!(err, GatewayError::Domain(Some("No data found for symbol".into())));
    assert_eq!(
        err.user_message(Operation::FetchMarketData),
        "No data found for symbol"
    );
}

#[test]
fn fetch_with_unordered_timestamps_is_contract_error() {
    let mut body = market_json(3, 2);
    body["data"]["timestamps"] = json!([
        "2024-01-01 00:10:00+00:00",
        "2024-01-01 00:05:00+00:00",
        "2024-01-01 00:00:00+00:00"
    ]);
    let transport = ScriptedTransport::new();
    transport.on("GET api/data/BTCUSDT/5m", Ok(body));
    let gateway = BackendGateway::new(transport);

    assert!(matches!(
        gateway.fetch_market_data(&request()),
        Err(GatewayError::Contract(_))
    ));
}

#[test]
fn fetch_transport_failure() {
    let transport = ScriptedTransport::new();
    transport.on(
        "GET api/data/BTCUSDT/5m",
        Err(TransportError::Timeout("30s elapsed".into())),
    );
    let gateway = BackendGateway::new(transport);

    let err = gateway.fetch_market_data(&request()).unwrap_err();
    assert!(matches!(err, GatewayError::Transport(TransportError::Timeout(_))));
    assert_eq!(
        err.user_message(Operation::FetchMarketData),
        "request timed out: 30s elapsed"
    );
}

// ── Backtest ─────────────────────────────────────────────────────────

#[test]
fn backtest_sends_fractions_and_decodes_trades() {
    let transport = ScriptedTransport::new();
    transport.on("POST api/backtest/BTCUSDT/5m", Ok(backtest_json()));
    let gateway = BackendGateway::new(transport.clone());

    let outcome = gateway
        .run_backtest("BTCUSDT", Interval::M5, &BacktestParams::default())
        .unwrap();

    assert_eq!(outcome.trades.len(), 2);
    assert_eq!(outcome.trades[0].exit_reason, ExitReason::TakeProfit);
    assert_eq!(outcome.trades[1].exit_reason, ExitReason::StopLoss);
    let perf = outcome.performance.unwrap();
    assert_eq!(perf.max_drawdown, 1.3);
    assert_eq!(perf.take_profit_hits, 1);
    assert_eq!(outcome.strategy_name.as_deref(), Some("MACD Crossover"));

    let body = transport.requests()[0].body.clone().unwrap();
    assert_eq!(body["take_profit"], json!(0.02));
    assert_eq!(body["stop_loss"], json!(0.01));
    assert_eq!(body["days_back"], json!(7));
    assert_eq!(body["timezone"], json!("UTC"));
}

#[test]
fn backtest_without_performance_block() {
    let mut body = backtest_json();
    body["results"]
        .as_object_mut()
        .unwrap()
        .remove("performance");
    let transport = ScriptedTransport::new();
    transport.on("POST api/backtest/BTCUSDT/5m", Ok(body));
    let gateway = BackendGateway::new(transport);

    let outcome = gateway
        .run_backtest("BTCUSDT", Interval::M5, &BacktestParams::default())
        .unwrap();
    assert!(outcome.performance.is_none());
    let derived = outcome.performance_or_derived();
    assert_eq!(derived.total_trades, 2);
    assert_eq!(derived.stop_loss_hits, 1);
}

#[test]
fn backtest_domain_failure() {
    let transport = ScriptedTransport::new();
    transport.on("POST api/backtest/BTCUSDT/5m", Ok(failure_json("insufficient data")));
    let gateway = BackendGateway::new(transport);

    let err = gateway
        .run_backtest("BTCUSDT", Interval::M5, &BacktestParams::default())
        .unwrap_err();
    assert_eq!(err.user_message(Operation::RunBacktest), "insufficient data");
}

// ── Stream control ───────────────────────────────────────────────────

#[test]
fn stream_start_and_stop() {
    let transport = ScriptedTransport::new();
    transport
        .on("POST api/stream/start", Ok(json!({"success": true, "message": "started"})))
        .on("POST api/stream/stop", Ok(json!({"success": false})));
    let gateway = BackendGateway::new(transport.clone());

    gateway
        .start_stream(&StreamRequest {
            symbol: "BTCUSDT".into(),
            interval: Interval::M1,
            timezone: "UTC".into(),
        })
        .unwrap();
    let body = transport.requests()[0].body.clone().unwrap();
    assert_eq!(body, json!({"symbol": "BTCUSDT", "interval": "1m", "timezone": "UTC"}));

    let err = gateway.stop_stream().unwrap_err();
    assert_eq!(err.user_message(Operation::StopStream), "Failed to stop live stream");
}

// ── Metadata ─────────────────────────────────────────────────────────

#[test]
fn metadata_lists_decode() {
    let transport = ScriptedTransport::new();
    transport
        .on("GET api/symbols", Ok(json!({"symbols": ["BTCUSDT", "ETHUSDT"]})))
        .on(
            "GET api/intervals",
            Ok(json!({"intervals": [{"value": "1m", "label": "1 Minute"}]})),
        );
    let gateway = BackendGateway::new(transport);

    assert_eq!(gateway.list_symbols(), vec!["BTCUSDT", "ETHUSDT"]);
    let intervals = gateway.list_intervals();
    assert_eq!(intervals.len(), 1);
    assert_eq!(intervals[0].value, "1m");
}

#[test]
fn metadata_failure_degrades_to_empty() {
    let transport = ScriptedTransport::new();
    transport.on("GET api/intervals", Ok(json!("not an object")));
    let gateway = BackendGateway::new(transport);

    // symbols route is unscripted: transport failure
    assert!(gateway.list_symbols().is_empty());
    // intervals body has the wrong shape
    assert!(gateway.list_intervals().is_empty());
}

#[test]
fn health_keeps_extra_fields() {
    let transport = ScriptedTransport::new();
    transport.on(
        "GET api/health",
        Ok(json!({"status": "healthy", "timestamp": "2024-01-01T00:00:00", "version": "1.2"})),
    );
    let gateway = BackendGateway::new(transport);

    let health = gateway.health().unwrap();
    assert!(health.is_healthy());
    assert_eq!(health.extra["version"], json!("1.2"));
}

#[test]
fn health_failure_propagates() {
    let gateway = BackendGateway::new(ScriptedTransport::new());
    assert!(matches!(gateway.health(), Err(GatewayError::Transport(_))));
}
