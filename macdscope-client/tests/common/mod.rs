//! Shared test helpers: a scripted in-memory transport and response fixtures.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::{json, Value};

use macdscope_client::{Transport, TransportError};

#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub method: &'static str,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

struct Scripted {
    reply: Result<Value, TransportError>,
    delay: Duration,
}

/// Replies are queued per `"METHOD path"` and consumed in order.
/// An unscripted route fails like an unreachable backend.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<Scripted>>>,
    log: Mutex<Vec<Recorded>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on(&self, route: &str, reply: Result<Value, TransportError>) -> &Self {
        self.on_delayed(route, reply, Duration::ZERO)
    }

    pub fn on_delayed(
        &self,
        route: &str,
        reply: Result<Value, TransportError>,
        delay: Duration,
    ) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .entry(route.to_string())
            .or_default()
            .push_back(Scripted { reply, delay });
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    fn answer(&self, method: &'static str, path: &[&str], query: &[(&str, String)], body: Option<&Value>) -> Result<Value, TransportError> {
        let path = path.join("/");
        self.log.lock().unwrap().push(Recorded {
            method,
            path: path.clone(),
            query: query.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
            body: body.cloned(),
        });
        let route = format!("{method} {path}");
        let scripted = self
            .routes
            .lock()
            .unwrap()
            .get_mut(&route)
            .and_then(VecDeque::pop_front);
        match scripted {
            Some(s) => {
                if !s.delay.is_zero() {
                    thread::sleep(s.delay);
                }
                s.reply
            }
            None => Err(TransportError::Connect(format!("no route for {route}"))),
        }
    }
}

impl Transport for ScriptedTransport {
    fn get_json(&self, path: &[&str], query: &[(&str, String)]) -> Result<Value, TransportError> {
        self.answer("GET", path, query, None)
    }

    fn post_json(&self, path: &[&str], body: &Value) -> Result<Value, TransportError> {
        self.answer("POST", path, &[], Some(body))
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────

pub fn stamps(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| format!("2024-01-01 00:{:02}:00+00:00", i * 5))
        .collect()
}

/// Market data success body with `bars` candles, an EMA of `ema_points`
/// (leading points null) and a MACD group over every bar.
pub fn market_json(bars: usize, ema_points: usize) -> Value {
    let ts = stamps(bars);
    let ohlcv: Vec<Value> = (0..bars)
        .map(|i| {
            let c = 100.0 + i as f64;
            json!({"Open": c - 0.5, "High": c + 1.0, "Low": c - 1.0, "Close": c, "Volume": 1000.0})
        })
        .collect();
    let ema: Vec<Value> = (0..bars)
        .map(|i| {
            if i + ema_points >= bars {
                json!(100.0 + i as f64)
            } else {
                Value::Null
            }
        })
        .collect();
    let macd: Vec<Value> = (0..bars).map(|i| json!(i as f64 * 0.1 - 0.1)).collect();
    let signal: Vec<Value> = (0..bars).map(|_| json!(0.0)).collect();
    json!({
        "success": true,
        "data": {
            "timestamps": ts,
            "ohlcv": ohlcv,
            "metadata": {"symbol": "BTCUSDT", "interval": "5m", "timezone": "UTC", "last_updated": ts.last()}
        },
        "indicators": {
            "MACD": {
                "MACD": {"values": macd, "timestamps": ts},
                "Signal": {"values": signal, "timestamps": ts}
            },
            "EMA_200": {
                "EMA_200": {"values": ema, "timestamps": ts}
            }
        }
    })
}

pub fn backtest_json() -> Value {
    json!({
        "success": true,
        "results": {
            "strategy_name": "MACD Crossover",
            "symbol": "BTCUSDT",
            "trades": [
                {"entry_date": "2024-01-01 00:00:00+00:00", "entry_price": 100.0,
                 "exit_date": "2024-01-01 00:10:00+00:00", "exit_price": 102.0,
                 "return_pct": 0.02, "exit_reason": "Take Profit", "position_size": 1.0},
                {"entry_date": "2024-01-01 00:15:00+00:00", "entry_price": 100.0,
                 "exit_date": "2024-01-01 00:20:00+00:00", "exit_price": 98.7,
                 "return_pct": -0.013, "exit_reason": "Stop Loss", "position_size": 1.0}
            ],
            "performance": {
                "total_trades": 2, "winning_trades": 1, "losing_trades": 1,
                "win_rate": 50.0, "total_return": 0.7, "average_return": 0.35,
                "best_trade": 2.0, "worst_trade": -1.3, "max_drawdown": -1.3,
                "sharpe_ratio": 3.1, "take_profit_hits": 1, "stop_loss_hits": 1
            }
        }
    })
}

pub fn failure_json(error: &str) -> Value {
    json!({"success": false, "error": error})
}
