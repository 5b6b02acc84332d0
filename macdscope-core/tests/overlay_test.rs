//! Overlay builder tests against hand-built datasets.

use macdscope_core::domain::{
    ExitReason, IndicatorSet, LinePoint, LineSeries, MarketDataset, Ohlcv, OscillatorPoint,
    OscillatorSeries, Timestamp, Trade,
};
use macdscope_core::overlay::{
    build_oscillator_view, build_price_view, LineRole, MarkerRole, Overlay, OverlayOptions, Trace,
};
use macdscope_core::{ResultStore, StoreCommand, Tone};

fn ts(minute: i64) -> Timestamp {
    Timestamp::from_millis(1_704_067_200_000 + minute * 60_000).unwrap()
}

fn dataset(n: usize) -> MarketDataset {
    let stamps = (0..n as i64).map(|i| ts(i * 5)).collect();
    let bars = (0..n)
        .map(|i| {
            let c = 100.0 + i as f64;
            Ohlcv {
                open: c - 0.5,
                high: c + 1.0,
                low: c - 1.0,
                close: c,
                volume: 10.0,
            }
        })
        .collect();
    MarketDataset::new(stamps, bars).unwrap()
}

fn ema(n: usize) -> LineSeries {
    let points = (0..n as i64)
        .map(|i| LinePoint {
            timestamp: ts(i * 5),
            value: 100.0,
        })
        .collect();
    LineSeries::new("EMA_200", points).unwrap()
}

fn macd(minutes: &[i64]) -> OscillatorSeries {
    let points = minutes
        .iter()
        .enumerate()
        .map(|(i, &m)| OscillatorPoint {
            timestamp: ts(m),
            value: i as f64 - 1.0,
            signal: 0.0,
        })
        .collect();
    OscillatorSeries::new("MACD", points).unwrap()
}

fn trade(entry_min: i64, ret: f64, reason: ExitReason) -> Trade {
    Trade {
        entry_date: ts(entry_min),
        exit_date: ts(entry_min + 7),
        entry_price: 100.0,
        exit_price: 100.0 * (1.0 + ret),
        return_pct: ret,
        exit_reason: reason,
        position_size: 1.0,
    }
}

// ── Price view ───────────────────────────────────────────────────────

#[test]
fn price_view_trace_counts() {
    // GIVEN 3 bars, a 2-point EMA and 2 trades
    let ds = dataset(3);
    let ind = IndicatorSet::default().with_line(ema(2));
    let trades = vec![
        trade(0, 0.02, ExitReason::TakeProfit),
        trade(5, -0.01, ExitReason::StopLoss),
    ];

    // WHEN the price view is built
    let traces = build_price_view(Some(&ds), Some(&ind), &trades, &OverlayOptions::default());

    // THEN candles + trend + entry + exit, in that order
    assert_eq!(traces.len(), 4);
    assert!(matches!(&traces[0], Trace::Candles { points } if points.len() == 3));
    assert_eq!(traces[1].line(LineRole::Trend).map(|p| p.len()), Some(2));
    assert_eq!(traces[2].markers(MarkerRole::Entry).map(|m| m.len()), Some(2));
    let exits = traces[3].markers(MarkerRole::Exit).unwrap();
    assert_eq!(exits.len(), 2);
    assert_eq!(exits[0].tone, Tone::Positive);
    assert_eq!(exits[1].tone, Tone::Negative);
}

#[test]
fn price_view_without_trend_or_trades() {
    let ds = dataset(4);
    let ind = IndicatorSet::default().with_line(ema(0));
    let traces = build_price_view(Some(&ds), Some(&ind), &[], &OverlayOptions::default());
    assert_eq!(traces.len(), 1);
    assert_eq!(traces[0].len(), 4);
}

#[test]
fn price_view_empty_without_indicators() {
    let ds = dataset(3);
    assert!(build_price_view(Some(&ds), None, &[], &OverlayOptions::default()).is_empty());
}

#[test]
fn price_view_falls_back_to_any_ema() {
    let ds = dataset(3);
    let ema50 = LineSeries::new(
        "EMA_50",
        vec![LinePoint {
            timestamp: ts(0),
            value: 99.0,
        }],
    )
    .unwrap();
    let ind = IndicatorSet::default().with_line(ema50);
    let traces = build_price_view(Some(&ds), Some(&ind), &[], &OverlayOptions::default());
    assert!(matches!(&traces[1], Trace::Line { name, .. } if name == "EMA_50"));
}

#[test]
fn stop_loss_marker_label() {
    let ds = dataset(3);
    let ind = IndicatorSet::default().with_line(ema(2));
    let trades = vec![trade(0, -0.013, ExitReason::parse("stop_loss"))];
    let traces = build_price_view(Some(&ds), Some(&ind), &trades, &OverlayOptions::default());
    let exit = &traces[3].markers(MarkerRole::Exit).unwrap()[0];
    assert_eq!(exit.tone, Tone::Negative);
    let label = exit.label.as_deref().unwrap();
    assert!(label.contains("stop_loss"), "{label}");
    assert!(label.contains("-1.30%"), "{label}");
}

// ── Oscillator view ──────────────────────────────────────────────────

#[test]
fn oscillator_view_lines_histogram_and_markers() {
    // GIVEN oscillator bars at 0, 5, 10 minutes with values -1, 0, 1 and signal 0
    let osc = macd(&[0, 5, 10]);
    // AND trades entering at 3 (aligns to bar 1), 10 (bar 2), 12 (after last bar)
    let trades = vec![
        trade(3, 0.02, ExitReason::TakeProfit),
        trade(10, -0.01, ExitReason::StopLoss),
        trade(12, 0.02, ExitReason::TakeProfit),
    ];

    let traces = build_oscillator_view(Some(&osc), &trades);

    assert_eq!(traces.len(), 4);
    assert_eq!(traces[0].line(LineRole::Oscillator).map(|p| p.len()), Some(3));
    assert_eq!(traces[1].line(LineRole::Signal).map(|p| p.len()), Some(3));
    match &traces[2] {
        Trace::Histogram { bars } => {
            let tones: Vec<Tone> = bars.iter().map(|b| b.tone).collect();
            assert_eq!(tones, vec![Tone::Negative, Tone::Neutral, Tone::Positive]);
        }
        other => panic!("expected histogram, got {other:?}"),
    }

    let markers = traces[3].markers(MarkerRole::Crossover).unwrap();
    assert_eq!(markers.len(), 2);
    assert_eq!(markers[0].timestamp, ts(5));
    assert_eq!(markers[0].y, 0.0);
    assert_eq!(markers[0].tone, Tone::Positive);
    assert_eq!(markers[1].timestamp, ts(10));
    assert_eq!(markers[1].y, 1.0);
    assert_eq!(markers[1].tone, Tone::Negative);
}

#[test]
fn oscillator_view_without_trades_has_no_marker_trace() {
    let traces = build_oscillator_view(Some(&macd(&[0, 5])), &[]);
    assert_eq!(traces.len(), 3);
}

// ── Snapshot overlay ─────────────────────────────────────────────────

#[test]
fn overlay_from_snapshot() {
    let mut store = ResultStore::default();
    store.apply(StoreCommand::LoadSucceeded {
        dataset: dataset(3),
        indicators: IndicatorSet::default()
            .with_line(ema(2))
            .with_oscillator(macd(&[0, 5, 10])),
    });
    store.apply(StoreCommand::TradesUpdated(vec![trade(0, 0.02, ExitReason::TakeProfit)]));

    let overlay = Overlay::from_snapshot(store.snapshot(), &OverlayOptions::default());
    assert_eq!(overlay.price.len(), 4);
    assert_eq!(overlay.oscillator.len(), 4);

    store.apply(StoreCommand::Clear);
    let overlay = Overlay::from_snapshot(store.snapshot(), &OverlayOptions::default());
    assert!(overlay.price.is_empty());
    assert!(overlay.oscillator.is_empty());
}
