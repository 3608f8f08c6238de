use std::time::Duration;

use signal_quant::config::EngineConfig;
use signal_quant::engine::Engine;
use signal_quant::error::EngineError;
use signal_quant::model::Direction;

fn test_config(min_confidence: f64, cooldown_s: u64) -> EngineConfig {
    let mut config = EngineConfig::default();
    config.symbols = vec!["EURUSD".to_string()];
    config.gate.min_confidence = min_confidence;
    config.gate.cooldown_s = cooldown_s;
    // Room for a whole test feed even before the worker gets scheduled.
    config.runtime.tick_queue_capacity = 2048;
    config
}

async fn feed_ramp(engine: &Engine, symbol: &str, t0: u64, n: u64, step: f64) {
    for i in 0..n {
        engine
            .on_tick(symbol, 1.1 + i as f64 * step, t0 + i)
            .expect("tick accepted");
        // Let the worker drain between sends.
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
/// A sustained uptrend long enough to fill the indicator window must produce
/// an Up signal whose confidence clears the configured floor.
async fn sustained_uptrend_emits_up_signal() {
    let (engine, mut signals) = Engine::builder(test_config(0.55, 120))
        .start()
        .expect("engine starts");
    feed_ramp(&engine, "EURUSD", 1_000_000, 300, 0.0001).await;

    let signal = tokio::time::timeout(Duration::from_secs(2), signals.recv())
        .await
        .expect("signal within timeout")
        .expect("channel open");
    assert_eq!(signal.symbol, "EURUSD");
    assert_eq!(signal.direction, Direction::Up);
    assert!(signal.confidence > 0.55);
    assert!((0.0..=1.0).contains(&signal.confidence));
    assert!(signal.take_profit > signal.entry_price);
    assert!(signal.stop_loss < signal.entry_price);
    engine.shutdown();
}

#[tokio::test]
/// A short flat feed never fills the indicator window, so no signal can
/// appear no matter how long we wait.
async fn short_flat_feed_stays_silent() {
    let (engine, mut signals) = Engine::builder(test_config(0.0, 0))
        .start()
        .expect("engine starts");
    for i in 0..25u64 {
        engine.on_tick("EURUSD", 1.1, 1_000_000 + i).expect("tick accepted");
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(signals.try_recv().is_err());
    engine.shutdown();
}

#[tokio::test]
/// A feed outage larger than the large-gap threshold poisons the window:
/// cycles are skipped until the gap ages out, so nothing is emitted.
async fn large_gap_suppresses_signals() {
    let (engine, mut signals) = Engine::builder(test_config(0.55, 0))
        .start()
        .expect("engine starts");
    let t0 = 1_000_000u64;
    // 200 ticks leave the window one short of computable.
    feed_ramp(&engine, "EURUSD", t0, 200, 0.0001).await;
    // The feed resumes after a two-minute outage.
    for i in 0..30u64 {
        engine
            .on_tick("EURUSD", 1.12 + i as f64 * 0.0001, t0 + 199 + 120 + i)
            .expect("tick accepted");
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(signals.try_recv().is_err());
    engine.shutdown();
}

#[tokio::test]
/// Consecutive signals for one symbol must be separated by at least the
/// configured cooldown.
async fn cooldown_spaces_out_signals() {
    let cooldown_s = 30;
    let (engine, mut signals) = Engine::builder(test_config(0.55, cooldown_s))
        .start()
        .expect("engine starts");
    feed_ramp(&engine, "EURUSD", 1_000_000, 420, 0.0001).await;
    tokio::time::sleep(Duration::from_millis(300)).await;

    let mut emitted = Vec::new();
    while let Ok(signal) = signals.try_recv() {
        emitted.push(signal);
    }
    assert!(emitted.len() >= 2, "expected repeated signals, got {}", emitted.len());
    for pair in emitted.windows(2) {
        assert!(pair[1].created_at_s - pair[0].created_at_s >= cooldown_s);
    }
    engine.shutdown();
}

#[tokio::test]
async fn unknown_symbol_is_rejected() {
    let (engine, _signals) = Engine::builder(test_config(0.75, 120))
        .start()
        .expect("engine starts");
    let err = engine.on_tick("GBPUSD", 1.25, 1_000_000).unwrap_err();
    assert!(matches!(err, EngineError::UnknownSymbol(_)));
    // Symbol lookup is case-insensitive for tracked instruments.
    assert!(engine.on_tick("eurusd", 1.1, 1_000_000).is_ok());
    engine.shutdown();
}

#[tokio::test]
async fn status_reflects_processed_ticks() {
    let (engine, _signals) = Engine::builder(test_config(0.75, 120))
        .start()
        .expect("engine starts");
    for i in 0..10u64 {
        engine
            .on_tick("EURUSD", 1.1 + i as f64 * 0.0001, 1_000_000 + i)
            .expect("tick accepted");
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(200)).await;

    let statuses = engine.status();
    assert_eq!(statuses.len(), 1);
    let status = &statuses[0];
    assert_eq!(status.symbol, "EURUSD");
    assert_eq!(status.tick_count, 10);
    assert_eq!(status.rejected_ticks, 0);
    assert_eq!(status.signals_emitted, 0);
    let last = status.last_price.expect("last price recorded");
    assert!((last - 1.1009).abs() < 1e-9);

    let json = engine.status_json().expect("status serializes");
    assert!(json.contains("\"EURUSD\""));
    engine.shutdown();
}

#[tokio::test]
/// After shutdown the workers stop consuming, so feeding becomes an error
/// instead of silently queueing forever.
async fn shutdown_stops_accepting_ticks() {
    let (engine, _signals) = Engine::builder(test_config(0.75, 120))
        .start()
        .expect("engine starts");
    assert!(engine.on_tick("EURUSD", 1.1, 1_000_000).is_ok());

    engine.shutdown();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(engine.on_tick("EURUSD", 1.1, 1_000_001).is_err());
}
