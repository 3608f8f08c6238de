use signal_quant::buffer::{AppendOutcome, TickBuffer};
use signal_quant::config::BufferConfig;
use signal_quant::model::Tick;

fn tick(price: f64, ts: u64) -> Tick {
    Tick::new("EURUSD", price, ts)
}

#[test]
/// The window never holds more than the configured history size, no matter
/// how many ticks are pushed through it.
fn capacity_bound_holds_under_load() {
    let mut buf = TickBuffer::new(BufferConfig {
        history_size: 300,
        ..BufferConfig::default()
    });
    for i in 0..5_000u64 {
        buf.append(tick(1.1 + (i % 7) as f64 * 0.0001, i));
        assert!(buf.len() <= 300);
    }
    assert_eq!(buf.len(), 300);
    assert_eq!(buf.accepted(), 5_000);

    let snap = buf.snapshot();
    assert_eq!(snap.len(), 300);
    assert!((snap[snap.len() - 1] - (1.1 + (4_999 % 7) as f64 * 0.0001)).abs() < 1e-12);
}

#[test]
fn equal_timestamps_are_kept() {
    let mut buf = TickBuffer::new(BufferConfig::default());
    assert_eq!(buf.append(tick(1.1, 1_000)), AppendOutcome::Appended);
    assert_eq!(buf.append(tick(1.2, 1_000)), AppendOutcome::Appended);
    assert_eq!(buf.len(), 2);
}

#[test]
fn rejections_never_disturb_the_window() {
    let mut buf = TickBuffer::new(BufferConfig::default());
    buf.append(tick(1.1, 1_000));
    buf.append(tick(1.2, 1_001));

    assert_eq!(buf.append(tick(f64::INFINITY, 1_002)), AppendOutcome::RejectedInvalidPrice);
    assert_eq!(buf.append(tick(0.0, 1_003)), AppendOutcome::RejectedInvalidPrice);
    assert_eq!(buf.append(tick(1.3, 100)), AppendOutcome::RejectedStale);

    assert_eq!(buf.len(), 2);
    assert_eq!(buf.rejected(), 3);
    assert_eq!(buf.snapshot(), vec![1.1, 1.2]);
    assert_eq!(buf.last_timestamp(), Some(1_001));
}

#[test]
/// Gapped entries are reported but stay in the window until age evicts them.
fn gaps_reported_without_eviction() {
    let mut buf = TickBuffer::new(BufferConfig {
        history_size: 100,
        max_age_s: 900,
        gap_threshold_s: 5,
        large_gap_s: 60,
        ..BufferConfig::default()
    });
    buf.append(tick(1.1, 0));
    buf.append(tick(1.1, 1));
    buf.append(tick(1.1, 100));
    assert_eq!(buf.gaps(), vec![(2, 99)]);
    assert!(buf.has_large_gap());
    assert_eq!(buf.len(), 3);
}
