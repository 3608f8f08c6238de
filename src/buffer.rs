//! Bounded, per-instrument ordered tick window with gap and staleness
//! filtering. One buffer per symbol, owned by that symbol's processing task.

use std::collections::VecDeque;

use crate::config::BufferConfig;
use crate::model::Tick;

/// Why an appended tick was not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Appended,
    RejectedInvalidPrice,
    RejectedStale,
}

#[derive(Debug)]
pub struct TickBuffer {
    ticks: VecDeque<Tick>,
    config: BufferConfig,
    accepted: u64,
    rejected_invalid: u64,
    rejected_stale: u64,
}

impl TickBuffer {
    pub fn new(config: BufferConfig) -> Self {
        Self {
            ticks: VecDeque::with_capacity(config.history_size),
            config,
            accepted: 0,
            rejected_invalid: 0,
            rejected_stale: 0,
        }
    }

    /// Append one tick. Non-finite or non-positive prices and timestamps more
    /// than `stale_skew_s` behind the newest stored tick are dropped and
    /// counted; both are normal feed noise, never an error.
    pub fn append(&mut self, tick: Tick) -> AppendOutcome {
        if !tick.has_valid_price() {
            self.rejected_invalid += 1;
            return AppendOutcome::RejectedInvalidPrice;
        }
        if let Some(newest) = self.ticks.back() {
            if tick.timestamp_s + self.config.stale_skew_s < newest.timestamp_s {
                self.rejected_stale += 1;
                return AppendOutcome::RejectedStale;
            }
            // Keep strict ordering for out-of-order arrivals inside the skew.
            if tick.timestamp_s < newest.timestamp_s {
                self.rejected_stale += 1;
                return AppendOutcome::RejectedStale;
            }
        }
        self.ticks.push_back(tick);
        self.accepted += 1;
        self.evict();
        AppendOutcome::Appended
    }

    fn evict(&mut self) {
        while self.ticks.len() > self.config.history_size {
            let _ = self.ticks.pop_front();
        }
        if let Some(newest_ts) = self.ticks.back().map(|t| t.timestamp_s) {
            while let Some(front) = self.ticks.front() {
                if newest_ts.saturating_sub(front.timestamp_s) > self.config.max_age_s {
                    let _ = self.ticks.pop_front();
                } else {
                    break;
                }
            }
        }
    }

    /// Indices where the timestamp delta to the previous tick exceeds the gap
    /// threshold, with the delta in seconds. Gapped entries stay in the
    /// window; only age evicts them.
    pub fn gaps(&self) -> Vec<(usize, u64)> {
        let mut out = Vec::new();
        for i in 1..self.ticks.len() {
            let delta = self.ticks[i]
                .timestamp_s
                .saturating_sub(self.ticks[i - 1].timestamp_s);
            if delta > self.config.gap_threshold_s {
                out.push((i, delta));
            }
        }
        out
    }

    /// True when any consecutive delta exceeds the large-gap threshold;
    /// callers skip indicator computation for the cycle ("insufficient
    /// contiguous data"), they do not error.
    pub fn has_large_gap(&self) -> bool {
        self.ticks.iter().zip(self.ticks.iter().skip(1)).any(|(a, b)| {
            b.timestamp_s.saturating_sub(a.timestamp_s) > self.config.large_gap_s
        })
    }

    /// Owned copy of the current price window, oldest first. Immune to later
    /// appends, safe to share read-only across analysis consumers.
    pub fn snapshot(&self) -> Vec<f64> {
        self.ticks.iter().map(|t| t.price).collect()
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    pub fn last_price(&self) -> Option<f64> {
        self.ticks.back().map(|t| t.price)
    }

    pub fn last_timestamp(&self) -> Option<u64> {
        self.ticks.back().map(|t| t.timestamp_s)
    }

    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    pub fn rejected(&self) -> u64 {
        self.rejected_invalid + self.rejected_stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_with(history_size: usize) -> TickBuffer {
        TickBuffer::new(BufferConfig {
            history_size,
            ..BufferConfig::default()
        })
    }

    fn tick(price: f64, ts: u64) -> Tick {
        Tick::new("EURUSD", price, ts)
    }

    #[test]
    fn rejects_invalid_prices() {
        let mut buf = buffer_with(10);
        assert_eq!(
            buf.append(tick(f64::NAN, 1)),
            AppendOutcome::RejectedInvalidPrice
        );
        assert_eq!(buf.append(tick(-1.0, 2)), AppendOutcome::RejectedInvalidPrice);
        assert_eq!(buf.len(), 0);
        assert_eq!(buf.rejected(), 2);
    }

    #[test]
    fn rejects_stale_timestamps() {
        let mut buf = buffer_with(10);
        assert_eq!(buf.append(tick(1.1, 1000)), AppendOutcome::Appended);
        assert_eq!(buf.append(tick(1.1, 900)), AppendOutcome::RejectedStale);
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn bounded_fifo_eviction() {
        let mut buf = buffer_with(5);
        for i in 0..20u64 {
            buf.append(tick(1.0 + i as f64, i));
        }
        assert_eq!(buf.len(), 5);
        // Oldest evicted first.
        let snap = buf.snapshot();
        assert_eq!(snap, vec![16.0, 17.0, 18.0, 19.0, 20.0]);
    }

    #[test]
    fn age_eviction() {
        let mut buf = TickBuffer::new(BufferConfig {
            history_size: 100,
            max_age_s: 60,
            ..BufferConfig::default()
        });
        buf.append(tick(1.0, 0));
        buf.append(tick(1.1, 30));
        buf.append(tick(1.2, 100));
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.last_price(), Some(1.2));
    }

    #[test]
    fn gap_detection() {
        let mut buf = buffer_with(10);
        buf.append(tick(1.0, 0));
        buf.append(tick(1.0, 2));
        buf.append(tick(1.0, 10));
        buf.append(tick(1.0, 130));
        let gaps = buf.gaps();
        assert_eq!(gaps, vec![(2, 8), (3, 120)]);
        assert!(buf.has_large_gap());
    }

    #[test]
    fn snapshot_is_a_copy() {
        let mut buf = buffer_with(10);
        buf.append(tick(1.0, 0));
        let snap = buf.snapshot();
        buf.append(tick(2.0, 1));
        assert_eq!(snap, vec![1.0]);
    }
}
