use serde::{Deserialize, Serialize};

/// A single timestamped price observation for one instrument.
///
/// Ticks are created by the feed collaborator and owned by the instrument's
/// buffer until evicted. Timestamps are unix seconds and must be
/// non-decreasing per instrument; the buffer enforces a staleness skew.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tick {
    pub symbol: String,
    pub price: f64,
    pub timestamp_s: u64,
}

impl Tick {
    pub fn new(symbol: impl Into<String>, price: f64, timestamp_s: u64) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            timestamp_s,
        }
    }

    /// A price is usable only if it is finite and strictly positive.
    pub fn has_valid_price(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}
