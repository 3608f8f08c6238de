//! Final admission control between a scored candidate and an emitted signal.
//!
//! Rejection at any stage is a normal per-cycle outcome ("no signal this
//! cycle"), reported as a stable reason code rather than an error.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};

use crate::config::GateConfig;
use crate::model::{Direction, RejectReason, Signal};
use crate::scorer::Candidate;

/// Collaborator-supplied market calendar. Absent calendar means always open.
pub trait TradingCalendar: Send + Sync {
    fn is_open(&self, timestamp_s: u64) -> bool;
}

/// UTC weekday session window; the common forex setup skips weekends and
/// the first/last hour of the day.
pub struct WeekdayCalendar {
    pub open_hour: u32,
    pub close_hour: u32,
}

impl Default for WeekdayCalendar {
    fn default() -> Self {
        Self {
            open_hour: 1,
            close_hour: 23,
        }
    }
}

impl TradingCalendar for WeekdayCalendar {
    fn is_open(&self, timestamp_s: u64) -> bool {
        let Some(dt) = DateTime::<Utc>::from_timestamp(timestamp_s as i64, 0) else {
            return false;
        };
        if matches!(dt.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }
        (self.open_hour..self.close_hour).contains(&dt.hour())
    }
}

pub struct SignalGate {
    config: GateConfig,
    calendar: Option<Arc<dyn TradingCalendar>>,
}

impl SignalGate {
    pub fn new(config: GateConfig) -> Self {
        Self {
            config,
            calendar: None,
        }
    }

    pub fn with_calendar(mut self, calendar: Arc<dyn TradingCalendar>) -> Self {
        self.calendar = Some(calendar);
        self
    }

    /// Run the admission chain: confidence floor, per-symbol cooldown,
    /// calendar, sanity. Success mints the immutable Signal.
    pub fn evaluate(
        &self,
        symbol: &str,
        candidate: &Candidate,
        last_signal_at_s: Option<u64>,
        now_s: u64,
    ) -> Result<Signal, RejectReason> {
        if candidate.confidence < self.config.min_confidence {
            return Err(RejectReason::BelowConfidenceFloor);
        }
        if let Some(last) = last_signal_at_s {
            if now_s.saturating_sub(last) < self.config.cooldown_s {
                return Err(RejectReason::CooldownActive);
            }
        }
        if let Some(calendar) = &self.calendar {
            if !calendar.is_open(now_s) {
                return Err(RejectReason::MarketClosed);
            }
        }
        if candidate.direction == Direction::Neutral {
            return Err(RejectReason::NeutralDirection);
        }
        if !levels_sane(candidate) {
            return Err(RejectReason::DegenerateLevels);
        }

        Ok(Signal {
            id: uuid::Uuid::new_v4().to_string(),
            symbol: symbol.to_string(),
            direction: candidate.direction,
            confidence: candidate.confidence,
            entry_price: candidate.entry_price,
            stop_loss: candidate.stop_loss,
            take_profit: candidate.take_profit,
            expires_in_s: candidate.expires_in_s,
            created_at_s: now_s,
            indicators: candidate.summary.clone(),
        })
    }

    pub fn cooldown_s(&self) -> u64 {
        self.config.cooldown_s
    }
}

fn levels_sane(candidate: &Candidate) -> bool {
    let Candidate {
        entry_price,
        stop_loss,
        take_profit,
        ..
    } = *candidate;
    entry_price.is_finite()
        && stop_loss.is_finite()
        && take_profit.is_finite()
        && stop_loss != entry_price
        && take_profit != entry_price
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IndicatorSummary;

    fn candidate(confidence: f64) -> Candidate {
        Candidate {
            direction: Direction::Up,
            confidence,
            entry_price: 1.1,
            stop_loss: 1.09,
            take_profit: 1.12,
            expires_in_s: 300,
            summary: IndicatorSummary {
                rsi: 50.0,
                macd_histogram: 0.0,
                percent_b: 0.5,
                adx: 25.0,
                atr: 0.001,
                trend_strength: 0.8,
            },
        }
    }

    #[test]
    fn confidence_floor() {
        let gate = SignalGate::new(GateConfig::default());
        assert_eq!(
            gate.evaluate("EURUSD", &candidate(0.5), None, 1_000).unwrap_err(),
            RejectReason::BelowConfidenceFloor
        );
        assert!(gate.evaluate("EURUSD", &candidate(0.9), None, 1_000).is_ok());
    }

    #[test]
    fn cooldown_window() {
        let gate = SignalGate::new(GateConfig {
            min_confidence: 0.5,
            cooldown_s: 120,
        });
        let c = candidate(0.9);
        assert_eq!(
            gate.evaluate("EURUSD", &c, Some(1_000), 1_060).unwrap_err(),
            RejectReason::CooldownActive
        );
        assert!(gate.evaluate("EURUSD", &c, Some(1_000), 1_120).is_ok());
    }

    #[test]
    fn neutral_direction_rejected() {
        let gate = SignalGate::new(GateConfig {
            min_confidence: 0.0,
            cooldown_s: 0,
        });
        let mut c = candidate(0.9);
        c.direction = Direction::Neutral;
        assert_eq!(
            gate.evaluate("EURUSD", &c, None, 1_000).unwrap_err(),
            RejectReason::NeutralDirection
        );
    }

    #[test]
    fn degenerate_levels_rejected() {
        let gate = SignalGate::new(GateConfig {
            min_confidence: 0.0,
            cooldown_s: 0,
        });
        let mut c = candidate(0.9);
        c.stop_loss = c.entry_price;
        assert_eq!(
            gate.evaluate("EURUSD", &c, None, 1_000).unwrap_err(),
            RejectReason::DegenerateLevels
        );
    }

    #[test]
    fn weekday_calendar_blocks_weekends() {
        let calendar = WeekdayCalendar::default();
        // 2024-01-06 is a Saturday, 2024-01-08 a Monday.
        let saturday_noon = 1_704_542_400;
        let monday_noon = 1_704_715_200;
        assert!(!calendar.is_open(saturday_noon));
        assert!(calendar.is_open(monday_noon));

        let gate =
            SignalGate::new(GateConfig::default()).with_calendar(Arc::new(calendar));
        assert_eq!(
            gate.evaluate("EURUSD", &candidate(0.9), None, saturday_noon)
                .unwrap_err(),
            RejectReason::MarketClosed
        );
    }
}
