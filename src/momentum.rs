//! Rate-of-change, price acceleration, and a synthetic volume proxy.
//!
//! The feed carries no traded volume, so "volume" here is the magnitude of
//! tick-to-tick price change relative to its own rolling average. It is an
//! explicit approximation: good for spotting unusually calm or choppy
//! stretches, useless as a participation measure.

use crate::config::MomentumConfig;
use crate::math::{self, linear_regression, mean};
use crate::model::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeTrend {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RocReading {
    /// Percent change over the lookback.
    pub value: f64,
    pub direction: Direction,
    pub strength: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VolumeReading {
    pub current: f64,
    pub average: f64,
    pub ratio: f64,
    pub trend: VolumeTrend,
    pub is_strong: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MomentumReport {
    pub roc: RocReading,
    /// Normalized second difference of the price series.
    pub acceleration: f64,
    pub volume: VolumeReading,
    /// Realized volatility of the window (RMS of simple returns).
    pub volatility: f64,
}

pub fn analyze(prices: &[f64], config: &MomentumConfig) -> Option<MomentumReport> {
    if prices.len() < config.roc_period + 2 {
        return None;
    }
    Some(MomentumReport {
        roc: rate_of_change(prices, config.roc_period),
        acceleration: acceleration(prices),
        volume: synthetic_volume(prices, config)?,
        volatility: math::realized_volatility(prices),
    })
}

fn rate_of_change(prices: &[f64], period: usize) -> RocReading {
    let current = prices[prices.len() - 1];
    let past = prices[prices.len() - 1 - period];
    let value = (current - past) / past.abs().max(f64::EPSILON) * 100.0;
    let direction = if value > 0.0 {
        Direction::Up
    } else if value < 0.0 {
        Direction::Down
    } else {
        Direction::Neutral
    };
    RocReading {
        value,
        direction,
        // A 0.1% move over the lookback saturates the reading; tick-scale
        // feeds move in hundredths of a percent.
        strength: math::clamp01(value.abs() / 0.1),
    }
}

/// Second difference of the last three prices, normalized by price level.
fn acceleration(prices: &[f64]) -> f64 {
    let n = prices.len();
    if n < 3 {
        return 0.0;
    }
    let second_diff = prices[n - 1] - 2.0 * prices[n - 2] + prices[n - 3];
    second_diff / prices[n - 1].abs().max(f64::EPSILON)
}

fn synthetic_volume(prices: &[f64], config: &MomentumConfig) -> Option<VolumeReading> {
    let changes: Vec<f64> = prices.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
    if changes.is_empty() {
        return None;
    }
    let avg_change = mean(&changes).max(f64::EPSILON);
    // Volume proxy: per-tick change magnitude scaled against the window mean.
    let volumes: Vec<f64> = changes.iter().map(|c| c / avg_change).collect();

    let tail_start = volumes.len().saturating_sub(config.volume_avg_window);
    let recent = &volumes[tail_start..];
    let average = mean(recent).max(f64::EPSILON);
    let current = volumes[volumes.len() - 1];
    let ratio = current / average;

    Some(VolumeReading {
        current,
        average,
        ratio,
        trend: volume_trend(volumes.as_slice()),
        is_strong: ratio > config.volume_strong_ratio,
    })
}

/// Classified from the slope of the last five proxy points; a ±10% relative
/// move over that stretch separates increasing/decreasing from stable.
fn volume_trend(volumes: &[f64]) -> VolumeTrend {
    let n = volumes.len();
    if n < 5 {
        return VolumeTrend::Stable;
    }
    let recent = &volumes[n - 5..];
    let Some(reg) = linear_regression(recent) else {
        return VolumeTrend::Stable;
    };
    let base = mean(recent).max(f64::EPSILON);
    let rel_change = reg.slope * 4.0 / base;
    if rel_change > 0.1 {
        VolumeTrend::Increasing
    } else if rel_change < -0.1 {
        VolumeTrend::Decreasing
    } else {
        VolumeTrend::Stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MomentumConfig {
        MomentumConfig::default()
    }

    #[test]
    fn uptrend_roc_reads_up() {
        let prices: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let report = analyze(&prices, &config()).unwrap();
        assert_eq!(report.roc.direction, Direction::Up);
        assert!(report.roc.value > 0.0);
        assert!((0.0..=1.0).contains(&report.roc.strength));
    }

    #[test]
    fn steady_steps_have_zero_acceleration() {
        let prices: Vec<f64> = (0..40).map(|i| 1.0 + 0.01 * i as f64).collect();
        let report = analyze(&prices, &config()).unwrap();
        assert!(report.acceleration.abs() < 1e-9);
    }

    #[test]
    fn burst_at_end_reads_strong_volume() {
        let mut prices: Vec<f64> = (0..60).map(|i| 1.1 + 0.0001 * (i % 2) as f64).collect();
        let last = *prices.last().unwrap();
        prices.push(last + 0.01);
        let report = analyze(&prices, &config()).unwrap();
        assert!(report.volume.is_strong);
        assert!(report.volume.ratio > 1.2);
    }

    #[test]
    fn calm_tail_trend_not_increasing() {
        // Noisy start, dead-flat tail.
        let mut prices: Vec<f64> = (0..30).map(|i| 1.1 + 0.001 * (i % 3) as f64).collect();
        prices.extend(std::iter::repeat(1.1).take(30));
        let report = analyze(&prices, &config()).unwrap();
        assert_ne!(report.volume.trend, VolumeTrend::Increasing);
    }

    #[test]
    fn short_window_skips() {
        assert!(analyze(&[1.0; 10], &config()).is_none());
    }
}
