//! Per-timeframe trend reading and cross-timeframe alignment.
//!
//! Each timeframe is a tail slice of the price snapshot: short and medium
//! windows from config, long spanning the full window. Longer timeframes
//! carry more weight in the alignment vote.

use crate::config::TrendConfig;
use crate::indicator::ema::ema_last;
use crate::indicator::sma::sma_last;
use crate::math::{self, linear_regression};
use crate::model::Direction;

#[derive(Debug, Clone, PartialEq)]
pub struct TrendState {
    pub timeframe: &'static str,
    pub direction: Direction,
    /// Composite of fit quality, inverse volatility, and range; in [0, 1].
    pub strength: f64,
    pub slope: f64,
    pub r_squared: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentResult {
    pub direction: Direction,
    /// Agreeing weight over total weight, in [0, 1].
    pub strength: f64,
    /// True only when every timeframe reads the same direction.
    pub is_aligned: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendReport {
    pub timeframes: Vec<TrendState>,
    pub alignment: AlignmentResult,
    /// Mean per-timeframe strength scaled by alignment, in [0, 1].
    pub strength: f64,
}

/// Analyze all configured timeframes. `None` when even the short window
/// cannot be filled.
pub fn analyze(prices: &[f64], config: &TrendConfig) -> Option<TrendReport> {
    if prices.len() < config.medium_window {
        return None;
    }

    let frames = [
        ("short", config.short_window, config.short_weight),
        ("medium", config.medium_window, config.medium_weight),
        ("long", prices.len(), config.long_weight),
    ];

    let mut timeframes = Vec::with_capacity(frames.len());
    let mut weights = Vec::with_capacity(frames.len());
    for (label, window, weight) in frames {
        let tail = &prices[prices.len() - window.min(prices.len())..];
        timeframes.push(single_timeframe(label, tail, config.min_movement));
        weights.push(weight);
    }

    let alignment = alignment(&timeframes, &weights);
    let mean_strength =
        timeframes.iter().map(|t| t.strength).sum::<f64>() / timeframes.len() as f64;
    let strength = math::clamp01(mean_strength * alignment.strength);

    Some(TrendReport {
        timeframes,
        alignment,
        strength,
    })
}

fn single_timeframe(timeframe: &'static str, prices: &[f64], min_movement: f64) -> TrendState {
    let Some(reg) = linear_regression(prices) else {
        return TrendState {
            timeframe,
            direction: Direction::Neutral,
            strength: 0.0,
            slope: 0.0,
            r_squared: 0.0,
        };
    };

    let first = prices[0];
    let last = prices[prices.len() - 1];
    let rel_change = (last - first) / first.abs().max(f64::EPSILON);

    // Short average above long average, confirmed by actual movement and the
    // regression slope; anything mixed reads neutral.
    let short_avg = ema_last(prices, 9);
    let long_avg = sma_last(prices, 20);
    let cross = match (short_avg, long_avg) {
        (Some(s), Some(l)) if s > l => Direction::Up,
        (Some(s), Some(l)) if s < l => Direction::Down,
        _ => Direction::Neutral,
    };

    let direction = if rel_change.abs() < min_movement {
        Direction::Neutral
    } else if rel_change > 0.0 && reg.slope > 0.0 && cross != Direction::Down {
        Direction::Up
    } else if rel_change < 0.0 && reg.slope < 0.0 && cross != Direction::Up {
        Direction::Down
    } else {
        Direction::Neutral
    };

    let volatility = math::realized_volatility(prices);
    let high = prices.iter().cloned().fold(f64::MIN, f64::max);
    let low = prices.iter().cloned().fold(f64::MAX, f64::min);
    let range = (high - low) / first.abs().max(f64::EPSILON);

    let strength = math::clamp01(
        reg.r_squared.max(0.0) * 0.4 + (1.0 - volatility).max(0.0) * 0.3 + range * 0.3,
    );

    TrendState {
        timeframe,
        direction,
        strength,
        slope: reg.slope,
        r_squared: reg.r_squared,
    }
}

fn alignment(timeframes: &[TrendState], weights: &[f64]) -> AlignmentResult {
    let mut up = 0.0;
    let mut down = 0.0;
    let mut neutral = 0.0;
    for (state, &w) in timeframes.iter().zip(weights) {
        match state.direction {
            Direction::Up => up += w,
            Direction::Down => down += w,
            Direction::Neutral => neutral += w,
        }
    }
    let total = up + down + neutral;
    if total <= f64::EPSILON {
        return AlignmentResult {
            direction: Direction::Neutral,
            strength: 0.0,
            is_aligned: false,
        };
    }

    let (direction, winning) = if up >= down && up >= neutral {
        (Direction::Up, up)
    } else if down >= up && down >= neutral {
        (Direction::Down, down)
    } else {
        (Direction::Neutral, neutral)
    };

    AlignmentResult {
        direction,
        strength: winning / total,
        is_aligned: timeframes
            .iter()
            .all(|t| t.direction == timeframes[0].direction),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_up_aligns_up() {
        let prices: Vec<f64> = (0..80).map(|i| 1.1 + 0.0005 * i as f64).collect();
        let report = analyze(&prices, &TrendConfig::default()).unwrap();
        for tf in &report.timeframes {
            assert_eq!(tf.direction, Direction::Up, "{} not up", tf.timeframe);
        }
        assert!(report.alignment.is_aligned);
        assert_eq!(report.alignment.direction, Direction::Up);
        assert!((report.alignment.strength - 1.0).abs() < 1e-9);
    }

    #[test]
    fn flat_series_is_neutral() {
        let prices = vec![1.1; 80];
        let report = analyze(&prices, &TrendConfig::default()).unwrap();
        assert_eq!(report.alignment.direction, Direction::Neutral);
    }

    #[test]
    fn strength_is_clamped() {
        let prices: Vec<f64> = (0..80).map(|i| 1.0 + 0.05 * i as f64).collect();
        let report = analyze(&prices, &TrendConfig::default()).unwrap();
        for tf in &report.timeframes {
            assert!((0.0..=1.0).contains(&tf.strength));
        }
        assert!((0.0..=1.0).contains(&report.strength));
    }

    #[test]
    fn too_short_window_skips() {
        assert!(analyze(&[1.0; 30], &TrendConfig::default()).is_none());
    }
}
