//! Average True Range approximated from single-price ticks.
//!
//! The feed carries one price per tick, no high/low, so the true range
//! collapses to |close - prevClose|. That makes this a volatility proxy
//! rather than a real ATR; deployments that need the genuine indicator
//! should feed OHLC candles instead.

/// Wilder-smoothed ATR series from close-only prices.
pub fn atr_series(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() < period + 1 {
        return Vec::new();
    }
    let ranges: Vec<f64> = prices.windows(2).map(|w| (w[1] - w[0]).abs()).collect();

    let mut atr = ranges[..period].iter().sum::<f64>() / period as f64;
    let mut out = Vec::with_capacity(ranges.len() - period + 1);
    out.push(atr);
    let pf = period as f64;
    for &tr in &ranges[period..] {
        atr = (atr * (pf - 1.0) + tr) / pf;
        out.push(atr);
    }
    out
}

pub fn atr_last(prices: &[f64], period: usize) -> Option<f64> {
    atr_series(prices, period).last().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_step_converges_to_step() {
        let prices: Vec<f64> = (0..60).map(|i| 1.0 + 0.01 * i as f64).collect();
        let atr = atr_last(&prices, 14).unwrap();
        assert!((atr - 0.01).abs() < 1e-9);
    }

    #[test]
    fn flat_series_is_zero() {
        assert_eq!(atr_last(&[2.0; 40], 14), Some(0.0));
    }

    #[test]
    fn requires_period_plus_one() {
        assert!(atr_last(&[1.0; 14], 14).is_none());
        assert!(atr_last(&[1.0; 15], 14).is_some());
    }
}
