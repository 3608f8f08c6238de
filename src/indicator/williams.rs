//! Williams %R over a close-only window: where the latest price sits between
//! the window's extremes, scaled to [-100, 0]. A flat window reads -50.

pub fn williams_r_series(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() < period {
        return Vec::new();
    }
    prices
        .windows(period)
        .map(|w| {
            let close = w[period - 1];
            let highest = w.iter().cloned().fold(f64::MIN, f64::max);
            let lowest = w.iter().cloned().fold(f64::MAX, f64::min);
            let range = highest - lowest;
            if range < f64::EPSILON {
                -50.0
            } else {
                (highest - close) / range * -100.0
            }
        })
        .collect()
}

pub fn williams_r_last(prices: &[f64], period: usize) -> Option<f64> {
    williams_r_series(prices, period).last().copied()
}
