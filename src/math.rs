//! Shared numeric helpers for the analysis modules.

/// Least-squares line fit over `values` with x = 0..n.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

pub fn linear_regression(values: &[f64]) -> Option<Regression> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    linear_regression_xy(&(0..n).map(|i| i as f64).collect::<Vec<_>>(), values)
}

/// Fit over explicit x coordinates, used for swing-point trendlines where the
/// points are not evenly spaced.
pub fn linear_regression_xy(xs: &[f64], ys: &[f64]) -> Option<Regression> {
    let n = xs.len();
    if n < 2 || n != ys.len() {
        return None;
    }
    let nf = n as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for (&x, &y) in xs.iter().zip(ys) {
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }
    let denom = nf * sum_xx - sum_x * sum_x;
    if denom.abs() < f64::EPSILON {
        return None;
    }
    let slope = (nf * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / nf;

    let mean_y = sum_y / nf;
    let mut total_ss = 0.0;
    let mut residual_ss = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        let d = y - mean_y;
        total_ss += d * d;
        let r = y - (slope * x + intercept);
        residual_ss += r * r;
    }
    // A perfectly flat series fits its own mean exactly.
    let r_squared = if total_ss < f64::EPSILON {
        1.0
    } else {
        1.0 - residual_ss / total_ss
    };

    Some(Regression {
        slope,
        intercept,
        r_squared,
    })
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Simple tick-to-tick returns: (p[i] - p[i-1]) / p[i-1].
pub fn simple_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|w| (w[1] - w[0]) / w[0].abs().max(f64::EPSILON))
        .collect()
}

/// Realized volatility of a price window as the root-mean-square of simple
/// returns. RMS rather than stddev so a smooth drift still registers as
/// movement instead of reading dead.
pub fn realized_volatility(prices: &[f64]) -> f64 {
    let returns = simple_returns(prices);
    if returns.is_empty() {
        return 0.0;
    }
    (returns.iter().map(|r| r * r).sum::<f64>() / returns.len() as f64).sqrt()
}

pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}
