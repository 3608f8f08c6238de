//! Relative Strength Index with Wilder smoothing.
//!
//! Smoothing choice: Wilder's recursive averages (not the simple-average
//! variant), applied consistently everywhere RSI is used. A window with zero
//! average loss reads 100 by definition, not a division error.

/// RSI series over the full input; one output per bar after the first
/// `period + 1` inputs. Empty when the input is too short.
pub fn rsi_series(prices: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || prices.len() < period + 1 {
        return Vec::new();
    }

    let mut gains = 0.0;
    let mut losses = 0.0;
    for w in prices[..period + 1].windows(2) {
        let delta = w[1] - w[0];
        if delta >= 0.0 {
            gains += delta;
        } else {
            losses -= delta;
        }
    }
    let mut avg_gain = gains / period as f64;
    let mut avg_loss = losses / period as f64;

    let mut out = Vec::with_capacity(prices.len() - period);
    out.push(rsi_from_averages(avg_gain, avg_loss));

    let pf = period as f64;
    for w in prices[period..].windows(2) {
        let delta = w[1] - w[0];
        let (gain, loss) = if delta >= 0.0 { (delta, 0.0) } else { (0.0, -delta) };
        avg_gain = (avg_gain * (pf - 1.0) + gain) / pf;
        avg_loss = (avg_loss * (pf - 1.0) + loss) / pf;
        out.push(rsi_from_averages(avg_gain, avg_loss));
    }
    out
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss <= f64::EPSILON {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}
