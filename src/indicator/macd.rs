use super::ema::Ema;

/// One MACD observation: fast EMA minus slow EMA, its signal EMA, and the
/// histogram between them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdPoint {
    pub value: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// MACD series over the input; outputs start once the slow EMA and the signal
/// EMA of the MACD line are both seeded.
pub fn macd_series(prices: &[f64], fast: usize, slow: usize, signal: usize) -> Vec<MacdPoint> {
    let mut fast_ema = Ema::new(fast.max(1));
    let mut slow_ema = Ema::new(slow.max(fast + 1));
    let mut signal_ema = Ema::new(signal.max(1));

    let mut out = Vec::new();
    for &price in prices {
        let f = fast_ema.push(price);
        let s = slow_ema.push(price);
        let (Some(f), Some(s)) = (f, s) else { continue };
        let macd = f - s;
        if let Some(sig) = signal_ema.push(macd) {
            out.push(MacdPoint {
                value: macd,
                signal: sig,
                histogram: macd - sig,
            });
        }
    }
    out
}
