//! ADX/DMI from single-price moves.
//!
//! With close-only ticks the directional movement degenerates to the signed
//! tick-to-tick delta: up moves feed +DM, down moves feed -DM, and the true
//! range is |delta|. The Wilder smoothing chain (DM/TR -> DI -> DX -> ADX)
//! is the standard one.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdxPoint {
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
}

/// Latest ADX/DMI reading; needs at least `2 * period + 1` prices for the
/// double smoothing to seed.
pub fn adx_last(prices: &[f64], period: usize) -> Option<AdxPoint> {
    adx_series(prices, period).last().copied()
}

pub fn adx_series(prices: &[f64], period: usize) -> Vec<AdxPoint> {
    if period == 0 || prices.len() < 2 * period + 1 {
        return Vec::new();
    }

    let n = prices.len() - 1;
    let mut plus_dm = Vec::with_capacity(n);
    let mut minus_dm = Vec::with_capacity(n);
    let mut tr = Vec::with_capacity(n);
    for w in prices.windows(2) {
        let delta = w[1] - w[0];
        plus_dm.push(delta.max(0.0));
        minus_dm.push((-delta).max(0.0));
        tr.push(delta.abs());
    }

    let pf = period as f64;
    let mut sm_plus: f64 = plus_dm[..period].iter().sum();
    let mut sm_minus: f64 = minus_dm[..period].iter().sum();
    let mut sm_tr: f64 = tr[..period].iter().sum();

    let mut dx_values = Vec::new();
    let mut di_points = Vec::new();
    for i in period..n {
        sm_plus = sm_plus - sm_plus / pf + plus_dm[i];
        sm_minus = sm_minus - sm_minus / pf + minus_dm[i];
        sm_tr = sm_tr - sm_tr / pf + tr[i];

        let (plus_di, minus_di) = if sm_tr < f64::EPSILON {
            (0.0, 0.0)
        } else {
            (100.0 * sm_plus / sm_tr, 100.0 * sm_minus / sm_tr)
        };
        let di_sum = plus_di + minus_di;
        let dx = if di_sum < f64::EPSILON {
            0.0
        } else {
            100.0 * (plus_di - minus_di).abs() / di_sum
        };
        dx_values.push(dx);
        di_points.push((plus_di, minus_di));
    }

    if dx_values.len() < period {
        return Vec::new();
    }

    let mut adx = dx_values[..period].iter().sum::<f64>() / pf;
    let mut out = Vec::with_capacity(dx_values.len() - period + 1);
    let (p, m) = di_points[period - 1];
    out.push(AdxPoint {
        adx,
        plus_di: p,
        minus_di: m,
    });
    for i in period..dx_values.len() {
        adx = (adx * (pf - 1.0) + dx_values[i]) / pf;
        let (p, m) = di_points[i];
        out.push(AdxPoint {
            adx,
            plus_di: p,
            minus_di: m,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_uptrend_has_high_adx_and_plus_di() {
        let prices: Vec<f64> = (0..120).map(|i| 100.0 + 0.5 * i as f64).collect();
        let p = adx_last(&prices, 14).unwrap();
        assert!(p.adx > 50.0, "adx = {}", p.adx);
        assert!(p.plus_di > p.minus_di);
    }

    #[test]
    fn flat_series_reads_zero() {
        let p = adx_last(&[1.0; 120], 14).unwrap();
        assert_eq!(p.adx, 0.0);
        assert_eq!(p.plus_di, 0.0);
        assert_eq!(p.minus_di, 0.0);
    }

    #[test]
    fn adx_bounded() {
        let prices: Vec<f64> = (0..200)
            .map(|i| 100.0 + ((i as f64) * 0.5).sin() * 2.0)
            .collect();
        for p in adx_series(&prices, 14) {
            assert!((0.0..=100.0).contains(&p.adx));
        }
    }

    #[test]
    fn needs_double_window() {
        assert!(adx_last(&[1.0; 28], 14).is_none());
    }
}
