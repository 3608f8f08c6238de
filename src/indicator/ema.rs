use super::sma::Sma;

/// Exponential Moving Average; the first output is the SMA of the initial
/// window, as most charting packages compute it.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    multiplier: f64,
    ema: Option<f64>,
    seed: Sma,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "EMA period must be > 0");
        Self {
            period,
            multiplier: 2.0 / (period as f64 + 1.0),
            ema: None,
            seed: Sma::new(period),
        }
    }

    pub fn push(&mut self, value: f64) -> Option<f64> {
        match self.ema {
            Some(prev) => {
                self.ema = Some((value - prev) * self.multiplier + prev);
            }
            None => {
                if let Some(first) = self.seed.push(value) {
                    self.ema = Some(first);
                }
            }
        }
        self.ema
    }

    pub fn value(&self) -> Option<f64> {
        self.ema
    }

    pub fn is_ready(&self) -> bool {
        self.ema.is_some()
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

/// Fold a slice through an EMA, one output per input past the seed window.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    let mut ema = Ema::new(period);
    values.iter().filter_map(|&v| ema.push(v)).collect()
}

/// Latest EMA of a slice, `None` when shorter than the period.
pub fn ema_last(values: &[f64], period: usize) -> Option<f64> {
    ema_series(values, period).last().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_with_sma() {
        let mut ema = Ema::new(3);
        assert_eq!(ema.push(1.0), None);
        assert_eq!(ema.push(2.0), None);
        assert!((ema.push(3.0).unwrap() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn converges_toward_constant_input() {
        let mut ema = Ema::new(5);
        for _ in 0..5 {
            ema.push(10.0);
        }
        for _ in 0..200 {
            ema.push(20.0);
        }
        assert!((ema.value().unwrap() - 20.0).abs() < 1e-6);
    }

    #[test]
    fn series_length() {
        let values: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        assert_eq!(ema_series(&values, 5).len(), 16);
        assert_eq!(ema_last(&values[..4], 5), None);
    }
}
