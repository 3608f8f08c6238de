/// Simple Moving Average over a fixed period, ring-buffered for O(1) push.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    buffer: Vec<f64>,
    head: usize,
    count: usize,
    sum: f64,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "SMA period must be > 0");
        Self {
            period,
            buffer: vec![0.0; period],
            head: 0,
            count: 0,
            sum: 0.0,
        }
    }

    /// Push a value; returns the average once the window is full.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        if self.count >= self.period {
            self.sum -= self.buffer[self.head];
        }
        self.buffer[self.head] = value;
        self.sum += value;
        self.head = (self.head + 1) % self.period;
        if self.count < self.period {
            self.count += 1;
        }
        self.value()
    }

    pub fn value(&self) -> Option<f64> {
        (self.count >= self.period).then(|| self.sum / self.period as f64)
    }

    pub fn is_ready(&self) -> bool {
        self.count >= self.period
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

/// Fold a price slice through an SMA, returning one output per input that had
/// a full window behind it.
pub fn sma_series(values: &[f64], period: usize) -> Vec<f64> {
    let mut sma = Sma::new(period);
    values.iter().filter_map(|&v| sma.push(v)).collect()
}

/// Latest SMA of a slice, `None` when the slice is shorter than the period.
pub fn sma_last(values: &[f64], period: usize) -> Option<f64> {
    if values.len() < period {
        return None;
    }
    let tail = &values[values.len() - period..];
    Some(tail.iter().sum::<f64>() / period as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warms_up_then_tracks() {
        let mut sma = Sma::new(3);
        assert_eq!(sma.push(1.0), None);
        assert_eq!(sma.push(2.0), None);
        assert!(!sma.is_ready());
        assert!((sma.push(3.0).unwrap() - 2.0).abs() < f64::EPSILON);
        assert!((sma.push(4.0).unwrap() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn no_drift_after_many_pushes() {
        let mut sma = Sma::new(10);
        let mut naive: Vec<f64> = Vec::new();
        for i in 0..10_000u64 {
            let v = (i as f64) * 0.1 + 0.01;
            sma.push(v);
            naive.push(v);
            if naive.len() > 10 {
                naive.remove(0);
            }
            if let Some(ring_avg) = sma.value() {
                let naive_avg = naive.iter().sum::<f64>() / naive.len() as f64;
                assert!((ring_avg - naive_avg).abs() < 1e-8, "drift at i={}", i);
            }
        }
    }

    #[test]
    fn series_and_last_agree() {
        let values: Vec<f64> = (1..=30).map(|i| i as f64).collect();
        let series = sma_series(&values, 5);
        assert_eq!(series.len(), 26);
        assert_eq!(series.last().copied(), sma_last(&values, 5));
    }

    #[test]
    fn last_requires_full_window() {
        assert_eq!(sma_last(&[1.0, 2.0], 3), None);
    }

    #[test]
    #[should_panic(expected = "SMA period must be > 0")]
    fn zero_period_panics() {
        Sma::new(0);
    }
}
