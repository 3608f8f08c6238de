use crate::math::{mean, std_dev};

/// Bollinger Bands around a simple moving average, plus the two derived
/// readings the scorer consumes directly: band width and %B.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerPoint {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    /// (upper - lower) / middle.
    pub bandwidth: f64,
    /// Position of the close within the band; 0.5 on a zero-width band.
    pub percent_b: f64,
}

/// Latest band over the trailing `period` prices.
pub fn bollinger_last(prices: &[f64], period: usize, std_mult: f64) -> Option<BollingerPoint> {
    if period < 2 || prices.len() < period {
        return None;
    }
    let window = &prices[prices.len() - period..];
    let close = *window.last().expect("window is non-empty");
    Some(point(window, close, std_mult))
}

/// Band series, one point per full window.
pub fn bollinger_series(prices: &[f64], period: usize, std_mult: f64) -> Vec<BollingerPoint> {
    if period < 2 || prices.len() < period {
        return Vec::new();
    }
    prices
        .windows(period)
        .map(|w| point(w, w[period - 1], std_mult))
        .collect()
}

fn point(window: &[f64], close: f64, std_mult: f64) -> BollingerPoint {
    let middle = mean(window);
    let sd = std_dev(window);
    let upper = middle + std_mult * sd;
    let lower = middle - std_mult * sd;
    let width = upper - lower;
    let bandwidth = if middle.abs() < f64::EPSILON {
        0.0
    } else {
        width / middle
    };
    let percent_b = if width < f64::EPSILON {
        0.5
    } else {
        (close - lower) / width
    };
    BollingerPoint {
        upper,
        middle,
        lower,
        bandwidth,
        percent_b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_are_ordered() {
        let prices: Vec<f64> = (0..60)
            .map(|i| 1.1 + ((i as f64) * 0.9).sin() * 0.002)
            .collect();
        for p in bollinger_series(&prices, 20, 2.0) {
            assert!(p.upper >= p.middle, "upper < middle");
            assert!(p.middle >= p.lower, "middle < lower");
        }
    }

    #[test]
    fn flat_window_collapses_to_middle() {
        let p = bollinger_last(&[1.5; 25], 20, 2.0).unwrap();
        assert!((p.upper - p.lower).abs() < 1e-12);
        assert!((p.percent_b - 0.5).abs() < f64::EPSILON);
        assert_eq!(p.bandwidth, 0.0);
    }

    #[test]
    fn percent_b_tracks_extremes() {
        let mut prices = vec![1.0; 19];
        prices.push(2.0);
        let p = bollinger_last(&prices, 20, 2.0).unwrap();
        assert!(p.percent_b > 0.8);
    }

    #[test]
    fn short_input_not_computable() {
        assert!(bollinger_last(&[1.0; 10], 20, 2.0).is_none());
    }
}
