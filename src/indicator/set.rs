use crate::config::IndicatorConfig;
use crate::model::Direction;

use super::adx::{adx_last, AdxPoint};
use super::atr::atr_series;
use super::bollinger::{bollinger_last, BollingerPoint};
use super::ema::ema_last;
use super::macd::{macd_series, MacdPoint};
use super::rsi::rsi_series;
use super::sma::sma_last;
use super::williams::williams_r_series;

/// Trailing values of one indicator, newest last. Keeps enough history
/// (up to five points) to read the indicator's own local trend.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorTrack {
    history: Vec<f64>,
}

impl IndicatorTrack {
    const KEEP: usize = 5;

    fn from_series(series: &[f64]) -> Option<Self> {
        if series.is_empty() {
            return None;
        }
        let start = series.len().saturating_sub(Self::KEEP);
        Some(Self {
            history: series[start..].to_vec(),
        })
    }

    pub fn current(&self) -> f64 {
        *self.history.last().expect("track is never empty")
    }

    pub fn previous(&self) -> Option<f64> {
        (self.history.len() >= 2).then(|| self.history[self.history.len() - 2])
    }

    pub fn history(&self) -> &[f64] {
        &self.history
    }

    /// Rising/falling/flat over the last two points.
    pub fn local_trend(&self) -> Direction {
        match self.previous() {
            Some(prev) if self.current() > prev => Direction::Up,
            Some(prev) if self.current() < prev => Direction::Down,
            _ => Direction::Neutral,
        }
    }
}

/// One cycle's derived indicator values. Recomputed from each snapshot,
/// never mutated in place; consumers share it read-only within the cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    pub rsi: IndicatorTrack,
    pub macd: MacdPoint,
    pub macd_histogram: IndicatorTrack,
    pub bollinger: BollingerPoint,
    pub sma: Vec<(usize, f64)>,
    pub ema: Vec<(usize, f64)>,
    pub atr: IndicatorTrack,
    pub williams_r: IndicatorTrack,
    pub adx: AdxPoint,
}

impl IndicatorSet {
    pub fn sma(&self, period: usize) -> Option<f64> {
        self.sma.iter().find(|(p, _)| *p == period).map(|(_, v)| *v)
    }

    pub fn ema(&self, period: usize) -> Option<f64> {
        self.ema.iter().find(|(p, _)| *p == period).map(|(_, v)| *v)
    }
}

/// Compute a full IndicatorSet over a price snapshot.
///
/// Pure and deterministic: the same snapshot yields a bit-for-bit identical
/// set. Returns `None` when the snapshot is shorter than the minimum window
/// ("not computable" is a skipped cycle, not an error).
pub fn compute(prices: &[f64], config: &IndicatorConfig) -> Option<IndicatorSet> {
    if prices.len() < config.min_window() {
        return None;
    }

    let rsi = IndicatorTrack::from_series(&rsi_series(prices, config.rsi_period))?;

    let macd_points = macd_series(prices, config.macd_fast, config.macd_slow, config.macd_signal);
    let macd = *macd_points.last()?;
    let histograms: Vec<f64> = macd_points.iter().map(|p| p.histogram).collect();
    let macd_histogram = IndicatorTrack::from_series(&histograms)?;

    let bollinger = bollinger_last(prices, config.bollinger_period, config.bollinger_std_dev)?;

    let mut sma = Vec::with_capacity(config.sma_periods.len());
    for &period in &config.sma_periods {
        sma.push((period, sma_last(prices, period)?));
    }
    let mut ema = Vec::with_capacity(config.ema_periods.len());
    for &period in &config.ema_periods {
        ema.push((period, ema_last(prices, period)?));
    }

    let atr = IndicatorTrack::from_series(&atr_series(prices, config.atr_period))?;
    let williams_r =
        IndicatorTrack::from_series(&williams_r_series(prices, config.williams_period))?;
    let adx = adx_last(prices, config.adx_period)?;

    Some(IndicatorSet {
        rsi,
        macd,
        macd_histogram,
        bollinger,
        sma,
        ema,
        atr,
        williams_r,
        adx,
    })
}
