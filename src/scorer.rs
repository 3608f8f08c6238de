//! Weighted combination of indicator, trend, market-condition, and pattern
//! readings into a directional candidate with a [0, 1] confidence.
//!
//! One consistent scale is used throughout: probabilistic confidence. The
//! per-deployment integer "signal score" variants collapse into the
//! configurable weights here.

use crate::config::ScoringConfig;
use crate::indicator::IndicatorSet;
use crate::math::clamp01;
use crate::model::{Direction, IndicatorSummary};
use crate::momentum::{MomentumReport, VolumeTrend};
use crate::pattern::PatternMatch;
use crate::trend::TrendReport;

/// A scored, un-gated signal candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub direction: Direction,
    pub confidence: f64,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub expires_in_s: u64,
    pub summary: IndicatorSummary,
}

/// Read-only per-cycle inputs; everything is borrowed from the cycle's
/// analysis pass.
pub struct ScoreInputs<'a> {
    pub prices: &'a [f64],
    pub indicators: &'a IndicatorSet,
    pub trend: &'a TrendReport,
    pub patterns: &'a [PatternMatch],
    pub momentum: &'a MomentumReport,
    /// Optional (bid, ask); `None` leaves spread out of the quality mix.
    pub spread: Option<(f64, f64)>,
}

#[derive(Debug, Clone, Copy)]
struct Vote {
    direction: Direction,
    strength: f64,
}

pub struct SignalScorer {
    config: ScoringConfig,
}

impl SignalScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Score one cycle. `None` means the cycle is skipped before scoring
    /// (flat market), a normal outcome.
    pub fn score(&self, inputs: &ScoreInputs<'_>) -> Option<Candidate> {
        let prices = inputs.prices;
        let entry_price = *prices.last()?;

        // Flat-market pre-check: no meaningful move over the last 10 ticks.
        if prices.len() >= 10 {
            let past = prices[prices.len() - 10];
            let movement = (entry_price - past).abs() / entry_price.abs().max(f64::EPSILON);
            if movement < self.config.min_price_movement {
                return None;
            }
        }

        let votes = indicator_votes(inputs.indicators, prices);
        let (ind_direction, ind_strength) = resolve_votes(&votes);

        let trend = inputs.trend;
        let momentum = inputs.momentum;
        let trend_direction = trend.alignment.direction;
        let trend_strength =
            clamp01(trend.alignment.strength * 0.7 + momentum.roc.strength * 0.3);
        let trend_confirmed = trend.alignment.is_aligned && momentum.roc.strength > 0.7;

        let volume_quality = volume_quality(momentum);
        let volatility_quality = self.volatility_quality(momentum.volatility);
        let spread_ok = self.spread_ok(inputs.spread);
        let market_quality = {
            let base = (volume_quality + volatility_quality) / 2.0;
            if spread_ok {
                base
            } else {
                base * 0.5
            }
        };
        let market_favorable = volume_quality > 0.7 && volatility_quality > 0.7 && spread_ok;

        let (pattern_direction, pattern_score) = pattern_component(inputs.patterns, trend_direction);

        let direction = final_direction(
            ind_direction,
            ind_strength * self.config.indicator_weight,
            trend_direction,
            trend_strength * self.config.trend_weight,
            pattern_direction,
            pattern_score * self.config.pattern_weight,
        );

        let weight_sum = self.config.indicator_weight
            + self.config.trend_weight
            + self.config.market_weight
            + self.config.pattern_weight;
        let score = (ind_strength * self.config.indicator_weight
            + trend_strength * self.config.trend_weight
            + market_quality * self.config.market_weight
            + pattern_score * self.config.pattern_weight)
            / weight_sum.max(f64::EPSILON);

        let mut confidence = score;
        if !market_favorable {
            confidence *= 0.7;
        }
        if !trend_confirmed {
            confidence *= 0.8;
        }
        // Contradictory indicator and trend reads cut confidence further.
        if ind_direction != Direction::Neutral
            && trend_direction != Direction::Neutral
            && ind_direction != trend_direction
        {
            confidence *= 0.8;
        }
        if volatility_quality < 0.5 {
            confidence *= 0.9;
        }
        // Indicators and trend independently landing on the final direction
        // is worth a modest boost.
        if direction != Direction::Neutral
            && ind_direction == direction
            && trend_direction == direction
        {
            confidence *= 1.15;
        }
        let confidence = clamp01(confidence);

        let (stop_loss, take_profit) =
            trading_levels(direction, entry_price, inputs.indicators, momentum.volatility);

        Some(Candidate {
            direction,
            confidence,
            entry_price,
            stop_loss,
            take_profit,
            expires_in_s: suggest_expiry(momentum.volatility, trend.strength),
            summary: IndicatorSummary {
                rsi: inputs.indicators.rsi.current(),
                macd_histogram: inputs.indicators.macd.histogram,
                percent_b: inputs.indicators.bollinger.percent_b,
                adx: inputs.indicators.adx.adx,
                atr: inputs.indicators.atr.current(),
                trend_strength: trend.strength,
            },
        })
    }

    /// Quality of realized volatility against the acceptable band: scaled
    /// toward 0 below the floor, decaying above the ceiling, 1 inside.
    fn volatility_quality(&self, volatility: f64) -> f64 {
        let min = self.config.min_volatility;
        let max = self.config.max_volatility;
        if volatility < min {
            clamp01(volatility / min.max(f64::EPSILON))
        } else if volatility > max {
            clamp01(1.0 - (volatility - max) / max.max(f64::EPSILON))
        } else {
            1.0
        }
    }

    fn spread_ok(&self, spread: Option<(f64, f64)>) -> bool {
        match spread {
            Some((bid, ask)) if bid > 0.0 && ask.is_finite() => {
                (ask - bid) / bid <= self.config.max_spread
            }
            _ => true,
        }
    }
}

fn indicator_votes(set: &IndicatorSet, prices: &[f64]) -> Vec<Vote> {
    let mut votes = Vec::with_capacity(7);

    // With a strongly trending market (high ADX) the oscillator reversal
    // zones stop meaning "reversal"; suppress any vote that would fade the
    // dominant DI side.
    let adx = set.adx;
    let trend_bias = if adx.adx >= 25.0 {
        if adx.plus_di > adx.minus_di {
            Direction::Up
        } else if adx.minus_di > adx.plus_di {
            Direction::Down
        } else {
            Direction::Neutral
        }
    } else {
        Direction::Neutral
    };
    let fade_allowed =
        |d: Direction| trend_bias == Direction::Neutral || d != trend_bias.invert();

    // RSI zones: hard reversal bands at 30/70, graded lean inside 45/55.
    let rsi = set.rsi.current();
    let rsi_vote = if rsi <= 30.0 {
        Vote {
            direction: Direction::Up,
            strength: clamp01(1.0 - rsi / 30.0),
        }
    } else if rsi >= 70.0 {
        Vote {
            direction: Direction::Down,
            strength: clamp01((rsi - 70.0) / 30.0),
        }
    } else if rsi < 45.0 {
        Vote {
            direction: Direction::Up,
            strength: clamp01((45.0 - rsi) / 15.0),
        }
    } else if rsi > 55.0 {
        Vote {
            direction: Direction::Down,
            strength: clamp01((rsi - 55.0) / 15.0),
        }
    } else {
        Vote {
            direction: Direction::Neutral,
            strength: 0.0,
        }
    };
    if fade_allowed(rsi_vote.direction) {
        votes.push(rsi_vote);
    }

    // MACD: histogram sign agreeing with the line-vs-signal relation.
    let macd = set.macd;
    votes.push(if macd.histogram > 0.0 && macd.value > macd.signal {
        Vote {
            direction: Direction::Up,
            strength: clamp01(macd.histogram.abs() / 0.001),
        }
    } else if macd.histogram < 0.0 && macd.value < macd.signal {
        Vote {
            direction: Direction::Down,
            strength: clamp01(macd.histogram.abs() / 0.001),
        }
    } else {
        Vote {
            direction: Direction::Neutral,
            strength: 0.0,
        }
    });

    // Bollinger %B at the band edges.
    let pb = set.bollinger.percent_b;
    let bb_vote = if pb <= 0.2 {
        Vote {
            direction: Direction::Up,
            strength: clamp01(1.0 - pb),
        }
    } else if pb >= 0.8 {
        Vote {
            direction: Direction::Down,
            strength: clamp01(pb),
        }
    } else {
        Vote {
            direction: Direction::Neutral,
            strength: 0.0,
        }
    };
    if fade_allowed(bb_vote.direction) {
        votes.push(bb_vote);
    }

    // Moving-average cross: EMA(20) against SMA(50).
    if let (Some(ema20), Some(sma50)) = (set.ema(20), set.sma(50)) {
        let gap = (ema20 - sma50) / sma50.abs().max(f64::EPSILON) * 100.0;
        votes.push(if gap > 0.0 {
            Vote {
                direction: Direction::Up,
                strength: clamp01(gap),
            }
        } else if gap < 0.0 {
            Vote {
                direction: Direction::Down,
                strength: clamp01(-gap),
            }
        } else {
            Vote {
                direction: Direction::Neutral,
                strength: 0.0,
            }
        });
    }

    // Williams %R extremes.
    let wr = set.williams_r.current();
    let wr_vote = if wr <= -80.0 {
        Vote {
            direction: Direction::Up,
            strength: clamp01((-wr - 80.0) / 20.0),
        }
    } else if wr >= -20.0 {
        Vote {
            direction: Direction::Down,
            strength: clamp01((wr + 20.0) / 20.0),
        }
    } else {
        Vote {
            direction: Direction::Neutral,
            strength: 0.0,
        }
    };
    if fade_allowed(wr_vote.direction) {
        votes.push(wr_vote);
    }

    // ADX lets the dominant DI side vote once the trend is established.
    if adx.adx >= 20.0 {
        let strength = clamp01((adx.adx - 20.0) / 30.0);
        votes.push(if adx.plus_di > adx.minus_di {
            Vote {
                direction: Direction::Up,
                strength,
            }
        } else if adx.minus_di > adx.plus_di {
            Vote {
                direction: Direction::Down,
                strength,
            }
        } else {
            Vote {
                direction: Direction::Neutral,
                strength: 0.0,
            }
        });
    }

    // Proximity to the 50-bar extremes: near support leans up, near
    // resistance leans down.
    if prices.len() >= 50 {
        let window = &prices[prices.len() - 50..];
        let high = window.iter().cloned().fold(f64::MIN, f64::max);
        let low = window.iter().cloned().fold(f64::MAX, f64::min);
        let last = window[window.len() - 1];
        let to_high = (high - last) / last.abs().max(f64::EPSILON);
        let to_low = (last - low) / last.abs().max(f64::EPSILON);
        if to_low < 0.0005 && to_low < to_high && fade_allowed(Direction::Up) {
            votes.push(Vote {
                direction: Direction::Up,
                strength: clamp01(1.0 - to_low / 0.0005),
            });
        } else if to_high < 0.0005 && to_high < to_low && fade_allowed(Direction::Down) {
            votes.push(Vote {
                direction: Direction::Down,
                strength: clamp01(1.0 - to_high / 0.0005),
            });
        }
    }

    votes
}

fn resolve_votes(votes: &[Vote]) -> (Direction, f64) {
    let mut up = 0.0;
    let mut down = 0.0;
    let mut active = 0usize;
    let mut total_strength = 0.0;
    for vote in votes {
        match vote.direction {
            Direction::Up => {
                up += vote.strength;
                active += 1;
                total_strength += vote.strength;
            }
            Direction::Down => {
                down += vote.strength;
                active += 1;
                total_strength += vote.strength;
            }
            Direction::Neutral => {}
        }
    }
    if active == 0 {
        return (Direction::Neutral, 0.0);
    }
    let direction = if up > down {
        Direction::Up
    } else if down > up {
        Direction::Down
    } else {
        Direction::Neutral
    };
    (direction, clamp01(total_strength / active as f64))
}

fn volume_quality(momentum: &MomentumReport) -> f64 {
    let trend_score = match momentum.volume.trend {
        VolumeTrend::Increasing => 1.0,
        VolumeTrend::Stable => 0.5,
        VolumeTrend::Decreasing => 0.0,
    };
    clamp01(momentum.volume.ratio * 0.7 + trend_score * 0.3)
}

fn pattern_component(patterns: &[PatternMatch], prevailing: Direction) -> (Direction, f64) {
    let best = patterns
        .iter()
        .filter(|p| p.usable_with(prevailing))
        .max_by(|a, b| {
            (a.strength * a.reliability)
                .partial_cmp(&(b.strength * b.reliability))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    match best {
        Some(p) => (p.vote(prevailing), clamp01(p.strength * p.reliability)),
        None => (Direction::Neutral, 0.0),
    }
}

/// Majority vote across the three directional components, each weighted by
/// its contribution. Ties read neutral.
fn final_direction(
    ind: Direction,
    ind_weight: f64,
    trend: Direction,
    trend_weight: f64,
    pattern: Direction,
    pattern_weight: f64,
) -> Direction {
    let mut up = 0.0;
    let mut down = 0.0;
    for (direction, weight) in [(ind, ind_weight), (trend, trend_weight), (pattern, pattern_weight)]
    {
        match direction {
            Direction::Up => up += weight,
            Direction::Down => down += weight,
            Direction::Neutral => {}
        }
    }
    if up > down {
        Direction::Up
    } else if down > up {
        Direction::Down
    } else {
        Direction::Neutral
    }
}

/// ATR-based levels, widened with volatility; take-profit runs further than
/// the stop for a positive reward/risk ratio.
fn trading_levels(
    direction: Direction,
    entry: f64,
    indicators: &IndicatorSet,
    volatility: f64,
) -> (f64, f64) {
    let atr = indicators.atr.current();
    let stop_mult = 2.0 + volatility * 2.0;
    let take_mult = 3.0 + volatility * 2.0;
    match direction {
        Direction::Up => (entry - atr * stop_mult, entry + atr * take_mult),
        Direction::Down => (entry + atr * stop_mult, entry - atr * take_mult),
        Direction::Neutral => (entry, entry),
    }
}

/// Suggested signal lifetime: calm, well-fit trends get the short horizon,
/// jittery or weak ones the defensive middle, everything else the long one.
fn suggest_expiry(volatility: f64, trend_strength: f64) -> u64 {
    if volatility > 0.004 || trend_strength < 0.6 {
        300
    } else if trend_strength > 0.8 && volatility < 0.002 {
        60
    } else {
        900
    }
}
