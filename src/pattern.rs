//! Chart pattern detection over a price snapshot.
//!
//! Swing points come from strict neighbor comparison; classification covers
//! double tops/bottoms, head-and-shoulders (plain and inverse), and the three
//! triangle families via trendline regression over recent swings.

use crate::config::PatternConfig;
use crate::math::{self, linear_regression_xy};
use crate::model::Direction;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingPoint {
    pub index: usize,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    DoubleTop,
    DoubleBottom,
    HeadAndShoulders,
    InverseHeadAndShoulders,
    TriangleAscending,
    TriangleDescending,
    TriangleSymmetric,
}

impl PatternKind {
    /// Direction the pattern resolves toward once it completes.
    pub fn implied_direction(self) -> Direction {
        match self {
            Self::DoubleTop | Self::HeadAndShoulders | Self::TriangleDescending => Direction::Down,
            Self::DoubleBottom | Self::InverseHeadAndShoulders | Self::TriangleAscending => {
                Direction::Up
            }
            Self::TriangleSymmetric => Direction::Neutral,
        }
    }

    pub fn is_reversal(self) -> bool {
        matches!(
            self,
            Self::DoubleTop
                | Self::DoubleBottom
                | Self::HeadAndShoulders
                | Self::InverseHeadAndShoulders
        )
    }

    /// Historical reliability prior per family; head-and-shoulders highest,
    /// triangles lowest.
    pub fn reliability(self) -> f64 {
        match self {
            Self::HeadAndShoulders | Self::InverseHeadAndShoulders => 0.8,
            Self::DoubleTop | Self::DoubleBottom => 0.7,
            Self::TriangleAscending | Self::TriangleDescending | Self::TriangleSymmetric => 0.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatternMatch {
    pub kind: PatternKind,
    /// (bar index, price) anchors, oldest first.
    pub anchors: Vec<(usize, f64)>,
    /// Geometry quality in [0, 1]: anchor symmetry and spacing regularity.
    pub strength: f64,
    pub reliability: f64,
}

impl PatternMatch {
    /// Whether the scorer may use this pattern given the prevailing trend.
    /// Reversal patterns need the opposite prevailing trend (a double top
    /// only means something after an up leg); triangles continue the trend
    /// matching their breakout side, the symmetric one follows either.
    pub fn usable_with(&self, prevailing: Direction) -> bool {
        if prevailing == Direction::Neutral {
            return false;
        }
        if self.kind.is_reversal() {
            return prevailing == self.kind.implied_direction().invert();
        }
        match self.kind {
            PatternKind::TriangleSymmetric => true,
            _ => prevailing == self.kind.implied_direction(),
        }
    }

    /// Direction this match votes for; symmetric triangles break with the
    /// prevailing trend.
    pub fn vote(&self, prevailing: Direction) -> Direction {
        match self.kind.implied_direction() {
            Direction::Neutral => prevailing,
            d => d,
        }
    }
}

/// Local maxima by strict neighbor comparison.
pub fn swing_highs(prices: &[f64]) -> Vec<SwingPoint> {
    (1..prices.len().saturating_sub(1))
        .filter(|&i| prices[i] > prices[i - 1] && prices[i] > prices[i + 1])
        .map(|i| SwingPoint {
            index: i,
            price: prices[i],
        })
        .collect()
}

/// Local minima by strict neighbor comparison.
pub fn swing_lows(prices: &[f64]) -> Vec<SwingPoint> {
    (1..prices.len().saturating_sub(1))
        .filter(|&i| prices[i] < prices[i - 1] && prices[i] < prices[i + 1])
        .map(|i| SwingPoint {
            index: i,
            price: prices[i],
        })
        .collect()
}

/// Detect all pattern matches over the snapshot.
pub fn detect(prices: &[f64], config: &PatternConfig) -> Vec<PatternMatch> {
    if prices.len() < 30 {
        return Vec::new();
    }
    let highs = swing_highs(prices);
    let lows = swing_lows(prices);

    let mut out = Vec::new();
    if let Some(m) = find_double(&highs, &lows, prices, config, true) {
        out.push(m);
    }
    if let Some(m) = find_double(&lows, &highs, prices, config, false) {
        out.push(m);
    }
    if let Some(m) = find_head_and_shoulders(&highs, config, true) {
        out.push(m);
    }
    if let Some(m) = find_head_and_shoulders(&lows, config, false) {
        out.push(m);
    }
    out.extend(find_triangles(&highs, &lows, config));
    out
}

/// Double top (`top = true`) or double bottom: two anchors within tolerance,
/// far enough apart, with an opposing swing between them beyond both.
fn find_double(
    anchors: &[SwingPoint],
    opposing: &[SwingPoint],
    _prices: &[f64],
    config: &PatternConfig,
    top: bool,
) -> Option<PatternMatch> {
    for pair in anchors.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if b.index - a.index < config.min_distance {
            continue;
        }
        let rel_diff = (a.price - b.price).abs() / a.price.abs().max(f64::EPSILON);
        if rel_diff > config.tolerance {
            continue;
        }
        // The pullback between the anchors must break past both of them.
        let between_ok = opposing.iter().any(|s| {
            s.index > a.index
                && s.index < b.index
                && if top {
                    s.price < a.price.min(b.price)
                } else {
                    s.price > a.price.max(b.price)
                }
        });
        if !between_ok {
            continue;
        }

        let symmetry = math::clamp01(1.0 - rel_diff / config.tolerance.max(f64::EPSILON));
        let kind = if top {
            PatternKind::DoubleTop
        } else {
            PatternKind::DoubleBottom
        };
        return Some(PatternMatch {
            kind,
            anchors: vec![(a.index, a.price), (b.index, b.price)],
            strength: symmetry,
            reliability: kind.reliability(),
        });
    }
    None
}

/// Head-and-shoulders over swing highs (`peaks = true`) or its inverse over
/// swing lows: middle extreme beyond both shoulders, shoulders level within
/// tolerance.
fn find_head_and_shoulders(
    swings: &[SwingPoint],
    config: &PatternConfig,
    peaks: bool,
) -> Option<PatternMatch> {
    for w in swings.windows(3) {
        let (left, head, right) = (w[0], w[1], w[2]);
        let head_beyond = if peaks {
            head.price > left.price && head.price > right.price
        } else {
            head.price < left.price && head.price < right.price
        };
        if !head_beyond {
            continue;
        }
        let shoulder_diff =
            (left.price - right.price).abs() / left.price.abs().max(f64::EPSILON);
        if shoulder_diff > config.tolerance {
            continue;
        }

        let symmetry = math::clamp01(1.0 - shoulder_diff / config.tolerance.max(f64::EPSILON));
        // Even spacing between shoulders and head improves the geometry.
        let left_span = (head.index - left.index) as f64;
        let right_span = (right.index - head.index) as f64;
        let spacing = math::clamp01(
            1.0 - (left_span - right_span).abs() / left_span.max(right_span).max(1.0),
        );
        let kind = if peaks {
            PatternKind::HeadAndShoulders
        } else {
            PatternKind::InverseHeadAndShoulders
        };
        return Some(PatternMatch {
            kind,
            anchors: vec![
                (left.index, left.price),
                (head.index, head.price),
                (right.index, right.price),
            ],
            strength: math::clamp01(symmetry * 0.6 + spacing * 0.4),
            reliability: kind.reliability(),
        });
    }
    None
}

/// Triangles from trendline fits over the most recent swings: resistance over
/// highs, support over lows.
fn find_triangles(
    highs: &[SwingPoint],
    lows: &[SwingPoint],
    config: &PatternConfig,
) -> Vec<PatternMatch> {
    let Some(resistance) = fit_trendline(highs) else {
        return Vec::new();
    };
    let Some(support) = fit_trendline(lows) else {
        return Vec::new();
    };

    let eps = config.flat_slope_eps;
    let mut out = Vec::new();

    let anchors: Vec<(usize, f64)> = recent_swings(highs)
        .iter()
        .chain(recent_swings(lows).iter())
        .map(|s| (s.index, s.price))
        .collect();

    if support.slope > eps && resistance.slope.abs() <= eps {
        out.push(triangle(
            PatternKind::TriangleAscending,
            anchors.clone(),
            support.r_squared,
            resistance.r_squared,
        ));
    } else if resistance.slope < -eps && support.slope.abs() <= eps {
        out.push(triangle(
            PatternKind::TriangleDescending,
            anchors.clone(),
            support.r_squared,
            resistance.r_squared,
        ));
    } else if resistance.slope < -eps
        && support.slope > eps
        && (resistance.slope + support.slope).abs() <= eps
    {
        out.push(triangle(
            PatternKind::TriangleSymmetric,
            anchors,
            support.r_squared,
            resistance.r_squared,
        ));
    }
    out
}

fn triangle(
    kind: PatternKind,
    anchors: Vec<(usize, f64)>,
    support_fit: f64,
    resistance_fit: f64,
) -> PatternMatch {
    PatternMatch {
        kind,
        anchors,
        strength: math::clamp01((support_fit.max(0.0) + resistance_fit.max(0.0)) / 2.0),
        reliability: kind.reliability(),
    }
}

const TRENDLINE_SWINGS: usize = 5;

fn recent_swings(swings: &[SwingPoint]) -> &[SwingPoint] {
    &swings[swings.len().saturating_sub(TRENDLINE_SWINGS)..]
}

fn fit_trendline(swings: &[SwingPoint]) -> Option<math::Regression> {
    let recent = recent_swings(swings);
    if recent.len() < 2 {
        return None;
    }
    let xs: Vec<f64> = recent.iter().map(|s| s.index as f64).collect();
    let ys: Vec<f64> = recent.iter().map(|s| s.price).collect();
    linear_regression_xy(&xs, &ys)
}
