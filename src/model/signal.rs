use serde::{Deserialize, Serialize};

/// Directional reading shared by trends, indicator votes, and emitted signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Neutral,
}

impl Direction {
    pub fn invert(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Neutral => Self::Neutral,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Neutral => "neutral",
        }
    }
}

/// Compact indicator readout attached to an emitted signal so downstream
/// consumers can audit what the engine saw without replaying the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSummary {
    pub rsi: f64,
    pub macd_histogram: f64,
    pub percent_b: f64,
    pub adx: f64,
    pub atr: f64,
    pub trend_strength: f64,
}

/// A fully validated trading signal. Immutable once emitted; persistence and
/// notification are collaborator concerns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub id: String,
    pub symbol: String,
    /// Never `Neutral`; the gate rejects undecided candidates.
    pub direction: Direction,
    /// Clamped to [0, 1].
    pub confidence: f64,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    /// Suggested lifetime of the signal, seconds from `created_at_s`.
    pub expires_in_s: u64,
    pub created_at_s: u64,
    pub indicators: IndicatorSummary,
}

/// Stable taxonomy for gate rejections. Rejection is a normal per-cycle
/// outcome, not a fault; codes are stable strings for logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    BelowConfidenceFloor,
    CooldownActive,
    MarketClosed,
    NeutralDirection,
    DegenerateLevels,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BelowConfidenceFloor => "gate.below_confidence_floor",
            Self::CooldownActive => "gate.cooldown_active",
            Self::MarketClosed => "gate.market_closed",
            Self::NeutralDirection => "gate.neutral_direction",
            Self::DegenerateLevels => "gate.degenerate_levels",
        }
    }
}
