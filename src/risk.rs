//! Position-sizing collaborator seam. The engine never books balances; the
//! sizer owns its own view of account state. A zero suggested amount means
//! "do not trade" and leaves the candidate's confidence untouched.

/// Collaborator-supplied sizing, consulted on the emission path when
/// configured. Zero or negative means skip the trade.
pub trait RiskSizer: Send + Sync {
    fn suggest_amount(&self, confidence: f64) -> f64;
}

/// Risk a fixed fraction of a balance snapshot, scaled by confidence.
/// Mirrors the classic 2%-of-balance rule.
#[derive(Debug, Clone, Copy)]
pub struct FixedFractionSizer {
    pub balance: f64,
    pub fraction: f64,
    pub min_amount: f64,
    pub max_amount: f64,
}

impl FixedFractionSizer {
    pub fn new(balance: f64) -> Self {
        Self {
            balance,
            fraction: 0.02,
            min_amount: 1.0,
            max_amount: 100.0,
        }
    }
}

impl RiskSizer for FixedFractionSizer {
    fn suggest_amount(&self, confidence: f64) -> f64 {
        if !confidence.is_finite() || !self.balance.is_finite() || self.balance <= 0.0 {
            return 0.0;
        }
        let amount = self.balance * self.fraction * confidence.clamp(0.0, 1.0);
        if amount < self.min_amount {
            return 0.0;
        }
        amount.min(self.max_amount)
    }
}
