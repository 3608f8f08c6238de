use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Engine configuration. Every field carries a default so an empty TOML file
/// (or no file at all) yields a working engine.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Instruments tracked by the engine; the registry is fixed at startup.
    pub symbols: Vec<String>,
    pub buffer: BufferConfig,
    pub indicators: IndicatorConfig,
    pub trend: TrendConfig,
    pub pattern: PatternConfig,
    pub momentum: MomentumConfig,
    pub scoring: ScoringConfig,
    pub gate: GateConfig,
    pub cache: CacheConfig,
    pub runtime: RuntimeConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    pub history_size: usize,
    pub max_age_s: u64,
    pub stale_skew_s: u64,
    pub gap_threshold_s: u64,
    pub large_gap_s: u64,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            history_size: 300,
            max_age_s: 900,
            stale_skew_s: 30,
            gap_threshold_s: 5,
            large_gap_s: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_std_dev: f64,
    pub sma_periods: Vec<usize>,
    pub ema_periods: Vec<usize>,
    pub atr_period: usize,
    pub williams_period: usize,
    pub adx_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_std_dev: 2.0,
            sma_periods: vec![20, 50, 200],
            ema_periods: vec![9, 12, 20, 26],
            atr_period: 14,
            williams_period: 14,
            adx_period: 14,
        }
    }
}

impl IndicatorConfig {
    /// Minimum window length for a full IndicatorSet: the longest configured
    /// period plus one (the ADX double-smooth is checked separately by the
    /// indicator itself).
    pub fn min_window(&self) -> usize {
        let mut max = self
            .rsi_period
            .max(self.macd_slow + self.macd_signal)
            .max(self.bollinger_period)
            .max(self.atr_period)
            .max(self.williams_period)
            .max(self.adx_period * 2);
        for &p in self.sma_periods.iter().chain(self.ema_periods.iter()) {
            max = max.max(p);
        }
        max + 1
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Tail window sizes for the short and medium timeframes; the long
    /// timeframe always spans the full snapshot.
    pub short_window: usize,
    pub medium_window: usize,
    pub short_weight: f64,
    pub medium_weight: f64,
    pub long_weight: f64,
    /// Minimum relative price change over a window to call a direction.
    pub min_movement: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            short_window: 30,
            medium_window: 60,
            short_weight: 0.2,
            medium_weight: 0.3,
            long_weight: 0.5,
            min_movement: 0.00005,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Relative price tolerance for matching anchor levels.
    pub tolerance: f64,
    /// Minimum bars between double-top/bottom anchors.
    pub min_distance: usize,
    /// Slope magnitude below which a trendline counts as flat.
    pub flat_slope_eps: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.0003,
            min_distance: 5,
            flat_slope_eps: 0.0001,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MomentumConfig {
    pub roc_period: usize,
    pub volume_avg_window: usize,
    /// Synthetic volume ratio above which activity counts as strong.
    pub volume_strong_ratio: f64,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            roc_period: 14,
            volume_avg_window: 20,
            volume_strong_ratio: 1.2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub indicator_weight: f64,
    pub trend_weight: f64,
    pub market_weight: f64,
    pub pattern_weight: f64,
    /// Acceptable realized-volatility band; outside it market conditions
    /// count as unfavorable.
    pub min_volatility: f64,
    pub max_volatility: f64,
    /// Relative bid/ask spread above which conditions degrade.
    pub max_spread: f64,
    /// Relative move over the last 10 ticks below which the cycle is skipped.
    pub min_price_movement: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            indicator_weight: 0.35,
            trend_weight: 0.30,
            market_weight: 0.20,
            pattern_weight: 0.15,
            min_volatility: 0.00005,
            max_volatility: 0.025,
            max_spread: 0.0003,
            min_price_movement: 0.00005,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub min_confidence: f64,
    pub cooldown_s: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.75,
            cooldown_s: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_s: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_s: 30 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Bounded per-symbol tick queue; overflow drops the tick, never blocks.
    pub tick_queue_capacity: usize,
    /// Bounded outbound signal queue toward collaborators.
    pub signal_queue_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tick_queue_capacity: 256,
            signal_queue_capacity: 64,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Tracing filter directive, overridden by `RUST_LOG` when present.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load from a TOML file, then apply env overrides. Missing file is an
    /// error; missing keys are not.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        dotenvy::dotenv().ok();
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut config: EngineConfig =
            toml::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Comma-separated `SQ_SYMBOLS` and `SQ_MIN_CONFIDENCE` override the file,
    /// mirroring how deployments pin the strict-confidence mode.
    fn apply_env_overrides(&mut self) {
        if let Ok(raw) = std::env::var("SQ_SYMBOLS") {
            let symbols: Vec<String> = raw
                .split(',')
                .map(|s| s.trim().to_ascii_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
            if !symbols.is_empty() {
                self.symbols = symbols;
            }
        }
        if let Ok(raw) = std::env::var("SQ_MIN_CONFIDENCE") {
            if let Ok(v) = raw.parse::<f64>() {
                self.gate.min_confidence = v;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.buffer.history_size < self.indicators.min_window() {
            bail!(
                "buffer.history_size {} is below the indicator minimum window {}",
                self.buffer.history_size,
                self.indicators.min_window()
            );
        }
        if !(0.0..=1.0).contains(&self.gate.min_confidence) {
            bail!(
                "gate.min_confidence {} must be within [0, 1]",
                self.gate.min_confidence
            );
        }
        let weight_sum = self.scoring.indicator_weight
            + self.scoring.trend_weight
            + self.scoring.market_weight
            + self.scoring.pattern_weight;
        if weight_sum <= 0.0 {
            bail!("scoring weights must sum to a positive value");
        }
        if self.trend.short_window < 2 || self.trend.medium_window <= self.trend.short_window {
            bail!("trend windows must satisfy 2 <= short < medium");
        }
        Ok(())
    }

    /// Uppercased, deduplicated symbol list.
    pub fn tracked_symbols(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for sym in &self.symbols {
            let s = sym.trim().to_ascii_uppercase();
            if !s.is_empty() && !out.iter().any(|v| v == &s) {
                out.push(s);
            }
        }
        out
    }
}
