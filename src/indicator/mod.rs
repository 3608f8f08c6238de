pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod set;
pub mod sma;
pub mod williams;

pub use set::{compute, IndicatorSet, IndicatorTrack};
