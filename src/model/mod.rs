pub mod signal;
pub mod tick;

pub use signal::{Direction, IndicatorSummary, RejectReason, Signal};
pub use tick::Tick;
