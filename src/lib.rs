//! Market signal analysis engine.
//!
//! Turns a live stream of per-instrument price ticks into directional
//! trading signals with a [0, 1] confidence score: bounded tick buffering,
//! rolling technical indicators, multi-timeframe trend aggregation, chart
//! pattern detection, momentum/synthetic-volume estimation, weighted scoring,
//! and cooldown/validity gating. Transport, persistence, and notification
//! live behind collaborator seams; this crate never blocks on I/O inside a
//! tick cycle.

pub mod buffer;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod gate;
pub mod indicator;
pub mod math;
pub mod model;
pub mod momentum;
pub mod pattern;
pub mod risk;
pub mod scorer;
pub mod telemetry;
pub mod trend;

pub use config::EngineConfig;
pub use engine::{Engine, SymbolStatus};
pub use error::EngineError;
pub use model::{Direction, Signal, Tick};
