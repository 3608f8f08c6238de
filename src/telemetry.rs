//! Process-wide tracing setup for embedding binaries.
//!
//! `RUST_LOG` wins when set; otherwise the configured level applies. Output
//! is JSON without ANSI escapes so collaborators can ship it to a collector
//! as-is. Safe to call more than once; later calls are no-ops.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| config.level.parse())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .json()
        .try_init();
}
