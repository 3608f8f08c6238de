//! Per-instrument processing runtime.
//!
//! One task per symbol, each driven by its own bounded tick queue: buffer
//! append, indicator computation, scoring, and gating run to completion for
//! one tick before the next is taken (single writer per instrument). The
//! TTL cache is the only structure shared across tasks. Emission toward
//! collaborators is a non-blocking send on a bounded channel, so a slow
//! consumer can never stall tick processing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::buffer::{AppendOutcome, TickBuffer};
use crate::cache::{window_fingerprint, TtlCache};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::gate::{SignalGate, TradingCalendar};
use crate::model::{Signal, Tick};
use crate::risk::RiskSizer;
use crate::scorer::{Candidate, ScoreInputs, SignalScorer};
use crate::{indicator, momentum, pattern, trend};

/// Read-only per-instrument snapshot for health/monitoring surfaces.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolStatus {
    pub symbol: String,
    pub tick_count: u64,
    pub rejected_ticks: u64,
    pub dropped_ticks: u64,
    pub last_price: Option<f64>,
    pub last_signal_at_s: Option<u64>,
    pub signals_emitted: u64,
    pub cache_entries: usize,
}

impl SymbolStatus {
    fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            tick_count: 0,
            rejected_ticks: 0,
            dropped_ticks: 0,
            last_price: None,
            last_signal_at_s: None,
            signals_emitted: 0,
            cache_entries: 0,
        }
    }
}

type AnalysisCache = TtlCache<Option<Candidate>>;

pub struct EngineBuilder {
    config: EngineConfig,
    calendar: Option<Arc<dyn TradingCalendar>>,
    sizer: Option<Arc<dyn RiskSizer>>,
}

impl EngineBuilder {
    pub fn calendar(mut self, calendar: Arc<dyn TradingCalendar>) -> Self {
        self.calendar = Some(calendar);
        self
    }

    pub fn risk_sizer(mut self, sizer: Arc<dyn RiskSizer>) -> Self {
        self.sizer = Some(sizer);
        self
    }

    /// Validate config, build the fixed symbol registry, and spawn one
    /// worker task per symbol. Returns the engine handle and the signal
    /// stream for persistence/notification collaborators.
    pub fn start(self) -> Result<(Engine, mpsc::Receiver<Signal>), EngineError> {
        self.config
            .validate()
            .map_err(|e| EngineError::Config(e.to_string()))?;
        let symbols = self.config.tracked_symbols();
        if symbols.is_empty() {
            return Err(EngineError::Config("no symbols configured".to_string()));
        }

        let cache: Arc<AnalysisCache> =
            Arc::new(TtlCache::new(Duration::from_secs(self.config.cache.ttl_s)));
        let (signal_tx, signal_rx) = mpsc::channel(self.config.runtime.signal_queue_capacity);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let mut tick_senders = HashMap::new();
        let mut statuses = HashMap::new();
        for symbol in symbols {
            let (tick_tx, tick_rx) = mpsc::channel(self.config.runtime.tick_queue_capacity);
            let status = Arc::new(Mutex::new(SymbolStatus::new(&symbol)));

            let mut gate = SignalGate::new(self.config.gate.clone());
            if let Some(calendar) = &self.calendar {
                gate = gate.with_calendar(Arc::clone(calendar));
            }
            let worker = SymbolWorker {
                symbol: symbol.clone(),
                buffer: TickBuffer::new(self.config.buffer.clone()),
                config: self.config.clone(),
                scorer: SignalScorer::new(self.config.scoring.clone()),
                gate,
                sizer: self.sizer.clone(),
                cache: Arc::clone(&cache),
                status: Arc::clone(&status),
                signal_tx: signal_tx.clone(),
                last_signal_at_s: None,
                signals_emitted: 0,
            };
            tokio::spawn(worker.run(tick_rx, shutdown_rx.clone()));

            tick_senders.insert(symbol.clone(), tick_tx);
            statuses.insert(symbol, status);
        }

        Ok((
            Engine {
                tick_senders,
                statuses,
                cache,
                shutdown_tx,
            },
            signal_rx,
        ))
    }
}

pub struct Engine {
    tick_senders: HashMap<String, mpsc::Sender<Tick>>,
    statuses: HashMap<String, Arc<Mutex<SymbolStatus>>>,
    cache: Arc<AnalysisCache>,
    shutdown_tx: watch::Sender<bool>,
}

impl Engine {
    pub fn builder(config: EngineConfig) -> EngineBuilder {
        EngineBuilder {
            config,
            calendar: None,
            sizer: None,
        }
    }

    /// Feed one observation from the stream collaborator. Never blocks: a
    /// full queue drops the tick, counts it, and reports `QueueFull`.
    pub fn on_tick(
        &self,
        symbol: &str,
        price: f64,
        timestamp_s: u64,
    ) -> Result<(), EngineError> {
        let key = symbol.to_ascii_uppercase();
        let sender = self
            .tick_senders
            .get(&key)
            .ok_or_else(|| EngineError::UnknownSymbol(key.clone()))?;
        match sender.try_send(Tick::new(key.clone(), price, timestamp_s)) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                if let Some(status) = self.statuses.get(&key) {
                    status.lock().expect("status mutex poisoned").dropped_ticks += 1;
                }
                warn!(symbol = %key, "tick queue full, dropping tick");
                Err(EngineError::QueueFull { symbol: key })
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                Err(EngineError::UnknownSymbol(key))
            }
        }
    }

    /// Read-only status snapshot across all tracked instruments.
    pub fn status(&self) -> Vec<SymbolStatus> {
        let cache_entries = self.cache.len();
        let mut out: Vec<SymbolStatus> = self
            .statuses
            .values()
            .map(|s| {
                let mut status = s.lock().expect("status mutex poisoned").clone();
                status.cache_entries = cache_entries;
                status
            })
            .collect();
        out.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        out
    }

    /// Status snapshot rendered as JSON for a health endpoint collaborator.
    pub fn status_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.status())
    }

    /// Cooperative shutdown: workers stop consuming their queues; no
    /// in-flight cycle needs cancellation.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

struct SymbolWorker {
    symbol: String,
    buffer: TickBuffer,
    config: EngineConfig,
    scorer: SignalScorer,
    gate: SignalGate,
    sizer: Option<Arc<dyn RiskSizer>>,
    cache: Arc<AnalysisCache>,
    status: Arc<Mutex<SymbolStatus>>,
    signal_tx: mpsc::Sender<Signal>,
    last_signal_at_s: Option<u64>,
    signals_emitted: u64,
}

impl SymbolWorker {
    async fn run(
        mut self,
        mut tick_rx: mpsc::Receiver<Tick>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        debug!(symbol = %self.symbol, "symbol worker started");
        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }
                maybe_tick = tick_rx.recv() => {
                    let Some(tick) = maybe_tick else { break };
                    self.process(tick);
                }
            }
        }
        debug!(symbol = %self.symbol, "symbol worker stopped");
    }

    /// One full cycle for one tick; runs to completion before the next tick
    /// for this symbol is taken.
    fn process(&mut self, tick: Tick) {
        let now_s = tick.timestamp_s;
        let outcome = self.buffer.append(tick);
        self.mirror_status();
        if outcome != AppendOutcome::Appended {
            debug!(symbol = %self.symbol, ?outcome, "tick rejected by buffer");
            return;
        }

        if self.buffer.len() < self.config.indicators.min_window() {
            return;
        }
        if self.buffer.has_large_gap() {
            debug!(symbol = %self.symbol, "large gap in window, skipping cycle");
            return;
        }

        let prices = self.buffer.snapshot();
        let key = window_fingerprint(&self.symbol, &prices);
        let candidate = match self.cache.get(&key) {
            Some(cached) => cached,
            None => {
                let computed = self.analyze(&prices);
                self.cache.put(key, computed.clone());
                computed
            }
        };
        let Some(candidate) = candidate else {
            debug!(symbol = %self.symbol, "cycle produced no candidate");
            return;
        };

        match self
            .gate
            .evaluate(&self.symbol, &candidate, self.last_signal_at_s, now_s)
        {
            Ok(signal) => self.emit(signal, now_s),
            Err(reason) => {
                debug!(symbol = %self.symbol, reason = reason.as_str(), "candidate rejected");
            }
        }
    }

    /// The full analysis pass over a snapshot: indicators, trends, patterns,
    /// momentum, then scoring. Any "not computable" stage skips the cycle.
    fn analyze(&self, prices: &[f64]) -> Option<Candidate> {
        let indicators = indicator::compute(prices, &self.config.indicators)?;
        let trend = trend::analyze(prices, &self.config.trend)?;
        let patterns = pattern::detect(prices, &self.config.pattern);
        let momentum = momentum::analyze(prices, &self.config.momentum)?;
        self.scorer.score(&ScoreInputs {
            prices,
            indicators: &indicators,
            trend: &trend,
            patterns: &patterns,
            momentum: &momentum,
            spread: None,
        })
    }

    fn emit(&mut self, signal: Signal, now_s: u64) {
        if let Some(sizer) = &self.sizer {
            if sizer.suggest_amount(signal.confidence) <= 0.0 {
                debug!(symbol = %self.symbol, "risk sizer returned zero, not emitting");
                return;
            }
        }

        self.last_signal_at_s = Some(now_s);
        self.signals_emitted += 1;
        info!(
            symbol = %self.symbol,
            direction = signal.direction.as_str(),
            confidence = signal.confidence,
            "signal emitted"
        );
        if self.signal_tx.try_send(signal).is_err() {
            warn!(symbol = %self.symbol, "signal queue full, dropping signal");
        }
        self.mirror_status();
    }

    fn mirror_status(&self) {
        let mut status = self.status.lock().expect("status mutex poisoned");
        status.tick_count = self.buffer.accepted();
        status.rejected_ticks = self.buffer.rejected();
        status.last_price = self.buffer.last_price();
        status.last_signal_at_s = self.last_signal_at_s;
        status.signals_emitted = self.signals_emitted;
    }
}
