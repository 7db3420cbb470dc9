//! Online per-transaction-type statistics.
//!
//! One [`TxStats`] instance exists per registered transaction type and is
//! mutated concurrently by every worker executing that type. Aggregation is
//! streaming: count, min, max, mean and sum are updated incrementally per
//! observation and individual samples are never retained.

use parking_lot::Mutex;
use serde::Serialize;

/// Sentinel for "no timestamp observed yet" (lower bound of the window).
const MIN_TS_IDENTITY: i64 = i64::MAX;

/// Sentinel for "no timestamp observed yet" (upper bound of the window).
const MAX_TS_IDENTITY: i64 = i64::MIN;

#[derive(Debug, Clone)]
struct StatsInner {
    count: u64,
    errors: u64,
    warnings: u64,
    rollbacks: u64,
    min_ms: f64,
    max_ms: f64,
    mean_ms: f64,
    sum_ms: f64,
    min_ts_ms: i64,
    max_ts_ms: i64,
}

impl StatsInner {
    fn identity() -> Self {
        Self {
            count: 0,
            errors: 0,
            warnings: 0,
            rollbacks: 0,
            min_ms: f64::INFINITY,
            max_ms: f64::NEG_INFINITY,
            mean_ms: f64::NAN,
            sum_ms: 0.0,
            min_ts_ms: MIN_TS_IDENTITY,
            max_ts_ms: MAX_TS_IDENTITY,
        }
    }
}

/// Thread-safe streaming accumulator for one transaction type.
///
/// All mutating operations are safe under concurrent invocation from
/// multiple workers; [`TxStats::snapshot`] returns a consistent
/// point-in-time view while updates continue.
#[derive(Debug)]
pub struct TxStats {
    name: String,
    inner: Mutex<StatsInner>,
}

impl TxStats {
    /// Create an empty aggregator for the named transaction type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inner: Mutex::new(StatsInner::identity()),
        }
    }

    /// The transaction type this aggregator belongs to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Merge one latency observation (milliseconds) into the running
    /// aggregates.
    pub fn add_value(&self, latency_ms: f64) {
        let mut inner = self.inner.lock();
        inner.count += 1;
        inner.sum_ms += latency_ms;
        inner.min_ms = inner.min_ms.min(latency_ms);
        inner.max_ms = inner.max_ms.max(latency_ms);
        if inner.count == 1 {
            inner.mean_ms = latency_ms;
        } else {
            // Incremental mean update; numerically stable, no sample storage.
            let delta = latency_ms - inner.mean_ms;
            inner.mean_ms += delta / inner.count as f64;
        }
    }

    /// Count one hard error.
    pub fn increment_errors(&self) {
        self.inner.lock().errors += 1;
    }

    /// Count one benign warning.
    pub fn increment_warnings(&self) {
        self.inner.lock().warnings += 1;
    }

    /// Count one rollback.
    pub fn increment_rollbacks(&self) {
        self.inner.lock().rollbacks += 1;
    }

    /// Widen the lower bound of the observed wall-clock window. Never
    /// narrows it.
    pub fn offer_min_ts(&self, ts_ms: i64) {
        let mut inner = self.inner.lock();
        if ts_ms < inner.min_ts_ms {
            inner.min_ts_ms = ts_ms;
        }
    }

    /// Widen the upper bound of the observed wall-clock window. Never
    /// narrows it.
    pub fn offer_max_ts(&self, ts_ms: i64) {
        let mut inner = self.inner.lock();
        if ts_ms > inner.max_ts_ms {
            inner.max_ts_ms = ts_ms;
        }
    }

    /// Reset every counter and aggregate to its identity value.
    ///
    /// Used to discard warmup-phase data before measurement begins.
    pub fn clear(&self) {
        *self.inner.lock() = StatsInner::identity();
    }

    /// Consistent point-in-time snapshot of the current aggregates.
    pub fn snapshot(&self) -> TxStatsSnapshot {
        let inner = self.inner.lock().clone();
        TxStatsSnapshot {
            name: self.name.clone(),
            count: inner.count,
            errors: inner.errors,
            warnings: inner.warnings,
            rollbacks: inner.rollbacks,
            min_ms: if inner.count == 0 { f64::NAN } else { inner.min_ms },
            max_ms: if inner.count == 0 { f64::NAN } else { inner.max_ms },
            mean_ms: inner.mean_ms,
            sum_ms: inner.sum_ms,
            min_ts_ms: inner.min_ts_ms,
            max_ts_ms: inner.max_ts_ms,
        }
    }
}

/// Immutable view of one transaction type's aggregates.
#[derive(Debug, Clone, Serialize)]
pub struct TxStatsSnapshot {
    /// Transaction type name.
    pub name: String,
    /// Number of latency observations.
    pub count: u64,
    /// Hard errors (business rule violations and infrastructure failures).
    pub errors: u64,
    /// Benign warnings.
    pub warnings: u64,
    /// Rollbacks performed after hard errors.
    pub rollbacks: u64,
    /// Minimum observed latency, NaN before the first observation.
    pub min_ms: f64,
    /// Maximum observed latency, NaN before the first observation.
    pub max_ms: f64,
    /// Mean latency, NaN before the first observation.
    pub mean_ms: f64,
    /// Sum of observed latencies.
    pub sum_ms: f64,
    /// Earliest observed wall-clock timestamp (unix millis), `i64::MAX`
    /// before the first offer.
    pub min_ts_ms: i64,
    /// Latest observed wall-clock timestamp (unix millis), `i64::MIN`
    /// before the first offer.
    pub max_ts_ms: i64,
}

impl TxStatsSnapshot {
    /// Throughput over the observed window, in transactions per second.
    ///
    /// Returns 0 when fewer than two distinct timestamps were observed.
    pub fn observed_tps(&self) -> f64 {
        if self.min_ts_ms == MIN_TS_IDENTITY || self.max_ts_ms <= self.min_ts_ms {
            return 0.0;
        }
        let window_secs = (self.max_ts_ms - self.min_ts_ms) as f64 / 1000.0;
        self.count as f64 / window_secs
    }
}
