//! Synthetic transactions for exercising the engine without a database.
//!
//! These stand in for real business transactions in the demonstration
//! binary and the end-to-end tests: each execution draws a latency and an
//! outcome from its own deterministic random stream, sleeps for the drawn
//! latency, and reports a status code. No business rules are modeled.

use crate::secondary::SecondaryPool;
use crate::transaction::{BenchTransaction, TxError};
use async_trait::async_trait;
use oltpmix_core::{SeededRng, TxOutput, TxStats};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// A transaction with simulated latency and configurable warning/error
/// rates.
pub struct SyntheticTx {
    name: String,
    /// Shared stream; access is serialized, which keeps draws well-defined
    /// when several workers execute this type concurrently.
    rng: Mutex<SeededRng>,
    min_latency_ms: i64,
    max_latency_ms: i64,
    warning_rate: f64,
    error_rate: f64,
}

impl SyntheticTx {
    /// Create a synthetic transaction drawing from the given stream.
    pub fn new(name: impl Into<String>, rng: SeededRng) -> Self {
        Self {
            name: name.into(),
            rng: Mutex::new(rng),
            min_latency_ms: 1,
            max_latency_ms: 5,
            warning_rate: 0.0,
            error_rate: 0.0,
        }
    }

    /// Set the simulated latency range (inclusive, milliseconds).
    pub fn with_latency_ms(mut self, min: i64, max: i64) -> Self {
        self.min_latency_ms = min;
        self.max_latency_ms = max;
        self
    }

    /// Fraction of executions reporting a warning status.
    pub fn with_warning_rate(mut self, rate: f64) -> Self {
        self.warning_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Fraction of executions reporting a hard error status.
    pub fn with_error_rate(mut self, rate: f64) -> Self {
        self.error_rate = rate.clamp(0.0, 1.0);
        self
    }
}

#[async_trait]
impl BenchTransaction for SyntheticTx {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self) -> Result<TxOutput, TxError> {
        let (latency_ms, outcome) = {
            let mut rng = self.rng.lock();
            let latency = rng.next_i64_range(self.min_latency_ms, self.max_latency_ms);
            (latency, rng.next_f64())
        };

        tokio::time::sleep(Duration::from_millis(latency_ms as u64)).await;

        if outcome < self.error_rate {
            Ok(TxOutput::error(-1, "simulated business rule violation"))
        } else if outcome < self.error_rate + self.warning_rate {
            Ok(TxOutput::warning(1, "simulated benign condition"))
        } else {
            Ok(TxOutput::ok())
        }
    }
}

/// A transaction that triggers a dependent follow-up on the secondary pool.
///
/// The follow-up records into the aggregator registered for the mix's
/// placeholder entry, shared by reference, so the final report reflects
/// true asynchronous completion counts and timings.
pub struct TriggeringTx {
    primary: SyntheticTx,
    pool: Arc<SecondaryPool>,
    follow_up: Arc<dyn BenchTransaction>,
    follow_up_stats: Arc<TxStats>,
}

impl TriggeringTx {
    /// Wrap a synthetic transaction so each successful execution submits
    /// `follow_up` to `pool`, recorded against `follow_up_stats`.
    pub fn new(
        primary: SyntheticTx,
        pool: Arc<SecondaryPool>,
        follow_up: Arc<dyn BenchTransaction>,
        follow_up_stats: Arc<TxStats>,
    ) -> Self {
        Self {
            primary,
            pool,
            follow_up,
            follow_up_stats,
        }
    }
}

#[async_trait]
impl BenchTransaction for TriggeringTx {
    fn name(&self) -> &str {
        self.primary.name()
    }

    async fn execute(&self) -> Result<TxOutput, TxError> {
        let output = self.primary.execute().await?;
        if output.kind() != oltpmix_core::StatusKind::Error {
            self.pool.submit(
                Arc::clone(&self.follow_up),
                Arc::clone(&self.follow_up_stats),
            );
        }
        Ok(output)
    }
}
