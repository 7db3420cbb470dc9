//! The weighted mix scheduler.
//!
//! Owns the weighted transaction table and the periodic-task table, runs a
//! fixed pool of concurrent workers for a bounded duration with optional
//! closed-loop pacing, and snapshots everything into a [`RunSummary`] at the
//! end.
//!
//! The scheduler is phase-agnostic: [`MixScheduler::run_tx_mix`] can be
//! called any number of times. The caller implements the warmup/measurement
//! protocol by running once, calling
//! [`MixScheduler::clear_all_stats`], and running again.

use crate::config::DriverConfig;
use crate::error::DriverError;
use crate::executor::execute_recorded;
use crate::summary::RunSummary;
use crate::transaction::BenchTransaction;
use oltpmix_core::{SeededRng, TxStats};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// What a mix slot does when selected.
#[derive(Clone)]
enum EntryKind {
    /// Execute the transaction on the selecting worker.
    Direct(Arc<dyn BenchTransaction>),
    /// Reserve the slot's share for a dependently-triggered transaction;
    /// selection performs no work. The asynchronous completion path records
    /// into this entry's aggregator, shared via [`MixScheduler::stats_for`].
    Placeholder,
}

#[derive(Clone)]
struct MixEntry {
    kind: EntryKind,
    weight: f64,
    stats: Arc<TxStats>,
}

#[derive(Clone)]
struct PeriodicEntry {
    tx: Arc<dyn BenchTransaction>,
    initial_delay: Duration,
    period: Duration,
    stats: Arc<TxStats>,
}

/// Drives a weighted transaction mix with a fixed pool of concurrent
/// workers plus independent periodic tasks.
pub struct MixScheduler {
    config: DriverConfig,
    entries: Vec<MixEntry>,
    periodics: Vec<PeriodicEntry>,
}

impl MixScheduler {
    /// Create a scheduler for the given configuration.
    pub fn new(config: DriverConfig) -> Result<Self, DriverError> {
        if config.clients == 0 {
            return Err(DriverError::NoClients);
        }
        Ok(Self {
            config,
            entries: Vec::new(),
            periodics: Vec::new(),
        })
    }

    /// The configuration this scheduler runs with.
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Register a weighted transaction type.
    ///
    /// Weights need not sum to 1; they are normalized into a cumulative
    /// distribution at run start. Registration order breaks ties and fixes
    /// report order.
    pub fn add_tx(
        &mut self,
        tx: Arc<dyn BenchTransaction>,
        weight: f64,
    ) -> Result<(), DriverError> {
        let name = tx.name().to_string();
        self.check_weight(&name, weight)?;
        self.check_unregistered(&name)?;
        self.entries.push(MixEntry {
            kind: EntryKind::Direct(tx),
            weight,
            stats: Arc::new(TxStats::new(name)),
        });
        Ok(())
    }

    /// Register a placeholder mix entry for a dependently-triggered
    /// transaction.
    ///
    /// The entry reserves `weight`'s proportional share of selections but
    /// executes nothing directly; the asynchronous completion path obtains
    /// the entry's aggregator through [`MixScheduler::stats_for`] and
    /// records into that same instance.
    pub fn add_placeholder(
        &mut self,
        name: impl Into<String>,
        weight: f64,
    ) -> Result<(), DriverError> {
        let name = name.into();
        self.check_weight(&name, weight)?;
        self.check_unregistered(&name)?;
        self.entries.push(MixEntry {
            kind: EntryKind::Placeholder,
            weight,
            stats: Arc::new(TxStats::new(name)),
        });
        Ok(())
    }

    /// Register a task fired by its own fixed-rate timer, independent of
    /// and concurrent with the weighted mix.
    pub fn add_periodic(
        &mut self,
        tx: Arc<dyn BenchTransaction>,
        initial_delay: Duration,
        period: Duration,
    ) -> Result<(), DriverError> {
        let name = tx.name().to_string();
        if period.is_zero() {
            return Err(DriverError::ZeroPeriod(name));
        }
        self.check_unregistered(&name)?;
        self.periodics.push(PeriodicEntry {
            stats: Arc::new(TxStats::new(name)),
            tx,
            initial_delay,
            period,
        });
        Ok(())
    }

    /// The aggregator registered for `name`.
    ///
    /// Requesting statistics for an unregistered transaction type is a
    /// setup error and fails fast.
    pub fn stats_for(&self, name: &str) -> Result<Arc<TxStats>, DriverError> {
        self.all_stats()
            .find(|s| s.name() == name)
            .cloned()
            .ok_or_else(|| DriverError::UnknownTransaction(name.to_string()))
    }

    /// Reset every registered aggregator to its identity values.
    ///
    /// Called between the warmup and measurement invocations of
    /// [`MixScheduler::run_tx_mix`] so the final summary reflects only the
    /// measured phase.
    pub fn clear_all_stats(&self) {
        for stats in self.all_stats() {
            stats.clear();
        }
    }

    /// Execute the mix for exactly `duration`.
    ///
    /// Spawns one worker per configured client plus one timer task per
    /// periodic entry. At the deadline workers are signaled to stop
    /// cooperatively, checked between executions only, and the call blocks
    /// until every in-flight execution has finished.
    pub async fn run_tx_mix(&self, duration: Duration) -> Result<(), DriverError> {
        if self.entries.is_empty() {
            return Err(DriverError::EmptyMix);
        }

        let entries: Arc<[MixEntry]> = self.entries.clone().into();
        let cumulative: Arc<[f64]> = cumulative_weights(&self.entries).into();
        let pacing = self.config.pacing_interval();
        let stop = CancellationToken::new();
        let start = Instant::now();

        info!(
            clients = self.config.clients,
            types = entries.len(),
            periodics = self.periodics.len(),
            paced_tps = self.config.target_tps.unwrap_or(0.0),
            duration_secs = duration.as_secs_f64(),
            "starting transaction mix"
        );

        let mut tasks = JoinSet::new();

        for periodic in &self.periodics {
            let periodic = periodic.clone();
            let stop = stop.clone();
            tasks.spawn(async move {
                run_periodic(periodic, start, stop).await;
            });
        }

        let clients = self.config.clients;
        for worker in 0..clients {
            let entries = Arc::clone(&entries);
            let cumulative = Arc::clone(&cumulative);
            let stop = stop.clone();
            let rng = SeededRng::for_worker(self.config.seed, worker as u64);
            tasks.spawn(async move {
                run_worker(worker, clients, entries, cumulative, rng, pacing, start, stop).await;
            });
        }

        tokio::time::sleep(duration).await;
        stop.cancel();
        while tasks.join_next().await.is_some() {}

        info!(
            elapsed_secs = start.elapsed().as_secs_f64(),
            "transaction mix finished"
        );
        Ok(())
    }

    /// Snapshot every registered aggregator plus run metadata into an
    /// immutable [`RunSummary`].
    pub fn build_summary(&self, measured: Duration) -> RunSummary {
        RunSummary {
            db_info: self.config.db_info.clone(),
            clients: self.config.clients,
            duration_secs: measured.as_secs_f64(),
            transactions: self.all_stats().map(|s| s.snapshot()).collect(),
        }
    }

    fn all_stats(&self) -> impl Iterator<Item = &Arc<TxStats>> + '_ {
        self.entries
            .iter()
            .map(|e| &e.stats)
            .chain(self.periodics.iter().map(|p| &p.stats))
    }

    fn check_weight(&self, name: &str, weight: f64) -> Result<(), DriverError> {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(DriverError::InvalidWeight {
                name: name.to_string(),
                weight,
            });
        }
        Ok(())
    }

    fn check_unregistered(&self, name: &str) -> Result<(), DriverError> {
        if self.all_stats().any(|s| s.name() == name) {
            return Err(DriverError::DuplicateTransaction(name.to_string()));
        }
        Ok(())
    }
}

/// Normalize registration-order weights into a cumulative distribution.
///
/// The final entry is pinned to 1.0 so a draw can never fall off the end of
/// the table.
fn cumulative_weights(entries: &[MixEntry]) -> Vec<f64> {
    let total: f64 = entries.iter().map(|e| e.weight).sum();
    let mut acc = 0.0;
    let mut table: Vec<f64> = entries
        .iter()
        .map(|e| {
            acc += e.weight / total;
            acc
        })
        .collect();
    if let Some(last) = table.last_mut() {
        *last = 1.0;
    }
    table
}

/// Standard discrete weighted sampling: the first entry whose cumulative
/// weight exceeds the draw, ties broken by registration order.
fn select_index(cumulative: &[f64], draw: f64) -> usize {
    cumulative
        .iter()
        .position(|&c| draw < c)
        .unwrap_or(cumulative.len() - 1)
}

#[allow(clippy::too_many_arguments)]
async fn run_worker(
    worker: usize,
    clients: usize,
    entries: Arc<[MixEntry]>,
    cumulative: Arc<[f64]>,
    mut rng: SeededRng,
    pacing: Option<Duration>,
    start: Instant,
    stop: CancellationToken,
) {
    // Stagger paced workers evenly across one inter-arrival interval so the
    // aggregate arrival process is smooth from the first tick.
    let mut next_at = match pacing {
        Some(interval) => start + interval.mul_f64(worker as f64 / clients.max(1) as f64),
        None => start,
    };
    let mut executed = 0u64;

    while !stop.is_cancelled() {
        let draw = rng.next_f64();
        let entry = &entries[select_index(&cumulative, draw)];

        if let Some(interval) = pacing {
            tokio::select! {
                _ = stop.cancelled() => break,
                _ = tokio::time::sleep_until(next_at) => {}
            }
            next_at += interval;
        }

        match &entry.kind {
            EntryKind::Direct(tx) => {
                execute_recorded(tx.as_ref(), &entry.stats).await;
                executed += 1;
            }
            // Share reserved for a dependently-triggered transaction; the
            // async completion path records into the same aggregator. Yield
            // so an unpaced all-placeholder mix cannot starve the runtime.
            EntryKind::Placeholder => tokio::task::yield_now().await,
        }
    }

    debug!(worker, executed, "worker stopped");
}

async fn run_periodic(periodic: PeriodicEntry, start: Instant, stop: CancellationToken) {
    let mut ticker = tokio::time::interval_at(start + periodic.initial_delay, periodic.period);
    let mut fired = 0u64;

    loop {
        tokio::select! {
            _ = stop.cancelled() => break,
            _ = ticker.tick() => {
                execute_recorded(periodic.tx.as_ref(), &periodic.stats).await;
                fired += 1;
            }
        }
    }

    debug!(tx = periodic.tx.name(), fired, "periodic task stopped");
}
