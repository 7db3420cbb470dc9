//! Configuration for a benchmark run.

use std::time::Duration;

/// Configuration for the mix scheduler.
#[derive(Clone, Debug)]
pub struct DriverConfig {
    /// Number of concurrent simulated clients (primary workers).
    pub clients: usize,

    /// Master seed; each worker draws from a disjoint jump-ahead stream
    /// derived from it.
    pub seed: u64,

    /// Target aggregate throughput in transactions per second. `None` runs
    /// unpaced: workers execute back-to-back, bounded only by concurrency
    /// and downstream latency.
    pub target_tps: Option<f64>,

    /// Damping factor applied when sizing the secondary pool from a
    /// transaction's mix share.
    pub secondary_damping: f64,

    /// Grace period granted to in-flight secondary work at shutdown before
    /// it is force-cancelled.
    pub secondary_grace: Duration,

    /// Description of the database under test, carried into the run
    /// summary.
    pub db_info: String,
}

impl DriverConfig {
    /// Create a configuration for the given number of clients.
    pub fn new(clients: usize) -> Self {
        Self {
            clients,
            seed: 12345,
            target_tps: None,
            secondary_damping: 0.5,
            secondary_grace: Duration::from_secs(10),
            db_info: String::new(),
        }
    }

    /// Set the master seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enable closed-loop pacing toward the given aggregate rate.
    pub fn with_target_tps(mut self, tps: f64) -> Self {
        self.target_tps = if tps > 0.0 { Some(tps) } else { None };
        self
    }

    /// Set the secondary-pool damping factor.
    pub fn with_secondary_damping(mut self, damping: f64) -> Self {
        self.secondary_damping = damping;
        self
    }

    /// Set the secondary-pool shutdown grace period.
    pub fn with_secondary_grace(mut self, grace: Duration) -> Self {
        self.secondary_grace = grace;
        self
    }

    /// Set the database description carried into the summary.
    pub fn with_db_info(mut self, info: impl Into<String>) -> Self {
        self.db_info = info.into();
        self
    }

    /// Per-worker inter-arrival interval for the configured pacing target,
    /// or `None` when unpaced.
    pub fn pacing_interval(&self) -> Option<Duration> {
        self.target_tps
            .map(|tps| Duration::from_secs_f64(self.clients as f64 / tps))
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::new(1)
    }
}
