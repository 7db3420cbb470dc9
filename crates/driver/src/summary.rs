//! The immutable end-of-run summary handed to report writers.

use oltpmix_core::TxStatsSnapshot;
use serde::Serialize;

/// Snapshot of an entire run: metadata plus one aggregate per registered
/// transaction type, in registration order.
///
/// Built once by [`crate::MixScheduler::build_summary`]; rendering is the
/// report writer's concern.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Description of the database under test.
    pub db_info: String,
    /// Number of concurrent simulated clients.
    pub clients: usize,
    /// Measured-phase duration in seconds.
    pub duration_secs: f64,
    /// Per-type aggregates, in registration order.
    pub transactions: Vec<TxStatsSnapshot>,
}

impl RunSummary {
    /// Total completed executions across all types.
    pub fn total_count(&self) -> u64 {
        self.transactions.iter().map(|t| t.count).sum()
    }

    /// Total hard errors across all types.
    pub fn total_errors(&self) -> u64 {
        self.transactions.iter().map(|t| t.errors).sum()
    }

    /// Aggregate throughput over the measured duration.
    pub fn overall_tps(&self) -> f64 {
        if self.duration_secs <= 0.0 {
            return 0.0;
        }
        self.total_count() as f64 / self.duration_secs
    }

    /// The mix share each type actually achieved, `(name, fraction)` pairs
    /// in registration order.
    pub fn observed_mix(&self) -> Vec<(String, f64)> {
        let total = self.total_count();
        self.transactions
            .iter()
            .map(|t| {
                let share = if total == 0 {
                    0.0
                } else {
                    t.count as f64 / total as f64
                };
                (t.name.clone(), share)
            })
            .collect()
    }
}
