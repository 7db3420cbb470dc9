//! The execution wrapper: timing, outcome classification, fault isolation.
//!
//! Every execution, whether selected from the weighted mix, fired by a
//! periodic timer, or submitted to the secondary pool, passes through
//! [`execute_recorded`]. The wrapper times the call, classifies the reported
//! status, records the result into the bound aggregator and guarantees that
//! one failing execution never aborts the run or kills its worker.

use crate::transaction::BenchTransaction;
use futures::FutureExt;
use oltpmix_core::{StatusKind, TxOutput, TxStats};
use std::panic::AssertUnwindSafe;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::warn;

/// Status code synthesized for infrastructure failures and panics.
pub const INFRA_ERROR_STATUS: i32 = -1;

/// How one wrapped execution ended, for callers that care (the scheduler
/// does not).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecOutcome {
    /// Completed with a status code (any sign).
    Completed(StatusKind),
    /// Failed with an infrastructure error or panic; counted as an error.
    Faulted,
}

/// Current wall-clock time in unix milliseconds.
pub fn now_unix_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Execute one transaction and record its outcome into `stats`.
///
/// Completed executions contribute a latency observation; a negative status
/// additionally counts one error and one rollback (the business logic has
/// already rolled back), a positive status counts one warning. An `Err` or a
/// panic from the transaction's logic is captured, logged with its root
/// cause, counted as exactly one error and never propagated.
pub async fn execute_recorded(tx: &dyn BenchTransaction, stats: &TxStats) -> ExecOutcome {
    let start_ts = now_unix_ms();
    let started = Instant::now();

    let result = AssertUnwindSafe(tx.execute()).catch_unwind().await;

    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    stats.offer_min_ts(start_ts);
    stats.offer_max_ts(now_unix_ms());

    match result {
        Ok(Ok(output)) => {
            stats.add_value(elapsed_ms);
            record_status(tx.name(), &output, stats);
            ExecOutcome::Completed(output.kind())
        }
        Ok(Err(error)) => {
            // Both ends of the source chain: the outermost message names the
            // failing operation, the root cause names what actually broke.
            warn!(
                tx = tx.name(),
                status = INFRA_ERROR_STATUS,
                error = %error,
                root_cause = %error.root_cause(),
                "transaction failed, counting as error"
            );
            stats.increment_errors();
            ExecOutcome::Faulted
        }
        Err(panic) => {
            warn!(
                tx = tx.name(),
                status = INFRA_ERROR_STATUS,
                root_cause = %panic_message(&*panic),
                "transaction panicked, counting as error"
            );
            stats.increment_errors();
            ExecOutcome::Faulted
        }
    }
}

fn record_status(name: &str, output: &TxOutput, stats: &TxStats) {
    match output.kind() {
        StatusKind::Success => {}
        StatusKind::Warning => stats.increment_warnings(),
        StatusKind::Error => {
            warn!(
                tx = name,
                status = output.status,
                status_message = output.message.as_deref().unwrap_or(""),
                "transaction reported hard error"
            );
            stats.increment_errors();
            stats.increment_rollbacks();
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
