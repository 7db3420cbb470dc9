//! The execution contract between the engine and business transactions.
//!
//! The scheduler requires exactly one capability from a transaction: an
//! async `execute` returning a [`TxOutput`] or an infrastructure-level
//! [`TxError`]. Business-rule outcomes (including benign warnings and hard
//! errors that the transaction already rolled back) travel in the output's
//! status code; `TxError` is reserved for failures the transaction could
//! not handle itself, such as lost connectivity or a malformed query.

use async_trait::async_trait;
use oltpmix_core::TxOutput;
use std::error::Error;

/// One business transaction type, pluggable into the mix.
///
/// Implementations are shared across workers and must be internally
/// synchronized; the engine calls `execute` concurrently from many tasks.
/// Any database-level rollback on a mid-transaction failure is the
/// implementation's own responsibility.
#[async_trait]
pub trait BenchTransaction: Send + Sync {
    /// Display name, used as the statistics key and in reports.
    fn name(&self) -> &str;

    /// Run one execution with freshly generated input.
    async fn execute(&self) -> Result<TxOutput, TxError>;
}

/// Infrastructure failure inside a transaction's logic.
///
/// Never aborts the run: the execution wrapper normalizes it to a generic
/// error status and counts it.
#[derive(Debug, thiserror::Error)]
pub enum TxError {
    #[error("database connection lost: {0}")]
    Connection(String),

    #[error("database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<Box<dyn Error + Send + Sync>>,
    },

    #[error("{0}")]
    Other(String),
}

impl TxError {
    /// Wrap a driver-level error with context.
    pub fn database(
        message: impl Into<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        Self::Database {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// The innermost cause in this error's source chain.
    ///
    /// Used for diagnostics when an execution fails unexpectedly; falls
    /// back to this error's own message when there is no deeper cause.
    pub fn root_cause(&self) -> String {
        let mut current: &dyn Error = self;
        while let Some(source) = current.source() {
            current = source;
        }
        current.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("connection refused (os error 111)")]
    struct FakeDriverError;

    #[test]
    fn test_root_cause_walks_source_chain() {
        let err = TxError::database("SELECT failed", FakeDriverError);
        assert_eq!(err.root_cause(), "connection refused (os error 111)");
    }

    #[test]
    fn test_root_cause_without_source_is_own_message() {
        let err = TxError::Other("unexpected row count".into());
        assert_eq!(err.root_cause(), "unexpected row count");
    }

    #[test]
    fn test_diagnostic_carries_both_ends_of_the_chain() {
        // The outermost message names the failing operation, the root cause
        // names what actually broke; both are distinct and available.
        let err = TxError::database("SELECT failed", FakeDriverError);
        assert_eq!(err.to_string(), "database error: SELECT failed");
        assert_eq!(err.root_cause(), "connection refused (os error 111)");
        assert_ne!(err.to_string(), err.root_cause());
    }
}
