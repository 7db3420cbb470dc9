//! Setup-time errors.
//!
//! Everything here is a misconfiguration detected before or at run start and
//! fails fast. Runtime failures inside a transaction are a different
//! category, [`crate::transaction::TxError`], and are isolated per
//! execution rather than propagated.

/// Errors raised while assembling or starting a run.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("no transaction types registered in the mix")]
    EmptyMix,

    #[error("invalid weight {weight} for transaction '{name}': weights must be finite and positive")]
    InvalidWeight { name: String, weight: f64 },

    #[error("transaction '{0}' already registered in the mix")]
    DuplicateTransaction(String),

    #[error("no statistics registered for transaction '{0}'")]
    UnknownTransaction(String),

    #[error("client count must be at least 1")]
    NoClients,

    #[error("period must be non-zero for periodic transaction '{0}'")]
    ZeroPeriod(String),
}
