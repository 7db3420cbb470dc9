//! Transaction-mix execution engine for oltpmix.
//!
//! The driver owns everything between "a set of business transactions" and
//! "a final report": the weighted [`scheduler`] running a fixed pool of
//! concurrent workers with optional closed-loop pacing, the [`executor`]
//! wrapper that times, classifies and fault-isolates every execution, the
//! [`secondary`] pool absorbing asynchronous follow-up work, and the
//! immutable [`summary`] handed to report writers.
//!
//! The engine knows nothing about SQL dialects or business rules; it
//! requires exactly one capability from a transaction, the
//! [`transaction::BenchTransaction`] trait.

pub mod config;
pub mod error;
pub mod executor;
pub mod report;
pub mod scheduler;
pub mod secondary;
pub mod summary;
pub mod transaction;
pub mod workload;

pub use config::DriverConfig;
pub use error::DriverError;
pub use scheduler::MixScheduler;
pub use secondary::SecondaryPool;
pub use summary::RunSummary;
pub use transaction::{BenchTransaction, TxError};
