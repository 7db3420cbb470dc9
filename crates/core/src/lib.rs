//! Core building blocks for the oltpmix benchmark driver.
//!
//! This crate holds the leaf components of the transaction-mix engine, with
//! no async or runtime dependencies:
//!
//! - [`random`]: a seeded, jump-ahead-capable pseudorandom stream that makes
//!   benchmark input generation reproducible across parallel workers.
//! - [`stats`]: a thread-safe online accumulator of per-transaction-type
//!   latency and outcome counters.
//! - [`status`]: the transaction status taxonomy (success / warning / error)
//!   and the per-execution output record.

pub mod random;
pub mod stats;
pub mod status;

pub use random::SeededRng;
pub use stats::{TxStats, TxStatsSnapshot};
pub use status::{StatusKind, TxOutput};
