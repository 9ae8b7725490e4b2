//! Application layer: the ledger engine and its unit of work.
//!
//! `Ledger` owns the ports it was deployed with and serializes every call on a
//! single async mutex, so each operation sees and leaves a consistent state.

pub mod engine;
pub mod transaction;
