//! Per-member, per-currency balances with locked funds.
//!
//! Every mutation of an account's `(balance, locked)` pair is a
//! [`FundsOperation`](domain::FundsOperation): a pure transition that can be
//! computed and checked against a snapshot, and an
//! [`AccountLedger`](ledger::AccountLedger) wrapper that re-runs it under the
//! account's exclusive row lock and writes the result back.

pub mod config;
pub mod dlq;
pub mod domain;
pub mod engine;
pub mod events;
pub mod ingestion;
pub mod ledger;
pub mod output;
pub mod store;

pub use config::LedgerConfig;
pub use domain::{Account, AccountStore, Error, FundsChange, FundsOperation, LockedAccount};
pub use ledger::AccountLedger;
pub use store::MemoryStore;
