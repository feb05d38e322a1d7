//! A funds transfer service.
//!
//! Transfer requests come in as JSON (simple transfers) or XML (cross-border
//! transfers and remittances). They are decoded into a `TransferRequest`,
//! validated against the ledger of user balances by the `TransferEngine`,
//! applied, and the ledger is written back to storage.

pub mod config;
pub mod dispatch;
pub mod input;
pub mod ledger;
pub mod logging;
pub mod repository;
