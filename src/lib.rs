//! Merch Ledger Library
//!
//! # Overview
//!
//! An accounting engine for a virtual-currency merch shop: users hold a coin
//! balance, buy items from a fixed catalog and send coins to each other. The
//! engine keeps every balance non-negative under concurrent operations and
//! rebuilds a consistent account summary from the same ledger it writes.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (accounts, catalog, ledger records, errors)
//! - [`core`] - Business logic:
//!   - [`core::store`] - In-process store with per-account locks
//!   - [`core::balance`], [`core::purchase`], [`core::transfer`] - The ledgers
//!   - [`core::aggregator`] - Snapshot-consistent account summaries
//!   - [`core::engine`] - The [`Accountant`] facade
//! - [`io`] - Operation log readers and snapshot writers
//! - [`strategy`] - Sequential and concurrent replay pipelines
//! - [`cli`], [`config`], [`telemetry`] - The replay binary's plumbing
//!
//! # Operations
//!
//! - **OpenAccount**: called after a successful login; creates the account
//!   with the starting balance (1000 by default) the first time
//! - **Buy**: debit the item price and record the purchase, atomically
//! - **Transfer**: debit the sender, credit the recipient and record the
//!   transfer, atomically
//! - **Info**: balance, inventory and received/sent history from one
//!   consistent view
//!
//! # Errors
//!
//! Callers see three classes: bad request (unknown account or item, invalid
//! input), not enough coins, and internal failure. The precise cause is kept
//! as the error's `source()`.

pub mod cli;
pub mod config;
pub mod core;
pub mod io;
pub mod strategy;
pub mod telemetry;
pub mod types;

pub use config::{EngineConfig, OutputFormat, ReplayConfig};
pub use core::{Accountant, MemoryStore};
pub use types::{
    AccountOpening, AccountSnapshot, AccountingError, Catalog, Coins, ErrorClass, LedgerError,
    Login, Operation, ReplayError,
};
