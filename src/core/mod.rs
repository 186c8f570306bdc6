//! Core business logic module
//!
//! This module contains the accounting engine and the store behind it:
//! - `traits` - Store seams (balances, purchases, transfers, snapshots)
//! - `store` - In-process store with per-account locks
//! - `balance` - Account state and the debit/credit primitives
//! - `purchase` - Purchase ledger and inventory grouping
//! - `transfer` - Transfer ledger and received/sent summaries
//! - `aggregator` - Snapshot-consistent `Info` read path
//! - `engine` - The `Accountant` facade
//! - `batch_processor` - Replay of operations through the facade

pub mod aggregator;
pub mod balance;
pub mod batch_processor;
pub mod engine;
pub mod purchase;
pub mod store;
pub mod traits;
pub mod transfer;

pub use aggregator::{AccountAggregator, AccountView};
pub use balance::AccountState;
pub use batch_processor::{BatchProcessor, OperationResult, Outcome};
pub use engine::Accountant;
pub use store::MemoryStore;
pub use traits::{AccountSource, BalanceStore, PurchaseLedger, TransferLedger};
