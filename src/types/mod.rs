//! Types module
//!
//! Contains the data structures shared by the engine, the store and the
//! replay pipeline:
//! - `account`: logins, balances, account opening outcome
//! - `catalog`: the item price list
//! - `records`: ledger records and the views derived from them
//! - `operation`: operations replayed through the engine
//! - `error`: error types for every layer

pub mod account;
pub mod catalog;
pub mod error;
pub mod operation;
pub mod records;

pub use account::{Account, AccountOpening, Coins, Login, DEFAULT_STARTING_BALANCE};
pub use catalog::{Catalog, CatalogError};
pub use error::{
    AccountingError, ErrorClass, ErrorKind, ErrorResponse, InputError, LedgerError, ReplayError,
};
pub use operation::Operation;
pub use records::{
    AccountSnapshot, CoinHistory, InventoryItem, PurchaseRecord, ReceivedTransfer, Sequence,
    SentTransfer, TransferRecord,
};
