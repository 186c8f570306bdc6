//! Error types for the merch ledger
//!
//! Errors come in three layers:
//!
//! - **Ledger errors** ([`LedgerError`]): raised by the store. They carry full
//!   context (login, item, balance) and fall into three kinds: not found,
//!   insufficient funds, and generic failure.
//! - **Accounting errors** ([`AccountingError`]): what the engine facade
//!   returns. The underlying cause is kept as `source()` for diagnostics while
//!   `Display` only shows the coarse class a client is allowed to see.
//! - **Replay errors** ([`ReplayError`]): file, CSV and output failures of the
//!   replay binary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::account::{Coins, Login};
use super::catalog::CatalogError;

/// Coarse classification of a [`LedgerError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InsufficientFunds,
    GenericFailure,
}

/// Failure reported by the store
///
/// The store never retries. Every error leaves the store exactly as it was
/// before the operation started.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// No account with this login
    #[error("account '{login}' not found")]
    AccountNotFound { login: Login },

    /// The catalog does not carry this item
    #[error("item '{item}' not found in catalog")]
    ItemNotFound { item: String },

    /// A debit would drive the balance below zero
    #[error("insufficient funds for '{login}': balance {balance}, requested {requested}")]
    InsufficientFunds {
        login: Login,
        balance: Coins,
        requested: Coins,
    },

    /// A credit would overflow the balance
    #[error("balance overflow crediting {amount} to '{login}'")]
    BalanceOverflow { login: Login, amount: Coins },

    /// The caller cancelled before the store acquired its locks
    #[error("operation cancelled before it was applied")]
    Cancelled,

    /// Any other storage failure
    #[error("storage failure: {message}")]
    Storage { message: String },
}

impl LedgerError {
    pub fn account_not_found(login: &str) -> Self {
        LedgerError::AccountNotFound {
            login: login.to_string(),
        }
    }

    pub fn item_not_found(item: &str) -> Self {
        LedgerError::ItemNotFound {
            item: item.to_string(),
        }
    }

    pub fn insufficient_funds(login: &str, balance: Coins, requested: Coins) -> Self {
        LedgerError::InsufficientFunds {
            login: login.to_string(),
            balance,
            requested,
        }
    }

    pub fn balance_overflow(login: &str, amount: Coins) -> Self {
        LedgerError::BalanceOverflow {
            login: login.to_string(),
            amount,
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        LedgerError::Storage {
            message: message.into(),
        }
    }

    /// Classify the error into one of the three store kinds
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::AccountNotFound { .. } | LedgerError::ItemNotFound { .. } => {
                ErrorKind::NotFound
            }
            LedgerError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            LedgerError::BalanceOverflow { .. }
            | LedgerError::Cancelled
            | LedgerError::Storage { .. } => ErrorKind::GenericFailure,
        }
    }
}

/// Request rejected by input checks before any store access
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("transfer amount must be positive, got {amount}")]
    NonPositiveAmount { amount: i64 },

    #[error("'{login}' cannot transfer coins to itself")]
    SelfTransfer { login: Login },

    #[error("login must not be empty")]
    EmptyLogin,
}

/// Client-visible error class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    BadRequest,
    NotEnoughCoins,
    Internal,
}

impl ErrorClass {
    /// HTTP status the class is reported with
    pub fn status_code(self) -> u16 {
        match self {
            ErrorClass::BadRequest | ErrorClass::NotEnoughCoins => 400,
            ErrorClass::Internal => 500,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ErrorClass::BadRequest => "Bad request",
            ErrorClass::NotEnoughCoins => "Not enough coins",
            ErrorClass::Internal => "Internal server error",
        }
    }
}

/// Error returned by the accounting engine
///
/// `Display` never leaks the cause (no item names, no balances); use
/// [`std::error::Error::source`] to get at it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountingError {
    /// An account or item does not exist
    #[error("Bad request")]
    NotFound {
        #[source]
        source: LedgerError,
    },

    /// The request failed input checks
    #[error("Bad request")]
    InvalidInput {
        #[source]
        source: InputError,
    },

    #[error("Not enough coins")]
    InsufficientFunds {
        #[source]
        source: LedgerError,
    },

    #[error("Internal server error")]
    Internal {
        #[source]
        source: LedgerError,
    },
}

impl AccountingError {
    pub fn class(&self) -> ErrorClass {
        match self {
            AccountingError::NotFound { .. } | AccountingError::InvalidInput { .. } => {
                ErrorClass::BadRequest
            }
            AccountingError::InsufficientFunds { .. } => ErrorClass::NotEnoughCoins,
            AccountingError::Internal { .. } => ErrorClass::Internal,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.class().status_code()
    }

    /// Wrap a store error that must surface as an internal failure whatever
    /// its kind, e.g. a failed sub-read while composing a snapshot
    pub fn internal(source: LedgerError) -> Self {
        AccountingError::Internal { source }
    }
}

impl From<LedgerError> for AccountingError {
    fn from(source: LedgerError) -> Self {
        match source.kind() {
            ErrorKind::NotFound => AccountingError::NotFound { source },
            ErrorKind::InsufficientFunds => AccountingError::InsufficientFunds { source },
            ErrorKind::GenericFailure => AccountingError::Internal { source },
        }
    }
}

impl From<InputError> for AccountingError {
    fn from(source: InputError) -> Self {
        AccountingError::InvalidInput { source }
    }
}

/// Error body returned to clients: `{"errors": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub errors: String,
}

impl From<&AccountingError> for ErrorResponse {
    fn from(error: &AccountingError) -> Self {
        ErrorResponse {
            errors: error.class().message().to_string(),
        }
    }
}

/// Errors of the replay pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    /// Input or catalog file does not exist
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("I/O error: {message}")]
    Io { message: String },

    /// Malformed CSV; the row is skipped
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    Parse { line: Option<u64>, message: String },

    /// Well-formed CSV row that does not describe a valid operation
    #[error("Invalid operation{}: {reason}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    InvalidOperation { line: Option<u64>, reason: String },

    /// The async runtime could not be built or a task failed
    #[error("Runtime error: {message}")]
    Runtime { message: String },

    #[error("Output error: {message}")]
    Output { message: String },

    #[error("Invalid catalog: {0}")]
    Catalog(#[from] CatalogError),
}

impl ReplayError {
    pub fn invalid_operation(reason: impl Into<String>) -> Self {
        ReplayError::InvalidOperation {
            line: None,
            reason: reason.into(),
        }
    }

    /// Attach a line number to a row-level error that lacks one
    pub fn at_line(self, line: u64) -> Self {
        match self {
            ReplayError::InvalidOperation { line: None, reason } => {
                ReplayError::InvalidOperation {
                    line: Some(line),
                    reason,
                }
            }
            ReplayError::Parse {
                line: None,
                message,
            } => ReplayError::Parse {
                line: Some(line),
                message,
            },
            other => other,
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        ReplayError::Runtime {
            message: message.into(),
        }
    }

    pub fn output(message: impl Into<String>) -> Self {
        ReplayError::Output {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ReplayError {
    fn from(error: std::io::Error) -> Self {
        ReplayError::Io {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for ReplayError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        ReplayError::Parse {
            line,
            message: error.to_string(),
        }
    }
}

// The async reader counts lines itself and attaches them with `at_line`
impl From<csv_async::Error> for ReplayError {
    fn from(error: csv_async::Error) -> Self {
        ReplayError::Parse {
            line: None,
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for ReplayError {
    fn from(error: serde_json::Error) -> Self {
        ReplayError::Output {
            message: error.to_string(),
        }
    }
}
