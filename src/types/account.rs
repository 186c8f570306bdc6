//! Account-related types
//!
//! Accounts are keyed by login and carry a single non-negative coin balance.
//! The mutable per-account state lives inside the store; these are the
//! values handed across the engine boundary.

/// Unique account identifier (the authenticated login)
pub type Login = String;

/// Coin amount
///
/// Balances can never go below zero, so the unsigned type carries the
/// invariant. Transport-supplied amounts arrive as `i64` and are validated
/// before they are converted.
pub type Coins = u64;

/// Balance given to an account the first time its owner authorizes
pub const DEFAULT_STARTING_BALANCE: Coins = 1000;

/// Point-in-time view of one account's balance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// The account login
    pub login: Login,

    /// Current coin balance
    pub balance: Coins,
}

impl Account {
    /// Create an account value with the given balance
    pub fn new(login: impl Into<Login>, balance: Coins) -> Self {
        Account {
            login: login.into(),
            balance,
        }
    }
}

/// Outcome of opening an account on authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountOpening {
    /// The account did not exist and was created with the starting balance
    Created,
    /// The account already existed and was left untouched
    Existing,
}
