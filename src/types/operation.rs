//! Operations replayed through the accounting engine

use std::fmt;

use super::account::Login;

/// One parsed row of an operation log
///
/// Each variant maps onto one engine call. `Auth` stands for a successful
/// login at the authentication boundary and opens the account if needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Successful login, opens the account on first sight
    Auth { user: Login },

    /// Purchase of one catalog item
    Buy { user: Login, item: String },

    /// Peer-to-peer coin transfer
    ///
    /// The amount is kept signed so that non-positive amounts reach the
    /// engine's input checks instead of being lost at parse time.
    Transfer { from: Login, to: Login, amount: i64 },

    /// Account summary read
    Info { user: Login },
}

impl Operation {
    /// The acting user, used to partition concurrent replay
    pub fn user(&self) -> &str {
        match self {
            Operation::Auth { user }
            | Operation::Buy { user, .. }
            | Operation::Info { user } => user,
            Operation::Transfer { from, .. } => from,
        }
    }

    /// Short operation name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Auth { .. } => "auth",
            Operation::Buy { .. } => "buy",
            Operation::Transfer { .. } => "transfer",
            Operation::Info { .. } => "info",
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Operation::Auth { .. })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Auth { user } => write!(f, "auth {user}"),
            Operation::Buy { user, item } => write!(f, "buy {user} {item}"),
            Operation::Transfer { from, to, amount } => {
                write!(f, "transfer {from} -> {to} ({amount})")
            }
            Operation::Info { user } => write!(f, "info {user}"),
        }
    }
}
