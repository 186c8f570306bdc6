//! Store traits the accounting engine is built on
//!
//! Each ledger is a separate seam so the facade can be tested against mocks
//! and so a different backing store could implement them. [`MemoryStore`]
//! implements all four.
//!
//! Every method takes a [`CancellationToken`]. Cancellation is only observed
//! while an implementation waits for its locks: once the locks are held the
//! mutation completes, so a cancelled call has either fully applied or not
//! started.
//!
//! [`MemoryStore`]: super::store::MemoryStore

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::types::{
    AccountOpening, Coins, InventoryItem, LedgerError, PurchaseRecord, ReceivedTransfer,
    SentTransfer, TransferRecord,
};

use super::aggregator::AccountView;

/// Current balances and account opening
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BalanceStore: Send + Sync {
    /// Current balance, `AccountNotFound` if the login is unknown
    async fn get_balance(
        &self,
        login: &str,
        cancel: &CancellationToken,
    ) -> Result<Coins, LedgerError>;

    /// Create the account with the starting balance if it does not exist
    ///
    /// Idempotent: an existing account is left untouched.
    async fn open_account(
        &self,
        login: &str,
        cancel: &CancellationToken,
    ) -> Result<AccountOpening, LedgerError>;
}

/// Catalog purchases
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PurchaseLedger: Send + Sync {
    /// Debit the buyer by the item price and record the purchase as one unit
    async fn buy_item(
        &self,
        buyer: &str,
        item: &str,
        cancel: &CancellationToken,
    ) -> Result<PurchaseRecord, LedgerError>;

    /// Purchases grouped by item, most bought first
    async fn list_purchases(
        &self,
        login: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<InventoryItem>, LedgerError>;
}

/// Peer-to-peer transfers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransferLedger: Send + Sync {
    /// Debit the sender, credit the recipient and record the transfer as one unit
    async fn transfer(
        &self,
        sender: &str,
        recipient: &str,
        amount: Coins,
        cancel: &CancellationToken,
    ) -> Result<TransferRecord, LedgerError>;

    /// Coins received, summed per sender in sender login order
    async fn list_received(
        &self,
        login: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<ReceivedTransfer>, LedgerError>;

    /// Coins sent, summed per recipient in recipient login order
    async fn list_sent(
        &self,
        login: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<SentTransfer>, LedgerError>;
}

/// Read-consistent view of one account
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountSource: Send + Sync {
    /// Balance and raw ledger records of one account, all read under the
    /// same account lock
    async fn snapshot(
        &self,
        login: &str,
        cancel: &CancellationToken,
    ) -> Result<AccountView, LedgerError>;
}
