//! Accounting engine facade
//!
//! This module provides the `Accountant` struct, the entry point the
//! transport layer (here: the replay pipeline) talks to.
//!
//! # Design
//!
//! The `Accountant` holds no state of its own. It applies the input checks
//! that do not need the store, delegates to the ledgers, and maps every
//! [`LedgerError`] onto the three client-visible classes of
//! [`AccountingError`]. Every call runs in its own tracing span carrying the
//! operation arguments; applied operations are logged at `info`, business
//! rejections at `warn` and internal failures at `error`.
//!
//! # Architecture
//!
//! ```text
//! Accountant
//!     ├── Arc<dyn BalanceStore>    (balances, account opening)
//!     ├── Arc<dyn PurchaseLedger>  (buy)
//!     ├── Arc<dyn TransferLedger>  (transfer)
//!     └── AccountAggregator        (info)
//! ```
//!
//! # Thread Safety
//!
//! The accountant is cheap to clone and every clone shares the same
//! collaborators, so it can be handed to any number of tokio tasks.

use std::error::Error as _;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::types::{
    AccountOpening, AccountSnapshot, AccountingError, Coins, ErrorClass, InputError,
};

use super::aggregator::AccountAggregator;
use super::store::MemoryStore;
use super::traits::{AccountSource, BalanceStore, PurchaseLedger, TransferLedger};

/// Use-case layer over the ledgers
#[derive(Clone)]
pub struct Accountant {
    balances: Arc<dyn BalanceStore>,
    purchases: Arc<dyn PurchaseLedger>,
    transfers: Arc<dyn TransferLedger>,
    aggregator: AccountAggregator,
}

impl Accountant {
    /// Create an accountant over explicit collaborators
    ///
    /// # Arguments
    ///
    /// * `balances` - Balance reads and account opening
    /// * `purchases` - Purchase ledger
    /// * `transfers` - Transfer ledger
    /// * `accounts` - Snapshot source for `info`
    pub fn new(
        balances: Arc<dyn BalanceStore>,
        purchases: Arc<dyn PurchaseLedger>,
        transfers: Arc<dyn TransferLedger>,
        accounts: Arc<dyn AccountSource>,
    ) -> Self {
        Self {
            balances,
            purchases,
            transfers,
            aggregator: AccountAggregator::new(accounts),
        }
    }

    /// Create an accountant with every collaborator backed by one store
    pub fn with_store(store: Arc<MemoryStore>) -> Self {
        Self::new(store.clone(), store.clone(), store.clone(), store)
    }

    /// Open the account of a freshly authenticated user
    ///
    /// Called by the authentication boundary after a successful login. The
    /// first call creates the account with the starting balance; later calls
    /// leave it untouched.
    #[instrument(skip(self, cancel))]
    pub async fn open_account(
        &self,
        user: &str,
        cancel: &CancellationToken,
    ) -> Result<AccountOpening, AccountingError> {
        if user.trim().is_empty() {
            return Err(AccountingError::from(InputError::EmptyLogin)).inspect_err(report);
        }

        let opening = self
            .balances
            .open_account(user, cancel)
            .await
            .map_err(AccountingError::from)
            .inspect_err(report)?;

        if opening == AccountOpening::Created {
            info!("account opened");
        }
        Ok(opening)
    }

    /// Current balance of a user
    #[instrument(skip(self, cancel))]
    pub async fn balance(
        &self,
        user: &str,
        cancel: &CancellationToken,
    ) -> Result<Coins, AccountingError> {
        self.balances
            .get_balance(user, cancel)
            .await
            .map_err(AccountingError::from)
            .inspect_err(report)
    }

    /// Buy one catalog item
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The buyer was debited and the purchase recorded
    /// * `Err(AccountingError::NotFound)` - Unknown item or buyer
    /// * `Err(AccountingError::InsufficientFunds)` - The price exceeds the balance
    /// * `Err(AccountingError::Internal)` - Anything else; nothing was applied
    #[instrument(skip(self, cancel))]
    pub async fn buy(
        &self,
        user: &str,
        item: &str,
        cancel: &CancellationToken,
    ) -> Result<(), AccountingError> {
        let record = self
            .purchases
            .buy_item(user, item, cancel)
            .await
            .map_err(AccountingError::from)
            .inspect_err(report)?;

        info!(price = record.price, seq = record.seq, "purchase applied");
        Ok(())
    }

    /// Send coins to another user
    ///
    /// `amount` is taken as the transport delivers it. Non-positive amounts
    /// and transfers to oneself are rejected before the store is touched.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Sender debited, recipient credited, transfer recorded
    /// * `Err(AccountingError::InvalidInput)` - Non-positive amount or self-transfer
    /// * `Err(AccountingError::NotFound)` - Unknown sender or recipient
    /// * `Err(AccountingError::InsufficientFunds)` - The amount exceeds the balance
    /// * `Err(AccountingError::Internal)` - Anything else; nothing was applied
    #[instrument(skip(self, cancel))]
    pub async fn transfer(
        &self,
        from: &str,
        to: &str,
        amount: i64,
        cancel: &CancellationToken,
    ) -> Result<(), AccountingError> {
        let coins = check_transfer(from, to, amount)
            .map_err(AccountingError::from)
            .inspect_err(report)?;

        let record = self
            .transfers
            .transfer(from, to, coins, cancel)
            .await
            .map_err(AccountingError::from)
            .inspect_err(report)?;

        info!(seq = record.seq, "transfer applied");
        Ok(())
    }

    /// Balance, inventory and coin history of a user
    ///
    /// Every read failure is internal, an unknown user included: partial
    /// information is never returned.
    #[instrument(skip(self, cancel))]
    pub async fn info(
        &self,
        user: &str,
        cancel: &CancellationToken,
    ) -> Result<AccountSnapshot, AccountingError> {
        self.aggregator
            .info(user, cancel)
            .await
            .map_err(AccountingError::internal)
            .inspect_err(report)
    }
}

impl std::fmt::Debug for Accountant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Accountant")
            .field("aggregator", &self.aggregator)
            .finish_non_exhaustive()
    }
}

/// Validate a transfer request and convert the amount to coins
fn check_transfer(from: &str, to: &str, amount: i64) -> Result<Coins, InputError> {
    let coins = Coins::try_from(amount)
        .ok()
        .filter(|coins| *coins > 0)
        .ok_or(InputError::NonPositiveAmount { amount })?;

    if from == to {
        return Err(InputError::SelfTransfer {
            login: from.to_string(),
        });
    }
    Ok(coins)
}

/// Log a failed operation at the level its class calls for
fn report(error: &AccountingError) {
    let reason = error
        .source()
        .map(|source| source.to_string())
        .unwrap_or_default();

    match error.class() {
        ErrorClass::Internal => error!(%reason, "operation failed"),
        class => warn!(class = class.message(), %reason, "operation rejected"),
    }
}
