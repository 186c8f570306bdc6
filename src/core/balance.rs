//! Balance store: per-account state and the debit/credit primitives
//!
//! There is no way to set a balance directly. Balances change only through
//! [`AccountState::debit`] and [`AccountState::credit`], which are called by
//! the purchase and transfer ledgers inside their atomic units. A debit that
//! would go below zero is refused with `InsufficientFunds`, so callers never
//! need to check the balance first.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::types::{AccountOpening, Coins, LedgerError, PurchaseRecord, TransferRecord};

use super::store::MemoryStore;
use super::traits::BalanceStore;

/// Mutable state of one account, guarded by its mutex in the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountState {
    /// Current balance
    pub(crate) balance: Coins,

    /// Purchases made by this account, in insertion order
    pub(crate) purchases: Vec<PurchaseRecord>,

    /// Transfers credited to this account, in insertion order
    pub(crate) received: Vec<TransferRecord>,

    /// Transfers debited from this account, in insertion order
    pub(crate) sent: Vec<TransferRecord>,
}

impl AccountState {
    pub fn new(balance: Coins) -> Self {
        Self {
            balance,
            ..Self::default()
        }
    }

    pub fn balance(&self) -> Coins {
        self.balance
    }

    /// Balance after taking `amount` out
    ///
    /// Pure: the caller commits the returned value once every other part
    /// of the unit has been computed.
    ///
    /// # Returns
    ///
    /// * `Ok(new_balance)` - The debit fits
    /// * `Err(LedgerError::InsufficientFunds)` - The balance would go negative
    pub fn debit(&self, login: &str, amount: Coins) -> Result<Coins, LedgerError> {
        self.balance
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::insufficient_funds(login, self.balance, amount))
    }

    /// Balance after adding `amount`
    ///
    /// # Returns
    ///
    /// * `Ok(new_balance)` - The credit fits
    /// * `Err(LedgerError::BalanceOverflow)` - The balance would overflow
    pub fn credit(&self, login: &str, amount: Coins) -> Result<Coins, LedgerError> {
        self.balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::balance_overflow(login, amount))
    }
}

#[async_trait]
impl BalanceStore for MemoryStore {
    async fn get_balance(
        &self,
        login: &str,
        cancel: &CancellationToken,
    ) -> Result<Coins, LedgerError> {
        let account = self.lock(login, cancel).await?;
        Ok(account.balance)
    }

    async fn open_account(
        &self,
        login: &str,
        cancel: &CancellationToken,
    ) -> Result<AccountOpening, LedgerError> {
        if cancel.is_cancelled() {
            return Err(LedgerError::Cancelled);
        }

        if self.insert_account(login) {
            Ok(AccountOpening::Created)
        } else {
            Ok(AccountOpening::Existing)
        }
    }
}
