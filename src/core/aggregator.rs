//! Account aggregator: the read path behind `Info`
//!
//! The aggregator takes one [`AccountView`] from an [`AccountSource`] and
//! derives the inventory and the received/sent summaries from it. Because the
//! view is read under a single account lock, the balance and the three
//! derived lists always describe the same point in time: a purchase can never
//! show up in the inventory without its debit in the balance.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::types::{
    AccountSnapshot, CoinHistory, Coins, LedgerError, Login, PurchaseRecord, TransferRecord,
};

use super::purchase::group_inventory;
use super::store::MemoryStore;
use super::traits::AccountSource;
use super::transfer::{summarize_received, summarize_sent};

/// Raw state of one account as of a single instant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountView {
    pub login: Login,
    pub balance: Coins,
    pub purchases: Vec<PurchaseRecord>,
    pub received: Vec<TransferRecord>,
    pub sent: Vec<TransferRecord>,
}

impl AccountView {
    /// Compose the client-facing snapshot
    ///
    /// Fails when a transfer summary does not fit the coin range.
    pub fn into_snapshot(self) -> Result<AccountSnapshot, LedgerError> {
        Ok(AccountSnapshot {
            balance: self.balance,
            inventory: group_inventory(&self.purchases),
            coin_history: CoinHistory {
                received: summarize_received(&self.received)?,
                sent: summarize_sent(&self.sent)?,
            },
        })
    }
}

#[async_trait]
impl AccountSource for MemoryStore {
    async fn snapshot(
        &self,
        login: &str,
        cancel: &CancellationToken,
    ) -> Result<AccountView, LedgerError> {
        let account = self.lock(login, cancel).await?;
        Ok(AccountView {
            login: login.to_string(),
            balance: account.balance,
            purchases: account.purchases.clone(),
            received: account.received.clone(),
            sent: account.sent.clone(),
        })
    }
}

/// Composes account snapshots from an [`AccountSource`]
#[derive(Clone)]
pub struct AccountAggregator {
    source: Arc<dyn AccountSource>,
}

impl AccountAggregator {
    pub fn new(source: Arc<dyn AccountSource>) -> Self {
        Self { source }
    }

    /// Balance, inventory and coin history of one account
    ///
    /// # Returns
    ///
    /// * `Ok(snapshot)` - Consistent snapshot of the account
    /// * `Err(LedgerError::AccountNotFound)` - Unknown login
    /// * `Err(LedgerError::Storage)` - A transfer summary overflows the coin range
    /// * `Err(_)` - The read failed; no partial snapshot is returned
    pub async fn info(
        &self,
        login: &str,
        cancel: &CancellationToken,
    ) -> Result<AccountSnapshot, LedgerError> {
        self.source.snapshot(login, cancel).await?.into_snapshot()
    }
}

impl std::fmt::Debug for AccountAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountAggregator").finish_non_exhaustive()
    }
}
