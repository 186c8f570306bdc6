//! In-process data store backing every ledger
//!
//! This module provides [`MemoryStore`], the single source of truth for
//! balances, purchases and transfers. It implements all store traits:
//! [`BalanceStore`](super::traits::BalanceStore) in `balance.rs`,
//! [`PurchaseLedger`](super::traits::PurchaseLedger) in `purchase.rs`,
//! [`TransferLedger`](super::traits::TransferLedger) in `transfer.rs` and
//! [`AccountSource`](super::traits::AccountSource) in `aggregator.rs`.
//!
//! # Design
//!
//! ```text
//! MemoryStore
//!     ├── DashMap<Login, Arc<Mutex<AccountState>>>  (per-account locks)
//!     ├── Arc<Catalog>                              (read-only prices)
//!     └── AtomicU64                                 (record sequence)
//! ```
//!
//! The `DashMap` only resolves a login to its account cell; its shard guard
//! is released before any lock is awaited. All mutation happens under the
//! per-account `tokio::sync::Mutex`, so operations on disjoint accounts
//! never wait on each other.
//!
//! # Lock order
//!
//! Operations touching two accounts lock them in ascending login order.
//! Two transfers between the same pair in opposite directions therefore
//! cannot deadlock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio_util::sync::CancellationToken;

use crate::types::{Catalog, Coins, LedgerError, Login, Sequence, DEFAULT_STARTING_BALANCE};

use super::balance::AccountState;

/// Shared, lockable account cell
pub(crate) type AccountCell = Arc<Mutex<AccountState>>;

/// Exclusive access to one account for the duration of an atomic unit
pub(crate) type AccountGuard = OwnedMutexGuard<AccountState>;

/// Thread-safe in-memory store
///
/// Safe to share behind an `Arc` across any number of tokio tasks.
#[derive(Debug)]
pub struct MemoryStore {
    /// Account cells by login
    accounts: DashMap<Login, AccountCell>,

    /// Price list used by purchases
    catalog: Arc<Catalog>,

    /// Balance of a freshly opened account
    starting_balance: Coins,

    /// Last issued record sequence
    sequence: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store
    ///
    /// # Arguments
    ///
    /// * `catalog` - Price list for purchases
    /// * `starting_balance` - Balance given to newly opened accounts
    pub fn new(catalog: Arc<Catalog>, starting_balance: Coins) -> Self {
        Self {
            accounts: DashMap::new(),
            catalog,
            starting_balance,
            sequence: AtomicU64::new(0),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn starting_balance(&self) -> Coins {
        self.starting_balance
    }

    /// All known logins in ascending order
    pub fn logins(&self) -> Vec<Login> {
        let mut logins: Vec<Login> = self
            .accounts
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        logins.sort();
        logins
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Insert the account cell if missing, returning whether it was created
    pub(crate) fn insert_account(&self, login: &str) -> bool {
        let mut created = false;
        self.accounts.entry(login.to_string()).or_insert_with(|| {
            created = true;
            Arc::new(Mutex::new(AccountState::new(self.starting_balance)))
        });
        created
    }

    /// Resolve a login to its account cell
    ///
    /// The map guard is dropped before returning so callers can await the
    /// cell's lock without blocking the shard.
    fn cell(&self, login: &str) -> Result<AccountCell, LedgerError> {
        self.accounts
            .get(login)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| LedgerError::account_not_found(login))
    }

    /// Next record sequence number, starting at 1
    pub(crate) fn next_sequence(&self) -> Sequence {
        self.sequence.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Lock one account
    ///
    /// # Returns
    ///
    /// * `Ok(guard)` - Exclusive access to the account
    /// * `Err(LedgerError::AccountNotFound)` - Unknown login
    /// * `Err(LedgerError::Cancelled)` - The token fired before the lock was acquired
    pub(crate) async fn lock(
        &self,
        login: &str,
        cancel: &CancellationToken,
    ) -> Result<AccountGuard, LedgerError> {
        let cell = self.cell(login)?;
        acquire(cell, cancel).await
    }

    /// Lock two distinct accounts in ascending login order
    ///
    /// `second` is resolved first so that an unknown counterpart is reported
    /// ahead of an unknown actor. The guards come back in argument order.
    pub(crate) async fn lock_pair(
        &self,
        first: &str,
        second: &str,
        cancel: &CancellationToken,
    ) -> Result<(AccountGuard, AccountGuard), LedgerError> {
        if first == second {
            return Err(LedgerError::storage(format!(
                "cannot lock account '{first}' twice in one unit"
            )));
        }

        let second_cell = self.cell(second)?;
        let first_cell = self.cell(first)?;

        if first < second {
            let first_guard = acquire(first_cell, cancel).await?;
            let second_guard = acquire(second_cell, cancel).await?;
            Ok((first_guard, second_guard))
        } else {
            let second_guard = acquire(second_cell, cancel).await?;
            let first_guard = acquire(first_cell, cancel).await?;
            Ok((first_guard, second_guard))
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Arc::new(Catalog::merch()), DEFAULT_STARTING_BALANCE)
    }
}

/// Wait for an account lock unless the token fires first
///
/// An already cancelled token wins even when the lock is free.
async fn acquire(
    cell: AccountCell,
    cancel: &CancellationToken,
) -> Result<AccountGuard, LedgerError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(LedgerError::Cancelled),
        guard = cell.lock_owned() => Ok(guard),
    }
}
