//! Purchase ledger
//!
//! A purchase looks the price up in the catalog, debits the buyer and
//! appends a [`PurchaseRecord`] while the buyer's lock is held. Either all of
//! it happens or none of it does.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::types::{InventoryItem, LedgerError, PurchaseRecord};

use super::store::MemoryStore;
use super::traits::PurchaseLedger;

/// Group purchases into inventory lines
///
/// Lines are ordered by descending count, ties by item name so the output
/// is deterministic.
pub fn group_inventory(purchases: &[PurchaseRecord]) -> Vec<InventoryItem> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for purchase in purchases {
        *counts.entry(purchase.item.as_str()).or_default() += 1;
    }

    let mut inventory: Vec<InventoryItem> = counts
        .into_iter()
        .map(|(item, quantity)| InventoryItem::new(item, quantity))
        .collect();
    inventory.sort_by(|a, b| {
        b.quantity
            .cmp(&a.quantity)
            .then_with(|| a.item_type.cmp(&b.item_type))
    });
    inventory
}

#[async_trait]
impl PurchaseLedger for MemoryStore {
    async fn buy_item(
        &self,
        buyer: &str,
        item: &str,
        cancel: &CancellationToken,
    ) -> Result<PurchaseRecord, LedgerError> {
        let price = self
            .catalog()
            .price(item)
            .ok_or_else(|| LedgerError::item_not_found(item))?;

        let mut account = self.lock(buyer, cancel).await?;
        let balance = account.debit(buyer, price)?;

        let record = PurchaseRecord {
            seq: self.next_sequence(),
            buyer: buyer.to_string(),
            item: item.to_string(),
            price,
        };
        account.balance = balance;
        account.purchases.push(record.clone());

        Ok(record)
    }

    async fn list_purchases(
        &self,
        login: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<InventoryItem>, LedgerError> {
        let account = self.lock(login, cancel).await?;
        Ok(group_inventory(&account.purchases))
    }
}
