//! Ledger records and the aggregated views built from them
//!
//! Purchase and transfer records are immutable facts appended by the store
//! inside the same atomic unit that moves the coins. Everything a caller
//! reads back (inventory, received/sent summaries, the account snapshot) is
//! derived from those records on demand and never persisted.

use serde::{Deserialize, Serialize};

use super::account::{Coins, Login};

/// Global insertion order of ledger records
pub type Sequence = u64;

/// A single successful purchase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseRecord {
    /// Insertion order across the whole store
    pub seq: Sequence,

    /// Account that paid
    pub buyer: Login,

    /// Catalog item name
    pub item: String,

    /// Price paid at the time of purchase
    pub price: Coins,
}

/// A single successful peer-to-peer transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    /// Insertion order across the whole store
    pub seq: Sequence,

    /// Debited account
    pub sender: Login,

    /// Credited account
    pub recipient: Login,

    /// Coins moved
    pub amount: Coins,
}

/// Inventory line: how many of one item an account bought
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Item name
    #[serde(rename = "type")]
    pub item_type: String,

    /// Number of purchases of this item
    pub quantity: u64,
}

impl InventoryItem {
    pub fn new(item_type: impl Into<String>, quantity: u64) -> Self {
        Self {
            item_type: item_type.into(),
            quantity,
        }
    }
}

/// Coins received from one counterpart, summed over all transfers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedTransfer {
    pub from_user: Login,
    pub amount: Coins,
}

impl ReceivedTransfer {
    pub fn new(from_user: impl Into<Login>, amount: Coins) -> Self {
        Self {
            from_user: from_user.into(),
            amount,
        }
    }
}

/// Coins sent to one counterpart, summed over all transfers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentTransfer {
    pub to_user: Login,
    pub amount: Coins,
}

impl SentTransfer {
    pub fn new(to_user: impl Into<Login>, amount: Coins) -> Self {
        Self {
            to_user: to_user.into(),
            amount,
        }
    }
}

/// Received and sent summaries of one account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinHistory {
    pub received: Vec<ReceivedTransfer>,
    pub sent: Vec<SentTransfer>,
}

/// Composed account summary returned by `Info`
///
/// Serializes to the shape of the shop's `/api/info` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSnapshot {
    /// Current balance
    #[serde(rename = "coins")]
    pub balance: Coins,

    /// Purchases grouped by item, most bought first
    pub inventory: Vec<InventoryItem>,

    /// Transfer history grouped by counterpart
    pub coin_history: CoinHistory,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn snapshot_serializes_to_info_response_shape() {
        let snapshot = AccountSnapshot {
            balance: 360,
            inventory: vec![InventoryItem::new("hoody", 2)],
            coin_history: CoinHistory {
                received: vec![],
                sent: vec![SentTransfer::new("u1", 40)],
            },
        };

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(
            value,
            json!({
                "coins": 360,
                "inventory": [{ "type": "hoody", "quantity": 2 }],
                "coinHistory": {
                    "received": [],
                    "sent": [{ "toUser": "u1", "amount": 40 }]
                }
            })
        );
    }

    #[test]
    fn received_transfer_uses_from_user_key() {
        let value = serde_json::to_value(ReceivedTransfer::new("u2", 15)).unwrap();
        assert_eq!(value, json!({ "fromUser": "u2", "amount": 15 }));
    }

    #[test]
    fn empty_snapshot_has_empty_sequences() {
        let snapshot: AccountSnapshot = serde_json::from_value(json!({
            "coins": 1000,
            "inventory": [],
            "coinHistory": { "received": [], "sent": [] }
        }))
        .unwrap();
        assert_eq!(snapshot.balance, 1000);
        assert!(snapshot.inventory.is_empty());
        assert_eq!(snapshot.coin_history, CoinHistory::default());
    }
}
