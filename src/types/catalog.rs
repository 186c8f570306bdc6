//! Fixed item price list
//!
//! The catalog is static reference data: the engine only ever looks prices
//! up. It is built once at startup (the default merch list, or a CSV file)
//! and shared read-only by the store.

use std::collections::BTreeMap;

use thiserror::Error;

use super::account::Coins;

/// Default merch catalog as (item, price) pairs
pub const MERCH_ITEMS: [(&str, Coins); 10] = [
    ("t-shirt", 80),
    ("cup", 20),
    ("book", 50),
    ("pen", 10),
    ("powerbank", 200),
    ("hoody", 300),
    ("umbrella", 200),
    ("socks", 10),
    ("wallet", 50),
    ("pink-hoody", 500),
];

/// Invalid catalog definition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("catalog item name must not be empty")]
    EmptyName,

    #[error("catalog item '{item}' is listed more than once")]
    DuplicateItem { item: String },

    #[error("catalog item '{item}' must have a positive price")]
    NonPositivePrice { item: String },
}

/// Item name to price lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    prices: BTreeMap<String, Coins>,
}

impl Catalog {
    /// Build a catalog from (item, price) pairs
    ///
    /// Names are trimmed. Empty names, duplicates and zero prices are
    /// rejected so a bad price list fails at startup rather than at the
    /// first purchase.
    pub fn new<I, S>(entries: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (S, Coins)>,
        S: AsRef<str>,
    {
        let mut prices = BTreeMap::new();
        for (name, price) in entries {
            let name = name.as_ref().trim();
            if name.is_empty() {
                return Err(CatalogError::EmptyName);
            }
            if price == 0 {
                return Err(CatalogError::NonPositivePrice {
                    item: name.to_string(),
                });
            }
            if prices.insert(name.to_string(), price).is_some() {
                return Err(CatalogError::DuplicateItem {
                    item: name.to_string(),
                });
            }
        }
        Ok(Self { prices })
    }

    /// The merch catalog the shop ships with
    pub fn merch() -> Self {
        Self {
            prices: MERCH_ITEMS
                .iter()
                .map(|(name, price)| (name.to_string(), *price))
                .collect(),
        }
    }

    /// Price of an item, `None` if the catalog does not carry it
    pub fn price(&self, item: &str) -> Option<Coins> {
        self.prices.get(item).copied()
    }

    /// All items in name order
    pub fn items(&self) -> impl Iterator<Item = (&str, Coins)> + '_ {
        self.prices.iter().map(|(name, price)| (name.as_str(), *price))
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::merch()
    }
}
