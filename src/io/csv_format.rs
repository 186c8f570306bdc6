//! CSV format handling for operation logs, catalogs and balance output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization of operation rows
//! - Conversion from CSV records to [`Operation`]s
//! - Catalog loading from `item,price` files
//! - Balance output serialization
//!
//! Apart from `read_catalog_csv`, all functions are pure (no file access) for
//! easy testing.

use std::io::Write;
use std::path::Path;

use serde::Deserialize;

use crate::types::{Account, Catalog, Coins, Operation, ReplayError};

/// CSV record structure for deserialization
///
/// Matches the input CSV format with columns: op, user, target, amount.
/// `target` and `amount` are optional because not every operation uses them.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    pub op: String,
    pub user: String,
    pub target: Option<String>,
    pub amount: Option<String>,
}

/// One row of a catalog file
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CatalogRow {
    pub item: String,
    pub price: Coins,
}

/// Convert a CsvRecord to an Operation
///
/// This function:
/// - Matches the op name case-insensitively (`sendcoin` is an alias of `transfer`)
/// - Requires a non-empty user on every row
/// - Requires a target for `buy` and `transfer`
/// - Parses the transfer amount as a signed integer; its sign is checked
///   later by the engine
///
/// # Returns
///
/// * `Ok(Operation)` - Successfully converted row
/// * `Err(ReplayError::InvalidOperation)` - The row does not describe an operation
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<Operation, ReplayError> {
    let user = csv_record.user.trim().to_string();
    if user.is_empty() {
        return Err(ReplayError::invalid_operation(format!(
            "'{}' row has an empty user",
            csv_record.op
        )));
    }

    let target = csv_record
        .target
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    match csv_record.op.trim().to_lowercase().as_str() {
        "auth" => Ok(Operation::Auth { user }),
        "info" => Ok(Operation::Info { user }),
        "buy" => {
            let item = target.ok_or_else(|| {
                ReplayError::invalid_operation(format!("buy by '{user}' requires an item"))
            })?;
            Ok(Operation::Buy { user, item })
        }
        "transfer" | "sendcoin" => {
            let to = target.ok_or_else(|| {
                ReplayError::invalid_operation(format!(
                    "transfer by '{user}' requires a recipient"
                ))
            })?;
            let amount = parse_amount(csv_record.amount.as_deref(), &user)?;
            Ok(Operation::Transfer {
                from: user,
                to,
                amount,
            })
        }
        other => Err(ReplayError::invalid_operation(format!(
            "unknown operation '{other}'"
        ))),
    }
}

fn parse_amount(raw: Option<&str>, user: &str) -> Result<i64, ReplayError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(|| {
        ReplayError::invalid_operation(format!("transfer by '{user}' requires an amount"))
    })?;

    raw.parse::<i64>().map_err(|_| {
        ReplayError::invalid_operation(format!(
            "invalid amount '{raw}' in transfer by '{user}'"
        ))
    })
}

/// Load a catalog from a CSV file with columns: item, price
///
/// Unlike operation logs, a catalog file is all or nothing: any malformed
/// row, duplicate item or zero price fails the load.
pub fn read_catalog_csv(path: &Path) -> Result<Catalog, ReplayError> {
    if !path.exists() {
        return Err(ReplayError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut entries = Vec::new();
    for row in reader.deserialize::<CatalogRow>() {
        let row = row?;
        entries.push((row.item, row.price));
    }

    Ok(Catalog::new(entries)?)
}

/// Write account balances to CSV format
///
/// Writes one `login,coins` row per account, sorted by login for
/// deterministic output.
pub fn write_balances_csv(
    accounts: &[Account],
    output: &mut dyn Write,
) -> Result<(), ReplayError> {
    let mut writer = csv::Writer::from_writer(output);

    writer
        .write_record(["login", "coins"])
        .map_err(|e| ReplayError::output(format!("Failed to write CSV header: {e}")))?;

    let mut sorted: Vec<&Account> = accounts.iter().collect();
    sorted.sort_by(|a, b| a.login.cmp(&b.login));

    for account in sorted {
        let coins = account.balance.to_string();
        writer
            .write_record([account.login.as_str(), coins.as_str()])
            .map_err(|e| ReplayError::output(format!("Failed to write balance record: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| ReplayError::output(format!("Failed to flush output: {e}")))?;

    Ok(())
}
