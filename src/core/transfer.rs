//! Transfer ledger
//!
//! A transfer locks sender and recipient together (in login order, see the
//! store), computes both new balances, and only then commits the two
//! balances and the two record copies. A refused debit or an overflowing
//! credit returns before anything is written.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::types::{Coins, LedgerError, ReceivedTransfer, SentTransfer, TransferRecord};

use super::store::MemoryStore;
use super::traits::TransferLedger;

/// Sum incoming transfers per sender, in sender login order
///
/// A per-sender total beyond the coin range is a storage failure.
pub fn summarize_received(
    transfers: &[TransferRecord],
) -> Result<Vec<ReceivedTransfer>, LedgerError> {
    Ok(sum_by(transfers, |t| t.sender.as_str())?
        .into_iter()
        .map(|(from, amount)| ReceivedTransfer::new(from, amount))
        .collect())
}

/// Sum outgoing transfers per recipient, in recipient login order
pub fn summarize_sent(transfers: &[TransferRecord]) -> Result<Vec<SentTransfer>, LedgerError> {
    Ok(sum_by(transfers, |t| t.recipient.as_str())?
        .into_iter()
        .map(|(to, amount)| SentTransfer::new(to, amount))
        .collect())
}

fn sum_by<'a>(
    transfers: &'a [TransferRecord],
    counterpart: impl Fn(&'a TransferRecord) -> &'a str,
) -> Result<BTreeMap<&'a str, Coins>, LedgerError> {
    let mut totals: BTreeMap<&str, Coins> = BTreeMap::new();
    for transfer in transfers {
        let login = counterpart(transfer);
        let total = totals.entry(login).or_default();
        *total = total.checked_add(transfer.amount).ok_or_else(|| {
            LedgerError::storage(format!(
                "coins exchanged with '{login}' exceed the balance range"
            ))
        })?;
    }
    Ok(totals)
}

#[async_trait]
impl TransferLedger for MemoryStore {
    async fn transfer(
        &self,
        sender: &str,
        recipient: &str,
        amount: Coins,
        cancel: &CancellationToken,
    ) -> Result<TransferRecord, LedgerError> {
        let (mut from, mut to) = self.lock_pair(sender, recipient, cancel).await?;

        let sender_balance = from.debit(sender, amount)?;
        let recipient_balance = to.credit(recipient, amount)?;

        let record = TransferRecord {
            seq: self.next_sequence(),
            sender: sender.to_string(),
            recipient: recipient.to_string(),
            amount,
        };
        from.balance = sender_balance;
        to.balance = recipient_balance;
        from.sent.push(record.clone());
        to.received.push(record.clone());

        Ok(record)
    }

    async fn list_received(
        &self,
        login: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<ReceivedTransfer>, LedgerError> {
        let account = self.lock(login, cancel).await?;
        summarize_received(&account.received)
    }

    async fn list_sent(
        &self,
        login: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<SentTransfer>, LedgerError> {
        let account = self.lock(login, cancel).await?;
        summarize_sent(&account.sent)
    }
}
