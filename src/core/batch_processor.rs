//! Batch processing with user-based partitioning for concurrent replay
//!
//! This module provides the `BatchProcessor` struct, which applies replayed
//! operations through the [`Accountant`], either one by one or as batches
//! partitioned by acting user.
//!
//! # Design
//!
//! A batch is applied in two phases:
//!
//! 1. Every `auth` operation of the batch, so accounts registered in the
//!    batch exist before anyone transfers to them.
//! 2. All other operations, partitioned by acting user. Each user's
//!    operations run sequentially in input order on their own task; different
//!    users run concurrently and only meet at the store's account locks.
//!
//! # Architecture
//!
//! ```text
//! BatchProcessor
//!     ├── Accountant          (shared engine facade)
//!     ├── Option<Duration>    (per-operation deadline)
//!     └── CancellationToken   (replay-wide shutdown)
//! ```

use std::collections::HashMap;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::types::{
    AccountOpening, AccountSnapshot, AccountingError, LedgerError, Login, Operation,
};

use super::Accountant;

/// What an applied operation produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Authorized(AccountOpening),
    Bought,
    Transferred,
    Info(AccountSnapshot),
}

/// Result of processing a single operation
#[derive(Debug, Clone)]
pub struct OperationResult {
    /// The operation that was processed
    pub operation: Operation,

    /// The result of processing (success or error)
    pub result: Result<Outcome, AccountingError>,
}

/// Batch processor with user-based partitioning
///
/// Cheap to clone; clones share the accountant and the cancellation token.
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    accountant: Accountant,

    /// Deadline for a single operation, lock waits included
    op_timeout: Option<Duration>,

    /// Fired on shutdown; operations still waiting for locks give up
    cancel: CancellationToken,
}

impl BatchProcessor {
    /// Create a new BatchProcessor
    ///
    /// # Arguments
    ///
    /// * `accountant` - Engine facade the operations are applied through
    /// * `op_timeout` - Optional per-operation deadline
    /// * `cancel` - Replay-wide cancellation token
    pub fn new(
        accountant: Accountant,
        op_timeout: Option<Duration>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            accountant,
            op_timeout,
            cancel,
        }
    }

    pub fn accountant(&self) -> &Accountant {
        &self.accountant
    }

    /// Apply one operation, honouring the deadline
    ///
    /// A deadline that expires drops the engine call. The store only commits
    /// after all locks are held and never awaits while committing, so an
    /// expired operation has either fully applied or not started.
    pub async fn apply(&self, operation: Operation) -> OperationResult {
        let result = match self.op_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.dispatch(&operation)).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(
                        operation = operation.name(),
                        user = operation.user(),
                        timeout_ms = limit.as_millis() as u64,
                        "operation deadline exceeded"
                    );
                    Err(AccountingError::internal(LedgerError::Cancelled))
                }
            },
            None => self.dispatch(&operation).await,
        };

        OperationResult { operation, result }
    }

    async fn dispatch(&self, operation: &Operation) -> Result<Outcome, AccountingError> {
        let cancel = &self.cancel;
        match operation {
            Operation::Auth { user } => self
                .accountant
                .open_account(user, cancel)
                .await
                .map(Outcome::Authorized),
            Operation::Buy { user, item } => self
                .accountant
                .buy(user, item, cancel)
                .await
                .map(|()| Outcome::Bought),
            Operation::Transfer { from, to, amount } => self
                .accountant
                .transfer(from, to, *amount, cancel)
                .await
                .map(|()| Outcome::Transferred),
            Operation::Info { user } => self
                .accountant
                .info(user, cancel)
                .await
                .map(Outcome::Info),
        }
    }

    /// Apply operations one at a time in input order
    pub async fn process_sequential(&self, operations: Vec<Operation>) -> Vec<OperationResult> {
        let mut results = Vec::with_capacity(operations.len());
        for operation in operations {
            results.push(self.apply(operation).await);
        }
        results
    }

    /// Partition a batch of operations by acting user
    ///
    /// # Guarantees
    ///
    /// - Each operation appears in exactly one sub-batch
    /// - Operations of each user keep their original order
    pub fn partition_by_user(&self, batch: Vec<Operation>) -> HashMap<Login, Vec<Operation>> {
        let mut user_batches: HashMap<Login, Vec<Operation>> = HashMap::new();

        for operation in batch {
            user_batches
                .entry(operation.user().to_string())
                .or_default()
                .push(operation);
        }

        user_batches
    }

    /// Process a batch: auth operations first, then one task per user
    ///
    /// Results are grouped per user; their order across users is not
    /// defined. Every operation yields exactly one result: if a user's task
    /// dies, each of its operations is reported as an internal failure.
    pub async fn process_batch(&self, batch: Vec<Operation>) -> Vec<OperationResult> {
        let (auths, rest): (Vec<_>, Vec<_>) = batch.into_iter().partition(Operation::is_auth);

        let mut results = self.process_sequential(auths).await;

        let user_batches = self.partition_by_user(rest);
        debug!(users = user_batches.len(), "processing batch partitions");

        let mut tasks = Vec::with_capacity(user_batches.len());
        for (user, operations) in user_batches {
            let processor = self.clone();
            let submitted = operations.clone();
            let task = tokio::spawn(async move { processor.process_sequential(operations).await });
            tasks.push((user, submitted, task));
        }

        for (user, submitted, task) in tasks {
            match task.await {
                Ok(user_results) => results.extend(user_results),
                Err(e) => {
                    error!(
                        %user,
                        error = %e,
                        operations = submitted.len(),
                        "partition task failed"
                    );
                    let cause = LedgerError::storage(format!("partition task failed: {e}"));
                    results.extend(submitted.into_iter().map(|operation| OperationResult {
                        operation,
                        result: Err(AccountingError::internal(cause.clone())),
                    }));
                }
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::MockPurchaseLedger;
    use crate::core::MemoryStore;
    use crate::strategy::ReplaySummary;
    use crate::types::ErrorClass;
    use std::sync::Arc;

    fn processor() -> BatchProcessor {
        BatchProcessor::new(
            Accountant::with_store(Arc::new(MemoryStore::default())),
            None,
            CancellationToken::new(),
        )
    }

    fn auth(user: &str) -> Operation {
        Operation::Auth { user: user.into() }
    }

    fn buy(user: &str, item: &str) -> Operation {
        Operation::Buy {
            user: user.into(),
            item: item.into(),
        }
    }

    fn transfer(from: &str, to: &str, amount: i64) -> Operation {
        Operation::Transfer {
            from: from.into(),
            to: to.into(),
            amount,
        }
    }

    async fn balance(processor: &BatchProcessor, user: &str) -> u64 {
        processor
            .accountant()
            .balance(user, &CancellationToken::new())
            .await
            .unwrap()
    }

    #[test]
    fn partition_keeps_per_user_order() {
        let processor = processor();
        let batch = vec![
            buy("u1", "cup"),
            buy("u2", "pen"),
            transfer("u1", "u2", 5),
            buy("u1", "book"),
        ];

        let partitions = processor.partition_by_user(batch);
        assert_eq!(partitions.len(), 2);
        assert_eq!(
            partitions["u1"],
            vec![buy("u1", "cup"), transfer("u1", "u2", 5), buy("u1", "book")]
        );
        assert_eq!(partitions["u2"], vec![buy("u2", "pen")]);
    }

    #[tokio::test]
    async fn sequential_processing_reports_each_result() {
        let processor = processor();
        let results = processor
            .process_sequential(vec![
                auth("u1"),
                buy("u1", "cup"),
                buy("u1", "sword"),
                Operation::Info { user: "u1".into() },
            ])
            .await;

        assert_eq!(results.len(), 4);
        assert_eq!(
            results[0].result,
            Ok(Outcome::Authorized(AccountOpening::Created))
        );
        assert_eq!(results[1].result, Ok(Outcome::Bought));
        assert_eq!(
            results[2].result.as_ref().unwrap_err().class(),
            ErrorClass::BadRequest
        );
        match &results[3].result {
            Ok(Outcome::Info(snapshot)) => assert_eq!(snapshot.balance, 980),
            other => panic!("expected info, got {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn batch_applies_auth_before_transfers() {
        let processor = processor();
        let results = processor
            .process_batch(vec![transfer("u1", "u2", 100), auth("u2"), auth("u1")])
            .await;

        assert!(results.iter().all(|r| r.result.is_ok()));
        assert_eq!(balance(&processor, "u1").await, 900);
        assert_eq!(balance(&processor, "u2").await, 1100);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn batch_preserves_per_user_order() {
        let processor = processor();
        processor.process_batch(vec![auth("u1"), auth("u2")]).await;

        let results = processor
            .process_batch(vec![
                buy("u1", "cup"),
                buy("u2", "pen"),
                buy("u1", "cup"),
                buy("u1", "cup"),
            ])
            .await;

        assert_eq!(results.len(), 4);
        assert_eq!(balance(&processor, "u1").await, 940);
        assert_eq!(balance(&processor, "u2").await, 990);
    }

    #[tokio::test]
    async fn cancelled_processor_applies_nothing() {
        let store = Arc::new(MemoryStore::default());
        let cancel = CancellationToken::new();
        let processor = BatchProcessor::new(
            Accountant::with_store(Arc::clone(&store)),
            None,
            cancel.clone(),
        );

        processor.apply(auth("u1")).await;
        cancel.cancel();
        let result = processor.apply(buy("u1", "cup")).await;

        assert_eq!(
            result.result.unwrap_err(),
            AccountingError::internal(LedgerError::Cancelled)
        );
        let fresh = CancellationToken::new();
        let accountant = Accountant::with_store(store);
        assert_eq!(accountant.balance("u1", &fresh).await, Ok(1000));
    }

    #[tokio::test]
    async fn deadline_exceeded_while_waiting_for_lock() {
        let store = Arc::new(MemoryStore::default());
        let processor = BatchProcessor::new(
            Accountant::with_store(Arc::clone(&store)),
            Some(Duration::from_millis(20)),
            CancellationToken::new(),
        );
        processor.apply(auth("u1")).await;

        let held = store.lock("u1", &CancellationToken::new()).await.unwrap();
        let result = processor.apply(buy("u1", "cup")).await;
        drop(held);

        assert_eq!(
            result.result.unwrap_err(),
            AccountingError::internal(LedgerError::Cancelled)
        );
        assert_eq!(balance(&processor, "u1").await, 1000);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn crashed_partition_reports_every_operation_as_failed() {
        let store = Arc::new(MemoryStore::default());
        let mut purchases = MockPurchaseLedger::new();
        purchases
            .expect_buy_item()
            .returning(|_, _, _| panic!("purchase ledger crashed"));
        let accountant = Accountant::new(
            store.clone(),
            Arc::new(purchases),
            store.clone(),
            store.clone(),
        );
        let processor = BatchProcessor::new(accountant, None, CancellationToken::new());

        let batch = vec![
            auth("u1"),
            auth("u2"),
            buy("u1", "cup"),
            transfer("u2", "u1", 5),
            transfer("u1", "u2", 1),
        ];
        let results = processor.process_batch(batch).await;

        assert_eq!(results.len(), 5);
        for result in &results {
            match result.operation.user() {
                "u1" if !result.operation.is_auth() => assert_eq!(
                    result.result.as_ref().unwrap_err().class(),
                    ErrorClass::Internal
                ),
                _ => assert!(result.result.is_ok(), "{result:?}"),
            }
        }
        assert_eq!(balance(&processor, "u2").await, 995);

        let mut summary = ReplaySummary::default();
        summary.record_all(&results);
        assert_eq!((summary.applied, summary.failed), (3, 2));
    }
}
