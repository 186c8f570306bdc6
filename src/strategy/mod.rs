//! Processing strategy module for replaying operation logs
//!
//! This module defines the Strategy pattern for complete replay pipelines,
//! covering CSV parsing, applying operations through the accounting engine
//! and writing the final account snapshots. Implementations (sequential,
//! concurrent batches) are selected at runtime.

use std::io::Write;
use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::StrategyType;
use crate::config::{OutputFormat, ReplayConfig};
use crate::core::{Accountant, MemoryStore, OperationResult};
use crate::io::{write_balances_csv, write_reports_json, AccountReport};
use crate::types::{ErrorClass, ReplayError};

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete replay pipelines
pub trait ProcessingStrategy: Send + Sync {
    /// Replay the operations of `input_path` and write the final snapshots
    ///
    /// # Returns
    ///
    /// * `Ok(ReplaySummary)` - Replay finished (possibly with rejected or skipped rows)
    /// * `Err(ReplayError)` - Fatal error: input unreadable, runtime or output failure
    ///
    /// Row-level problems (malformed rows, rejected operations) are logged
    /// and counted but never abort the replay.
    fn process(
        &self,
        input_path: &Path,
        output: &mut dyn Write,
    ) -> Result<ReplaySummary, ReplayError>;
}

/// Counts of what happened to the rows of a replay
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Operations the engine applied
    pub applied: usize,
    /// Operations refused as bad request or for lack of coins
    pub rejected: usize,
    /// Operations that hit an internal failure (including cancellation)
    pub failed: usize,
    /// Rows that did not parse into an operation
    pub skipped: usize,
}

impl ReplaySummary {
    pub fn record(&mut self, result: &OperationResult) {
        match &result.result {
            Ok(_) => self.applied += 1,
            Err(e) if e.class() == ErrorClass::Internal => self.failed += 1,
            Err(_) => self.rejected += 1,
        }
    }

    pub fn record_all(&mut self, results: &[OperationResult]) {
        for result in results {
            self.record(result);
        }
    }

    fn log(&self) {
        info!(
            applied = self.applied,
            rejected = self.rejected,
            failed = self.failed,
            skipped = self.skipped,
            "replay finished"
        );
    }
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - Sequential or concurrent replay
/// * `config` - Engine, output and cancellation settings
/// * `batch` - Batch settings (ignored for sync)
pub fn create_strategy(
    strategy_type: StrategyType,
    config: ReplayConfig,
    batch: BatchConfig,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(config)),
        StrategyType::Async => Box::new(AsyncProcessingStrategy::new(config, batch)),
    }
}

/// Map a failure to open the input file
fn open_error(path: &Path, error: std::io::Error) -> ReplayError {
    match error.kind() {
        std::io::ErrorKind::NotFound => ReplayError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => ReplayError::from(error),
    }
}

/// Cancel `shutdown` when the process receives ctrl-c
///
/// Must be called from within a runtime with the signal driver enabled.
fn listen_for_ctrl_c(shutdown: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping replay");
            shutdown.cancel();
        }
    });
}

/// Snapshot every account, sorted by login
///
/// Uses its own token so snapshots are still taken after the replay was
/// interrupted.
async fn collect_reports(
    store: &MemoryStore,
    accountant: &Accountant,
) -> Result<Vec<AccountReport>, ReplayError> {
    let cancel = CancellationToken::new();
    let mut reports = Vec::with_capacity(store.account_count());

    for login in store.logins() {
        let info = accountant
            .info(&login, &cancel)
            .await
            .map_err(|e| ReplayError::runtime(format!("failed to snapshot '{login}': {e}")))?;
        reports.push(AccountReport { login, info });
    }

    Ok(reports)
}

fn write_output(
    format: OutputFormat,
    reports: &[AccountReport],
    output: &mut dyn Write,
) -> Result<(), ReplayError> {
    match format {
        OutputFormat::Json => write_reports_json(reports, output),
        OutputFormat::Csv => {
            let accounts: Vec<_> = reports.iter().map(AccountReport::account).collect();
            write_balances_csv(&accounts, output)
        }
    }
}

/// Shared tail of every strategy: log the summary, snapshot, write
async fn finish(
    summary: ReplaySummary,
    store: &MemoryStore,
    accountant: &Accountant,
    format: OutputFormat,
    output: &mut dyn Write,
) -> Result<ReplaySummary, ReplayError> {
    summary.log();
    let reports = collect_reports(store, accountant).await?;
    write_output(format, &reports, output)?;
    Ok(summary)
}
