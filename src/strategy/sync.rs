//! Sequential processing strategy
//!
//! Replays the log one row at a time, in file order, on a single-threaded
//! runtime. This is the reference behaviour the concurrent strategy is
//! compared against.
//!
//! # Design
//!
//! The SyncProcessingStrategy focuses on orchestration, delegating:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - Applying operations to `BatchProcessor::apply` (engine facade)
//! - Output to the `json_format` / `csv_format` writers
//!
//! Rows are streamed; memory grows with the number of accounts and ledger
//! records, not with the size of the log.

use std::io::Write;
use std::path::Path;

use tracing::warn;

use crate::config::ReplayConfig;
use crate::core::BatchProcessor;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{finish, listen_for_ctrl_c, ProcessingStrategy, ReplaySummary};
use crate::types::ReplayError;

/// Sequential processing strategy
///
/// # Examples
///
/// ```no_run
/// use merch_ledger::config::ReplayConfig;
/// use merch_ledger::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SyncProcessingStrategy::new(ReplayConfig::default());
/// let mut output = io::stdout();
///
/// strategy.process(Path::new("operations.csv"), &mut output)
///     .expect("Replay failed");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SyncProcessingStrategy {
    config: ReplayConfig,
}

impl SyncProcessingStrategy {
    pub fn new(config: ReplayConfig) -> Self {
        Self { config }
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    /// Replay the log sequentially and write the final snapshots
    ///
    /// 1. Opens the log with a `SyncReader` (a missing file is fatal)
    /// 2. Builds a fresh store and accountant from the engine config
    /// 3. Applies each row in order, stopping early if shutdown fires
    /// 4. Snapshots every account and writes them in the configured format
    fn process(
        &self,
        input_path: &Path,
        output: &mut dyn Write,
    ) -> Result<ReplaySummary, ReplayError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ReplayError::runtime(format!("Failed to create tokio runtime: {e}")))?;

        let reader = SyncReader::new(input_path)?;

        runtime.block_on(async {
            let (store, accountant) = self.config.engine.build();
            let shutdown = self.config.shutdown.clone();
            let processor =
                BatchProcessor::new(accountant.clone(), self.config.op_timeout, shutdown.clone());

            if self.config.listen_for_ctrl_c {
                listen_for_ctrl_c(shutdown.clone());
            }

            let mut summary = ReplaySummary::default();
            for row in reader {
                if shutdown.is_cancelled() {
                    warn!("replay interrupted, remaining rows dropped");
                    break;
                }

                match row {
                    Ok(operation) => summary.record(&processor.apply(operation).await),
                    Err(e) => {
                        warn!(error = %e, "skipping row");
                        summary.skipped += 1;
                    }
                }
            }

            finish(
                summary,
                &store,
                &accountant,
                self.config.output_format,
                output,
            )
            .await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use serde_json::{json, Value};
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn run(strategy: &SyncProcessingStrategy, content: &str) -> (ReplaySummary, String) {
        let file = create_temp_csv(content);
        let mut output = Vec::new();
        let summary = strategy.process(file.path(), &mut output).unwrap();
        (summary, String::from_utf8(output).unwrap())
    }

    #[test]
    fn replays_in_file_order() {
        let (summary, output) = run(
            &SyncProcessingStrategy::default(),
            "op,user,target,amount\n\
             auth,u1,,\n\
             transfer,u1,u2,10\n\
             auth,u2,,\n\
             transfer,u1,u2,10\n",
        );

        // The first transfer runs before u2 exists and is rejected.
        assert_eq!(
            summary,
            ReplaySummary {
                applied: 3,
                rejected: 1,
                failed: 0,
                skipped: 0
            }
        );

        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[0]["login"], json!("u1"));
        assert_eq!(value[0]["info"]["coins"], json!(990));
        assert_eq!(value[1]["info"]["coins"], json!(1010));
    }

    #[test]
    fn counts_skipped_and_rejected_rows() {
        let (summary, _) = run(
            &SyncProcessingStrategy::default(),
            "op,user,target,amount\n\
             auth,u1,,\n\
             refund,u1,,\n\
             buy,u1,pink-hoody,\n\
             buy,u1,pink-hoody,\n\
             buy,u1,cup,\n\
             transfer,u1,u1,5\n",
        );

        assert_eq!(
            summary,
            ReplaySummary {
                applied: 3,
                rejected: 2,
                failed: 0,
                skipped: 1
            }
        );
    }

    #[test]
    fn csv_output() {
        let config = ReplayConfig {
            output_format: OutputFormat::Csv,
            ..ReplayConfig::default()
        };
        let (_, output) = run(
            &SyncProcessingStrategy::new(config),
            "op,user,target,amount\nauth,bob,,\nauth,alice,,\nbuy,bob,socks,\n",
        );

        assert_eq!(output, "login,coins\nalice,1000\nbob,990\n");
    }

    #[test]
    fn shutdown_before_start_applies_nothing() {
        let config = ReplayConfig::default();
        config.shutdown.cancel();
        let (summary, output) = run(
            &SyncProcessingStrategy::new(config),
            "op,user,target,amount\nauth,u1,,\n",
        );

        assert_eq!(summary, ReplaySummary::default());
        assert_eq!(output.trim(), "[]");
    }

    #[test]
    fn missing_file_is_fatal() {
        let strategy = SyncProcessingStrategy::default();
        let mut output = Vec::new();

        let result = strategy.process(Path::new("nonexistent.csv"), &mut output);
        assert!(matches!(result, Err(ReplayError::FileNotFound { .. })));
    }
}
