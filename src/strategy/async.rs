//! Concurrent batch processing strategy
//!
//! This module provides a multi-threaded implementation of the
//! ProcessingStrategy trait. It reads the log in batches and applies each
//! batch with user-based partitioning.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── ReplayConfig (engine, output, deadline, shutdown)
//!     ├── AsyncReader (batch CSV reading)
//!     └── BatchProcessor (auth first, then one task per user)
//!         └── Accountant → MemoryStore (per-account locks)
//! ```
//!
//! # Ordering
//!
//! - Batches are processed one after another, so a user's operations keep
//!   their file order across batch boundaries
//! - Within a batch, `auth` rows are applied before everything else
//! - Different users' operations in one batch run concurrently; their
//!   relative order is not defined

use std::io::Write;
use std::path::Path;

use tracing::warn;

use crate::config::ReplayConfig;
use crate::core::BatchProcessor;
use crate::io::async_reader::AsyncReader;
use crate::strategy::{finish, listen_for_ctrl_c, open_error, ProcessingStrategy, ReplaySummary};
use crate::types::ReplayError;

/// Configuration for batch processing
///
/// Controls how operations are batched and the number of worker threads
/// applying each batch.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Number of operations per batch
    pub batch_size: usize,
    /// Number of runtime worker threads
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig, replacing zero values with the defaults
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                batch_size,
                default = default.batch_size,
                "invalid batch size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            warn!(
                max_concurrent_batches,
                default = default.max_concurrent_batches,
                "invalid concurrency, using default"
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Concurrent batch processing strategy
#[derive(Debug, Clone, Default)]
pub struct AsyncProcessingStrategy {
    config: ReplayConfig,
    batch: BatchConfig,
}

impl AsyncProcessingStrategy {
    /// Create a new AsyncProcessingStrategy
    ///
    /// # Arguments
    ///
    /// * `config` - Engine, output and cancellation settings
    /// * `batch` - Batch size and worker thread count
    pub fn new(config: ReplayConfig, batch: BatchConfig) -> Self {
        Self { config, batch }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Replay the log in concurrent batches and write the final snapshots
    ///
    /// 1. Creates a multi-threaded runtime with the configured worker count
    /// 2. Opens the log with an `AsyncReader` (a missing file is fatal)
    /// 3. Reads a batch, applies it, waits for it to finish, repeats
    /// 4. Snapshots every account and writes them in the configured format
    fn process(
        &self,
        input_path: &Path,
        output: &mut dyn Write,
    ) -> Result<ReplaySummary, ReplayError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.batch.max_concurrent_batches)
            .enable_all()
            .build()
            .map_err(|e| ReplayError::runtime(format!("Failed to create tokio runtime: {e}")))?;

        runtime.block_on(async {
            let (store, accountant) = self.config.engine.build();
            let shutdown = self.config.shutdown.clone();
            let processor =
                BatchProcessor::new(accountant.clone(), self.config.op_timeout, shutdown.clone());

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| open_error(input_path, e))?;

            // Wrap tokio file in a compatibility layer for csv-async
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);

            if self.config.listen_for_ctrl_c {
                listen_for_ctrl_c(shutdown.clone());
            }

            let mut summary = ReplaySummary::default();
            loop {
                if shutdown.is_cancelled() {
                    warn!("replay interrupted, remaining rows dropped");
                    break;
                }

                let batch = reader.read_batch(self.batch.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                let results = processor.process_batch(batch).await;
                summary.record_all(&results);
            }
            summary.skipped = reader.skipped();

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

    fn run(strategy: &AsyncProcessingStrategy, content: &str) -> (ReplaySummary, Value) {
        let file = create_temp_csv(content);
        let mut output = Vec::new();
        let summary = strategy.process(file.path(), &mut output).unwrap();
        (summary, serde_json::from_slice(&output).unwrap())
    }

    #[test]
    fn processes_multiple_users() {
        let (summary, value) = run(
            &AsyncProcessingStrategy::default(),
            "op,user,target,amount\n\
             auth,u1,,\n\
             auth,u2,,\n\
             buy,u1,book,\n\
             buy,u2,wallet,\n\
             buy,u1,book,\n",
        );

        assert_eq!(summary.applied, 5);
        assert_eq!(value[0]["info"]["coins"], json!(900));
        assert_eq!(
            value[0]["info"]["inventory"],
            json!([{ "type": "book", "quantity": 2 }])
        );
        assert_eq!(value[1]["info"]["coins"], json!(950));
    }

    #[test]
    fn maintains_per_user_ordering_across_batches() {
        // u1 can afford the second pink hoody only if the purchases run in
        // file order: socks first would leave 490 and reject the hoody.
        let strategy =
            AsyncProcessingStrategy::new(ReplayConfig::default(), BatchConfig::new(2, num_cpus::get()));
        let (summary, value) = run(
            &strategy,
            "op,user,target,amount\n\
             auth,u1,,\n\
             auth,u2,,\n\
             buy,u1,pink-hoody,\n\
             buy,u2,pen,\n\
             buy,u1,pink-hoody,\n\
             buy,u1,socks,\n",
        );

        assert_eq!(summary.applied, 5);
        assert_eq!(summary.rejected, 1);
        assert_eq!(value[0]["info"]["coins"], json!(0));
        assert_eq!(
            value[0]["info"]["inventory"],
            json!([{ "type": "pink-hoody", "quantity": 2 }])
        );
        assert_eq!(value[1]["info"]["coins"], json!(990));
    }

    #[test]
    fn counts_skipped_rows() {
        let (summary, _) = run(
            &AsyncProcessingStrategy::default(),
            "op,user,target,amount\nauth,u1,,\nrefund,u1,,\ntransfer,u1,u2,\n",
        );
        assert_eq!(summary.applied, 1);
        assert_eq!(summary.skipped, 2);
    }

    #[test]
    fn handles_missing_file() {
        let strategy = AsyncProcessingStrategy::default();
        let mut output = Vec::new();

        let result = strategy.process(Path::new("nonexistent.csv"), &mut output);
        assert!(matches!(result, Err(ReplayError::FileNotFound { .. })));
    }

    #[test]
    fn zero_values_fall_back_to_defaults() {
        let config = BatchConfig::new(0, 0);
        assert_eq!(config.batch_size, 1000);
        assert_eq!(config.max_concurrent_batches, num_cpus::get());
    }
}
