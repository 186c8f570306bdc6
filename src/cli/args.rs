use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::{EngineConfig, OutputFormat, ReplayConfig};
use crate::io::read_catalog_csv;
use crate::strategy::BatchConfig;
use crate::telemetry::LogFormat;
use crate::types::{Catalog, Coins, ReplayError, DEFAULT_STARTING_BALANCE};

/// Replay merch shop operations through the accounting engine
#[derive(Parser, Debug)]
#[command(name = "merch-ledger")]
#[command(
    about = "Replay merch shop operations (auth, buy, transfer, info) and print final account snapshots",
    long_about = None
)]
pub struct CliArgs {
    /// Input CSV file with columns op,user,target,amount
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    /// Replay strategy
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Replay strategy: 'sync' for sequential or 'async' for concurrent batches"
    )]
    pub strategy: StrategyType,

    /// Number of operations per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of operations per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Number of worker threads (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Number of worker threads applying a batch (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,

    /// Balance of a newly opened account
    #[arg(
        long = "starting-balance",
        value_name = "COINS",
        env = "MERCH_STARTING_BALANCE",
        default_value_t = DEFAULT_STARTING_BALANCE
    )]
    pub starting_balance: Coins,

    /// Catalog CSV with columns item,price (default: built-in merch catalog)
    #[arg(long = "catalog", value_name = "FILE", env = "MERCH_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Output format for the final snapshots
    #[arg(long = "format", value_name = "FORMAT", value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Deadline per operation in milliseconds, lock waits included
    #[arg(long = "op-timeout-ms", value_name = "MILLIS")]
    pub op_timeout_ms: Option<u64>,

    /// Log line format on stderr
    #[arg(long = "log-format", value_name = "FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Available replay strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Missing values fall back to the defaults; zero values are replaced
    /// with the defaults by `BatchConfig::new` with a warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent_batches.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent_batches
                    .unwrap_or(default.max_concurrent_batches),
            )
        } else {
            BatchConfig::default()
        }
    }

    /// Build the replay configuration, loading the catalog file if given
    ///
    /// # Errors
    ///
    /// Fails if the catalog file is missing or invalid.
    pub fn to_replay_config(&self) -> Result<ReplayConfig, ReplayError> {
        let catalog = match &self.catalog {
            Some(path) => read_catalog_csv(path)?,
            None => Catalog::merch(),
        };

        Ok(ReplayConfig {
            engine: EngineConfig {
                starting_balance: self.starting_balance,
                catalog: Arc::new(catalog),
            },
            output_format: self.format,
            op_timeout: self.op_timeout_ms.map(Duration::from_millis),
            listen_for_ctrl_c: true,
            ..ReplayConfig::default()
        })
    }
}
