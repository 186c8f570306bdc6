//! Runtime configuration
//!
//! Configuration is built once at startup (from CLI flags and environment
//! variables, see `cli::args`) and passed down explicitly. Nothing reads
//! global state.

use std::sync::Arc;
use std::time::Duration;

use clap::ValueEnum;
use tokio_util::sync::CancellationToken;

use crate::core::{Accountant, MemoryStore};
use crate::types::{Catalog, Coins, DEFAULT_STARTING_BALANCE};

/// Settings of the accounting engine itself
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Balance of a freshly opened account
    pub starting_balance: Coins,

    /// Price list for purchases
    pub catalog: Arc<Catalog>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            starting_balance: DEFAULT_STARTING_BALANCE,
            catalog: Arc::new(Catalog::merch()),
        }
    }
}

impl EngineConfig {
    pub fn new(starting_balance: Coins, catalog: Catalog) -> Self {
        Self {
            starting_balance,
            catalog: Arc::new(catalog),
        }
    }

    /// Build an empty store and an accountant over it
    pub fn build(&self) -> (Arc<MemoryStore>, Accountant) {
        let store = Arc::new(MemoryStore::new(
            Arc::clone(&self.catalog),
            self.starting_balance,
        ));
        let accountant = Accountant::with_store(Arc::clone(&store));
        (store, accountant)
    }
}

/// Format of the final snapshot output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON array of `{login, info}` objects
    #[default]
    Json,
    /// `login,coins` rows
    Csv,
}

/// Settings shared by every replay strategy
#[derive(Debug, Clone, Default)]
pub struct ReplayConfig {
    pub engine: EngineConfig,

    pub output_format: OutputFormat,

    /// Deadline for a single operation, lock waits included
    pub op_timeout: Option<Duration>,

    /// Fired to stop the replay; rows not yet applied are dropped
    pub shutdown: CancellationToken,

    /// Fire `shutdown` on ctrl-c
    pub listen_for_ctrl_c: bool,
}
