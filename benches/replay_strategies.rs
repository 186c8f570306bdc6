//! Benchmark suite for comparing replay strategies
//!
//! This benchmark compares the performance of sequential and concurrent
//! replay using the divan benchmarking framework.
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//! ```
//!
//! # Benchmark Fixtures
//!
//! Three representative operation logs are used:
//! - `benchmark_small.csv` - Small log (100 operations, 10 users)
//! - `benchmark_medium.csv` - Medium log (1,000 operations, 50 users)
//! - `benchmark_large.csv` - Large log (20,000 operations, 500 users)
//!
//! Each fixture authenticates every user first and then mixes:
//! - Purchases across the whole catalog
//! - Transfers between random users (some overdrawing)
//! - Info lookups

use merch_ledger::cli::StrategyType;
use merch_ledger::config::ReplayConfig;
use merch_ledger::strategy::{create_strategy, BatchConfig};
use std::path::Path;

fn main() {
    divan::main();
}

fn replay(strategy_type: StrategyType, fixture: &str) {
    let strategy = create_strategy(strategy_type, ReplayConfig::default(), BatchConfig::default());
    let path = Path::new("benches/fixtures").join(fixture);
    let mut output = Vec::new();

    strategy.process(&path, &mut output).expect("Replay failed");
}

/// Sequential replay of the small log
#[divan::bench]
fn sync_strategy_small() {
    replay(StrategyType::Sync, "benchmark_small.csv");
}

/// Concurrent replay of the small log
#[divan::bench]
fn async_strategy_small() {
    replay(StrategyType::Async, "benchmark_small.csv");
}

/// Sequential replay of the medium log
#[divan::bench]
fn sync_strategy_medium() {
    replay(StrategyType::Sync, "benchmark_medium.csv");
}

/// Concurrent replay of the medium log
#[divan::bench]
fn async_strategy_medium() {
    replay(StrategyType::Async, "benchmark_medium.csv");
}

/// Sequential replay of the large log
#[divan::bench(sample_count = 10)]
fn sync_strategy_large() {
    replay(StrategyType::Sync, "benchmark_large.csv");
}

/// Concurrent replay of the large log
#[divan::bench(sample_count = 10)]
fn async_strategy_large() {
    replay(StrategyType::Async, "benchmark_large.csv");
}
