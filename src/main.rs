//! Merch ledger replay CLI
//!
//! Replays a CSV operation log through the accounting engine and prints the
//! final account snapshots to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- operations.csv > snapshots.json
//! cargo run -- --strategy sync operations.csv
//! cargo run -- --format csv --starting-balance 500 operations.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 operations.csv
//! RUST_LOG=info cargo run -- --log-format json operations.csv
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success (rejected or malformed rows do not fail the run)
//! - 1: Error (missing arguments, file not found, invalid catalog, output failure)

use std::process;

use merch_ledger::{cli, strategy, telemetry};
use tracing::error;

fn main() {
    let args = cli::parse_args();
    telemetry::init(args.log_format);

    let config = match args.to_replay_config() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let strategy = strategy::create_strategy(args.strategy, config, args.to_batch_config());

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        error!(error = %e, "replay failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
