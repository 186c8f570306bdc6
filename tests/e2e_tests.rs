//! End-to-end integration tests
//!
//! These tests validate the complete replay pipeline using predefined CSV
//! fixtures. Each test:
//! 1. Reads input.csv from a fixture directory
//! 2. Replays all operations through the accounting engine
//! 3. Writes the final snapshots (JSON) or balances (CSV)
//! 4. Compares actual output with expected.json / expected.csv
//!
//! Test fixtures are located in tests/fixtures/ and cover:
//! - Happy path purchases and transfers
//! - Insufficient funds for purchases and transfers
//! - Invalid requests (unknown users and items, bad amounts, self-transfer)
//! - Malformed rows that are skipped
//! - Aggregation of inventory and coin history across several users
//!
//! Fixtures authenticate every user before anything else and never let one
//! user's outcome depend on another user's concurrent operations, so both
//! strategies must produce identical output.

#[cfg(test)]
mod tests {
    use merch_ledger::cli::StrategyType;
    use merch_ledger::config::{OutputFormat, ReplayConfig};
    use merch_ledger::strategy::{create_strategy, BatchConfig};
    use rstest::rstest;
    use serde_json::Value;
    use std::fs;
    use std::path::Path;

    /// Replay `tests/fixtures/{fixture_name}/input.csv` and return the output
    ///
    /// # Panics
    ///
    /// Panics if the input file is missing or the replay fails.
    fn replay_fixture(
        fixture_name: &str,
        strategy_type: StrategyType,
        output_format: OutputFormat,
    ) -> String {
        let input_path = format!("tests/fixtures/{}/input.csv", fixture_name);
        assert!(
            Path::new(&input_path).exists(),
            "Input file not found: {}",
            input_path
        );

        let config = ReplayConfig {
            output_format,
            ..ReplayConfig::default()
        };
        let strategy = create_strategy(strategy_type, config, BatchConfig::default());

        let mut output = Vec::new();
        strategy
            .process(Path::new(&input_path), &mut output)
            .unwrap_or_else(|e| panic!("Failed to replay operations: {}", e));

        String::from_utf8(output).expect("Output is not UTF-8")
    }

    fn read_expected(fixture_name: &str, file: &str) -> String {
        let expected_path = format!("tests/fixtures/{}/{}", fixture_name, file);
        fs::read_to_string(&expected_path)
            .unwrap_or_else(|e| panic!("Failed to read expected file {}: {}", expected_path, e))
    }

    /// JSON snapshots for every fixture with both strategies
    #[rstest]
    #[case("happy_path")]
    #[case("insufficient_funds")]
    #[case("invalid_requests")]
    #[case("malformed_data")]
    #[case("multiple_users")]
    fn test_fixtures_json(
        #[case] fixture: &str,
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        let actual_output = replay_fixture(fixture, strategy, OutputFormat::Json);
        let expected_output = read_expected(fixture, "expected.json");

        let actual: Value = serde_json::from_str(&actual_output)
            .unwrap_or_else(|e| panic!("Output is not valid JSON: {}\n{}", e, actual_output));
        let expected: Value =
            serde_json::from_str(&expected_output).expect("expected.json is not valid JSON");

        assert_eq!(
            actual, expected,
            "\n\nOutput mismatch for fixture: {} (strategy: {:?})\n\nActual output:\n{}\n\nExpected output:\n{}\n",
            fixture, strategy, actual_output, expected_output
        );
    }

    /// CSV balances for every fixture with both strategies
    #[rstest]
    #[case("happy_path")]
    #[case("insufficient_funds")]
    #[case("invalid_requests")]
    #[case("malformed_data")]
    #[case("multiple_users")]
    fn test_fixtures_csv(
        #[case] fixture: &str,
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        let actual_output = replay_fixture(fixture, strategy, OutputFormat::Csv);
        let expected_output = read_expected(fixture, "expected.csv");

        assert_eq!(
            actual_output, expected_output,
            "\n\nOutput mismatch for fixture: {} (strategy: {:?})\n",
            fixture, strategy
        );
    }

    /// Batch boundaries must not change the result
    #[rstest]
    fn small_batches_match_single_batch(#[values(1, 2, 3, 7)] batch_size: usize) {
        let input_path = Path::new("tests/fixtures/multiple_users/input.csv");
        let strategy = create_strategy(
            StrategyType::Async,
            ReplayConfig::default(),
            BatchConfig::new(batch_size, 2),
        );

        let mut output = Vec::new();
        strategy.process(input_path, &mut output).unwrap();

        let actual: Value = serde_json::from_slice(&output).unwrap();
        let expected: Value =
            serde_json::from_str(&read_expected("multiple_users", "expected.json")).unwrap();
        assert_eq!(actual, expected);
    }
}
