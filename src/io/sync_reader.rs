//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over the operations of a replay log.
//! Delegates CSV format concerns to the csv_format module.
//!
//! # Iterator Interface
//!
//! SyncReader implements the Iterator trait, yielding
//! `Result<Operation, ReplayError>` for each CSV row:
//!
//! ```no_run
//! use merch_ledger::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("operations.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(operation) => println!("Replaying: {}", operation),
//!         Err(e) => eprintln!("Skipping row: {}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual row errors are yielded as Err variants carrying the line number
//!
//! Rows are read one at a time; the file is never loaded whole.

use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, Trim};

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::{Operation, ReplayError};

/// Synchronous CSV reader over an operation log
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,

    /// Line of the last row read; the header is line 1
    line_num: u64,
}

impl SyncReader {
    /// Create a new SyncReader from a file path
    ///
    /// The CSV reader is configured to:
    /// - Trim whitespace from all fields
    /// - Allow flexible field counts (`auth` and `info` rows may stop after the user)
    /// - Use an 8KB buffer
    ///
    /// # Returns
    ///
    /// * `Ok(SyncReader)` if the file opened successfully
    /// * `Err(ReplayError::FileNotFound)` if there is no such file
    /// * `Err(ReplayError::Io)` if it could not be opened for another reason
    pub fn new(path: &Path) -> Result<Self, ReplayError> {
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ReplayError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ReplayError::from(e),
        })?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            line_num: 1,
        })
    }
}

impl Iterator for SyncReader {
    type Item = Result<Operation, ReplayError>;

    /// Next operation of the log
    ///
    /// # Returns
    ///
    /// * `Some(Ok(Operation))` - Successfully parsed row
    /// * `Some(Err(ReplayError))` - Parse or conversion error with line number
    /// * `None` - End of file reached
    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<CsvRecord>();
        let row = deserializer.next()?;
        self.line_num += 1;

        Some(
            row.map_err(ReplayError::from)
                .and_then(convert_csv_record)
                .map_err(|e| e.at_line(self.line_num)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    #[test]
    fn new_fails_on_missing_file() {
        let result = SyncReader::new(Path::new("nonexistent.csv"));
        assert_eq!(
            result.unwrap_err(),
            ReplayError::FileNotFound {
                path: "nonexistent.csv".to_string()
            }
        );
    }

    #[test]
    fn iterates_all_operation_kinds() {
        let file = create_temp_csv(
            "op,user,target,amount\n\
             auth,u1,,\n\
             auth,u2\n\
             buy,u1,cup,\n\
             transfer,u1,u2,40\n\
             info,u2,,\n",
        );

        let operations: Vec<Operation> = SyncReader::new(file.path())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(
            operations,
            vec![
                Operation::Auth { user: "u1".into() },
                Operation::Auth { user: "u2".into() },
                Operation::Buy {
                    user: "u1".into(),
                    item: "cup".into()
                },
                Operation::Transfer {
                    from: "u1".into(),
                    to: "u2".into(),
                    amount: 40
                },
                Operation::Info { user: "u2".into() },
            ]
        );
    }

    #[test]
    fn handles_whitespace() {
        let file = create_temp_csv("op,user,target,amount\n  buy ,  u1  ,  pen ,\n");

        let records: Vec<_> = SyncReader::new(file.path()).unwrap().collect();
        assert_eq!(
            records,
            vec![Ok(Operation::Buy {
                user: "u1".into(),
                item: "pen".into()
            })]
        );
    }

    #[test]
    fn errors_carry_line_numbers_and_reading_continues() {
        let file = create_temp_csv(
            "op,user,target,amount\n\
             auth,u1,,\n\
             refund,u1,,\n\
             transfer,u1,u2,lots\n\
             info,u1,,\n",
        );

        let records: Vec<_> = SyncReader::new(file.path()).unwrap().collect();
        assert_eq!(records.len(), 4);
        assert!(records[0].is_ok());
        assert!(records[3].is_ok());

        let second = records[1].as_ref().unwrap_err();
        assert!(second.to_string().starts_with("Invalid operation at line 3"));
        let third = records[2].as_ref().unwrap_err();
        assert!(third.to_string().starts_with("Invalid operation at line 4"));
    }

    #[test]
    fn empty_file_after_header() {
        let file = create_temp_csv("op,user,target,amount\n");
        assert_eq!(SyncReader::new(file.path()).unwrap().count(), 0);
    }
}
