//! Asynchronous CSV reader with batch interface
//!
//! Reads an operation log in batches for the concurrent replay strategy.
//!
//! # Architecture
//!
//! ```text
//! CSV Reader → AsyncReader → Batches of Operations
//!                  ↓
//!           csv_format module
//!           (CsvRecord, convert_csv_record)
//! ```

use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use tracing::warn;

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::{Operation, ReplayError};

/// Asynchronous CSV reader over an operation log
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,

    /// Line of the last row read; the header is line 1
    line_num: u64,

    /// Rows dropped because they did not parse
    skipped: usize,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    /// Create a new AsyncReader from an async reader
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self {
            csv_reader,
            line_num: 1,
            skipped: 0,
        }
    }

    /// Number of rows skipped so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Read a batch of operations
    ///
    /// Reads until `batch_size` operations are collected or the file ends.
    /// Rows that fail to parse or convert are logged with their line number
    /// and skipped.
    ///
    /// # Returns
    ///
    /// The converted operations. An empty vector means the end of the file.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<Operation> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<CsvRecord>();

        while batch.len() < batch_size {
            let Some(row) = records.next().await else {
                break;
            };
            self.line_num += 1;

            match row.map_err(ReplayError::from).and_then(convert_csv_record) {
                Ok(operation) => batch.push(operation),
                Err(e) => {
                    warn!(error = %e.at_line(self.line_num), "skipping row");
                    self.skipped += 1;
                }
            }
        }

        batch
    }
}
