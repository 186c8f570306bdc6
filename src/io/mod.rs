//! I/O module
//!
//! Handles operation log parsing, catalog loading and snapshot output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (row conversion, catalog files, balance output)
//! - `json_format` - JSON snapshot output
//! - `sync_reader` - Synchronous CSV reader with iterator interface
//! - `async_reader` - Asynchronous CSV reader with batch reading interface

pub mod async_reader;
pub mod csv_format;
pub mod json_format;
pub mod sync_reader;

pub use async_reader::AsyncReader;
pub use csv_format::{convert_csv_record, read_catalog_csv, write_balances_csv, CsvRecord};
pub use json_format::{write_reports_json, AccountReport};
pub use sync_reader::SyncReader;
