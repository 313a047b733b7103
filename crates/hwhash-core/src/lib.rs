//! hwhash-core: Core library for consolidating device hardware hash exports
//!
//! This library provides functionality to:
//! - Discover CSV exports in a directory tree
//! - Sniff each file's delimiter and detect whether it has a header row
//! - Union divergent column sets into one consolidated dataset
//! - Count duplicate device serial numbers
//! - Export the consolidated dataset with a deterministic column order

pub mod config;
pub mod dialect;
pub mod duplicates;
pub mod error;
pub mod export;
pub mod merger;
pub mod parser;
pub mod pipeline;
pub mod scanner;
pub mod table;

pub use config::{validate_directory, RunConfig};
pub use dialect::Dialect;
pub use duplicates::{count_duplicates, device_identifier, duplicate_identifiers};
pub use error::{Error, Result};
pub use export::{export, output_file_name, output_path, sanitize_label, ExportResult};
pub use merger::ConsolidatedDataset;
pub use parser::{ingest, parse_csv, parse_csv_str, IngestionOutcome};
pub use pipeline::{
    consolidate, consolidate_with, run, run_at, Reporter, RunEvent, RunOutcome, RunSummary,
    SilentReporter,
};
pub use scanner::{discover, discover_with, ScanOptions, SourceFile};
pub use table::{Row, Table};
