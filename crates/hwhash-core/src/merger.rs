//! Aggregation of per-file rows into one consolidated dataset

use crate::parser::IngestionOutcome;
use crate::scanner::SourceFile;
use crate::table::Row;
use std::collections::BTreeSet;
use tracing::debug;

/// All rows consolidated so far, the union of their columns, and the
/// per-run counters
#[derive(Debug, Clone, Default)]
pub struct ConsolidatedDataset {
    /// Rows in discovery order, then file order
    pub rows: Vec<Row>,
    /// Every column name seen in a successfully ingested file
    pub columns: BTreeSet<String>,
    /// Files that contributed rows
    pub processed_count: usize,
    /// Files that failed or contributed nothing
    pub error_count: usize,
    /// Display names of the failed files, in discovery order
    pub error_files: Vec<String>,
}

impl ConsolidatedDataset {
    /// Create an empty dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one file's ingestion outcome into the dataset
    pub fn accumulate(&mut self, file: &SourceFile, outcome: IngestionOutcome) {
        match outcome {
            IngestionOutcome::Success(table) if !table.rows.is_empty() => {
                debug!(
                    "{}: {} row(s), {} column(s)",
                    file.display_name(),
                    table.row_count(),
                    table.column_count()
                );
                self.columns.extend(table.columns);
                self.rows.extend(table.rows);
                self.processed_count += 1;
            }
            _ => {
                self.error_count += 1;
                self.error_files.push(file.display_name());
            }
        }
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column names in export order
    pub fn sorted_columns(&self) -> Vec<&str> {
        self.columns.iter().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
