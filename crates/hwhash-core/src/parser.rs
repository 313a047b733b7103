//! CSV ingestion for hardware hash exports
//!
//! Exports from different tools disagree on whether a header line is
//! present and which delimiter is used. A file is read once into memory,
//! its dialect is sniffed, and it is parsed first assuming a header row and
//! then, if that yields no data, as headerless rows with synthesized
//! `Column1..ColumnN` names.

use crate::dialect::{self, Dialect};
use crate::error::{Error, Result};
use crate::scanner::SourceFile;
use crate::table::{Row, Table};
use csv::StringRecord;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const BOM: char = '\u{feff}';

/// Result of ingesting one file
#[derive(Debug, Clone)]
pub enum IngestionOutcome {
    /// File parsed into rows and columns
    Success(Table),
    /// File could not be used; `reason` is for diagnostics only
    Failure { reason: String },
}

impl IngestionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, IngestionOutcome::Success(_))
    }
}

/// Ingest a discovered file, converting every error into a failure outcome
pub fn ingest(file: &SourceFile) -> IngestionOutcome {
    match parse_csv(&file.path) {
        Ok(table) => IngestionOutcome::Success(table),
        Err(e) => {
            warn!("skipping {}: {}", file.display_name(), e);
            IngestionOutcome::Failure {
                reason: e.to_string(),
            }
        }
    }
}

/// Read and parse a CSV file into a Table
pub fn parse_csv<P: AsRef<Path>>(path: P) -> Result<Table> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let content = String::from_utf8(bytes).map_err(|e| Error::Decode {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_text(&content, path)
}

/// Parse CSV from a string (useful for testing)
pub fn parse_csv_str(content: &str, source_name: &str) -> Result<Table> {
    parse_text(content, Path::new(source_name))
}

fn parse_text(content: &str, path: &Path) -> Result<Table> {
    let content = content.strip_prefix(BOM).unwrap_or(content);
    if content.trim().is_empty() {
        return Err(Error::EmptyFile(path.to_path_buf()));
    }

    let dialect = dialect::detect(content);
    debug!(
        "{}: using {} delimiter",
        path.display(),
        dialect.delimiter_name()
    );

    if let Some(table) = parse_with_header(content, dialect, path)? {
        if !table.rows.is_empty() {
            return Ok(table);
        }
        debug!(
            "{}: header row without data, re-reading as headerless",
            path.display()
        );
    }

    parse_headerless(content, dialect, path)?.ok_or_else(|| Error::NoRows(path.to_path_buf()))
}

/// Parse treating the first record as column names
///
/// Returns `None` when there is no header record at all. Values past the
/// header width are dropped; short rows simply lack the trailing columns.
fn parse_with_header(content: &str, dialect: Dialect, path: &Path) -> Result<Option<Table>> {
    let mut records = read_records(content, dialect, path)?.into_iter();

    let header = match records.next() {
        Some(header) if !header.is_empty() => header,
        _ => return Ok(None),
    };

    let names: Vec<String> = header.iter().map(str::to_string).collect();
    let rows = records
        .filter(|record| !record.is_empty())
        .map(|record| to_row(&names, &record))
        .collect();

    Ok(Some(Table {
        columns: unique(names),
        rows,
        headerless: false,
    }))
}

/// Parse treating every record as data, naming columns `Column1..ColumnN`
/// after the width of the first record
fn parse_headerless(content: &str, dialect: Dialect, path: &Path) -> Result<Option<Table>> {
    let records = read_records(content, dialect, path)?;

    let Some(first) = records.first() else {
        return Ok(None);
    };
    let names: Vec<String> = (1..=first.len()).map(|i| format!("Column{}", i)).collect();

    let rows: Vec<Row> = records
        .iter()
        .filter(|record| !record.is_empty())
        .map(|record| to_row(&names, record))
        .collect();

    if rows.is_empty() {
        return Ok(None);
    }

    Ok(Some(Table {
        columns: names,
        rows,
        headerless: true,
    }))
}

fn read_records(content: &str, dialect: Dialect, path: &Path) -> Result<Vec<StringRecord>> {
    dialect
        .reader(content)
        .records()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::Csv {
            path: PathBuf::from(path),
            source: e,
        })
}

fn to_row(names: &[String], record: &StringRecord) -> Row {
    names
        .iter()
        .zip(record.iter())
        .map(|(name, value)| (name.as_str(), value))
        .collect()
}

/// Drop repeated column names, keeping the first occurrence
fn unique(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_csv() {
        let csv = "Serial Number,Model\nABC123,Laptop\nXYZ999,Desktop";
        let table = parse_csv_str(csv, "test.csv").unwrap();

        assert_eq!(table.columns, vec!["Serial Number", "Model"]);
        assert!(!table.headerless);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].get("Serial Number"), Some("ABC123"));
        assert_eq!(table.rows[0].get("Model"), Some("Laptop"));
        assert_eq!(table.rows[1].get("Serial Number"), Some("XYZ999"));
        assert_eq!(table.rows[1].get("Model"), Some("Desktop"));
    }

    #[test]
    fn test_header_only_becomes_headerless_row() {
        let table = parse_csv_str("A,B,C", "test.csv").unwrap();

        assert!(table.headerless);
        assert_eq!(table.columns, vec!["Column1", "Column2", "Column3"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].get("Column1"), Some("A"));
        assert_eq!(table.rows[0].get("Column2"), Some("B"));
        assert_eq!(table.rows[0].get("Column3"), Some("C"));
    }

    #[test]
    fn test_ragged_rows_truncated_and_sparse() {
        let csv = "a,b\n1,2,3\n4\n";
        let table = parse_csv_str(csv, "test.csv").unwrap();

        assert_eq!(table.rows[0].len(), 2);
        assert_eq!(table.rows[0].get("b"), Some("2"));
        assert_eq!(table.rows[1].get("a"), Some("4"));
        assert_eq!(table.rows[1].get("b"), None);
    }

    #[test]
    fn test_empty_cells_are_kept() {
        let table = parse_csv_str("a,b\n,2\n", "test.csv").unwrap();
        assert_eq!(table.rows[0].get("a"), Some(""));
    }

    #[test]
    fn test_strips_byte_order_mark() {
        let csv = "\u{feff}Device Serial Number,Hardware Hash\nSN1,HASH1\n";
        let table = parse_csv_str(csv, "test.csv").unwrap();

        assert_eq!(table.columns[0], "Device Serial Number");
        assert_eq!(table.rows[0].get("Device Serial Number"), Some("SN1"));
    }

    #[test]
    fn test_semicolon_file() {
        let csv = "Serial Number;Model\nABC;Laptop\n";
        let table = parse_csv_str(csv, "test.csv").unwrap();
        assert_eq!(table.rows[0].get("Model"), Some("Laptop"));
    }

    #[test]
    fn test_empty_and_whitespace_fail() {
        assert!(matches!(
            parse_csv_str("", "test.csv"),
            Err(Error::EmptyFile(_))
        ));
        assert!(matches!(
            parse_csv_str(" \n\t\n", "test.csv"),
            Err(Error::EmptyFile(_))
        ));
        assert!(matches!(
            parse_csv_str("\u{feff}", "test.csv"),
            Err(Error::EmptyFile(_))
        ));
    }

    #[test]
    fn test_blank_lines_skipped() {
        let csv = "a,b\n\n1,2\n\n3,4\n";
        let table = parse_csv_str(csv, "test.csv").unwrap();
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn test_duplicate_header_names_collapse() {
        let table = parse_csv_str("a,a\n1,2\n", "test.csv").unwrap();
        assert_eq!(table.columns, vec!["a"]);
        assert_eq!(table.rows[0].get("a"), Some("2"));
    }

    #[test]
    fn test_ingest_missing_file_is_failure() {
        let file = SourceFile {
            path: PathBuf::from("/nonexistent/definitely/missing.csv"),
            index: 0,
        };
        assert!(!ingest(&file).is_success());
    }

    #[test]
    fn test_ingest_invalid_utf8_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, [0x61, 0x2c, 0xff, 0xfe, 0x0a]).unwrap();

        let outcome = ingest(&SourceFile { path, index: 0 });
        match outcome {
            IngestionOutcome::Failure { reason } => assert!(reason.contains("UTF-8")),
            IngestionOutcome::Success(_) => panic!("expected failure"),
        }
    }
}
