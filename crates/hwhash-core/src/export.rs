//! Export of the consolidated dataset
//!
//! Output is UTF-8 with a leading byte-order mark, CRLF line endings and
//! the sorted union of all column names as the header. A failed write may
//! leave a partially written file behind; it is not removed.

use crate::error::{Error, Result};
use crate::merger::ConsolidatedDataset;
use chrono::NaiveDateTime;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

const BOM: &[u8] = "\u{feff}".as_bytes();

/// Fixed part of every output file name
pub const OUTPUT_MARKER: &str = "ConsolidatedHardwareHashes";

/// Summary of a completed export
#[derive(Debug, Clone)]
pub struct ExportResult {
    pub path: PathBuf,
    pub rows_written: usize,
    pub columns_written: usize,
}

/// Make a free-text label safe for use in a file name
///
/// Keeps alphanumerics, spaces, hyphens and underscores, then turns spaces
/// into underscores.
pub fn sanitize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect()
}

/// `{label}_ConsolidatedHardwareHashes_{YYYY-MM-DD_HHMM}.csv`
pub fn output_file_name(label: &str, timestamp: &NaiveDateTime) -> String {
    format!(
        "{}_{}_{}.csv",
        sanitize_label(label),
        OUTPUT_MARKER,
        timestamp.format("%Y-%m-%d_%H%M")
    )
}

/// Full output path inside `dir`
pub fn output_path<P: AsRef<Path>>(dir: P, label: &str, timestamp: &NaiveDateTime) -> PathBuf {
    dir.as_ref().join(output_file_name(label, timestamp))
}

/// Check that every row only uses columns from the dataset's column set
pub fn check_schema(dataset: &ConsolidatedDataset) -> Result<()> {
    for (row_idx, row) in dataset.rows.iter().enumerate() {
        if let Some(column) = row.columns().find(|c| !dataset.columns.contains(*c)) {
            return Err(Error::SchemaViolation {
                row: row_idx,
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

/// Serialize the dataset into memory
pub fn to_csv_bytes(dataset: &ConsolidatedDataset) -> Result<Vec<u8>> {
    check_schema(dataset)?;
    let mut buffer = Vec::new();
    write_csv(dataset, &mut buffer).map_err(|e| Error::Export {
        path: PathBuf::from("<memory>"),
        message: e.to_string(),
    })?;
    Ok(buffer)
}

/// Write the dataset to `path`, replacing any existing file
pub fn export<P: AsRef<Path>>(dataset: &ConsolidatedDataset, path: P) -> Result<ExportResult> {
    let path = path.as_ref();
    check_schema(dataset)?;

    let export_error = |message: String| Error::Export {
        path: path.to_path_buf(),
        message,
    };

    let file = File::create(path).map_err(|e| export_error(e.to_string()))?;
    let mut writer = BufWriter::new(file);
    write_csv(dataset, &mut writer).map_err(|e| export_error(e.to_string()))?;
    writer.flush().map_err(|e| export_error(e.to_string()))?;

    info!(
        "wrote {} row(s) to {}",
        dataset.row_count(),
        path.display()
    );

    Ok(ExportResult {
        path: path.to_path_buf(),
        rows_written: dataset.row_count(),
        columns_written: dataset.columns.len(),
    })
}

fn write_csv<W: Write>(dataset: &ConsolidatedDataset, mut out: W) -> std::result::Result<(), csv::Error> {
    out.write_all(BOM)?;

    let columns = dataset.sorted_columns();
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(out);

    writer.write_record(&columns)?;
    for row in &dataset.rows {
        writer.write_record(columns.iter().map(|c| row.get(c).unwrap_or("")))?;
    }
    writer.flush()?;
    Ok(())
}
