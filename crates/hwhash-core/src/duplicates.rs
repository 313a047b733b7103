//! Duplicate device detection over consolidated rows

use crate::merger::ConsolidatedDataset;
use crate::table::Row;
use std::collections::BTreeMap;

/// Column names checked for a device identifier, in priority order
pub const SERIAL_COLUMNS: &[&str] = &["Device Serial Number", "Serial Number", "DeviceSerialNumber"];

/// Device identifier of a row: the first non-empty serial column
pub fn device_identifier(row: &Row) -> Option<&str> {
    SERIAL_COLUMNS
        .iter()
        .filter_map(|column| row.get(column))
        .find(|value| !value.is_empty())
}

/// Identifiers seen more than once, with their occurrence counts, sorted by
/// identifier
pub fn duplicate_identifiers(dataset: &ConsolidatedDataset) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for id in dataset.rows.iter().filter_map(device_identifier) {
        *counts.entry(id).or_default() += 1;
    }

    counts
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .map(|(id, count)| (id.to_string(), count))
        .collect()
}

/// Number of rows beyond the first for every repeated identifier
///
/// Identifiers `[A, A, B, C, C, C]` give `(2 + 3) - 2 = 3`.
pub fn count_duplicates(dataset: &ConsolidatedDataset) -> usize {
    let duplicates = duplicate_identifiers(dataset);
    let occurrences: usize = duplicates.iter().map(|(_, count)| count).sum();
    occurrences - duplicates.len()
}
