use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use hwhash_core::{
    consolidate, discover, parse_csv, run_at, RunConfig, RunOutcome, SilentReporter,
};

fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn fixed_time() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 30)
        .unwrap()
        .and_hms_opt(14, 45, 12)
        .unwrap()
}

fn seed_exports(dir: &Path) {
    write(
        dir,
        "01_site_a.csv",
        "\u{feff}Device Serial Number,Windows Product ID,Hardware Hash\nSN-1,,HASH1\nSN-2,,HASH2\n",
    );
    write(dir, "02_site_b.csv", "Serial Number;Model\nSN-3;Laptop\n");
    write(dir, "03_headerless.csv", "SN-1,PKID,HASH9");
    write(dir, "04_empty.csv", "   \n");
    write(dir, "nested/05_deep.csv", "Device Serial Number,Group Tag\nSN-2,Sales\n");
}

#[test]
fn row_count_is_sum_of_ingested_files() {
    let dir = tempfile::tempdir().unwrap();
    seed_exports(dir.path());

    let files = discover(dir.path(), true);
    let expected: usize = files
        .iter()
        .filter_map(|f| parse_csv(&f.path).ok())
        .map(|t| t.row_count())
        .sum();

    let dataset = consolidate(&files);
    assert_eq!(dataset.row_count(), expected);
    assert_eq!(dataset.row_count(), 5);
    assert_eq!(dataset.rows[0].get("Device Serial Number"), Some("SN-1"));
    assert_eq!(dataset.rows[2].get("Serial Number"), Some("SN-3"));
    assert_eq!(dataset.rows[3].get("Column1"), Some("SN-1"));
}

#[test]
fn column_set_is_union_of_successful_files() {
    let dir = tempfile::tempdir().unwrap();
    seed_exports(dir.path());

    let dataset = consolidate(&discover(dir.path(), false));
    let expected: BTreeSet<String> = [
        "Column1",
        "Column2",
        "Column3",
        "Device Serial Number",
        "Hardware Hash",
        "Model",
        "Serial Number",
        "Windows Product ID",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    assert_eq!(dataset.columns, expected);
    assert_eq!(dataset.error_files, vec!["04_empty.csv"]);
    for row in &dataset.rows {
        assert!(row.columns().all(|c| dataset.columns.contains(c)));
    }
}

#[test]
fn non_recursive_discovery_is_subset_of_recursive() {
    let dir = tempfile::tempdir().unwrap();
    seed_exports(dir.path());

    let shallow: BTreeSet<_> = discover(dir.path(), false)
        .into_iter()
        .map(|f| f.path)
        .collect();
    let deep: BTreeSet<_> = discover(dir.path(), true)
        .into_iter()
        .map(|f| f.path)
        .collect();

    assert_eq!(shallow.len(), 4);
    assert_eq!(deep.len(), 5);
    assert!(shallow.is_subset(&deep));
    assert!(shallow.iter().all(|p| p.parent() == Some(dir.path())));
}

#[test]
fn full_run_writes_sorted_bom_prefixed_output() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.csv", "Serial Number,Model\nABC123,Laptop\nXYZ999,Desktop");
    write(dir.path(), "b.csv", "Serial Number,Asset\nABC123,42\n");

    let config = RunConfig::new("Contoso Ltd.", dir.path());
    let outcome = run_at(&config, fixed_time(), &mut SilentReporter).unwrap();

    let summary = match outcome {
        RunOutcome::Completed(summary) => summary,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.total_rows, 3);
    assert_eq!(summary.duplicates, 1);

    let path = summary.output_path.unwrap();
    assert_eq!(
        path,
        dir.path()
            .join("Contoso_Ltd_ConsolidatedHardwareHashes_2025-06-30_1445.csv")
    );
    let written = fs::read_to_string(&path).unwrap();
    assert_eq!(
        written,
        "\u{feff}Asset,Model,Serial Number\r\n,Laptop,ABC123\r\n,Desktop,XYZ999\r\n42,,ABC123\r\n"
    );
}

#[test]
fn rerun_with_fixed_timestamp_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    seed_exports(dir.path());

    let mut config = RunConfig::new("Fabrikam", dir.path());
    config.recursive = true;
    config.output_dir = Some(out.path().to_path_buf());

    let first = run_at(&config, fixed_time(), &mut SilentReporter).unwrap();
    let first_path = first.summary().unwrap().output_path.clone().unwrap();
    let first_bytes = fs::read(&first_path).unwrap();

    let second = run_at(&config, fixed_time(), &mut SilentReporter).unwrap();
    let second_bytes = fs::read(second.summary().unwrap().output_path.as_ref().unwrap()).unwrap();

    assert_eq!(first_bytes, second_bytes);
}

#[test]
fn empty_directory_reports_no_files() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "notes.txt", "not a csv");

    let config = RunConfig::new("Contoso", dir.path());
    let outcome = run_at(&config, fixed_time(), &mut SilentReporter).unwrap();
    assert_eq!(outcome, RunOutcome::NoFiles);
}

#[test]
fn all_failed_files_report_no_valid_data() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.csv", "");
    write(dir.path(), "b.csv", "\n\n");

    let config = RunConfig::new("Contoso", dir.path());
    let outcome = run_at(&config, fixed_time(), &mut SilentReporter).unwrap();

    match outcome {
        RunOutcome::NoValidData(summary) => {
            assert_eq!(summary.errors, 2);
            assert_eq!(summary.error_files, vec!["a.csv", "b.csv"]);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
}

#[test]
fn unwritable_output_reports_export_failure() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.csv", "a,b\n1,2\n");

    let mut config = RunConfig::new("Contoso", dir.path());
    config.output_dir = Some(dir.path().join("does-not-exist"));
    let outcome = run_at(&config, fixed_time(), &mut SilentReporter).unwrap();

    match outcome {
        RunOutcome::ExportFailed { summary, .. } => assert_eq!(summary.total_rows, 1),
        other => panic!("unexpected outcome: {:?}", other),
    }
}
