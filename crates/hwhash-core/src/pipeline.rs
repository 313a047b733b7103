//! Orchestration of a consolidation run
//!
//! The run is strictly sequential: discover, confirm, ingest each file in
//! discovery order, count duplicates, export. Progress is relayed to a
//! [`Reporter`], which is also asked for confirmation and polled for
//! cancellation between files. Nothing is written until every file has
//! been ingested.

use crate::config::{validate_directory, RunConfig};
use crate::duplicates::count_duplicates;
use crate::error::Result;
use crate::export::{export, output_path};
use crate::merger::ConsolidatedDataset;
use crate::parser::{ingest, IngestionOutcome};
use crate::scanner::{discover_with, SourceFile};
use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Progress notifications sent to the presentation layer
#[derive(Debug, Clone)]
pub enum RunEvent<'a> {
    Started { label: &'a str, root: &'a Path },
    FilesDiscovered { files: &'a [SourceFile] },
    /// `position` is 1-based
    FileStarted {
        position: usize,
        total: usize,
        file: &'a SourceFile,
    },
    FileProcessed { file: &'a SourceFile, rows: usize },
    FileFailed { file: &'a SourceFile, reason: &'a str },
    ConsolidationFinished { dataset: &'a ConsolidatedDataset },
    DuplicatesFound { count: usize },
    Exporting { path: &'a Path },
    Finished { summary: &'a RunSummary },
}

/// Presentation collaborator for a run
pub trait Reporter {
    /// Receive a progress event
    fn event(&mut self, event: RunEvent<'_>);

    /// Confirmation point before ingestion starts; `false` cancels the run
    fn confirm(&mut self, _file_count: usize, _label: &str) -> bool {
        true
    }

    /// Polled between files; `true` stops the run before the next file
    fn cancel_requested(&mut self) -> bool {
        false
    }
}

/// Reporter that ignores every event and never cancels
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn event(&mut self, _event: RunEvent<'_>) {}
}

/// Counters describing a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub label: String,
    pub files_found: usize,
    pub processed: usize,
    pub total_rows: usize,
    pub errors: usize,
    pub error_files: Vec<String>,
    pub duplicates: usize,
    pub output_path: Option<PathBuf>,
}

impl RunSummary {
    fn from_dataset(label: &str, files_found: usize, dataset: &ConsolidatedDataset) -> Self {
        Self {
            label: label.to_string(),
            files_found,
            processed: dataset.processed_count,
            total_rows: dataset.row_count(),
            errors: dataset.error_count,
            error_files: dataset.error_files.clone(),
            duplicates: 0,
            output_path: None,
        }
    }
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Output written
    Completed(RunSummary),
    /// No matching files under the root
    NoFiles,
    /// Every file failed or yielded no rows
    NoValidData(RunSummary),
    /// Cancelled at the confirmation point or between files
    Cancelled,
    /// Consolidation succeeded but the output could not be written
    ExportFailed { message: String, summary: RunSummary },
}

impl RunOutcome {
    pub fn summary(&self) -> Option<&RunSummary> {
        match self {
            RunOutcome::Completed(summary)
            | RunOutcome::NoValidData(summary)
            | RunOutcome::ExportFailed { summary, .. } => Some(summary),
            RunOutcome::NoFiles | RunOutcome::Cancelled => None,
        }
    }
}

/// Run a consolidation stamped with the current local time
pub fn run(config: &RunConfig, reporter: &mut dyn Reporter) -> Result<RunOutcome> {
    run_at(config, Local::now().naive_local(), reporter)
}

/// Run a consolidation with an explicit output timestamp
///
/// Only an invalid configuration or root directory is returned as an
/// error; every other ending is a [`RunOutcome`].
pub fn run_at(
    config: &RunConfig,
    timestamp: NaiveDateTime,
    reporter: &mut dyn Reporter,
) -> Result<RunOutcome> {
    config.validate()?;
    validate_directory(&config.root)?;

    reporter.event(RunEvent::Started {
        label: &config.label,
        root: &config.root,
    });
    info!("scanning {}", config.root.display());

    let files = discover_with(&config.root, &config.scan_options());
    if files.is_empty() {
        info!("no .{} files found", config.extension);
        return Ok(RunOutcome::NoFiles);
    }
    reporter.event(RunEvent::FilesDiscovered { files: &files });

    if !config.assume_yes && !reporter.confirm(files.len(), &config.label) {
        info!("cancelled at confirmation");
        return Ok(RunOutcome::Cancelled);
    }

    let Some(dataset) = consolidate_with(&files, reporter) else {
        info!("cancelled during consolidation");
        return Ok(RunOutcome::Cancelled);
    };

    let mut summary = RunSummary::from_dataset(&config.label, files.len(), &dataset);
    if dataset.is_empty() {
        return Ok(RunOutcome::NoValidData(summary));
    }

    summary.duplicates = count_duplicates(&dataset);
    if summary.duplicates > 0 {
        reporter.event(RunEvent::DuplicatesFound {
            count: summary.duplicates,
        });
    }

    let path = output_path(config.output_dir(), &config.label, &timestamp);
    reporter.event(RunEvent::Exporting { path: &path });
    match export(&dataset, &path) {
        Ok(result) => {
            summary.output_path = Some(result.path);
            reporter.event(RunEvent::Finished { summary: &summary });
            Ok(RunOutcome::Completed(summary))
        }
        Err(e) => {
            warn!("export failed: {}", e);
            Ok(RunOutcome::ExportFailed {
                message: e.to_string(),
                summary,
            })
        }
    }
}

/// Ingest and aggregate `files` in order without reporting
pub fn consolidate(files: &[SourceFile]) -> ConsolidatedDataset {
    consolidate_with(files, &mut SilentReporter).unwrap_or_default()
}

/// Ingest and aggregate `files` in order, returning `None` if the reporter
/// cancels between files
pub fn consolidate_with(
    files: &[SourceFile],
    reporter: &mut dyn Reporter,
) -> Option<ConsolidatedDataset> {
    let mut dataset = ConsolidatedDataset::new();
    let total = files.len();

    for (i, file) in files.iter().enumerate() {
        if reporter.cancel_requested() {
            return None;
        }
        reporter.event(RunEvent::FileStarted {
            position: i + 1,
            total,
            file,
        });

        let outcome = ingest(file);
        match &outcome {
            IngestionOutcome::Success(table) => reporter.event(RunEvent::FileProcessed {
                file,
                rows: table.row_count(),
            }),
            IngestionOutcome::Failure { reason } => {
                reporter.event(RunEvent::FileFailed { file, reason })
            }
        }
        dataset.accumulate(file, outcome);
    }

    reporter.event(RunEvent::ConsolidationFinished { dataset: &dataset });
    info!(
        "consolidated {} row(s) from {} file(s), {} error(s)",
        dataset.row_count(),
        dataset.processed_count,
        dataset.error_count
    );
    Some(dataset)
}
