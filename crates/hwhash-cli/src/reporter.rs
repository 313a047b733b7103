//! Terminal rendering of run events

use chrono::Local;
use console::{style, StyledObject, Term};
use dialoguer::Confirm;
use hwhash_core::{Reporter, RunEvent, RunSummary, SourceFile};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

const PREVIEW_LIMIT: usize = 5;
const PREVIEW_HEAD: usize = 3;
const NAME_WIDTH: usize = 30;

#[derive(Clone, Copy)]
enum Status {
    Success,
    Error,
    Warning,
    Process,
}

/// Renders run progress with colored status lines and a progress bar
pub struct TerminalReporter {
    term: Term,
    interactive: bool,
    progress: Option<ProgressBar>,
    banner_shown: bool,
}

impl TerminalReporter {
    /// `quiet_stdout` routes all output to stderr so stdout stays clean
    /// for machine-readable output
    pub fn new(quiet_stdout: bool, interactive: bool) -> Self {
        let term = if quiet_stdout {
            Term::stderr()
        } else {
            Term::stdout()
        };
        Self {
            term,
            interactive,
            progress: None,
            banner_shown: false,
        }
    }

    fn line(&self, text: impl AsRef<str>) {
        if let Err(e) = self.term.write_line(text.as_ref()) {
            debug!("terminal write failed: {}", e);
        }
    }

    fn status(&self, message: impl AsRef<str>, kind: Status) {
        let icon_and_text = |icon: &str| format!("{} {}", icon, message.as_ref());
        let styled: StyledObject<String> = match kind {
            Status::Success => style(icon_and_text("✓")).green(),
            Status::Error => style(icon_and_text("✗")).red(),
            Status::Warning => style(icon_and_text("⚠")).yellow(),
            Status::Process => style(icon_and_text("◆")).cyan(),
        };
        self.line(format!("  [{}] {}", Local::now().format("%H:%M:%S"), styled));
    }

    pub fn success(&self, message: impl AsRef<str>) {
        self.status(message, Status::Success);
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.status(message, Status::Error);
    }

    pub fn warning(&self, message: impl AsRef<str>) {
        self.status(message, Status::Warning);
    }

    /// Draw the welcome banner once, before any prompt
    pub fn banner(&mut self) {
        if self.banner_shown {
            return;
        }
        self.banner_shown = true;
        self.draw_banner("HARDWARE HASH CONSOLIDATOR", "Merge device export files");
    }

    fn draw_banner(&self, title: &str, subtitle: &str) {
        self.line("");
        self.line(style("  ╔═══════════════════════════════════════════╗").cyan().to_string());
        self.line(style(format!("  ║   {:<40}║", title)).cyan().to_string());
        self.line(style(format!("  ║   {:<40}║", subtitle)).cyan().to_string());
        self.line(style("  ╚═══════════════════════════════════════════╝").cyan().to_string());
        self.line("");
    }

    fn preview_files(&self, files: &[SourceFile]) {
        if files.len() <= PREVIEW_LIMIT {
            for file in files {
                self.line(format!("    • {}", file.display_name()));
            }
        } else {
            for file in &files[..PREVIEW_HEAD] {
                self.line(format!("    • {}", file.display_name()));
            }
            self.line(format!("    ... and {} more", files.len() - PREVIEW_HEAD));
        }
    }

    fn preview_errors(&self, names: &[String]) {
        for name in names.iter().take(PREVIEW_LIMIT) {
            self.line(format!("    - {}", name));
        }
        if names.len() > PREVIEW_LIMIT {
            self.line(format!("    ... and {} more", names.len() - PREVIEW_LIMIT));
        }
    }

    fn start_progress(&mut self, total: usize) {
        let style = ProgressStyle::with_template("  Processing: [{bar:50.cyan}] {percent}% - {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("= ");
        self.progress = Some(ProgressBar::new(total as u64).with_style(style));
    }

    fn summary(&self, summary: &RunSummary) {
        self.line("");
        self.line(style("  ╔═══════════════════════════════════════════╗").green().to_string());
        self.line(style("  ║           CONSOLIDATION COMPLETE          ║").green().to_string());
        self.line(style("  ╚═══════════════════════════════════════════╝").green().to_string());
        self.line("");
        self.success(format!("Files processed: {}", summary.processed));
        self.success(format!("Total entries: {}", summary.total_rows));
        if summary.errors > 0 {
            self.warning(format!("Files with errors: {}", summary.errors));
        }
        if let Some(path) = &summary.output_path {
            self.line("");
            self.line(format!("  {}", style("Output saved to:").white()));
            self.line(format!("  {}", style(path.display()).cyan()));
        }
    }
}

impl Reporter for TerminalReporter {
    fn event(&mut self, event: RunEvent<'_>) {
        match event {
            RunEvent::Started { .. } => {
                self.banner();
                self.status("Scanning for CSV files...", Status::Process);
            }
            RunEvent::FilesDiscovered { files } => {
                self.success(format!("Found {} CSV file(s)", files.len()));
                self.preview_files(files);
            }
            RunEvent::FileStarted {
                position,
                total,
                file,
            } => {
                if position == 1 {
                    self.line("");
                    self.status("Starting consolidation process...", Status::Process);
                    self.start_progress(total);
                }
                if let Some(progress) = &self.progress {
                    progress.set_message(truncate_name(&file.display_name()));
                }
            }
            RunEvent::FileProcessed { .. } | RunEvent::FileFailed { .. } => {
                if let Some(progress) = &self.progress {
                    progress.inc(1);
                }
            }
            RunEvent::ConsolidationFinished { dataset } => {
                if let Some(progress) = self.progress.take() {
                    progress.finish();
                }
                self.line("");
                if !dataset.error_files.is_empty() {
                    self.warning(format!(
                        "Failed to process {} file(s):",
                        dataset.error_files.len()
                    ));
                    self.preview_errors(&dataset.error_files);
                }
            }
            RunEvent::DuplicatesFound { count } => {
                self.warning(format!("Found {} duplicate serial number(s)", count));
            }
            RunEvent::Exporting { .. } => {
                self.status("Saving consolidated file...", Status::Process);
            }
            RunEvent::Finished { summary } => self.summary(summary),
        }
    }

    fn confirm(&mut self, file_count: usize, label: &str) -> bool {
        if !self.interactive {
            return true;
        }
        self.line("");
        self.line(format!(
            "  {}",
            style(format!(
                "Ready to consolidate {} CSV files for {}",
                file_count, label
            ))
            .yellow()
        ));
        Confirm::new()
            .with_prompt("  Continue?")
            .default(true)
            .interact()
            .unwrap_or(false)
    }
}

fn truncate_name(name: &str) -> String {
    if name.chars().count() > NAME_WIDTH {
        let head: String = name.chars().take(NAME_WIDTH).collect();
        format!("{}...", head)
    } else {
        name.to_string()
    }
}
