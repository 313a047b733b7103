//! Hardware hash consolidator CLI
//!
//! Command-line tool for merging device hardware hash CSV exports into a
//! single upload-ready file.

mod reporter;

use clap::{Args, Parser, Subcommand};
use console::Term;
use dialoguer::{Confirm, Input};
use hwhash_core::{
    consolidate, discover_with, duplicate_identifiers, parse_csv, run, validate_directory,
    RunConfig, RunOutcome, ScanOptions,
};
use reporter::TerminalReporter;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Exit status for runs that end without producing output
const EXIT_NO_OUTPUT: i32 = 2;

#[derive(Parser)]
#[command(name = "hwhash")]
#[command(about = "Consolidate device hardware hash CSV exports", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ScanArgs {
    /// Directory containing the exports
    #[arg(short, long)]
    root: PathBuf,

    /// Include subdirectories
    #[arg(long)]
    recursive: bool,

    /// Input file extension
    #[arg(long, default_value = "csv")]
    ext: String,
}

impl ScanArgs {
    fn options(&self) -> ScanOptions {
        ScanOptions {
            recursive: self.recursive,
            extension: self.ext.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Merge all exports in a directory into one consolidated CSV
    Consolidate {
        /// Label used in the output file name (e.g. company name)
        #[arg(short, long)]
        label: Option<String>,

        /// Directory containing the exports
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Include subdirectories
        #[arg(long)]
        recursive: bool,

        /// Input file extension
        #[arg(long)]
        ext: Option<String>,

        /// Directory for the consolidated file (defaults to the root)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Print the run summary as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Load settings from a JSON config file; flags override it
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List the files a consolidation would read
    Scan(ScanArgs),

    /// Parse and display a single export
    Inspect {
        /// Path to CSV file
        #[arg(short, long)]
        file: PathBuf,

        /// Maximum number of rows to display
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// List serial numbers that appear more than once
    Duplicates(ScanArgs),

    /// Create a config file template
    CreateConfig {
        /// Output path for the config file
        #[arg(short, long)]
        output: PathBuf,

        /// Label to store in the template
        #[arg(short, long, default_value = "Contoso")]
        label: String,

        /// Root directory to store in the template
        #[arg(short, long, default_value = ".")]
        root: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run_command(cli.command) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "error" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_command(command: Commands) -> hwhash_core::Result<i32> {
    match command {
        Commands::Consolidate {
            label,
            root,
            recursive,
            ext,
            output_dir,
            yes,
            json,
            config,
        } => {
            let overrides = Overrides {
                label,
                root,
                recursive,
                ext,
                output_dir,
                yes,
            };
            cmd_consolidate(config.as_deref(), overrides, json)
        }
        Commands::Scan(args) => cmd_scan(&args),
        Commands::Inspect { file, limit } => cmd_inspect(&file, limit),
        Commands::Duplicates(args) => cmd_duplicates(&args),
        Commands::CreateConfig {
            output,
            label,
            root,
        } => cmd_create_config(&output, &label, &root),
    }
}

struct Overrides {
    label: Option<String>,
    root: Option<PathBuf>,
    recursive: bool,
    ext: Option<String>,
    output_dir: Option<PathBuf>,
    yes: bool,
}

fn cmd_consolidate(
    config_path: Option<&Path>,
    overrides: Overrides,
    json: bool,
) -> hwhash_core::Result<i32> {
    let interactive = Term::stdout().is_term() && !json;
    let mut reporter = TerminalReporter::new(json, interactive);
    reporter.banner();

    let config = build_config(config_path, overrides, interactive)?;
    debug!("run config: {:?}", config);

    let outcome = run(&config, &mut reporter)?;

    let code = match &outcome {
        RunOutcome::Completed(_) => 0,
        RunOutcome::Cancelled => {
            reporter.warning("Operation cancelled by user");
            0
        }
        RunOutcome::NoFiles => {
            reporter.error("No CSV files found in the specified directory");
            EXIT_NO_OUTPUT
        }
        RunOutcome::NoValidData(_) => {
            reporter.error("No valid data found in CSV files");
            EXIT_NO_OUTPUT
        }
        RunOutcome::ExportFailed { message, .. } => {
            reporter.error(format!("Failed to save file: {}", message));
            EXIT_NO_OUTPUT
        }
    };

    if json {
        if let Some(summary) = outcome.summary() {
            println!("{}", serde_json::to_string_pretty(summary)?);
        }
    }

    Ok(code)
}

/// Merge config file, flags and interactive prompts into a run config
fn build_config(
    config_path: Option<&Path>,
    overrides: Overrides,
    interactive: bool,
) -> hwhash_core::Result<RunConfig> {
    let loaded = config_path.map(RunConfig::load).transpose()?;
    let prompted_root = overrides.root.is_none() && loaded.is_none();

    let label = match overrides.label.or_else(|| loaded.as_ref().map(|c| c.label.clone())) {
        Some(label) => label,
        None if interactive => prompt_label()?,
        None => {
            return Err(hwhash_core::Error::InvalidConfig(
                "--label is required".to_string(),
            ))
        }
    };

    let root = match overrides.root.or_else(|| loaded.as_ref().map(|c| c.root.clone())) {
        Some(root) if interactive && validate_directory(&root).is_err() => {
            eprintln!("Directory '{}' does not exist or is invalid", root.display());
            prompt_directory()?
        }
        Some(root) => root,
        None if interactive => prompt_directory()?,
        None => {
            return Err(hwhash_core::Error::InvalidConfig(
                "--root is required".to_string(),
            ))
        }
    };

    let mut config = loaded.unwrap_or_else(|| RunConfig::new(label.clone(), root.clone()));
    config.label = label;
    config.root = root;

    if overrides.recursive {
        config.recursive = true;
    } else if prompted_root {
        config.recursive = Confirm::new()
            .with_prompt("Include subdirectories?")
            .default(false)
            .interact()
            .map_err(prompt_error)?;
    }
    if let Some(ext) = overrides.ext {
        config.extension = ext;
    }
    if overrides.output_dir.is_some() {
        config.output_dir = overrides.output_dir;
    }
    config.assume_yes |= overrides.yes;

    config.validate()?;
    Ok(config)
}

fn prompt_label() -> hwhash_core::Result<String> {
    Input::<String>::new()
        .with_prompt("Enter company name")
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("Company name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .map(|s| s.trim().to_string())
        .map_err(prompt_error)
}

fn prompt_directory() -> hwhash_core::Result<PathBuf> {
    Input::<String>::new()
        .with_prompt("Enter directory path containing CSV files")
        .validate_with(|input: &String| -> Result<(), &str> {
            validate_directory(input.trim())
                .map_err(|_| "Directory does not exist or is invalid")
        })
        .interact_text()
        .map(|s| PathBuf::from(s.trim()))
        .map_err(prompt_error)
}

fn prompt_error(e: dialoguer::Error) -> hwhash_core::Error {
    hwhash_core::Error::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        e.to_string(),
    ))
}

fn cmd_scan(args: &ScanArgs) -> hwhash_core::Result<i32> {
    validate_directory(&args.root)?;
    let files = discover_with(&args.root, &args.options());

    println!("Scanned {}:", args.root.display());
    println!("Found {} file(s)", files.len());
    println!();
    for file in &files {
        println!("  {}. {}", file.index + 1, file.path.display());
    }

    Ok(0)
}

fn cmd_inspect(file: &Path, limit: usize) -> hwhash_core::Result<i32> {
    let table = parse_csv(file)?;

    println!("File: {}", file.display());
    println!(
        "Header: {}",
        if table.headerless {
            "none (columns synthesized)"
        } else {
            "present"
        }
    );
    println!("Columns: {}", table.column_count());
    println!("Rows: {}", table.row_count());
    println!();

    println!("{}", table.columns.join("\t"));
    println!("{}", "-".repeat(table.columns.len() * 12));

    for row in table.rows.iter().take(limit) {
        let values: Vec<&str> = table
            .columns
            .iter()
            .map(|c| row.get(c).unwrap_or(""))
            .collect();
        println!("{}", values.join("\t"));
    }

    if table.row_count() > limit {
        println!("... ({} more rows)", table.row_count() - limit);
    }

    Ok(0)
}

fn cmd_duplicates(args: &ScanArgs) -> hwhash_core::Result<i32> {
    validate_directory(&args.root)?;
    let files = discover_with(&args.root, &args.options());
    let dataset = consolidate(&files);

    let duplicates = duplicate_identifiers(&dataset);
    if duplicates.is_empty() {
        println!(
            "No duplicate serial numbers in {} row(s) from {} file(s)",
            dataset.row_count(),
            dataset.processed_count
        );
        return Ok(0);
    }

    println!("Duplicate serial numbers ({}):", duplicates.len());
    println!();
    for (id, count) in &duplicates {
        println!("  {} ({} rows)", id, count);
    }
    println!();
    println!(
        "{} duplicate entries",
        hwhash_core::count_duplicates(&dataset)
    );

    Ok(0)
}

fn cmd_create_config(output: &Path, label: &str, root: &Path) -> hwhash_core::Result<i32> {
    let config = RunConfig::new(label, root);
    config.save(output)?;

    println!("Created config file: {}", output.display());
    println!();
    println!("Edit the file to configure your run, then run:");
    println!("  hwhash consolidate --config {}", output.display());

    Ok(0)
}
