//! Command-line interface module for clean-folder.
//!
//! This module handles:
//! - Argument parsing
//! - Building the run configuration
//! - Preparing the target folder
//! - Running the scan and printing the summary

use crate::config::{Mode, RunConfig};
use crate::output::OutputFormatter;
use crate::scanner::{ScanReport, Scanner};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

/// Sort a folder into images, video, documents, audio, archive and unknown.
///
/// With one folder the files are moved in place and emptied subfolders are
/// removed. With two folders the target is recreated and files are copied.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "clean-folder", version, about)]
pub struct Args {
    /// Folder to organize [default: ./test-in]
    pub source: Option<PathBuf>,

    /// Folder to organize into; recreated when it differs from the source
    /// [default: the source, or ./test-out when no source is given]
    pub target: Option<PathBuf>,

    /// Further paths are accepted and ignored
    #[arg(hide = true)]
    pub ignored: Vec<PathBuf>,

    /// Print the summary as JSON (implies --quiet)
    #[arg(long)]
    pub json: bool,

    /// Do not print a line for every processed entry
    #[arg(short, long)]
    pub quiet: bool,
}

/// Runs the CLI application with the parsed arguments.
///
/// Per-file failures never make this return an error; only problems that
/// stop the run from starting do (unresolvable paths, a target that cannot be
/// recreated).
///
/// # Examples
///
/// ```no_run
/// use clean_folder::cli::{run_cli, Args};
/// use std::path::PathBuf;
///
/// let args = Args {
///     source: Some(PathBuf::from("/home/user/Downloads")),
///     ..Args::default()
/// };
/// if let Err(e) = run_cli(&args) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli(args: &Args) -> Result<(), String> {
    let config = RunConfig::from_args(args.source.as_deref(), args.target.as_deref())
        .map_err(|e| format!("Error: {}", e))?;
    let quiet = args.quiet || args.json;

    if !quiet {
        OutputFormatter::info(&format!(
            "Processing the source folder '{}'",
            config.source.display()
        ));
        OutputFormatter::info(&format!(
            "... into the target folder   '{}'",
            config.target.display()
        ));
    }

    if config.mode == Mode::Copy {
        recreate_target(&config.target)?;
        if !quiet {
            OutputFormatter::info(
                "... the target folder is re-created and the source content will be COPIED",
            );
        }
    } else if !quiet {
        OutputFormatter::info("... the source content will be MOVED into itself");
    }

    let report = organize(&config, !quiet);

    if args.json {
        let json = serde_json::to_string_pretty(&report.result)
            .map_err(|e| format!("Error serializing summary: {}", e))?;
        println!("{}", json);
    } else {
        OutputFormatter::summary(&report.result);
        if !report.failures.is_empty() {
            OutputFormatter::warning(&format!(
                "{} {} could not be handled, see errors above",
                report.failures.len(),
                if report.failures.len() == 1 {
                    "entry"
                } else {
                    "entries"
                }
            ));
        }
    }

    Ok(())
}

/// Scans the configured source folder into the target layout.
///
/// The target folder is expected to exist; see [`recreate_target`] for copy
/// mode.
pub fn organize(config: &RunConfig, verbose: bool) -> ScanReport {
    let progress = if verbose {
        OutputFormatter::create_spinner()
    } else {
        indicatif::ProgressBar::hidden()
    };
    Scanner::new(config)
        .with_progress(progress)
        .verbose(verbose)
        .scan(&config.source)
}

/// Deletes the target folder if present and creates it again, empty.
pub fn recreate_target(target: &Path) -> Result<(), String> {
    // A missing target is fine; anything else surfaces in create_dir_all.
    let _ = fs::remove_dir_all(target);
    fs::create_dir_all(target)
        .map_err(|e| format!("Error creating target folder {}: {}", target.display(), e))
}
