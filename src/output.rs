//! Output formatting and styling module.
//!
//! Every line the organizer prints goes through [`OutputFormatter`], so styling
//! stays consistent between the per-entry log and the final summary.

use crate::scanner::ProcessingResult;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::error::Error;

/// Manages all CLI output with consistent styling and formatting.
///
/// - Success messages (green with ✓)
/// - Error messages (red with ✗, on stderr)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - A spinner ticking once per scanned entry
/// - The summary of handled files
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use clean_folder::output::OutputFormatter;
    /// OutputFormatter::error("Failed to organize file");
    /// ```
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints an error followed by each error in its `source()` chain.
    pub fn error_chain(error: &dyn Error) {
        Self::error(&error.to_string());
        let mut source = error.source();
        while let Some(cause) = source {
            eprintln!("    {} {}", "caused by:".red(), cause);
            source = cause.source();
        }
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a spinner that counts scanned entries.
    ///
    /// Lines printed while the spinner is active should go through
    /// [`ProgressBar::suspend`] so they do not tear the spinner line.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use clean_folder::output::OutputFormatter;
    /// let pb = OutputFormatter::create_spinner();
    /// pb.suspend(|| OutputFormatter::plain("- processing 'a.txt'"));
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_spinner() -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {pos} entries scanned {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb
    }

    /// Renders the summary rows: one line per category, sorted by name, each
    /// with its extension breakdown sorted by extension.
    ///
    /// # Example
    ///
    /// ```
    /// use clean_folder::file_category::Category;
    /// use clean_folder::output::OutputFormatter;
    /// use clean_folder::scanner::ProcessingResult;
    ///
    /// let mut result = ProcessingResult::default();
    /// result.record(Category::Images, ".jpg");
    /// let rows = OutputFormatter::summary_rows(&result);
    /// assert_eq!(rows, vec!["    images:   1 file  --> .jpg: 1"]);
    /// ```
    pub fn summary_rows(result: &ProcessingResult) -> Vec<String> {
        result
            .iter()
            .map(|(category, extensions)| {
                let total: usize = extensions.values().sum();
                let breakdown = extensions
                    .iter()
                    .map(|(ext, count)| {
                        let ext = if ext.is_empty() { "(none)" } else { ext.as_str() };
                        format!("{}: {}", ext, count)
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "{:>10}: {:>3} {} --> {}",
                    category,
                    total,
                    if total == 1 { "file " } else { "files" },
                    breakdown
                )
            })
            .collect()
    }

    /// Prints the summary of a run, or a notice when nothing was handled.
    pub fn summary(result: &ProcessingResult) {
        if result.is_empty() {
            Self::header("No files were handled (maybe because of errors - see above)");
            return;
        }

        Self::header("The result of processing:");
        for row in Self::summary_rows(result) {
            println!("{}", row);
        }
        let total = result.total_files();
        println!(
            "{:>10}: {} {}",
            "total".bold(),
            total.to_string().green().bold(),
            if total == 1 { "file" } else { "files" }
        );
    }
}
