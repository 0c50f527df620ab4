//! Recursive scanning of the source tree.
//!
//! The walk is an explicit post-order traversal: a directory's children are
//! listed once, before anything in it is touched, and pushed onto a work
//! stack together with a `RemoveDir` step that only runs after the child's
//! whole subtree has been handled. Reserved output folders are never entered.

use crate::config::RunConfig;
use crate::file_category::{Category, FileMapper, is_reserved_dir_name};
use crate::file_organizer::{Action, FileOrganizer, Operation, OrganizeError};
use crate::output::OutputFormatter;
use indicatif::ProgressBar;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Per-category, per-extension counts of handled files.
///
/// Both levels are ordered, so iteration (and the JSON form) is sorted by
/// category name and then by extension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProcessingResult {
    counts: BTreeMap<String, BTreeMap<String, usize>>,
}

impl ProcessingResult {
    /// Counts one handled file.
    pub fn record(&mut self, category: Category, extension: &str) {
        *self
            .counts
            .entry(category.dir_name().to_string())
            .or_default()
            .entry(extension.to_string())
            .or_insert(0) += 1;
    }

    pub fn count(&self, category: Category, extension: &str) -> usize {
        self.counts
            .get(category.dir_name())
            .and_then(|extensions| extensions.get(extension))
            .copied()
            .unwrap_or(0)
    }

    pub fn category_total(&self, category: Category) -> usize {
        self.counts
            .get(category.dir_name())
            .map_or(0, |extensions| extensions.values().sum())
    }

    pub fn total_files(&self) -> usize {
        self.counts
            .values()
            .flat_map(|extensions| extensions.values())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeMap<String, usize>)> {
        self.counts.iter()
    }
}

/// What happened to a single visited entry.
#[derive(Debug)]
pub enum EntryOutcome {
    /// A file was placed into the target layout.
    Handled(Operation),
    /// A folder was opened and its children queued.
    Descended,
    /// A reserved or target folder was left alone.
    Skipped,
    Failed(OrganizeError),
}

/// An entry that could not be handled.
#[derive(Debug)]
pub struct ScanFailure {
    pub path: PathBuf,
    pub error: OrganizeError,
}

/// Everything a scan produced.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub result: ProcessingResult,
    pub failures: Vec<ScanFailure>,
    /// Folders removed after being emptied (move mode only).
    pub removed_dirs: usize,
}

enum Step {
    Visit(PathBuf),
    RemoveDir(PathBuf),
}

struct Child {
    path: PathBuf,
    is_dir: bool,
}

/// Walks a source tree and hands every file to [`FileOrganizer`].
pub struct Scanner<'a> {
    config: &'a RunConfig,
    mapper: FileMapper,
    progress: ProgressBar,
    verbose: bool,
}

impl<'a> Scanner<'a> {
    /// Creates a silent scanner. Failures are still printed.
    pub fn new(config: &'a RunConfig) -> Self {
        Self {
            config,
            mapper: FileMapper::default(),
            progress: ProgressBar::hidden(),
            verbose: false,
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Prints one line per visited entry when enabled.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Scans `root` depth-first and returns the accumulated report.
    ///
    /// The root itself is never removed, even in move mode.
    pub fn scan(&self, root: &Path) -> ScanReport {
        let mut report = ScanReport::default();
        let mut stack = vec![Step::Visit(root.to_path_buf())];

        while let Some(step) = stack.pop() {
            match step {
                Step::Visit(path) => {
                    self.progress.inc(1);
                    self.progress.set_message(path.display().to_string());
                    match self.visit(&path, &mut stack) {
                        EntryOutcome::Handled(op) => report.result.record(op.category, &op.extension),
                        EntryOutcome::Descended | EntryOutcome::Skipped => {}
                        EntryOutcome::Failed(error) => {
                            self.progress.suspend(|| OutputFormatter::error_chain(&error));
                            report.failures.push(ScanFailure { path, error });
                        }
                    }
                }
                Step::RemoveDir(path) => {
                    if self.remove_dir(&path) {
                        report.removed_dirs += 1;
                    }
                }
            }
        }

        self.progress.finish_and_clear();
        report
    }

    fn visit(&self, path: &Path, stack: &mut Vec<Step>) -> EntryOutcome {
        // Links are handled as files and never followed.
        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return EntryOutcome::Failed(OrganizeError::MissingPath {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => {
                return EntryOutcome::Failed(OrganizeError::MetadataFailed {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };

        if metadata.is_dir() {
            self.visit_dir(path, stack)
        } else {
            self.visit_file(path)
        }
    }

    fn visit_dir(&self, path: &Path, stack: &mut Vec<Step>) -> EntryOutcome {
        if is_reserved(path) {
            self.log(|| {
                OutputFormatter::plain(&format!(
                    "- skipping '{}': reserved folder name",
                    path.display()
                ))
            });
            return EntryOutcome::Skipped;
        }
        if path != self.config.source && path == self.config.target {
            self.log(|| {
                OutputFormatter::plain(&format!(
                    "- skipping '{}': target folder",
                    path.display()
                ))
            });
            return EntryOutcome::Skipped;
        }

        let children = match read_children(path) {
            Ok(children) => children,
            Err(e) => {
                return EntryOutcome::Failed(OrganizeError::DirectoryReadFailed {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };
        self.log(|| OutputFormatter::info(&format!("- processing folder '{}'", path.display())));

        // Pushed in reverse so children pop in name order.
        for child in children.into_iter().rev() {
            if child.is_dir && self.config.is_move() && !is_reserved(&child.path) {
                stack.push(Step::RemoveDir(child.path.clone()));
            }
            stack.push(Step::Visit(child.path));
        }
        EntryOutcome::Descended
    }

    fn visit_file(&self, path: &Path) -> EntryOutcome {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        let category = self.mapper.categorize(&name);

        match FileOrganizer::handle_file(self.config, path, category) {
            Ok(op) => {
                self.log(|| OutputFormatter::success(&self.describe(&op)));
                EntryOutcome::Handled(op)
            }
            Err(e) => EntryOutcome::Failed(e),
        }
    }

    /// Removes an emptied folder with whatever is left in it. Folders that
    /// still hold a reserved folder somewhere below are kept. Errors are
    /// ignored.
    fn remove_dir(&self, path: &Path) -> bool {
        if !path.exists() {
            return false;
        }
        if contains_reserved_dir(path) {
            self.log(|| {
                OutputFormatter::warning(&format!(
                    "- keeping folder '{}': it contains a reserved folder",
                    path.display()
                ))
            });
            return false;
        }
        self.log(|| OutputFormatter::plain(&format!("- removing folder '{}'", path.display())));
        fs::remove_dir_all(path).is_ok()
    }

    fn describe(&self, op: &Operation) -> String {
        let shown = op
            .new_path
            .strip_prefix(&self.config.target)
            .unwrap_or(&op.new_path);
        match op.action {
            Action::Moved => format!(
                "- '{}' as {} -> '{}' (moving)",
                op.original_path.display(),
                op.category,
                shown.display()
            ),
            Action::Copied => format!(
                "- '{}' as {} -> '{}' (copying)",
                op.original_path.display(),
                op.category,
                shown.display()
            ),
            Action::Unpacked(format) => format!(
                "- '{}' unpacked as {} into '{}'",
                op.original_path.display(),
                format,
                shown.display()
            ),
        }
    }

    fn log(&self, print: impl FnOnce()) {
        if self.verbose {
            self.progress.suspend(print);
        }
    }
}

fn is_reserved(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| is_reserved_dir_name(&name.to_string_lossy()))
}

/// Lists a directory's entries sorted by path, without following links.
fn read_children(dir: &Path) -> io::Result<Vec<Child>> {
    let mut children: Vec<Child> = fs::read_dir(dir)?
        .flatten()
        .map(|entry| Child {
            is_dir: entry.file_type().is_ok_and(|t| t.is_dir()),
            path: entry.path(),
        })
        .collect();
    children.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(children)
}

fn contains_reserved_dir(dir: &Path) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };
    entries.flatten().any(|entry| {
        entry.file_type().is_ok_and(|t| t.is_dir())
            && (is_reserved_dir_name(&entry.file_name().to_string_lossy())
                || contains_reserved_dir(&entry.path()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn move_config(root: &Path) -> RunConfig {
        RunConfig::new(root.to_path_buf(), root.to_path_buf())
    }

    fn write(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_record_and_totals() {
        let mut result = ProcessingResult::default();
        result.record(Category::Images, ".jpg");
        result.record(Category::Images, ".jpg");
        result.record(Category::Images, ".png");
        result.record(Category::Audio, ".mp3");

        assert_eq!(result.count(Category::Images, ".jpg"), 2);
        assert_eq!(result.count(Category::Video, ".mp4"), 0);
        assert_eq!(result.category_total(Category::Images), 3);
        assert_eq!(result.total_files(), 4);
        let categories: Vec<_> = result.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(categories, vec!["audio", "images"]);
    }

    #[test]
    fn test_result_serializes_as_nested_object() {
        let mut result = ProcessingResult::default();
        result.record(Category::Unknown, ".xyz");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json, serde_json::json!({ "unknown": { ".xyz": 1 } }));
    }

    #[test]
    fn test_missing_root_is_reported_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");
        let config = move_config(&missing);

        let report = Scanner::new(&config).scan(&missing);

        assert!(report.result.is_empty());
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            report.failures[0].error,
            OrganizeError::MissingPath { .. }
        ));
    }

    #[test]
    fn test_nested_files_are_collected_and_folders_removed() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(&root.join("a").join("b").join("clip.MP4"), "v");
        write(&root.join("a").join("song.mp3"), "s");
        write(&root.join("top.txt"), "t");
        let config = move_config(root);

        let report = Scanner::new(&config).scan(root);

        assert!(report.failures.is_empty());
        assert_eq!(report.result.count(Category::Video, ".mp4"), 1);
        assert_eq!(report.result.count(Category::Audio, ".mp3"), 1);
        assert_eq!(report.result.count(Category::Documents, ".txt"), 1);
        assert!(root.join("video").join("clip.mp4").exists());
        assert!(!root.join("a").exists());
        assert_eq!(report.removed_dirs, 2);
    }

    #[test]
    fn test_reserved_folders_are_not_entered_or_removed() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(&root.join("images").join("Raw Photo.JPG"), "i");
        write(&root.join("Archive").join("old.zip"), "not really a zip");
        write(&root.join("UNKNOWN").join("thing.xyz"), "u");
        let config = move_config(root);

        let report = Scanner::new(&config).scan(root);

        assert!(report.result.is_empty());
        assert!(report.failures.is_empty());
        assert!(root.join("images").join("Raw Photo.JPG").exists());
        assert!(root.join("Archive").join("old.zip").exists());
        assert!(root.join("UNKNOWN").join("thing.xyz").exists());
    }

    #[test]
    fn test_nested_reserved_folder_survives_parent_cleanup() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(&root.join("projects").join("audio").join("take1.wav"), "w");
        write(&root.join("projects").join("notes.txt"), "n");
        let config = move_config(root);

        let report = Scanner::new(&config).scan(root);

        assert_eq!(report.result.total_files(), 1);
        assert!(root.join("documents").join("notes.txt").exists());
        assert!(root.join("projects").join("audio").join("take1.wav").exists());
    }

    #[test]
    fn test_copy_mode_keeps_source_folders() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("in");
        let target = temp_dir.path().join("out");
        write(&source.join("sub").join("pic.png"), "p");
        fs::create_dir_all(&target).unwrap();
        let config = RunConfig::new(source.clone(), target.clone());

        let report = Scanner::new(&config).scan(&source);

        assert_eq!(report.result.count(Category::Images, ".png"), 1);
        assert_eq!(report.removed_dirs, 0);
        assert!(source.join("sub").join("pic.png").exists());
        assert!(target.join("images").join("pic.png").exists());
    }

    #[test]
    fn test_copy_mode_skips_target_inside_source() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().to_path_buf();
        let target = source.join("sorted");
        write(&source.join("a.txt"), "a");
        write(&target.join("leftover.txt"), "l");
        let config = RunConfig::new(source.clone(), target.clone());

        let report = Scanner::new(&config).scan(&source);

        assert_eq!(report.result.total_files(), 1);
        assert!(target.join("documents").join("a.txt").exists());
        assert!(target.join("leftover.txt").exists());
    }

    #[test]
    fn test_failed_file_is_not_counted() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(&root.join("broken.zip"), "garbage");
        write(&root.join("fine.txt"), "ok");
        let config = move_config(root);

        let report = Scanner::new(&config).scan(root);

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, root.join("broken.zip"));
        assert_eq!(report.result.total_files(), 1);
        assert_eq!(report.result.category_total(Category::Archive), 0);
    }
}
