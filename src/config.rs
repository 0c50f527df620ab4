//! Run configuration.
//!
//! A [`RunConfig`] is built once from the command-line paths and then passed
//! by reference through the scanner and file handler. It never changes during
//! a run.
//!
//! | arguments          | source      | target      | mode |
//! |--------------------|-------------|-------------|------|
//! | none               | `./test-in` | `./test-out`| copy |
//! | `DIR`              | `DIR`       | `DIR`       | move |
//! | `SRC DST`          | `SRC`       | `DST`       | copy (move if they resolve to the same path) |

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Source folder used when no arguments are given.
pub const DEFAULT_SOURCE: &str = "test-in";
/// Target folder used when no arguments are given.
pub const DEFAULT_TARGET: &str = "test-out";

/// Errors that can occur while building a run configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// A path could not be turned into an absolute path.
    PathResolution { path: PathBuf, source: io::Error },
    /// In copy mode the target is recreated, which would wipe the source.
    TargetContainsSource { source: PathBuf, target: PathBuf },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::PathResolution { path, source } => {
                write!(f, "Cannot resolve path {}: {}", path.display(), source)
            }
            ConfigError::TargetContainsSource { source, target } => write!(
                f,
                "Target folder {} contains the source folder {}; refusing to recreate it",
                target.display(),
                source.display()
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::PathResolution { source, .. } => Some(source),
            ConfigError::TargetContainsSource { .. } => None,
        }
    }
}

/// Whether files are relocated or duplicated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Source and target coincide: files are moved and emptied folders removed.
    Move,
    /// Target differs: it is recreated and files are copied, the source is untouched.
    Copy,
}

/// Immutable settings for one organizer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Absolute path of the folder to scan.
    pub source: PathBuf,
    /// Absolute path of the folder receiving the category subfolders.
    pub target: PathBuf,
    pub mode: Mode,
}

impl RunConfig {
    /// Builds a configuration from already-resolved paths. The mode follows
    /// from whether the two paths are equal.
    pub fn new(source: PathBuf, target: PathBuf) -> Self {
        let mode = if source == target {
            Mode::Move
        } else {
            Mode::Copy
        };
        Self {
            source,
            target,
            mode,
        }
    }

    /// Builds a configuration from the optional positional arguments.
    ///
    /// A missing target means "organize the source in place"; missing both
    /// falls back to [`DEFAULT_SOURCE`] and [`DEFAULT_TARGET`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::PathResolution` if a path cannot be made absolute
    /// and `ConfigError::TargetContainsSource` if a copy-mode target is an
    /// ancestor of the source.
    pub fn from_args(source: Option<&Path>, target: Option<&Path>) -> Result<Self, ConfigError> {
        let (source, target) = match (source, target) {
            (Some(source), Some(target)) => (source, target),
            (Some(source), None) => (source, source),
            (None, _) => (Path::new(DEFAULT_SOURCE), Path::new(DEFAULT_TARGET)),
        };

        let config = Self::new(resolve_path(source)?, resolve_path(target)?);
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.mode == Mode::Copy && self.source.starts_with(&self.target) {
            return Err(ConfigError::TargetContainsSource {
                source: self.source.clone(),
                target: self.target.clone(),
            });
        }
        Ok(())
    }

    pub fn is_move(&self) -> bool {
        self.mode == Mode::Move
    }
}

/// Makes a path absolute, resolving symlinks when the path already exists.
fn resolve_path(path: &Path) -> Result<PathBuf, ConfigError> {
    let resolved = match fs::canonicalize(path) {
        Ok(canonical) => Ok(canonical),
        Err(e) if e.kind() == io::ErrorKind::NotFound => std::path::absolute(path),
        Err(e) => Err(e),
    };
    resolved.map_err(|source| ConfigError::PathResolution {
        path: path.to_path_buf(),
        source,
    })
}
