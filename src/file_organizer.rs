/// File handling: moving, copying and unpacking into category directories.
///
/// This module places a single classified file into the target layout. Regular
/// files end up as `<target>/<category>/<normalized-stem><extension>`; archives
/// are unpacked into `<target>/archive/<normalized-stem>/`.
use crate::archive::{self, ArchiveFormat};
use crate::config::{Mode, RunConfig};
use crate::file_category::Category;
use crate::normalize::normalize;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// What was done with a handled file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Moved,
    Copied,
    Unpacked(ArchiveFormat),
}

/// Record of a single handled file.
#[derive(Debug, Clone)]
pub struct Operation {
    /// The path of the file before handling.
    pub original_path: PathBuf,
    /// The resulting file, or the extraction folder for archives.
    pub new_path: PathBuf,
    /// The category the file was placed in.
    pub category: Category,
    /// Lowercased extension including the dot, empty if the file has none.
    pub extension: String,
    pub action: Action,
}

/// Errors that can occur while handling a single entry.
#[derive(Debug)]
pub enum OrganizeError {
    /// The entry vanished or never existed.
    MissingPath { path: PathBuf },
    /// Could not inspect an entry.
    MetadataFailed { path: PathBuf, source: io::Error },
    /// Could not list a directory.
    DirectoryReadFailed { path: PathBuf, source: io::Error },
    /// Failed to create a category directory.
    DirectoryCreationFailed { path: PathBuf, source: io::Error },
    /// Failed to move a file to its category directory.
    FileMoveFailure {
        source: PathBuf,
        destination: PathBuf,
        source_error: io::Error,
    },
    /// Failed to copy a file to its category directory.
    FileCopyFailure {
        source: PathBuf,
        destination: PathBuf,
        source_error: io::Error,
    },
    /// The target root does not exist.
    InvalidBasePath { path: PathBuf },
    /// The path has no usable file name.
    InvalidFileName { path: PathBuf },
    /// Neither content nor name identify a supported archive format.
    UnsupportedArchive { path: PathBuf },
    /// The archive could not be opened or unpacked.
    ExtractionFailed {
        path: PathBuf,
        format: ArchiveFormat,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The archive was unpacked but the original could not be removed.
    ArchiveRemovalFailed { path: PathBuf, source: io::Error },
}

impl fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPath { path } => {
                write!(f, "The file or folder does not exist: {}", path.display())
            }
            Self::MetadataFailed { path, source } => {
                write!(f, "Cannot inspect {}: {}", path.display(), source)
            }
            Self::DirectoryReadFailed { path, source } => {
                write!(f, "Cannot read directory {}: {}", path.display(), source)
            }
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::FileMoveFailure {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::FileCopyFailure {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to copy {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::InvalidBasePath { path } => {
                write!(f, "Target folder does not exist: {}", path.display())
            }
            Self::InvalidFileName { path } => {
                write!(f, "Path has no file name: {}", path.display())
            }
            Self::UnsupportedArchive { path } => {
                write!(f, "Unsupported archive format: {}", path.display())
            }
            Self::ExtractionFailed { path, format, .. } => {
                write!(f, "Failed to unpack {} as {}", path.display(), format)
            }
            Self::ArchiveRemovalFailed { path, source } => {
                write!(
                    f,
                    "Unpacked but could not remove archive {}: {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for OrganizeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MetadataFailed { source, .. }
            | Self::DirectoryReadFailed { source, .. }
            | Self::DirectoryCreationFailed { source, .. }
            | Self::ArchiveRemovalFailed { source, .. } => Some(source),
            Self::FileMoveFailure { source_error, .. }
            | Self::FileCopyFailure { source_error, .. } => Some(source_error),
            Self::ExtractionFailed { source, .. } => Some(source.as_ref()),
            Self::MissingPath { .. }
            | Self::InvalidBasePath { .. }
            | Self::InvalidFileName { .. }
            | Self::UnsupportedArchive { .. } => None,
        }
    }
}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Places classified files into the target layout.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Handles one file according to its category and the run mode.
    ///
    /// Archives are unpacked into `<target>/archive/<stem>/` (and removed in
    /// move mode once unpacked); every other file is moved or copied into
    /// `<target>/<category>/` under its normalized name. An existing file
    /// with the same resulting name is overwritten.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use clean_folder::config::RunConfig;
    /// use clean_folder::file_category::Category;
    /// use clean_folder::file_organizer::FileOrganizer;
    /// use std::path::{Path, PathBuf};
    ///
    /// let config = RunConfig::new(PathBuf::from("/downloads"), PathBuf::from("/downloads"));
    /// match FileOrganizer::handle_file(&config, Path::new("/downloads/Фото.JPG"), Category::Images) {
    ///     Ok(op) => println!("{} -> {}", op.original_path.display(), op.new_path.display()),
    ///     Err(e) => eprintln!("Organization failed: {}", e),
    /// }
    /// ```
    pub fn handle_file(
        config: &RunConfig,
        file_path: &Path,
        category: Category,
    ) -> OrganizeResult<Operation> {
        if !config.target.is_dir() {
            return Err(OrganizeError::InvalidBasePath {
                path: config.target.clone(),
            });
        }

        let stem = file_path
            .file_stem()
            .ok_or_else(|| OrganizeError::InvalidFileName {
                path: file_path.to_path_buf(),
            })?
            .to_string_lossy();
        let extension = lowercase_extension(file_path);
        let category_path = config.target.join(category.dir_name());

        if category == Category::Archive {
            let extract_dir = category_path.join(normalize(&stem));
            create_dir(&extract_dir)?;
            let format = archive::extract(file_path, &extract_dir)?;
            if config.mode == Mode::Move {
                fs::remove_file(file_path).map_err(|e| OrganizeError::ArchiveRemovalFailed {
                    path: file_path.to_path_buf(),
                    source: e,
                })?;
            }
            return Ok(Operation {
                original_path: file_path.to_path_buf(),
                new_path: extract_dir,
                category,
                extension,
                action: Action::Unpacked(format),
            });
        }

        create_dir(&category_path)?;
        let destination_path = category_path.join(format!("{}{}", normalize(&stem), extension));

        let action = match config.mode {
            Mode::Move => {
                move_file(file_path, &destination_path)?;
                Action::Moved
            }
            Mode::Copy => {
                fs::copy(file_path, &destination_path).map_err(|e| {
                    OrganizeError::FileCopyFailure {
                        source: file_path.to_path_buf(),
                        destination: destination_path.clone(),
                        source_error: e,
                    }
                })?;
                Action::Copied
            }
        };

        Ok(Operation {
            original_path: file_path.to_path_buf(),
            new_path: destination_path,
            category,
            extension,
            action,
        })
    }
}

/// The file's extension, lowercased and with its dot, or an empty string.
pub fn lowercase_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

fn create_dir(path: &Path) -> OrganizeResult<()> {
    fs::create_dir_all(path).map_err(|e| OrganizeError::DirectoryCreationFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Renames `from` to `to`, replacing any existing file. Falls back to
/// copy-then-delete when the two paths live on different filesystems.
fn move_file(from: &Path, to: &Path) -> OrganizeResult<()> {
    let failure = |e: io::Error| OrganizeError::FileMoveFailure {
        source: from.to_path_buf(),
        destination: to.to_path_buf(),
        source_error: e,
    };

    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(from, to).map_err(failure)?;
            fs::remove_file(from).map_err(failure)
        }
        Err(e) => Err(failure(e)),
    }
}
