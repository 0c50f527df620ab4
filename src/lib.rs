//! clean-folder - sort a directory tree into category folders
//!
//! This library classifies files by extension, normalizes their names
//! (transliterating Cyrillic, replacing anything that is not an ASCII letter,
//! digit or underscore) and moves or copies them into `images`, `video`,
//! `documents`, `audio`, `archive` and `unknown` subfolders. Archives are
//! unpacked into their own folder under `archive`.

pub mod archive;
pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod normalize;
pub mod output;
pub mod scanner;

pub use config::{ConfigError, Mode, RunConfig};
pub use file_category::{Category, FileMapper};
pub use file_organizer::{FileOrganizer, OrganizeError};
pub use scanner::{ProcessingResult, ScanReport, Scanner};

pub use cli::{Args, organize, run_cli};
