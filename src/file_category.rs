/// File categorization by extension.
///
/// This module holds the fixed, ordered table of category rules and the
/// classifier that walks it. It also decides which directory names are
/// reserved output folders.
///
/// # Examples
///
/// ```
/// use clean_folder::file_category::{Category, FileMapper};
///
/// let mapper = FileMapper::default();
/// assert_eq!(mapper.categorize("holiday.JPG"), Category::Images);
/// assert_eq!(mapper.categorize("backup.tar.gz"), Category::Archive);
/// assert_eq!(mapper.categorize("notes.xyz"), Category::Unknown);
/// ```
use std::fmt;

/// A classification bucket, which is also the name of its target subfolder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Image files (JPEG, PNG, SVG)
    Images,
    /// Video files (AVI, MP4, MOV, MKV)
    Video,
    /// Document files (DOC, TXT, PDF, XLS, PPT)
    Documents,
    /// Audio files (MP3, OGG, WAV, AMR)
    Audio,
    /// Archive files (ZIP, GZ, TAR), unpacked rather than moved
    Archive,
    /// Anything no rule matched
    Unknown,
}

impl Category {
    /// Every category, including the fallback.
    pub const ALL: [Category; 6] = [
        Category::Images,
        Category::Video,
        Category::Documents,
        Category::Audio,
        Category::Archive,
        Category::Unknown,
    ];

    /// Returns the directory name for this category.
    ///
    /// # Examples
    ///
    /// ```
    /// use clean_folder::file_category::Category;
    ///
    /// assert_eq!(Category::Images.dir_name(), "images");
    /// assert_eq!(Category::Unknown.dir_name(), "unknown");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Images => "images",
            Category::Video => "video",
            Category::Documents => "documents",
            Category::Audio => "audio",
            Category::Archive => "archive",
            Category::Unknown => "unknown",
        }
    }

    /// Looks a category up by its directory name, ignoring case.
    pub fn from_dir_name(name: &str) -> Option<Category> {
        Self::ALL
            .into_iter()
            .find(|category| category.dir_name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Returns true if a directory with this name is one of the organizer's own
/// output folders. Such folders are neither scanned nor removed.
pub fn is_reserved_dir_name(name: &str) -> bool {
    Category::from_dir_name(name).is_some()
}

/// One entry of the classification table.
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub category: Category,
    /// Lowercase extensions without the leading dot.
    pub extensions: &'static [&'static str],
}

impl CategoryRule {
    /// Returns true if `lower_name` ends with `.ext` for one of the rule's
    /// extensions. The name must already be lowercased.
    fn matches(&self, lower_name: &str) -> bool {
        self.extensions.iter().any(|ext| {
            lower_name
                .strip_suffix(ext)
                .is_some_and(|rest| rest.ends_with('.'))
        })
    }
}

/// The fixed rule table, evaluated in order.
pub static CATEGORY_RULES: [CategoryRule; 5] = [
    CategoryRule {
        category: Category::Images,
        extensions: &["jpeg", "jpg", "png", "svg"],
    },
    CategoryRule {
        category: Category::Video,
        extensions: &["avi", "mp4", "mov", "mkv"],
    },
    CategoryRule {
        category: Category::Documents,
        extensions: &["doc", "docx", "txt", "pdf", "xls", "xlsx", "ppt", "pptx"],
    },
    CategoryRule {
        category: Category::Audio,
        extensions: &["mp3", "ogg", "ocg", "wav", "amr"],
    },
    CategoryRule {
        category: Category::Archive,
        extensions: &["zip", "gz", "tar"],
    },
];

/// Maps file names to categories using the ordered rule table.
#[derive(Debug, Clone)]
pub struct FileMapper {
    rules: &'static [CategoryRule],
}

impl FileMapper {
    /// Creates a mapper over the standard rule table.
    pub fn new() -> Self {
        Self {
            rules: &CATEGORY_RULES,
        }
    }

    /// Classifies a file name.
    ///
    /// The first rule with an extension the name ends with wins; the match is
    /// case-insensitive and must cover the whole tail of the name, so
    /// `clip.mp4.part` is [`Category::Unknown`]. Compound extensions count by
    /// their outer part only.
    pub fn categorize(&self, file_name: &str) -> Category {
        let lower = file_name.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lower))
            .map_or(Category::Unknown, |rule| rule.category)
    }
}

impl Default for FileMapper {
    fn default() -> Self {
        Self::new()
    }
}
