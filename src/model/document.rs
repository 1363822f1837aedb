//! Document model - the text buffer and file state

use ropey::Rope;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::outline::{DocumentChange, TextEdit, TextRange};

/// Maximum file size in bytes (50 MB)
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Errors that can occur when opening a document
#[derive(Debug, Clone, PartialEq)]
pub enum OpenError {
    NotFound,
    PermissionDenied,
    IsDirectory,
    /// File appears to be binary (contains null bytes)
    BinaryFile,
    TooLarge { size_mb: f64 },
    Io(String),
}

impl OpenError {
    fn from_io(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => OpenError::NotFound,
            std::io::ErrorKind::PermissionDenied => OpenError::PermissionDenied,
            _ => OpenError::Io(e.to_string()),
        }
    }
}

impl std::fmt::Display for OpenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "file not found"),
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::IsDirectory => write!(f, "is a directory"),
            Self::BinaryFile => write!(f, "binary file"),
            Self::TooLarge { size_mb } => write!(
                f,
                "file too large ({:.1} MB, max {} MB)",
                size_mb,
                MAX_FILE_SIZE / (1024 * 1024)
            ),
            Self::Io(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for OpenError {}

/// An edit that could not be applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// The span reaches past the end of the buffer
    OutOfBounds { span: TextRange, len: usize },
    /// The document has no file to save to
    NoPath,
    Io(String),
}

impl std::fmt::Display for EditError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfBounds { span, len } => {
                write!(f, "edit span {} is outside the document (length {})", span, len)
            }
            Self::NoPath => write!(f, "document has no file path"),
            Self::Io(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for EditError {}

/// Document state - the text buffer and associated file metadata
#[derive(Debug, Clone)]
pub struct Document {
    /// The text buffer
    pub buffer: Rope,
    /// Path to the file on disk (None for in-memory documents)
    pub file_path: Option<PathBuf>,
    /// Whether the buffer has unsaved changes
    pub is_modified: bool,
    /// Incremented on every applied change
    pub version: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::with_text("")
    }
}

impl Document {
    /// Create a document with initial text
    pub fn with_text(text: &str) -> Self {
        Self {
            buffer: Rope::from(text),
            file_path: None,
            is_modified: false,
            version: 0,
        }
    }

    /// Load a document from a file path
    ///
    /// Rejects directories, oversized files and files that look binary.
    pub fn from_file(path: PathBuf) -> Result<Self, OpenError> {
        let metadata = fs::metadata(&path).map_err(OpenError::from_io)?;
        if metadata.is_dir() {
            return Err(OpenError::IsDirectory);
        }
        if metadata.len() > MAX_FILE_SIZE {
            return Err(OpenError::TooLarge {
                size_mb: metadata.len() as f64 / (1024.0 * 1024.0),
            });
        }
        if is_likely_binary(&path) {
            return Err(OpenError::BinaryFile);
        }

        let content = fs::read_to_string(&path).map_err(OpenError::from_io)?;
        tracing::debug!(path = %path.display(), chars = content.chars().count(), "Opened document");
        Ok(Self {
            buffer: Rope::from(content),
            file_path: Some(path),
            is_modified: false,
            version: 0,
        })
    }

    /// Full text of the buffer
    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn len_chars(&self) -> usize {
        self.buffer.len_chars()
    }

    /// Apply `edit` atomically and describe the change
    ///
    /// Nothing is modified when the span is out of bounds.
    pub fn apply_edit(&mut self, edit: &TextEdit) -> Result<DocumentChange, EditError> {
        let len = self.buffer.len_chars();
        if edit.span.start > edit.span.end || edit.span.end > len {
            return Err(EditError::OutOfBounds {
                span: edit.span,
                len,
            });
        }

        self.buffer.remove(edit.span.start..edit.span.end);
        self.buffer.insert(edit.span.start, &edit.replacement);
        self.is_modified = true;
        self.version = self.version.wrapping_add(1);

        Ok(DocumentChange {
            range: edit.span,
            new_text: edit.replacement.clone(),
            version: self.version,
        })
    }

    /// Swap in new contents (e.g. reloaded from disk), reporting the minimal change
    pub fn replace_text(&mut self, new_text: &str) -> Option<DocumentChange> {
        let change = diff_change(&self.text(), new_text, self.version.wrapping_add(1))?;
        self.buffer = Rope::from(new_text);
        self.version = change.version;
        Some(change)
    }

    /// Write the buffer back to its file
    pub fn save(&mut self) -> Result<(), EditError> {
        let path = self.file_path.as_ref().ok_or(EditError::NoPath)?;
        fs::write(path, self.buffer.to_string()).map_err(|e| EditError::Io(e.to_string()))?;
        self.is_modified = false;
        tracing::info!("Saved {}", path.display());
        Ok(())
    }
}

/// Single replacement turning `old` into `new`, found by trimming the common
/// prefix and suffix. Returns None if the texts are identical.
pub fn diff_change(old: &str, new: &str, version: u64) -> Option<DocumentChange> {
    if old == new {
        return None;
    }

    let old_chars: Vec<char> = old.chars().collect();
    let new_chars: Vec<char> = new.chars().collect();

    let max_start = old_chars.len().min(new_chars.len());
    let mut start = 0;
    while start < max_start && old_chars[start] == new_chars[start] {
        start += 1;
    }

    // Suffix must not overlap the prefix
    let mut old_end = old_chars.len();
    let mut new_end = new_chars.len();
    while old_end > start && new_end > start && old_chars[old_end - 1] == new_chars[new_end - 1] {
        old_end -= 1;
        new_end -= 1;
    }

    Some(DocumentChange {
        range: TextRange::new(start, old_end),
        new_text: new_chars[start..new_end].iter().collect(),
        version,
    })
}

/// Check if a file is likely binary by scanning the first 8KB for null bytes
///
/// Returns `false` on any read error (the actual open fails with a better error).
fn is_likely_binary(path: &Path) -> bool {
    let Ok(mut file) = File::open(path) else {
        return false;
    };

    let mut buffer = [0u8; 8192];
    let Ok(bytes_read) = file.read(&mut buffer) else {
        return false;
    };

    buffer[..bytes_read].contains(&0)
}
