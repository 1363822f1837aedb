//! Text edits exchanged with the document owner

use super::node::TextRange;

/// A single replacement to commit to the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    /// Span of the current text to replace
    pub span: TextRange,
    pub replacement: String,
}

impl TextEdit {
    pub fn new(span: TextRange, replacement: impl Into<String>) -> Self {
        Self {
            span,
            replacement: replacement.into(),
        }
    }

    /// Change in document length once applied, in characters
    pub fn delta(&self) -> isize {
        self.replacement.chars().count() as isize - self.span.len() as isize
    }
}

/// Notification that the document text changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChange {
    /// Replaced span, in the coordinates of the text before the change
    pub range: TextRange,
    pub new_text: String,
    /// Document version after the change
    pub version: u64,
}

impl DocumentChange {
    pub fn summary(&self) -> EditSummary {
        EditSummary {
            start: self.range.start,
            old_end: self.range.end,
            new_len: self.new_text.chars().count(),
        }
    }
}

/// Shape of an edit, without its text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditSummary {
    pub start: usize,
    /// End of the replaced span before the edit
    pub old_end: usize,
    /// Length of the inserted text
    pub new_len: usize,
}

impl EditSummary {
    pub fn old_range(&self) -> TextRange {
        TextRange::new(self.start, self.old_end)
    }

    pub fn delta(&self) -> isize {
        self.new_len as isize - (self.old_end - self.start) as isize
    }
}
