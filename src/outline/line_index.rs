//! Line-start index for offset ↔ (line, column) conversion
//!
//! Built once per document version. Lines are split on `\n`; columns count
//! characters from the line start.

use ropey::Rope;

/// Sorted character offsets where each line starts
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// `line_starts[0] == 0` always
    line_starts: Vec<usize>,
    len: usize,
    version: u64,
}

impl LineIndex {
    pub fn new(text: &str, version: u64) -> Self {
        Self::from_chars(text.chars(), version)
    }

    pub fn from_rope(rope: &Rope, version: u64) -> Self {
        Self::from_chars(rope.chars(), version)
    }

    fn from_chars(chars: impl IntoIterator<Item = char>, version: u64) -> Self {
        let mut line_starts = vec![0];
        let mut len = 0;
        for ch in chars {
            len += 1;
            if ch == '\n' {
                line_starts.push(len);
            }
        }
        Self {
            line_starts,
            len,
            version,
        }
    }

    /// Document version this index was built from
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Total characters in the indexed text
    pub fn len_chars(&self) -> usize {
        self.len
    }

    /// Character offset where `line` starts
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Length of `line`, excluding its newline
    pub fn line_len(&self, line: usize) -> Option<usize> {
        let start = self.line_start(line)?;
        let end = match self.line_starts.get(line + 1) {
            Some(next) => next - 1,
            None => self.len,
        };
        Some(end - start)
    }

    /// (line, column) of an offset; `offset == len` is the end position
    pub fn position_of(&self, offset: usize) -> Option<(usize, usize)> {
        if offset > self.len {
            return None;
        }
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        Some((line, offset - self.line_starts[line]))
    }

    /// Offset of (line, column); the column may sit just past the last
    /// character of the line
    pub fn offset_of(&self, line: usize, column: usize) -> Option<usize> {
        let len = self.line_len(line)?;
        if column > len {
            return None;
        }
        Some(self.line_starts[line] + column)
    }
}
