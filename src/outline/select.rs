//! Navigation between nodes and (line, column) ranges

use serde::Serialize;

use super::error::OutlineError;
use super::index::OffsetIndex;
use super::line_index::LineIndex;
use super::node::{Node, NodeRef, TextRange};

/// A range in the document (line/col are 0-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LineRange {
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
}

/// Node ↔ line/column mapping against one tree and one document version
#[derive(Debug, Clone, Copy)]
pub struct SelectOperation<'a> {
    root: &'a Node,
    lines: &'a LineIndex,
}

impl<'a> SelectOperation<'a> {
    pub fn new(root: &'a Node, lines: &'a LineIndex) -> Self {
        Self { root, lines }
    }

    pub fn root(&self) -> &'a Node {
        self.root
    }

    /// Exact line/column range of `node`
    pub fn range_of(&self, node: &Node) -> Result<LineRange, OutlineError> {
        self.line_range(node.range)
    }

    /// Line/column form of a character range
    pub fn line_range(&self, range: TextRange) -> Result<LineRange, OutlineError> {
        let (start_line, start_col) = self
            .lines
            .position_of(range.start)
            .ok_or(OutlineError::NotFound {
                offset: range.start,
            })?;
        let (end_line, end_col) = self
            .lines
            .position_of(range.end)
            .ok_or(OutlineError::NotFound { offset: range.end })?;
        Ok(LineRange {
            start_line,
            start_col,
            end_line,
            end_col,
        })
    }

    /// Character form of a line/column range
    pub fn text_range(&self, range: LineRange) -> Result<TextRange, OutlineError> {
        let start = self.offset_of(range.start_line, range.start_col)?;
        let end = self.offset_of(range.end_line, range.end_col)?;
        if end < start {
            return Err(OutlineError::PositionNotFound {
                line: range.end_line,
                column: range.end_col,
            });
        }
        Ok(TextRange::new(start, end))
    }

    /// Deepest node covering (line, column)
    pub fn node_at(&self, line: usize, column: usize) -> Result<NodeRef<'a>, OutlineError> {
        let offset = self.offset_of(line, column)?;
        OffsetIndex::new(self.root).resolve(offset)
    }

    fn offset_of(&self, line: usize, column: usize) -> Result<usize, OutlineError> {
        self.lines
            .offset_of(line, column)
            .ok_or(OutlineError::PositionNotFound { line, column })
    }
}
