//! Error types for the outline engine

use super::node::NodeKind;

/// Malformed document text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Offset of the first offending character
    pub offset: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "parse error at offset {}: {}", self.offset, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Errors reported by outline operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutlineError {
    /// The document failed to parse
    Parse(ParseError),
    /// Offset is outside the current tree (stale or out of range)
    NotFound { offset: usize },
    /// Line/column does not exist in the current document version
    PositionNotFound { line: usize, column: usize },
    /// No tree has been built yet
    NoTree,
    /// The node at the offset is not a key or string value
    NotRenamable { offset: usize, kind: NodeKind },
    /// Replacement name rejected
    InvalidName(String),
}

impl OutlineError {
    /// Stale-view errors: the caller's idea of the document is out of date
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            OutlineError::NotFound { .. } | OutlineError::PositionNotFound { .. }
        )
    }
}

impl std::fmt::Display for OutlineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "{}", e),
            Self::NotFound { offset } => write!(f, "no node at offset {}", offset),
            Self::PositionNotFound { line, column } => {
                write!(f, "no position at line {}, column {}", line, column)
            }
            Self::NoTree => write!(f, "outline has not been built"),
            Self::NotRenamable { offset, kind } => {
                write!(f, "{} at offset {} cannot be renamed", kind, offset)
            }
            Self::InvalidName(reason) => write!(f, "invalid name: {}", reason),
        }
    }
}

impl std::error::Error for OutlineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ParseError> for OutlineError {
    fn from(e: ParseError) -> Self {
        OutlineError::Parse(e)
    }
}
