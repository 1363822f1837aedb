//! Message types for the Elm-style architecture
//!
//! All state changes to an [`OutlineSession`](crate::model::OutlineSession)
//! flow through these message types.

use crate::outline::{DocumentChange, NodePath};

/// Outline session messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutlineMsg {
    /// Build the tree for the session's document
    Open,
    /// The document text changed
    DocumentChanged(DocumentChange),
    /// Rebuild the tree: everything (`None`) or the container around an offset
    Refresh { anchor: Option<usize> },
    /// Run one cooperative parse step; `budget` overrides the configured one
    Pump { budget: Option<usize> },
    /// Rename the key or string value at `offset`
    Rename { offset: usize, new_name: String },
    /// Reveal the node at `path`
    Select {
        path: NodePath,
        preserve_focus: bool,
    },
    /// Reveal the node under a (line, column) position
    SelectAt {
        line: usize,
        column: usize,
        preserve_focus: bool,
    },
    /// Abandon all work and drop the tree
    Close,
}

impl OutlineMsg {
    /// Periodic messages that would flood the log
    pub fn is_noisy(&self) -> bool {
        matches!(self, OutlineMsg::Pump { .. })
    }
}
