//! JSON outline engine
//!
//! Parses a JSON document into a tree of [`Node`]s that carry character
//! ranges, keeps that tree in sync with edits, and answers the queries an
//! outline view needs.
//!
//! ## Architecture
//!
//! ```text
//! Document ──DocumentChange──▶ RefreshController ──OutlineChange──▶ renderer
//!                                │        ▲
//!                         ParseJob (cooperative, resumable)
//!                                │
//!                            Arc<Node> tree ◀── OffsetIndex / OutlineTree
//!                                                 SelectOperation / rename
//! ```
//!
//! Offsets are character positions, never bytes. Every range is half-open
//! and a child's range always lies inside its parent's.

mod edit;
mod error;
mod index;
mod line_index;
mod node;
mod parser;
mod refresh;
mod rename;
mod select;
mod tree;

pub use edit::{DocumentChange, EditSummary, TextEdit};
pub use error::{OutlineError, ParseError};
pub use index::{range_of, OffsetIndex};
pub use line_index::LineIndex;
pub use node::{Node, NodeKind, NodePath, NodeRef, TextRange};
pub use parser::{parse, ParseJob, ParseStep, MAX_DEPTH};
pub use refresh::{
    OutlineChange, RefreshController, RefreshOutcome, RefreshPoll, RefreshRequest,
    DEFAULT_PARSE_BUDGET,
};
pub use rename::{quote_name, rename, rename_span, RenameEdit, RenameSpan, RenameTarget};
pub use select::{LineRange, SelectOperation};
pub use tree::{truncate_preview, OutlineItem, OutlineTree, DEFAULT_PREVIEW_LEN};
