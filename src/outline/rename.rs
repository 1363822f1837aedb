//! In-place rename of a property key or string value
//!
//! Rename only computes the edit. Applying it is the document owner's job,
//! and the resulting change notification drives the refresh that brings the
//! tree back in sync, so ranges are never patched by hand here.

use super::edit::TextEdit;
use super::error::OutlineError;
use super::index::OffsetIndex;
use super::node::{Node, NodeKind, NodePath, TextRange};

/// What a rename rewrites
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameTarget {
    /// The quoted key of a property
    Key,
    /// A string value
    StringValue,
}

/// Span that a rename at some offset would rewrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameSpan {
    pub path: NodePath,
    pub target: RenameTarget,
    /// The old quoted text, quotes included
    pub span: TextRange,
    /// Current unquoted name
    pub current: String,
}

/// Edit produced by a rename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameEdit {
    pub path: NodePath,
    pub target: RenameTarget,
    pub edit: TextEdit,
    /// `len(new quoted text) - len(old quoted text)`
    pub delta: isize,
}

/// Locate the renamable span at `offset`
pub fn rename_span(root: &Node, offset: usize) -> Result<RenameSpan, OutlineError> {
    let found = OffsetIndex::new(root).resolve(offset)?;
    let node = found.node;

    let (target, span, current) = match node.kind {
        NodeKind::Property => match (node.key_range, node.key.as_ref()) {
            (Some(span), Some(key)) => (RenameTarget::Key, span, key.clone()),
            _ => {
                return Err(OutlineError::NotRenamable {
                    offset,
                    kind: node.kind,
                })
            }
        },
        NodeKind::String => (
            RenameTarget::StringValue,
            node.token_range.unwrap_or(node.range),
            node.value.clone().unwrap_or_default(),
        ),
        kind => return Err(OutlineError::NotRenamable { offset, kind }),
    };

    Ok(RenameSpan {
        path: found.path,
        target,
        span,
        current,
    })
}

/// Build the edit renaming the key or string at `offset` to `new_name`
pub fn rename(root: &Node, offset: usize, new_name: &str) -> Result<RenameEdit, OutlineError> {
    let found = rename_span(root, offset)?;
    let quoted = quote_name(new_name)?;
    let edit = TextEdit::new(found.span, quoted);
    // Measured on the quoted texts: "a" -> "longer" is 5
    let delta = edit.delta();

    tracing::debug!(
        path = %found.path,
        from = %found.current,
        to = new_name,
        delta,
        "rename edit computed"
    );

    Ok(RenameEdit {
        path: found.path,
        target: found.target,
        edit,
        delta,
    })
}

/// Quote and escape `name` as a JSON string
///
/// Control characters with a short escape (`\n`, `\t`, ...) are escaped;
/// any other control character is rejected.
pub fn quote_name(name: &str) -> Result<String, OutlineError> {
    if name.is_empty() {
        return Err(OutlineError::InvalidName("name is empty".to_string()));
    }

    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for c in name.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            '\u{8}' => quoted.push_str("\\b"),
            '\u{c}' => quoted.push_str("\\f"),
            c if c.is_control() => {
                return Err(OutlineError::InvalidName(format!(
                    "control character U+{:04X}",
                    c as u32
                )));
            }
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    Ok(quoted)
}
