//! Read-only projection of the current tree for renderers
//!
//! The renderer asks for children and labels lazily, top-down, and re-queries
//! after every change signal. Nothing here mutates the tree.

use std::sync::Arc;

use serde::Serialize;

use super::error::ParseError;
use super::index::OffsetIndex;
use super::node::{Node, NodeKind, NodePath, NodeRef, TextRange};

/// Default maximum characters in a scalar preview
pub const DEFAULT_PREVIEW_LEN: usize = 32;

/// One renderable row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlineItem {
    pub path: NodePath,
    pub kind: NodeKind,
    /// For properties, the kind of the value (drives the icon)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_kind: Option<NodeKind>,
    pub label: String,
    pub range: TextRange,
    pub expandable: bool,
}

/// Snapshot of the published outline
#[derive(Debug, Clone)]
pub struct OutlineTree {
    root: Arc<Node>,
    error: Option<ParseError>,
    preview_len: usize,
}

impl OutlineTree {
    pub fn new(root: Arc<Node>) -> Self {
        Self {
            root,
            error: None,
            preview_len: DEFAULT_PREVIEW_LEN,
        }
    }

    /// Attach the root-level error marker from the last failed parse
    pub fn with_error(mut self, error: Option<ParseError>) -> Self {
        self.error = error;
        self
    }

    pub fn with_preview_len(mut self, preview_len: usize) -> Self {
        self.preview_len = preview_len.max(1);
        self
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Error from the last full parse; the tree shown is the previous good one
    pub fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    pub fn index(&self) -> OffsetIndex<'_> {
        OffsetIndex::new(&self.root)
    }

    pub fn node(&self, path: &NodePath) -> Option<&Node> {
        self.root.at_path(path)
    }

    /// Direct children of the node at `path`, in document order
    pub fn children(&self, path: &NodePath) -> Vec<NodeRef<'_>> {
        let Some(node) = self.node(path) else {
            return Vec::new();
        };
        node.children
            .iter()
            .enumerate()
            .map(|(i, child)| NodeRef {
                path: path.child(i),
                node: child.as_ref(),
            })
            .collect()
    }

    /// Display label of the node at `path`
    ///
    /// Properties show their key, array elements their position, scalars a
    /// truncated preview and other containers their kind and size.
    pub fn label(&self, path: &NodePath) -> Option<String> {
        let node = self.node(path)?;

        if node.kind == NodeKind::Property {
            return node.key.clone();
        }
        if self.index().is_array_element(path) {
            return path.last().map(|i| i.to_string());
        }

        let label = match node.kind {
            NodeKind::Object | NodeKind::Array => {
                format!("{} ({})", node.kind.label(), node.children.len())
            }
            _ => truncate_preview(node.value.as_deref().unwrap_or_default(), self.preview_len),
        };
        Some(label)
    }

    /// Rows to show under the node at `path`
    ///
    /// Unlike [`children`](Self::children), a property whose value is a
    /// container expands straight to that container's members.
    pub fn items(&self, path: &NodePath) -> Vec<OutlineItem> {
        let Some(node) = self.node(path) else {
            return Vec::new();
        };
        let container_path = match node.kind {
            NodeKind::Property => path.child(0),
            _ => path.clone(),
        };

        self.children(&container_path)
            .into_iter()
            .map(|child| {
                let value = child.node.property_value();
                let shown = value.unwrap_or(child.node);
                OutlineItem {
                    label: self.label(&child.path).unwrap_or_default(),
                    kind: child.node.kind,
                    value_kind: value.map(|v| v.kind),
                    range: child.node.range,
                    expandable: shown.kind.is_container() && !shown.children.is_empty(),
                    path: child.path,
                }
            })
            .collect()
    }
}

/// Cut `value` to `max_len` characters, marking the cut with `…`
pub fn truncate_preview(value: &str, max_len: usize) -> String {
    let mut chars = value.chars();
    let head: String = chars.by_ref().take(max_len).collect();
    if chars.next().is_some() {
        let mut cut: String = head.chars().take(max_len.saturating_sub(1)).collect();
        cut.push('…');
        cut
    } else {
        head
    }
}
