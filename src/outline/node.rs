//! Outline node data model
//!
//! Nodes own their children (`Arc` so a published tree can be snapshotted and
//! grafted copy-on-write). The parent relation is never stored on the node:
//! it is a [`NodePath`] walked from the root.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// Half-open `[start, end)` character range into the document text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "inverted range {}..{}", start, end);
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `offset` falls inside the range (right-open)
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Whether `other` lies entirely within this range
    pub fn contains_range(&self, other: TextRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Both ends moved by `delta` characters
    pub fn shifted(self, delta: isize) -> Self {
        Self {
            start: shift_offset(self.start, delta),
            end: shift_offset(self.end, delta),
        }
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

pub(crate) fn shift_offset(offset: usize, delta: isize) -> usize {
    offset.saturating_add_signed(delta)
}

/// Syntactic kind of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Object,
    Array,
    String,
    Number,
    Boolean,
    Null,
    Property,
}

impl NodeKind {
    /// Objects and arrays: the only kinds that can be re-parsed on their own
    pub fn is_container(self) -> bool {
        matches!(self, NodeKind::Object | NodeKind::Array)
    }

    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            NodeKind::String | NodeKind::Number | NodeKind::Boolean | NodeKind::Null
        )
    }

    /// Short lowercase name, used in labels and log lines
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Object => "object",
            NodeKind::Array => "array",
            NodeKind::String => "string",
            NodeKind::Number => "number",
            NodeKind::Boolean => "boolean",
            NodeKind::Null => "null",
            NodeKind::Property => "property",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single syntactic construct and the range it covers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    pub range: TextRange,
    /// Unquoted property name (Property only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Span of the quoted key, including both quotes (Property only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_range: Option<TextRange>,
    /// Decoded scalar value (String/Number/Boolean/Null only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Span of the scalar token itself, quotes included
    ///
    /// Same as `range` except for a top-level scalar, whose range also
    /// covers the surrounding whitespace.
    #[serde(skip)]
    pub token_range: Option<TextRange>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Arc<Node>>,
}

impl Node {
    pub fn scalar(kind: NodeKind, range: TextRange, value: String) -> Self {
        debug_assert!(kind.is_scalar());
        Self {
            kind,
            range,
            key: None,
            key_range: None,
            value: Some(value),
            token_range: Some(range),
            children: Vec::new(),
        }
    }

    pub fn container(kind: NodeKind, range: TextRange, children: Vec<Arc<Node>>) -> Self {
        debug_assert!(kind.is_container());
        Self {
            kind,
            range,
            key: None,
            key_range: None,
            value: None,
            token_range: None,
            children,
        }
    }

    /// A property spanning from its quoted key through the end of `value`
    pub fn property(key: String, key_range: TextRange, value: Node) -> Self {
        Self {
            kind: NodeKind::Property,
            range: TextRange::new(key_range.start, value.range.end),
            key: Some(key),
            key_range: Some(key_range),
            value: None,
            token_range: None,
            children: vec![Arc::new(value)],
        }
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children.get(index).map(|c| c.as_ref())
    }

    /// The value of a Property node
    pub fn property_value(&self) -> Option<&Node> {
        match self.kind {
            NodeKind::Property => self.child(0),
            _ => None,
        }
    }

    /// Walk `path` down from this node
    pub fn at_path(&self, path: &NodePath) -> Option<&Node> {
        path.indices()
            .iter()
            .try_fold(self, |node, &index| node.child(index))
    }

    /// Total number of nodes in this subtree, including itself
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(node.children.iter().map(|c| c.as_ref()));
        }
        count
    }

    /// Move this subtree by `delta` characters
    ///
    /// Shared children are cloned on write; unshared ones are moved in place.
    pub fn shift(&mut self, delta: isize) {
        if delta == 0 {
            return;
        }
        self.range = self.range.shifted(delta);
        self.key_range = self.key_range.map(|r| r.shifted(delta));
        self.token_range = self.token_range.map(|r| r.shifted(delta));
        for child in &mut self.children {
            Arc::make_mut(child).shift(delta);
        }
    }

    /// Check the structural invariants of this subtree
    ///
    /// Children lie inside their parent, are sorted and pairwise disjoint;
    /// properties have exactly one child and span key through value;
    /// no node is empty.
    pub fn validate(&self) -> Result<(), String> {
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            node.validate_shallow()?;
            pending.extend(node.children.iter().map(|c| c.as_ref()));
        }
        Ok(())
    }

    /// [`validate`](Self::validate) for a whole document of `len_chars`
    /// characters: the root must also span exactly `[0, len_chars)`
    pub fn validate_document(&self, len_chars: usize) -> Result<(), String> {
        if self.range != TextRange::new(0, len_chars) {
            return Err(format!(
                "root spans {} but the document is 0..{}",
                self.range, len_chars
            ));
        }
        self.validate()
    }

    fn validate_shallow(&self) -> Result<(), String> {
        if self.range.is_empty() {
            return Err(format!("{} node at {} is empty", self.kind, self.range));
        }

        match self.kind {
            NodeKind::Property => {
                let key_range = self
                    .key_range
                    .ok_or_else(|| format!("property at {} has no key range", self.range))?;
                if self.key.is_none() {
                    return Err(format!("property at {} has no key", self.range));
                }
                if self.children.len() != 1 {
                    return Err(format!(
                        "property at {} has {} children",
                        self.range,
                        self.children.len()
                    ));
                }
                let value = &self.children[0];
                if key_range.start != self.range.start || value.range.end != self.range.end {
                    return Err(format!(
                        "property at {} does not span key {} through value {}",
                        self.range, key_range, value.range
                    ));
                }
            }
            kind if kind.is_scalar() => {
                if !self.children.is_empty() {
                    return Err(format!("{} at {} has children", kind, self.range));
                }
                match self.token_range {
                    Some(token) if self.range.contains_range(token) && !token.is_empty() => {}
                    token => {
                        return Err(format!(
                            "{} at {} has token range {:?}",
                            kind, self.range, token
                        ))
                    }
                }
            }
            _ => {}
        }

        let mut previous_end = self.range.start;
        for child in &self.children {
            if !self.range.contains_range(child.range) {
                return Err(format!(
                    "child {} escapes parent {} at {}",
                    child.range, self.kind, self.range
                ));
            }
            if child.range.start < previous_end {
                return Err(format!(
                    "child {} overlaps previous sibling ending at {}",
                    child.range, previous_end
                ));
            }
            previous_end = child.range.end;
        }

        Ok(())
    }
}

/// Trees can be far deeper than the call stack allows, so children are
/// released from a worklist instead of recursively.
impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(child) = pending.pop() {
            // Shared subtrees are still owned elsewhere
            if let Ok(mut node) = Arc::try_unwrap(child) {
                pending.append(&mut node.children);
            }
        }
    }
}

/// Index path from the root to a node
///
/// This is the parent relation: a node's parent is the node at
/// `path.parent()`. Paths are only meaningful against the tree they were
/// computed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Position of this node among its siblings
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.0.split_last()?;
        Some(Self(parent.to_vec()))
    }

    /// This path followed by each ancestor, ending at the root
    pub fn self_and_ancestors(&self) -> impl Iterator<Item = NodePath> + '_ {
        (0..=self.0.len()).rev().map(|len| Self(self.0[..len].to_vec()))
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for index in &self.0 {
            write!(f, "/{}", index)?;
        }
        Ok(())
    }
}

/// A borrowed node together with its path from the root
#[derive(Debug, Clone)]
pub struct NodeRef<'a> {
    pub path: NodePath,
    pub node: &'a Node,
}
