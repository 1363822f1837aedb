//! Offset resolution over an outline tree
//!
//! Children are sorted and disjoint, so each level is a binary search and a
//! lookup costs O(depth · log width).

use super::error::OutlineError;
use super::node::{Node, NodeKind, NodePath, NodeRef, TextRange};

/// Read-only offset queries against one tree snapshot
#[derive(Debug, Clone, Copy)]
pub struct OffsetIndex<'a> {
    root: &'a Node,
}

impl<'a> OffsetIndex<'a> {
    pub fn new(root: &'a Node) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &'a Node {
        self.root
    }

    /// Deepest node whose range contains `offset`
    ///
    /// On a boundary shared by two siblings the later sibling wins, which
    /// falls out of the ranges being right-open.
    pub fn resolve(&self, offset: usize) -> Result<NodeRef<'a>, OutlineError> {
        if !self.root.range.contains(offset) {
            return Err(OutlineError::NotFound { offset });
        }

        let mut node = self.root;
        let mut indices = Vec::new();
        while let Some(index) = child_containing(node, offset) {
            indices.push(index);
            node = node.children[index].as_ref();
        }

        Ok(NodeRef {
            path: NodePath::from(indices),
            node,
        })
    }

    /// Node at `path`, if the path is valid for this tree
    pub fn node(&self, path: &NodePath) -> Option<&'a Node> {
        self.root.at_path(path)
    }

    /// Parent of the node at `path` (None for the root)
    pub fn parent(&self, path: &NodePath) -> Option<NodeRef<'a>> {
        let parent = path.parent()?;
        let node = self.node(&parent)?;
        Some(NodeRef { path: parent, node })
    }

    /// Nearest object or array at or above `path`
    pub fn container_ancestor(&self, path: &NodePath) -> Option<NodeRef<'a>> {
        path.self_and_ancestors().find_map(|candidate| {
            let node = self.node(&candidate)?;
            node.kind.is_container().then_some(NodeRef {
                path: candidate,
                node,
            })
        })
    }

    /// Nearest container at or above `path` whose delimiters lie strictly
    /// outside `span`
    ///
    /// An edit inside such a container leaves the container's opening and
    /// closing characters untouched, so its text can be re-parsed alone.
    pub fn enclosing_container(&self, path: &NodePath, span: TextRange) -> Option<NodeRef<'a>> {
        path.self_and_ancestors().find_map(|candidate| {
            let node = self.node(&candidate)?;
            let encloses = node.kind.is_container()
                && node.range.start < span.start
                && span.end < node.range.end;
            encloses.then_some(NodeRef {
                path: candidate,
                node,
            })
        })
    }

    /// Whether the node at `path` is an element of an array
    pub fn is_array_element(&self, path: &NodePath) -> bool {
        self.parent(path)
            .is_some_and(|parent| parent.node.kind == NodeKind::Array)
    }
}

/// `(start, end)` of a node; O(1) since nodes carry their own range
pub fn range_of(node: &Node) -> (usize, usize) {
    (node.range.start, node.range.end)
}

fn child_containing(node: &Node, offset: usize) -> Option<usize> {
    let after = node
        .children
        .partition_point(|child| child.range.start <= offset);
    let index = after.checked_sub(1)?;
    node.children[index].range.contains(offset).then_some(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::parse;

    #[test]
    fn test_resolve_finds_deepest_node() {
        let root = parse(r#"{"a":[10,20]}"#, 0).unwrap();
        let index = OffsetIndex::new(&root);
        let found = index.resolve(9).unwrap();
        assert_eq!(found.node.kind, NodeKind::Number);
        assert_eq!(found.node.value.as_deref(), Some("20"));
        assert_eq!(found.path, NodePath::from(vec![0, 0, 1]));
    }

    #[test]
    fn test_resolve_separator_falls_to_container() {
        let root = parse("[1, 2]", 0).unwrap();
        let found = OffsetIndex::new(&root).resolve(2).unwrap();
        assert_eq!(found.node.kind, NodeKind::Array);
        assert!(found.path.is_root());
    }

    #[test]
    fn test_resolve_at_element_start() {
        let root = parse(r#"[[1],[2]]"#, 0).unwrap();
        // "[1]" is 1..4, "," sits at 4, "[2]" starts at 5
        let found = OffsetIndex::new(&root).resolve(5).unwrap();
        assert_eq!(found.path, NodePath::from(vec![1]));
    }

    #[test]
    fn test_resolve_out_of_range() {
        let root = parse("[1]", 0).unwrap();
        assert_eq!(
            OffsetIndex::new(&root).resolve(3).unwrap_err(),
            OutlineError::NotFound { offset: 3 }
        );
    }

    #[test]
    fn test_container_ancestor_skips_scalars_and_properties() {
        let root = parse(r#"{"x":{"y":1}}"#, 0).unwrap();
        let index = OffsetIndex::new(&root);
        let leaf = index.resolve(10).unwrap();
        assert_eq!(leaf.node.kind, NodeKind::Number);
        let container = index.container_ancestor(&leaf.path).unwrap();
        assert_eq!(container.node.kind, NodeKind::Object);
        assert_eq!(container.path, NodePath::from(vec![0, 0]));
    }

    #[test]
    fn test_enclosing_container_escalates_past_touched_delimiters() {
        let root = parse(r#"{"x":[1,2]}"#, 0).unwrap();
        let index = OffsetIndex::new(&root);
        let leaf = index.resolve(6).unwrap();
        // Replacing "1,2]" touches the array's closing bracket
        let container = index
            .enclosing_container(&leaf.path, TextRange::new(6, 10))
            .unwrap();
        assert!(container.path.is_root());
    }

    #[test]
    fn test_range_of_is_node_range() {
        let root = parse("[true]", 0).unwrap();
        assert_eq!(range_of(&root.children[0]), (1, 5));
    }
}
