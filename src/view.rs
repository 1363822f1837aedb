//! Text and JSON renderings of an outline

use serde::Serialize;

use crate::outline::{NodePath, OutlineItem, OutlineTree};

const INDENT: &str = "  ";

/// One row with its expanded children, for JSON output
#[derive(Debug, Clone, Serialize)]
pub struct OutlineEntry {
    #[serde(flatten)]
    pub item: OutlineItem,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<OutlineEntry>,
}

/// Every row under `path`, fully expanded
pub fn entries(tree: &OutlineTree, path: &NodePath) -> Vec<OutlineEntry> {
    tree.items(path)
        .into_iter()
        .map(|item| OutlineEntry {
            children: if item.expandable {
                entries(tree, &item.path)
            } else {
                Vec::new()
            },
            item,
        })
        .collect()
}

/// Indented outline, one row per line: label, kind and character range
pub fn render_text(tree: &OutlineTree) -> String {
    let mut out = String::new();
    if let Some(error) = tree.error() {
        out.push_str(&format!("! {}\n", error));
    }

    let root = tree.root();
    let label = tree.label(&NodePath::root()).unwrap_or_default();
    out.push_str(&format!("{}  {}  {}\n", label, root.kind, root.range));
    render_rows(&mut out, &entries(tree, &NodePath::root()), 1);
    out
}

fn render_rows(out: &mut String, rows: &[OutlineEntry], depth: usize) {
    for row in rows {
        let kind = row.item.value_kind.unwrap_or(row.item.kind);
        out.push_str(&format!(
            "{}{}  {}  {}\n",
            INDENT.repeat(depth),
            row.item.label,
            kind,
            row.item.range
        ));
        render_rows(out, &row.children, depth + 1);
    }
}

/// Pretty-printed JSON of the expanded outline
pub fn render_json(tree: &OutlineTree) -> Result<String, serde_json::Error> {
    #[derive(Serialize)]
    struct Document<'a> {
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        label: String,
        kind: crate::outline::NodeKind,
        range: crate::outline::TextRange,
        children: &'a [OutlineEntry],
    }

    let root = tree.root();
    let children = entries(tree, &NodePath::root());
    serde_json::to_string_pretty(&Document {
        error: tree.error().map(ToString::to_string),
        label: tree.label(&NodePath::root()).unwrap_or_default(),
        kind: root.kind,
        range: root.range,
        children: &children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::parse;
    use std::sync::Arc;

    fn tree(text: &str) -> OutlineTree {
        OutlineTree::new(Arc::new(parse(text, 0).unwrap()))
    }

    #[test]
    fn test_render_text_indents_children() {
        let text = render_text(&tree(r#"{"a":{"b":true},"c":[1]}"#));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "object (2)  object  0..24",
                "  a  object  1..15",
                "    b  boolean  6..14",
                "  c  array  16..23",
                "    0  number  21..22",
            ]
        );
    }

    #[test]
    fn test_render_json_nests_children() {
        let json = render_json(&tree(r#"[[1]]"#)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["kind"], "array");
        assert_eq!(value["children"][0]["label"], "0");
        assert_eq!(value["children"][0]["children"][0]["kind"], "number");
        assert!(value.get("error").is_none());
    }
}
