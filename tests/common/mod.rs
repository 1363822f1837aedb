//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use json_outline::messages::OutlineMsg;
use json_outline::model::OutlineSession;
use json_outline::outline::{
    parse, EditSummary, LineRange, Node, NodePath, OutlineChange, OutlineTree, ParseError,
};
use json_outline::runtime::{OutlineView, Runtime};

/// View that records everything the runtime tells it
#[derive(Debug, Default)]
pub struct RecordingView {
    pub changes: Vec<OutlineChange>,
    pub parse_errors: Vec<ParseError>,
    pub reveals: Vec<(NodePath, LineRange, bool)>,
    pub reports: Vec<String>,
}

impl OutlineView for RecordingView {
    fn outline_changed(&mut self, _tree: &OutlineTree, change: &OutlineChange) {
        self.changes.push(change.clone());
    }

    fn parse_failed(&mut self, error: &ParseError) {
        self.parse_errors.push(error.clone());
    }

    fn reveal(&mut self, path: &NodePath, range: LineRange, preserve_focus: bool) {
        self.reveals.push((path.clone(), range, preserve_focus));
    }

    fn report(&mut self, message: &str) {
        self.reports.push(message.to_string());
    }
}

/// Runtime over `text` with the outline already built
pub fn test_runtime(text: &str) -> Runtime<RecordingView> {
    let mut runtime = Runtime::new(OutlineSession::with_text(text), RecordingView::default());
    runtime.dispatch(OutlineMsg::Open);
    runtime
}

/// Replace chars `start..end` of `text` with `insert`
pub fn splice(text: &str, start: usize, end: usize, insert: &str) -> (String, EditSummary) {
    let chars: Vec<char> = text.chars().collect();
    let mut out: String = chars[..start].iter().collect();
    out.push_str(insert);
    out.extend(&chars[end..]);
    let summary = EditSummary {
        start,
        old_end: end,
        new_len: insert.chars().count(),
    };
    (out, summary)
}

/// Fresh parse of `text`, for comparing against incrementally maintained trees
pub fn full_parse(text: &str) -> Node {
    parse(text, 0).expect("test document should parse")
}

/// Character offset of the first occurrence of `needle`
pub fn offset_of(text: &str, needle: &str) -> usize {
    let byte = text.find(needle).expect("needle not in text");
    text[..byte].chars().count()
}

pub const SAMPLE: &str = r#"{
  "name": "outline",
  "version": 3,
  "tags": ["json", "tree", "ranges"],
  "owner": {
    "login": "octo",
    "admin": true,
    "teams": [
      {"id": 1, "members": [10, 11]},
      {"id": 2, "members": []}
    ]
  },
  "empty": {},
  "nothing": null
}"#;
