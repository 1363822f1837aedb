//! Session model - the complete state of one outlined document
//!
//! This module contains all the state types following the Elm Architecture pattern.

pub mod document;

pub use document::{diff_change, Document, EditError, OpenError};

use std::path::PathBuf;

use crate::config::OutlineConfig;
use crate::outline::{
    DocumentChange, LineIndex, NodePath, OutlineTree, RefreshController, RefreshOutcome,
    SelectOperation, TextEdit,
};

/// One document with its outline
///
/// Everything a session toggles lives here; nothing is shared between sessions.
#[derive(Debug)]
pub struct OutlineSession {
    pub document: Document,
    pub controller: RefreshController,
    pub config: OutlineConfig,
    /// Last node revealed through a select
    pub selected: Option<NodePath>,
    /// Document version the requested refreshes account for
    ///
    /// Falls behind `document.version` when an edit is applied without a
    /// `DocumentChanged` following it.
    pub reported_version: u64,
    /// Rebuilt lazily when the document version moves on
    line_index: Option<LineIndex>,
}

impl OutlineSession {
    pub fn new(document: Document, config: OutlineConfig) -> Self {
        Self {
            reported_version: document.version,
            document,
            controller: RefreshController::new(config.parse_budget),
            config,
            selected: None,
            line_index: None,
        }
    }

    /// Open `path` with the given config
    pub fn open(path: PathBuf, config: OutlineConfig) -> Result<Self, document::OpenError> {
        Ok(Self::new(Document::from_file(path)?, config))
    }

    pub fn with_text(text: &str) -> Self {
        Self::new(Document::with_text(text), OutlineConfig::default())
    }

    /// Snapshot of the published tree for rendering
    pub fn tree(&self) -> Option<OutlineTree> {
        let root = self.controller.snapshot()?;
        Some(
            OutlineTree::new(root)
                .with_error(self.controller.error().cloned())
                .with_preview_len(self.config.preview_len),
        )
    }

    /// Line index for the current document version
    pub fn line_index(&mut self) -> &LineIndex {
        let version = self.document.version;
        if self
            .line_index
            .as_ref()
            .is_some_and(|index| index.version() != version)
        {
            tracing::trace!(version, "Line index is stale");
            self.line_index = None;
        }
        let buffer = &self.document.buffer;
        self.line_index
            .get_or_insert_with(|| LineIndex::from_rope(buffer, version))
    }

    /// Run `f` against the current tree and line index
    pub fn with_select<T>(&mut self, f: impl FnOnce(SelectOperation<'_>) -> T) -> Option<T> {
        let root = self.controller.snapshot()?;
        let lines = self.line_index();
        Some(f(SelectOperation::new(&root, lines)))
    }

    /// Commit an edit to the document
    pub fn apply_edit(&mut self, edit: &TextEdit) -> Result<DocumentChange, EditError> {
        let change = self.document.apply_edit(edit)?;
        tracing::debug!(version = change.version, range = %change.range, "Applied edit");
        Ok(change)
    }

    /// Whether the document moved on without the outline being told
    pub fn has_unreported_edits(&self) -> bool {
        self.reported_version != self.document.version
    }

    /// Finish any pending refresh synchronously
    pub fn flush(&mut self) -> Option<RefreshOutcome> {
        let text = self.document.text();
        self.controller.run(&text)
    }
}
