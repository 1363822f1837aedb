//! Keeps the outline tree in sync with the document
//!
//! ## Scoping
//!
//! A refresh either re-parses the whole document or only the nearest
//! container around the anchor. Scalars can't be re-parsed alone (they need
//! their delimiters), so the smallest unit is an object or array. For an edit
//! the container must enclose the edited span strictly inside its
//! delimiters; otherwise the search moves up. Anchoring at the root is a full
//! refresh.
//!
//! A scoped parse that fails means the span is no longer self-contained
//! (bracket balance changed across its boundary); the controller falls back
//! to a full parse instead of attaching anything.
//!
//! ## Cooperative parsing
//!
//! ```text
//! request(R1) → poll → ParseJob yields → request(R2) → R1 dropped
//!             → poll … → Complete(outcome of R2)
//! ```
//!
//! Requests coalesce: only the newest is honored. The tree is only replaced
//! once a parse completes, and a closed controller never reports anything.

use std::sync::Arc;

use super::edit::EditSummary;
use super::error::ParseError;
use super::index::OffsetIndex;
use super::node::{shift_offset, Node, NodePath, TextRange};
use super::parser::{ParseJob, ParseStep};

/// Default number of sibling values parsed per cooperative step
pub const DEFAULT_PARSE_BUDGET: usize = 256;

/// What to rebuild
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshRequest {
    /// Re-parse the whole document
    Full,
    /// Re-parse the smallest container around `offset`
    Anchored {
        offset: usize,
        /// The edit that prompted the refresh, if any
        edit: Option<EditSummary>,
    },
}

impl RefreshRequest {
    pub fn from_anchor(anchor: Option<usize>) -> Self {
        match anchor {
            Some(offset) => RefreshRequest::Anchored { offset, edit: None },
            None => RefreshRequest::Full,
        }
    }

    pub fn for_edit(edit: EditSummary) -> Self {
        RefreshRequest::Anchored {
            offset: edit.start,
            edit: Some(edit),
        }
    }

    /// Whether dropping this request unserved could leave the tree behind
    /// the text (an unseen edit, or a full rebuild asked for a reason)
    fn is_lossy_to_drop(&self) -> bool {
        matches!(
            self,
            RefreshRequest::Full | RefreshRequest::Anchored { edit: Some(_), .. }
        )
    }
}

/// Change signal for the renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutlineChange {
    /// The whole tree was replaced
    Root,
    /// The subtree at `path` was rebuilt
    Subtree { path: NodePath, range: TextRange },
}

/// How a completed refresh ended
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Changed(OutlineChange),
    /// Full parse failed; the previous tree is still published
    Failed(ParseError),
}

/// Result of one cooperative [`RefreshController::poll`]
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshPoll {
    /// Nothing requested
    Idle,
    /// Work remains; poll again
    Pending,
    Complete(RefreshOutcome),
}

#[derive(Debug, Clone)]
enum Scope {
    Full,
    Subtree {
        path: NodePath,
        old_range: TextRange,
        delta: isize,
        /// Containers enclosing the re-parsed one
        depth: usize,
    },
}

#[derive(Debug)]
struct InFlight {
    request: RefreshRequest,
    scope: Scope,
    job: ParseJob,
}

/// Owner of the current tree for one document session
#[derive(Debug)]
pub struct RefreshController {
    root: Option<Arc<Node>>,
    error: Option<ParseError>,
    pending: Option<RefreshRequest>,
    in_flight: Option<InFlight>,
    budget: usize,
    closed: bool,
}

impl Default for RefreshController {
    fn default() -> Self {
        Self::new(DEFAULT_PARSE_BUDGET)
    }
}

impl RefreshController {
    pub fn new(budget: usize) -> Self {
        Self {
            root: None,
            error: None,
            pending: None,
            in_flight: None,
            budget: budget.max(1),
            closed: false,
        }
    }

    /// Current tree, if one has been built
    pub fn root(&self) -> Option<&Node> {
        self.root.as_deref()
    }

    /// Cheap handle on the current tree; later refreshes never alter it
    pub fn snapshot(&self) -> Option<Arc<Node>> {
        self.root.clone()
    }

    /// Error from the most recent full parse, if it failed
    pub fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    /// Whether a request is queued or being parsed
    pub fn is_busy(&self) -> bool {
        self.pending.is_some() || self.in_flight.is_some()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn set_budget(&mut self, budget: usize) {
        self.budget = budget.max(1);
    }

    /// Build the tree for a freshly opened document
    pub fn open(&mut self, text: &str) -> Option<RefreshOutcome> {
        self.closed = false;
        self.root = None;
        self.error = None;
        self.in_flight = None;
        self.pending = None;
        self.refresh(text, None)
    }

    /// Abandon all work and drop the tree
    pub fn close(&mut self) {
        if self.in_flight.is_some() {
            tracing::debug!("Abandoning in-flight refresh on close");
        }
        self.closed = true;
        self.in_flight = None;
        self.pending = None;
        self.root = None;
        self.error = None;
    }

    /// Queue a refresh, superseding anything not yet finished
    ///
    /// If a superseded request carried an edit (or was itself a full
    /// refresh), the tree never caught up with the text, so the surviving
    /// request is widened to a full refresh.
    pub fn request(&mut self, request: RefreshRequest) {
        if self.closed {
            tracing::debug!(?request, "Ignoring refresh request on closed outline");
            return;
        }

        let widen = self
            .pending
            .as_ref()
            .is_some_and(RefreshRequest::is_lossy_to_drop)
            || self
                .in_flight
                .as_ref()
                .is_some_and(|f| f.request.is_lossy_to_drop());

        if self.pending.is_some() || self.in_flight.is_some() {
            tracing::debug!(?request, widen, "Coalescing refresh request");
        }

        self.in_flight = None;
        self.pending = Some(if widen {
            RefreshRequest::Full
        } else {
            request
        });
    }

    /// Request and run a refresh to completion
    ///
    /// `None` re-parses everything; `Some(offset)` rebuilds the nearest
    /// container around `offset`.
    pub fn refresh(&mut self, text: &str, anchor: Option<usize>) -> Option<RefreshOutcome> {
        self.request(RefreshRequest::from_anchor(anchor));
        self.run(text)
    }

    /// Drive pending work to completion
    pub fn run(&mut self, text: &str) -> Option<RefreshOutcome> {
        loop {
            match self.poll(text) {
                RefreshPoll::Idle => return None,
                RefreshPoll::Pending => {}
                RefreshPoll::Complete(outcome) => return Some(outcome),
            }
        }
    }

    /// Do one budget's worth of parsing
    ///
    /// `text` must be the current document text; it is only read when a
    /// queued request starts.
    pub fn poll(&mut self, text: &str) -> RefreshPoll {
        if self.closed {
            return RefreshPoll::Idle;
        }

        let in_flight = match self.in_flight.take() {
            Some(in_flight) => in_flight,
            None => match self.pending.take() {
                Some(request) => self.start(request, text),
                None => return RefreshPoll::Idle,
            },
        };

        let InFlight {
            request,
            scope,
            job,
        } = in_flight;

        match job.step(self.budget) {
            ParseStep::Yielded(job) => {
                self.in_flight = Some(InFlight {
                    request,
                    scope,
                    job,
                });
                RefreshPoll::Pending
            }
            ParseStep::Done(result) => self.finish(request, scope, result, text),
        }
    }

    fn start(&self, request: RefreshRequest, text: &str) -> InFlight {
        let scope = self.scope_for(&request, text);
        let job = match &scope {
            Scope::Full => ParseJob::new(text, 0),
            Scope::Subtree {
                old_range,
                delta,
                depth,
                ..
            } => {
                let start = old_range.start;
                let len = shift_offset(old_range.len(), *delta);
                let span: String = text.chars().skip(start).take(len).collect();
                ParseJob::scoped(&span, start, *depth)
            }
        };

        tracing::debug!(?request, ?scope, "Starting refresh");
        InFlight {
            request,
            scope,
            job,
        }
    }

    fn scope_for(&self, request: &RefreshRequest, text: &str) -> Scope {
        let RefreshRequest::Anchored { offset, edit } = request else {
            return Scope::Full;
        };

        // A failed full parse leaves a tree older than the text
        let Some(root) = self.root.as_deref().filter(|_| self.error.is_none()) else {
            return Scope::Full;
        };

        let index = OffsetIndex::new(root);
        let anchor = match index.resolve(*offset) {
            Ok(anchor) => anchor,
            Err(e) => {
                tracing::debug!("Anchor unresolved ({}), refreshing everything", e);
                return Scope::Full;
            }
        };

        let (container, delta) = match edit {
            Some(edit) => (
                index.enclosing_container(&anchor.path, edit.old_range()),
                edit.delta(),
            ),
            None => (index.container_ancestor(&anchor.path), 0),
        };

        let Some(container) = container.filter(|c| !c.path.is_root()) else {
            return Scope::Full;
        };

        let new_end = shift_offset(container.node.range.end, delta);
        if new_end > text.chars().count() || new_end <= container.node.range.start {
            return Scope::Full;
        }

        Scope::Subtree {
            depth: containers_above(root, &container.path),
            path: container.path,
            old_range: container.node.range,
            delta,
        }
    }

    fn finish(
        &mut self,
        request: RefreshRequest,
        scope: Scope,
        result: Result<Node, ParseError>,
        text: &str,
    ) -> RefreshPoll {
        match (scope, result) {
            (Scope::Full, Ok(node)) => {
                tracing::debug!(nodes = node.subtree_len(), "Full refresh complete");
                self.root = Some(Arc::new(node));
                self.error = None;
                RefreshPoll::Complete(RefreshOutcome::Changed(OutlineChange::Root))
            }
            (Scope::Full, Err(e)) => {
                tracing::warn!("Parse failed, keeping previous outline: {}", e);
                self.error = Some(e.clone());
                RefreshPoll::Complete(RefreshOutcome::Failed(e))
            }
            (
                Scope::Subtree {
                    path,
                    old_range,
                    delta,
                    ..
                },
                Ok(node),
            ) => {
                let range = node.range;
                if let Some(root) = self.root.as_mut() {
                    graft(root, path.indices(), node, delta);
                    tracing::debug!(%path, %old_range, %range, delta, "Grafted subtree");
                    return RefreshPoll::Complete(RefreshOutcome::Changed(
                        OutlineChange::Subtree { path, range },
                    ));
                }
                self.fall_back(request, text)
            }
            (Scope::Subtree { path, .. }, Err(e)) => {
                tracing::debug!(%path, "Scoped re-parse failed ({}), falling back to full", e);
                self.fall_back(request, text)
            }
        }
    }

    fn fall_back(&mut self, request: RefreshRequest, text: &str) -> RefreshPoll {
        self.in_flight = Some(InFlight {
            request,
            scope: Scope::Full,
            job: ParseJob::new(text, 0),
        });
        RefreshPoll::Pending
    }
}

fn containers_above(root: &Node, path: &NodePath) -> usize {
    let mut node = root;
    let mut count = 0;
    for &index in path.indices() {
        if node.kind.is_container() {
            count += 1;
        }
        match node.child(index) {
            Some(child) => node = child,
            None => break,
        }
    }
    count
}

/// Replace the node at `path` with `replacement`
///
/// Every ancestor's end and every node after the old subtree moves by
/// `delta`. Nodes along the path are mutated in place when nothing else
/// holds them, so untouched ancestors keep their identity.
fn graft(slot: &mut Arc<Node>, path: &[usize], replacement: Node, delta: isize) {
    let Some((&index, rest)) = path.split_first() else {
        *slot = Arc::new(replacement);
        return;
    };

    let node = Arc::make_mut(slot);
    if delta != 0 {
        node.range.end = shift_offset(node.range.end, delta);
        for later in node.children.iter_mut().skip(index + 1) {
            Arc::make_mut(later).shift(delta);
        }
    }
    if let Some(child) = node.children.get_mut(index) {
        graft(child, rest, replacement, delta);
    }
}
