//! Headless runtime - executes commands for one outline session
//!
//! Messages are queued and handled one at a time. A pending refresh re-queues
//! itself as a `Pump` after whatever is already waiting, so long parses
//! interleave with other messages instead of blocking them.

use std::collections::VecDeque;

use crate::commands::Cmd;
use crate::messages::OutlineMsg;
use crate::model::OutlineSession;
use crate::outline::{LineRange, NodePath, OutlineChange, OutlineTree, ParseError};
use crate::update::update;

/// Receives the effects of outline updates
pub trait OutlineView {
    /// The tree changed; re-query from the node named by `change`
    fn outline_changed(&mut self, tree: &OutlineTree, change: &OutlineChange);

    fn parse_failed(&mut self, _error: &ParseError) {}

    /// Highlight `range`, keeping focus where it is if asked to
    fn reveal(&mut self, _path: &NodePath, _range: LineRange, _preserve_focus: bool) {}

    fn report(&mut self, _message: &str) {}
}

/// Message loop around a session and its view
pub struct Runtime<V> {
    pub session: OutlineSession,
    pub view: V,
    queue: VecDeque<OutlineMsg>,
}

impl<V: OutlineView> Runtime<V> {
    pub fn new(session: OutlineSession, view: V) -> Self {
        Self {
            session,
            view,
            queue: VecDeque::new(),
        }
    }

    /// Queue a message without handling it
    pub fn send(&mut self, msg: OutlineMsg) {
        self.queue.push_back(msg);
    }

    /// Queue a message and handle everything until the queue is empty
    pub fn dispatch(&mut self, msg: OutlineMsg) {
        self.send(msg);
        self.run_until_idle();
    }

    /// Handle one queued message; false if there was none
    pub fn step(&mut self) -> bool {
        let Some(msg) = self.queue.pop_front() else {
            return false;
        };
        self.handle(msg);
        true
    }

    fn handle(&mut self, msg: OutlineMsg) {
        if let Some(cmd) = update(&mut self.session, msg) {
            self.process_cmd(cmd);
        }
    }

    pub fn run_until_idle(&mut self) {
        while self.step() {}
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    fn process_cmd(&mut self, cmd: Cmd) {
        match cmd {
            Cmd::None => {}
            Cmd::NotifyRenderer(change) => {
                if let Some(tree) = self.session.tree() {
                    self.view.outline_changed(&tree, &change);
                }
            }
            Cmd::ShowError(error) => self.view.parse_failed(&error),
            Cmd::ReportError(error) => self.view.report(&error.to_string()),
            // The change is handled right away so that queued messages never
            // see the new text with a controller unaware of it
            Cmd::ApplyEdit(edit) => match self.session.apply_edit(&edit) {
                Ok(change) => self.handle(OutlineMsg::DocumentChanged(change)),
                Err(e) => {
                    tracing::warn!("Failed to apply edit: {}", e);
                    self.view.report(&e.to_string());
                }
            },
            Cmd::Reveal {
                path,
                range,
                preserve_focus,
            } => self.view.reveal(&path, range, preserve_focus),
            Cmd::SchedulePump => self.send(OutlineMsg::Pump { budget: None }),
            Cmd::Batch(cmds) => {
                for cmd in cmds {
                    self.process_cmd(cmd);
                }
            }
        }
    }
}
