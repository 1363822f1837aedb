//! Update functions for the Elm-style architecture
//!
//! All state transformations of an [`OutlineSession`] flow through
//! [`update`].

mod refresh;
mod rename;
mod select;

use crate::commands::Cmd;
use crate::messages::OutlineMsg;
use crate::model::OutlineSession;
use crate::outline::{OutlineError, RefreshOutcome, RefreshRequest};

#[cfg(debug_assertions)]
use tracing::{debug, span, Level};

pub use refresh::{
    update_close, update_document_changed, update_open, update_pump, update_refresh,
};
pub use rename::update_rename;
pub use select::{update_select, update_select_at};

/// Main update function - dispatches to sub-handlers
///
/// In debug builds, this wraps with tracing instrumentation.
#[inline]
pub fn update(session: &mut OutlineSession, msg: OutlineMsg) -> Option<Cmd> {
    #[cfg(debug_assertions)]
    {
        update_traced(session, msg)
    }
    #[cfg(not(debug_assertions))]
    {
        update_inner(session, msg)
    }
}

fn update_inner(session: &mut OutlineSession, msg: OutlineMsg) -> Option<Cmd> {
    match msg {
        OutlineMsg::Open => update_open(session),
        OutlineMsg::DocumentChanged(change) => update_document_changed(session, change),
        OutlineMsg::Refresh { anchor } => update_refresh(session, anchor),
        OutlineMsg::Pump { budget } => update_pump(session, budget),
        OutlineMsg::Rename { offset, new_name } => update_rename(session, offset, &new_name),
        OutlineMsg::Select {
            path,
            preserve_focus,
        } => update_select(session, path, preserve_focus),
        OutlineMsg::SelectAt {
            line,
            column,
            preserve_focus,
        } => update_select_at(session, line, column, preserve_focus),
        OutlineMsg::Close => update_close(session),
    }
}

/// Traced update wrapper (debug builds only)
///
/// Checks the tree's range invariants after every update that changed it.
#[cfg(debug_assertions)]
fn update_traced(session: &mut OutlineSession, msg: OutlineMsg) -> Option<Cmd> {
    let is_noisy = msg.is_noisy();
    let _span = if is_noisy {
        None
    } else {
        Some(span!(Level::DEBUG, "update", msg = ?msg).entered())
    };

    if !is_noisy {
        debug!(target: "message", ?msg, "processing");
    }

    let result = update_inner(session, msg);

    if result.as_ref().is_some_and(Cmd::needs_redraw) {
        if let Some(Err(e)) = session.controller.root().map(|root| {
            // Only a settled, successfully parsed tree has to match the text
            if session.controller.is_busy() || session.controller.error().is_some() {
                root.validate()
            } else {
                root.validate_document(session.document.len_chars())
            }
        }) {
            tracing::error!(version = session.document.version, "Outline invariant broken: {}", e);
        }
    }

    result
}

/// The caller acted on an out-of-date view; rebuild everything
fn refresh_stale_view(session: &mut OutlineSession, error: &OutlineError) -> Cmd {
    tracing::debug!("{}, scheduling full refresh", error);
    session.controller.request(RefreshRequest::Full);
    Cmd::SchedulePump
}

/// Finish any pending refresh so the tree matches the document
fn settle(session: &mut OutlineSession) -> Cmd {
    if session.has_unreported_edits() {
        tracing::debug!("Document changed behind the outline's back");
        session.reported_version = session.document.version;
        session.controller.request(RefreshRequest::Full);
    }
    if !session.controller.is_busy() {
        return Cmd::None;
    }
    tracing::debug!("Settling pending refresh before reading the tree");
    session.flush().map(outcome_cmd).unwrap_or_default()
}

fn outcome_cmd(outcome: RefreshOutcome) -> Cmd {
    match outcome {
        RefreshOutcome::Changed(change) => Cmd::NotifyRenderer(change),
        RefreshOutcome::Failed(e) => Cmd::ShowError(e),
    }
}

fn some(cmd: Cmd) -> Option<Cmd> {
    (!cmd.is_none()).then_some(cmd)
}
