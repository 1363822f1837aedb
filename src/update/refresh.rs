//! Refresh update handlers

use super::{outcome_cmd, some};
use crate::commands::Cmd;
use crate::model::OutlineSession;
use crate::outline::{DocumentChange, RefreshPoll, RefreshRequest};

/// Build the tree for the session's document
pub fn update_open(session: &mut OutlineSession) -> Option<Cmd> {
    session.controller.set_budget(session.config.parse_budget);
    session.selected = None;
    session.reported_version = session.document.version;
    let text = session.document.text();
    session.controller.open(&text).map(outcome_cmd)
}

/// Queue a refresh around `anchor`, or of everything
///
/// An anchored refresh assumes the text outside the anchor's container is
/// what the tree was built from; after an unreported edit that no longer
/// holds and everything is re-parsed.
pub fn update_refresh(session: &mut OutlineSession, anchor: Option<usize>) -> Option<Cmd> {
    let refresh = if anchor.is_some() && session.has_unreported_edits() {
        tracing::debug!(
            reported_version = session.reported_version,
            document_version = session.document.version,
            "Refresh after unreported edits"
        );
        RefreshRequest::Full
    } else {
        RefreshRequest::from_anchor(anchor)
    };
    session.reported_version = session.document.version;
    request(session, refresh)
}

/// Queue a refresh for an edit the document owner already applied
pub fn update_document_changed(session: &mut OutlineSession, change: DocumentChange) -> Option<Cmd> {
    let refresh = if change.version == session.document.version {
        RefreshRequest::for_edit(change.summary())
    } else {
        // Some change was never reported; the edit alone can't place the subtree
        tracing::debug!(
            change_version = change.version,
            document_version = session.document.version,
            "Out-of-order document change"
        );
        RefreshRequest::Full
    };
    session.reported_version = session.document.version;
    request(session, refresh)
}

pub(super) fn request(session: &mut OutlineSession, request: RefreshRequest) -> Option<Cmd> {
    if session.controller.is_closed() {
        return None;
    }
    session.controller.request(request);
    Some(Cmd::SchedulePump)
}

/// Run one cooperative step of the pending refresh
pub fn update_pump(session: &mut OutlineSession, budget: Option<usize>) -> Option<Cmd> {
    if !session.controller.is_busy() {
        return None;
    }
    session
        .controller
        .set_budget(budget.unwrap_or(session.config.parse_budget));

    let text = session.document.text();
    match session.controller.poll(&text) {
        RefreshPoll::Idle => None,
        RefreshPoll::Pending => Some(Cmd::SchedulePump),
        RefreshPoll::Complete(outcome) => some(outcome_cmd(outcome)),
    }
}

/// Abandon everything; no notification follows
pub fn update_close(session: &mut OutlineSession) -> Option<Cmd> {
    session.controller.close();
    session.selected = None;
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::{OutlineChange, TextEdit, TextRange};

    fn pump_until_done(session: &mut OutlineSession) -> Option<Cmd> {
        loop {
            match update_pump(session, Some(1)) {
                Some(Cmd::SchedulePump) => continue,
                other => return other,
            }
        }
    }

    #[test]
    fn test_open_notifies_root() {
        let mut session = OutlineSession::with_text(r#"{"a":[1,2]}"#);
        assert_eq!(
            update_open(&mut session),
            Some(Cmd::NotifyRenderer(OutlineChange::Root))
        );
        assert!(session.tree().is_some());
    }

    #[test]
    fn test_document_change_schedules_pump() {
        let mut session = OutlineSession::with_text(r#"{"a":[1,2]}"#);
        update_open(&mut session);

        let change = session
            .apply_edit(&TextEdit::new(TextRange::new(6, 7), "5"))
            .unwrap();
        assert_eq!(
            update_document_changed(&mut session, change),
            Some(Cmd::SchedulePump)
        );
        assert!(matches!(
            pump_until_done(&mut session),
            Some(Cmd::NotifyRenderer(OutlineChange::Subtree { .. }))
        ));
    }

    #[test]
    fn test_stale_version_refreshes_everything() {
        let mut session = OutlineSession::with_text(r#"{"a":[1,2]}"#);
        update_open(&mut session);

        let first = session
            .apply_edit(&TextEdit::new(TextRange::new(6, 7), "5"))
            .unwrap();
        session
            .apply_edit(&TextEdit::new(TextRange::new(8, 9), "6"))
            .unwrap();
        update_document_changed(&mut session, first);
        assert_eq!(
            pump_until_done(&mut session),
            Some(Cmd::NotifyRenderer(OutlineChange::Root))
        );
    }

    #[test]
    fn test_anchored_refresh_after_unreported_edit_is_full() {
        let mut session = OutlineSession::with_text(r#"{"a":[1, 22] ,"b":1}"#);
        update_open(&mut session);

        session
            .apply_edit(&TextEdit::new(TextRange::new(9, 11), "2"))
            .unwrap();
        assert!(session.has_unreported_edits());
        assert_eq!(update_refresh(&mut session, Some(8)), Some(Cmd::SchedulePump));
        assert!(!session.has_unreported_edits());
        assert_eq!(
            pump_until_done(&mut session),
            Some(Cmd::NotifyRenderer(OutlineChange::Root))
        );

        let root = session.controller.root().unwrap();
        assert!(root.validate_document(session.document.len_chars()).is_ok());
    }

    #[test]
    fn test_close_drops_pending_work() {
        let mut session = OutlineSession::with_text("[1,2,3]");
        update_open(&mut session);
        session.controller.request(RefreshRequest::Full);

        assert_eq!(update_close(&mut session), None);
        assert_eq!(update_pump(&mut session, None), None);
        assert!(session.tree().is_none());
    }
}
