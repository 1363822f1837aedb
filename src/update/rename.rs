//! Rename update handler

use super::{refresh_stale_view, settle, some};
use crate::commands::Cmd;
use crate::model::OutlineSession;
use crate::outline::{rename, OutlineError};

/// Compute the edit renaming the key or string value at `offset`
///
/// The edit is handed back as [`Cmd::ApplyEdit`]; the tree catches up once
/// the resulting document change comes in.
pub fn update_rename(session: &mut OutlineSession, offset: usize, new_name: &str) -> Option<Cmd> {
    let settled = settle(session);

    let result = match (session.controller.snapshot(), session.controller.error()) {
        (None, _) => Err(OutlineError::NoTree),
        // The published tree is older than the text
        (Some(_), Some(e)) => Err(OutlineError::Parse(e.clone())),
        (Some(root), None) => rename(&root, offset, new_name),
    };

    let cmd = match result {
        Ok(renamed) => {
            tracing::info!(path = %renamed.path, offset, new_name, "Renaming");
            Cmd::ApplyEdit(renamed.edit)
        }
        Err(e) if e.is_not_found() => refresh_stale_view(session, &e),
        Err(e) => {
            tracing::debug!("Rename rejected: {}", e);
            Cmd::ReportError(e)
        }
    };

    some(Cmd::batch(vec![settled, cmd]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::{NodeKind, TextEdit, TextRange};
    use crate::update::update_open;

    #[test]
    fn test_rename_emits_edit() {
        let mut session = OutlineSession::with_text(r#"{"a":1}"#);
        update_open(&mut session);
        assert_eq!(
            update_rename(&mut session, 2, "abc"),
            Some(Cmd::ApplyEdit(TextEdit::new(TextRange::new(1, 4), "\"abc\"")))
        );
    }

    #[test]
    fn test_rename_stale_offset_schedules_full_refresh() {
        let mut session = OutlineSession::with_text(r#"{"a":1}"#);
        update_open(&mut session);
        assert_eq!(
            update_rename(&mut session, 40, "x"),
            Some(Cmd::SchedulePump)
        );
        assert!(session.controller.is_busy());
    }

    #[test]
    fn test_rename_without_tree() {
        let mut session = OutlineSession::with_text(r#"{"a":1}"#);
        assert_eq!(
            update_rename(&mut session, 2, "x"),
            Some(Cmd::ReportError(OutlineError::NoTree))
        );
    }

    #[test]
    fn test_rename_reports_non_renamable() {
        let mut session = OutlineSession::with_text(r#"{"a":1}"#);
        update_open(&mut session);
        assert_eq!(
            update_rename(&mut session, 5, "x"),
            Some(Cmd::ReportError(OutlineError::NotRenamable {
                offset: 5,
                kind: NodeKind::Number
            }))
        );
    }

    #[test]
    fn test_rename_settles_pending_edit_first() {
        let mut session = OutlineSession::with_text(r#"{"a":1,"b":2}"#);
        update_open(&mut session);
        let change = session
            .apply_edit(&TextEdit::new(TextRange::new(1, 4), "\"long\""))
            .unwrap();
        crate::update::update_document_changed(&mut session, change);

        // "b" moved from 7..10 to 10..13
        let cmd = update_rename(&mut session, 11, "c").unwrap();
        match cmd {
            Cmd::Batch(cmds) => {
                assert!(matches!(cmds[0], Cmd::NotifyRenderer(_)));
                assert_eq!(
                    cmds[1],
                    Cmd::ApplyEdit(TextEdit::new(TextRange::new(10, 13), "\"c\""))
                );
            }
            other => panic!("expected batch, got {:?}", other),
        }
    }
}
