//! Selection update handlers

use super::{refresh_stale_view, settle, some};
use crate::commands::Cmd;
use crate::model::OutlineSession;
use crate::outline::{LineRange, NodePath, OutlineError, SelectOperation};

/// Reveal the node at `path`
pub fn update_select(
    session: &mut OutlineSession,
    path: NodePath,
    preserve_focus: bool,
) -> Option<Cmd> {
    let settled = settle(session);
    let result = locate(session, |select| {
        let node = select
            .root()
            .at_path(&path)
            .ok_or(OutlineError::NotFound {
                offset: select.root().range.end,
            })?;
        Ok((path.clone(), select.range_of(node)?))
    });
    some(Cmd::batch(vec![settled, reveal(session, result, preserve_focus)]))
}

/// Reveal the deepest node under (line, column)
pub fn update_select_at(
    session: &mut OutlineSession,
    line: usize,
    column: usize,
    preserve_focus: bool,
) -> Option<Cmd> {
    let settled = settle(session);
    let result = locate(session, |select| {
        let found = select.node_at(line, column)?;
        let range = select.range_of(found.node)?;
        Ok((found.path, range))
    });
    some(Cmd::batch(vec![settled, reveal(session, result, preserve_focus)]))
}

fn locate(
    session: &mut OutlineSession,
    f: impl FnOnce(SelectOperation<'_>) -> Result<(NodePath, LineRange), OutlineError>,
) -> Result<(NodePath, LineRange), OutlineError> {
    if let Some(e) = session.controller.error() {
        return Err(OutlineError::Parse(e.clone()));
    }
    session.with_select(f).unwrap_or(Err(OutlineError::NoTree))
}

fn reveal(
    session: &mut OutlineSession,
    result: Result<(NodePath, LineRange), OutlineError>,
    preserve_focus: bool,
) -> Cmd {
    match result {
        Ok((path, range)) => {
            tracing::debug!(%path, ?range, preserve_focus, "Revealing node");
            session.selected = Some(path.clone());
            Cmd::Reveal {
                path,
                range,
                preserve_focus,
            }
        }
        Err(e) if e.is_not_found() => refresh_stale_view(session, &e),
        Err(e) => Cmd::ReportError(e),
    }
}
