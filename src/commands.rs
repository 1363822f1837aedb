//! Command types for the Elm-style architecture
//!
//! Commands represent side effects that should be performed after an update.

use crate::outline::{LineRange, NodePath, OutlineChange, OutlineError, ParseError, TextEdit};

/// Commands returned by update functions
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cmd {
    /// No command - do nothing
    #[default]
    None,
    /// The tree changed; re-query from the given node down
    NotifyRenderer(OutlineChange),
    /// The last full parse failed and the previous tree is still shown
    ShowError(ParseError),
    /// An operation failed
    ReportError(OutlineError),
    /// Commit an edit to the document
    ApplyEdit(TextEdit),
    /// Highlight a range in the document view
    Reveal {
        path: NodePath,
        range: LineRange,
        preserve_focus: bool,
    },
    /// A refresh is pending; send `OutlineMsg::Pump` when idle
    SchedulePump,
    /// Execute multiple commands
    Batch(Vec<Cmd>),
}

impl Cmd {
    /// Create a batch of commands, flattening trivial cases
    pub fn batch(cmds: Vec<Cmd>) -> Self {
        let mut cmds: Vec<Cmd> = cmds.into_iter().filter(|c| !c.is_none()).collect();
        match cmds.len() {
            0 => Cmd::None,
            1 => cmds.remove(0),
            _ => Cmd::Batch(cmds),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Cmd::None)
    }

    /// Whether the renderer has to re-query the tree
    pub fn needs_redraw(&self) -> bool {
        match self {
            Cmd::NotifyRenderer(_) | Cmd::ShowError(_) => true,
            Cmd::Batch(cmds) => cmds.iter().any(Cmd::needs_redraw),
            Cmd::None
            | Cmd::ReportError(_)
            | Cmd::ApplyEdit(_)
            | Cmd::Reveal { .. }
            | Cmd::SchedulePump => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_flattens() {
        assert_eq!(Cmd::batch(vec![]), Cmd::None);
        assert_eq!(Cmd::batch(vec![Cmd::None, Cmd::SchedulePump]), Cmd::SchedulePump);
        assert!(matches!(
            Cmd::batch(vec![Cmd::SchedulePump, Cmd::NotifyRenderer(OutlineChange::Root)]),
            Cmd::Batch(ref cmds) if cmds.len() == 2
        ));
    }

    #[test]
    fn test_needs_redraw() {
        assert!(Cmd::NotifyRenderer(OutlineChange::Root).needs_redraw());
        assert!(!Cmd::SchedulePump.needs_redraw());
        assert!(Cmd::Batch(vec![Cmd::SchedulePump, Cmd::ShowError(ParseError::new(0, "x"))])
            .needs_redraw());
    }
}
