//! End-to-end runtime behavior: interleaving, coalescing, failure, close

mod common;

use common::{full_parse, offset_of, test_runtime, RecordingView, SAMPLE};
use json_outline::messages::OutlineMsg;
use json_outline::model::OutlineSession;
use json_outline::outline::{OutlineChange, RefreshRequest, TextEdit, TextRange};
use json_outline::runtime::Runtime;

fn slow_runtime(text: &str) -> Runtime<RecordingView> {
    let mut session = OutlineSession::with_text(text);
    session.config.parse_budget = 1;
    let mut runtime = Runtime::new(session, RecordingView::default());
    runtime.dispatch(OutlineMsg::Open);
    runtime.view.changes.clear();
    runtime
}

fn steps_until_idle(runtime: &mut Runtime<RecordingView>) -> usize {
    let mut steps = 0;
    while runtime.step() {
        steps += 1;
    }
    steps
}

#[test]
fn test_open_notifies_root_once() {
    let runtime = test_runtime(SAMPLE);
    assert_eq!(runtime.view.changes, vec![OutlineChange::Root]);
    assert!(runtime.is_idle());
    assert_eq!(
        runtime.session.controller.root().unwrap(),
        &full_parse(SAMPLE)
    );
}

#[test]
fn test_open_invalid_document_reports_error() {
    let runtime = test_runtime("{\"a\": }");
    assert!(runtime.view.changes.is_empty());
    assert_eq!(runtime.view.parse_errors.len(), 1);
    assert_eq!(runtime.view.parse_errors[0].offset, 6);
    assert!(runtime.session.tree().is_none());
}

#[test]
fn test_full_refresh_is_spread_over_pumps() {
    let mut runtime = slow_runtime(SAMPLE);
    runtime.send(OutlineMsg::Refresh { anchor: None });

    let steps = steps_until_idle(&mut runtime);
    assert!(steps > 10, "only {} steps", steps);
    assert_eq!(runtime.view.changes, vec![OutlineChange::Root]);
}

#[test]
fn test_messages_interleave_with_pumps() {
    let mut runtime = slow_runtime(SAMPLE);
    runtime.send(OutlineMsg::Refresh { anchor: None });
    runtime.step();
    runtime.step();
    assert!(runtime.session.controller.is_busy());

    // A second request while the first is mid-parse replaces it
    runtime.send(OutlineMsg::Refresh {
        anchor: Some(offset_of(SAMPLE, "\"octo\"")),
    });
    runtime.run_until_idle();

    assert_eq!(runtime.view.changes, vec![OutlineChange::Root]);
    assert!(!runtime.session.controller.is_busy());
}

#[test]
fn test_close_mid_refresh_drops_notification() {
    let mut runtime = slow_runtime(SAMPLE);
    runtime.send(OutlineMsg::Refresh { anchor: None });
    runtime.step();
    runtime.step();
    assert!(runtime.session.controller.is_busy());

    runtime.send(OutlineMsg::Close);
    runtime.run_until_idle();

    assert!(runtime.view.changes.is_empty());
    assert!(runtime.session.controller.is_closed());
    assert!(runtime.session.tree().is_none());

    // Changes after close are ignored
    runtime.send(OutlineMsg::Refresh { anchor: None });
    runtime.run_until_idle();
    assert!(runtime.view.changes.is_empty());
}

#[test]
fn test_reopen_after_close() {
    let mut runtime = test_runtime(SAMPLE);
    runtime.dispatch(OutlineMsg::Close);
    runtime.dispatch(OutlineMsg::Open);
    assert_eq!(
        runtime.view.changes,
        vec![OutlineChange::Root, OutlineChange::Root]
    );
    assert!(runtime.session.tree().is_some());
}

#[test]
fn test_stale_change_forces_full_refresh() {
    let mut runtime = test_runtime(SAMPLE);
    runtime.view.changes.clear();
    let at = offset_of(SAMPLE, "\"octo\"") + 1;

    let first = runtime
        .session
        .apply_edit(&TextEdit::new(TextRange::new(at, at), "x"))
        .unwrap();
    runtime
        .session
        .apply_edit(&TextEdit::new(TextRange::new(at, at), "y"))
        .unwrap();

    // The first change arrives after the document moved on
    runtime.dispatch(OutlineMsg::DocumentChanged(first));

    let text = runtime.session.document.text();
    assert!(text.contains("\"yxocto\""));
    assert_eq!(runtime.view.changes, vec![OutlineChange::Root]);
    assert_eq!(runtime.session.controller.root().unwrap(), &full_parse(&text));
}

#[test]
fn test_edits_while_invalid_keep_last_good_tree() {
    let mut runtime = test_runtime(SAMPLE);
    let good = runtime.session.controller.snapshot().unwrap();

    // Unterminate the "octo" string
    let at = offset_of(SAMPLE, "\"octo\"") + 5;
    let change = runtime
        .session
        .apply_edit(&TextEdit::new(TextRange::new(at, at + 1), ""))
        .unwrap();
    runtime.dispatch(OutlineMsg::DocumentChanged(change));

    assert_eq!(runtime.view.parse_errors.len(), 1);
    let tree = runtime.session.tree().unwrap();
    assert!(tree.error().is_some());
    assert_eq!(tree.root(), good.as_ref());

    // Operations refuse to run against the stale tree
    runtime.dispatch(OutlineMsg::Rename {
        offset: offset_of(SAMPLE, "\"name\""),
        new_name: "title".to_string(),
    });
    assert_eq!(runtime.view.reports.len(), 1);
    assert!(!runtime.session.document.text().contains("title"));

    // Restoring the quote recovers
    let change = runtime
        .session
        .apply_edit(&TextEdit::new(TextRange::new(at, at), "\""))
        .unwrap();
    runtime.dispatch(OutlineMsg::DocumentChanged(change));

    assert_eq!(runtime.session.document.text(), SAMPLE);
    assert!(runtime.session.controller.error().is_none());
    assert_eq!(
        runtime.session.controller.root().unwrap(),
        &full_parse(SAMPLE)
    );
}

#[test]
fn test_pump_budget_override() {
    let mut runtime = slow_runtime(SAMPLE);
    runtime.session.controller.request(RefreshRequest::Full);
    runtime.send(OutlineMsg::Pump {
        budget: Some(usize::MAX),
    });

    // One pump finishes the whole parse
    assert!(runtime.step());
    assert_eq!(runtime.view.changes, vec![OutlineChange::Root]);
    assert!(runtime.is_idle());
}
