//! Monkey tests - random edit sequences against a full re-parse
//!
//! Edits go through the runtime like an editor would send them, or land
//! unreported before a refresh request. Whenever the text is valid JSON, the
//! incrementally maintained tree must equal a fresh parse and span the whole
//! document; whenever it isn't, the last good tree stays published with an
//! error marker.

mod common;

use common::{RecordingView, SAMPLE};
use json_outline::messages::OutlineMsg;
use json_outline::model::OutlineSession;
use json_outline::outline::{parse, NodePath, TextEdit, TextRange};
use json_outline::runtime::Runtime;

/// Small deterministic generator so failures reproduce
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next() % n.max(1) as u64) as usize
    }
}

const FRAGMENTS: &[&str] = &[
    "1",
    "0",
    " ",
    "\n",
    ",",
    "\"k\": 7, ",
    "\"é\"",
    "[]",
    "{}",
    "]",
    "}",
    "\"",
    "true",
    "null, ",
];

fn random_edit(rng: &mut Lcg, len: usize) -> TextEdit {
    let start = rng.below(len + 1);
    let end = (start + rng.below(4)).min(len);
    let replacement = if rng.below(3) == 0 {
        ""
    } else {
        FRAGMENTS[rng.below(FRAGMENTS.len())]
    };
    TextEdit::new(TextRange::new(start, end), replacement)
}

fn runtime_with_budget(text: &str, budget: usize) -> Runtime<RecordingView> {
    let mut session = OutlineSession::with_text(text);
    session.config.parse_budget = budget;
    let mut runtime = Runtime::new(session, RecordingView::default());
    runtime.dispatch(OutlineMsg::Open);
    runtime
}

fn check_consistent(runtime: &Runtime<RecordingView>, step: usize) {
    let text = runtime.session.document.text();
    let controller = &runtime.session.controller;
    match parse(&text, 0) {
        Ok(expected) => {
            assert!(
                controller.error().is_none(),
                "step {}: stale error on valid text {:?}",
                step,
                text
            );
            assert_eq!(
                controller.root().unwrap(),
                &expected,
                "step {}: tree diverged for {:?}",
                step,
                text
            );
            let len = runtime.session.document.len_chars();
            if let Err(e) = controller.root().unwrap().validate_document(len) {
                panic!("step {}: {} for {:?}", step, e, text);
            }
        }
        Err(_) => assert!(
            controller.error().is_some() || controller.root().is_none(),
            "step {}: invalid text published without error: {:?}",
            step,
            text
        ),
    }
}

#[test]
fn test_random_edits_match_full_parse() {
    for seed in [1u64, 7, 42, 2024] {
        let mut rng = Lcg(seed);
        let mut runtime = runtime_with_budget(SAMPLE, 4);

        for step in 0..200 {
            let len = runtime.session.document.len_chars();
            let edit = random_edit(&mut rng, len);
            let change = runtime.session.apply_edit(&edit).unwrap();
            runtime.dispatch(OutlineMsg::DocumentChanged(change));
            check_consistent(&runtime, step);
        }
    }
}

#[test]
fn test_bursts_of_edits_before_pumping() {
    let mut rng = Lcg(99);
    let mut runtime = runtime_with_budget(SAMPLE, 1);

    for step in 0..60 {
        // Several edits land before the runtime gets to run
        for _ in 0..=rng.below(3) {
            let len = runtime.session.document.len_chars();
            let edit = random_edit(&mut rng, len);
            let change = runtime.session.apply_edit(&edit).unwrap();
            runtime.send(OutlineMsg::DocumentChanged(change));
        }
        runtime.run_until_idle();
        check_consistent(&runtime, step);
    }
}

#[test]
fn test_random_operations_never_panic() {
    let mut rng = Lcg(5);
    let mut runtime = runtime_with_budget(SAMPLE, 2);

    for step in 0..300 {
        let len = runtime.session.document.len_chars();
        let msg = match rng.below(7) {
            0 => OutlineMsg::Refresh {
                anchor: Some(rng.below(len + 10)),
            },
            1 => OutlineMsg::Rename {
                offset: rng.below(len + 10),
                new_name: "renamed".to_string(),
            },
            2 => OutlineMsg::Select {
                path: NodePath::from(vec![rng.below(8), rng.below(2)]),
                preserve_focus: true,
            },
            3 => OutlineMsg::SelectAt {
                line: rng.below(20),
                column: rng.below(40),
                preserve_focus: false,
            },
            4 => OutlineMsg::Pump {
                budget: Some(rng.below(3)),
            },
            5 => {
                // Edit the text without reporting it, then ask for a local refresh
                let edit = random_edit(&mut rng, len);
                runtime.session.apply_edit(&edit).unwrap();
                let len = runtime.session.document.len_chars();
                OutlineMsg::Refresh {
                    anchor: Some(rng.below(len + 1)),
                }
            }
            _ => {
                let edit = random_edit(&mut rng, len);
                let change = runtime.session.apply_edit(&edit).unwrap();
                OutlineMsg::DocumentChanged(change)
            }
        };
        runtime.dispatch(msg);
        check_consistent(&runtime, step);
    }
}
