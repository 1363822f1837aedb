use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::time::Duration;

use json_outline::cli::{CliArgs, RunConfig, RunMode};
use json_outline::fs_watcher::FileWatcher;
use json_outline::outline::{LineRange, NodeKind, NodePath, OutlineChange, OutlineTree, TextRange};
use json_outline::runtime::{OutlineView, Runtime};
use json_outline::view::{render_json, render_text};
use json_outline::{OutlineConfig, OutlineMsg, OutlineSession, ParseError};

/// Prints outlines to stdout and remembers what the session reported
#[derive(Default)]
struct PrintView {
    json: bool,
    print_outline: bool,
    revealed: Option<(NodePath, LineRange)>,
    errors: Vec<String>,
}

impl PrintView {
    fn print(&self, tree: &OutlineTree) {
        if self.json {
            match render_json(tree) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Failed to serialize outline: {}", e),
            }
        } else {
            print!("{}", render_text(tree));
        }
    }
}

impl OutlineView for PrintView {
    fn outline_changed(&mut self, tree: &OutlineTree, change: &OutlineChange) {
        if let OutlineChange::Subtree { path, range } = change {
            tracing::info!(%path, %range, "Outline updated");
        }
        if self.print_outline {
            self.print(tree);
        }
    }

    fn parse_failed(&mut self, error: &ParseError) {
        eprintln!("error: {}", error);
    }

    fn reveal(&mut self, path: &NodePath, range: LineRange, _preserve_focus: bool) {
        self.revealed = Some((path.clone(), range));
    }

    fn report(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}

/// Node under a position, as printed by `--at`
#[derive(Serialize)]
struct NodeAt {
    path: NodePath,
    label: String,
    kind: NodeKind,
    range: TextRange,
    /// 1-indexed
    start: (usize, usize),
    /// 1-indexed
    end: (usize, usize),
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    json_outline::tracing::init();

    let run = args.into_config().map_err(anyhow::Error::msg)?;
    let config = match &run.config_path {
        Some(path) => OutlineConfig::load_from(path),
        None => OutlineConfig::load(),
    };

    let session = OutlineSession::open(run.path.clone(), config)
        .with_context(|| format!("Failed to open {}", run.path.display()))?;
    let view = PrintView {
        json: run.json,
        print_outline: matches!(run.mode, RunMode::Print | RunMode::Watch),
        ..Default::default()
    };
    let mut runtime = Runtime::new(session, view);
    runtime.dispatch(OutlineMsg::Open);

    if runtime.session.controller.root().is_none() && run.mode != RunMode::Watch {
        bail!("{} is not valid JSON", run.path.display());
    }

    match run.mode.clone() {
        RunMode::Print => Ok(()),
        RunMode::At { line, column } => print_node_at(&mut runtime, &run, line, column),
        RunMode::Rename {
            offset,
            name,
            write,
        } => rename(&mut runtime, &run, offset, name, write),
        RunMode::Watch => watch(&mut runtime, &run),
    }
}

fn print_node_at(
    runtime: &mut Runtime<PrintView>,
    run: &RunConfig,
    line: usize,
    column: usize,
) -> Result<()> {
    let preserve_focus = runtime.session.config.preserve_focus;
    runtime.dispatch(OutlineMsg::SelectAt {
        line,
        column,
        preserve_focus,
    });

    let Some((path, range)) = runtime.view.revealed.clone() else {
        bail!("No node at {}:{}", line + 1, column + 1);
    };
    let tree = runtime.session.tree().context("Outline is not available")?;
    let node = tree.node(&path).context("Revealed node vanished")?;

    let found = NodeAt {
        label: tree.label(&path).unwrap_or_default(),
        kind: node.kind,
        range: node.range,
        start: (range.start_line + 1, range.start_col + 1),
        end: (range.end_line + 1, range.end_col + 1),
        path,
    };

    if run.json {
        println!("{}", serde_json::to_string_pretty(&found)?);
    } else {
        println!(
            "{}  {}  {}  {}:{}-{}:{}",
            found.path, found.label, found.kind, found.start.0, found.start.1, found.end.0, found.end.1
        );
    }
    Ok(())
}

fn rename(
    runtime: &mut Runtime<PrintView>,
    run: &RunConfig,
    offset: usize,
    name: String,
    write: bool,
) -> Result<()> {
    runtime.dispatch(OutlineMsg::Rename {
        offset,
        new_name: name,
    });

    if let Some(error) = runtime.view.errors.first() {
        bail!("Rename failed: {}", error);
    }
    if !runtime.session.document.is_modified {
        bail!("Nothing to rename at offset {}", offset);
    }

    if write {
        runtime
            .session
            .document
            .save()
            .with_context(|| format!("Failed to write {}", run.path.display()))?;
    } else {
        print!("{}", runtime.session.document.text());
    }
    Ok(())
}

fn watch(runtime: &mut Runtime<PrintView>, run: &RunConfig) -> Result<()> {
    let debounce = Duration::from_millis(runtime.session.config.debounce_ms);
    let watcher = FileWatcher::new(&run.path, debounce)
        .with_context(|| format!("Failed to watch {}", run.path.display()))?;

    while watcher.wait_for_change() {
        let content = match std::fs::read_to_string(watcher.path()) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!("Failed to re-read {}: {}", watcher.path().display(), e);
                continue;
            }
        };
        if let Some(change) = runtime.session.document.replace_text(&content) {
            runtime.dispatch(OutlineMsg::DocumentChanged(change));
        }
    }
    Ok(())
}
