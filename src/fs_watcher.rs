//! File watching for `--watch`
//!
//! Uses the `notify` crate with debouncing. The file's parent directory is
//! watched rather than the file itself, since editors often save by
//! replacing the file.

use notify_debouncer_mini::{new_debouncer, DebouncedEventKind, Debouncer};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

/// Debounced watcher for a single file
pub struct FileWatcher {
    _debouncer: Debouncer<notify::RecommendedWatcher>,
    rx: Receiver<Result<Vec<notify_debouncer_mini::DebouncedEvent>, notify::Error>>,
    path: PathBuf,
}

impl FileWatcher {
    pub fn new(path: &Path, debounce: Duration) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let mut debouncer = new_debouncer(debounce, tx)?;

        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        debouncer
            .watcher()
            .watch(&dir, notify::RecursiveMode::NonRecursive)?;

        tracing::info!("Watching {}", path.display());

        Ok(Self {
            _debouncer: debouncer,
            rx,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Block until the file changes; false once the watcher has shut down
    pub fn wait_for_change(&self) -> bool {
        loop {
            match self.rx.recv() {
                Ok(result) => {
                    if self.is_relevant(result) {
                        return true;
                    }
                }
                Err(_) => return false,
            }
        }
    }

    fn is_relevant(
        &self,
        result: Result<Vec<notify_debouncer_mini::DebouncedEvent>, notify::Error>,
    ) -> bool {
        match result {
            Ok(events) => events.iter().any(|event| {
                // Continuous events fire while a write is still in progress
                !matches!(event.kind, DebouncedEventKind::AnyContinuous) && event.path == self.path
            }),
            Err(e) => {
                tracing::warn!("File watcher error: {:?}", e);
                false
            }
        }
    }
}
