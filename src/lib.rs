//! JSON outline engine
//!
//! This crate parses JSON documents into an outline tree with character
//! ranges, keeps it in sync with edits through partial re-parsing, and
//! implements the outline operations (navigate, select, rename) around an
//! Elm-style update loop.

pub mod cli;
pub mod commands;
pub mod config;
pub mod config_paths;
pub mod fs_watcher;
pub mod messages;
pub mod model;
pub mod outline;
pub mod runtime;
pub mod tracing;
pub mod update;
pub mod view;

// Re-export commonly used types
pub use commands::Cmd;
pub use config::OutlineConfig;
pub use messages::OutlineMsg;
pub use model::OutlineSession;
pub use outline::{Node, NodeKind, OutlineError, OutlineTree, ParseError};
