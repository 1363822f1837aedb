//! Command-line argument parsing
//!
//! Supports:
//! - Printing the outline of a JSON file (text or JSON)
//! - Looking up the node at a line/column
//! - Renaming a key or string value, printed or written back
//! - Watching the file and re-printing on change

use clap::Parser;
use std::path::PathBuf;

/// Outline a JSON document
#[derive(Parser, Debug)]
#[command(name = "json-outline", version, about = "Outline a JSON document")]
pub struct CliArgs {
    /// JSON file to outline
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Show the node at LINE:COL (1-indexed)
    #[arg(long, value_name = "LINE:COL", conflicts_with_all = ["rename", "watch"])]
    pub at: Option<String>,

    /// Rename the key or string value at this character offset
    #[arg(long, value_name = "OFFSET", requires = "to", conflicts_with = "watch")]
    pub rename: Option<usize>,

    /// New name for --rename
    #[arg(long, value_name = "NAME", requires = "rename")]
    pub to: Option<String>,

    /// Write the renamed document back instead of printing it
    #[arg(long, requires = "rename")]
    pub write: bool,

    /// Print the outline as JSON
    #[arg(long)]
    pub json: bool,

    /// Keep running and re-print the outline when the file changes
    #[arg(long)]
    pub watch: bool,

    /// Use this config file instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// What a run does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Print the outline once
    Print,
    /// Print the node at a 0-indexed position
    At { line: usize, column: usize },
    Rename {
        offset: usize,
        name: String,
        write: bool,
    },
    Watch,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub path: PathBuf,
    pub mode: RunMode,
    pub json: bool,
    pub config_path: Option<PathBuf>,
}

impl CliArgs {
    /// Convert parsed CLI args into a run configuration
    pub fn into_config(self) -> Result<RunConfig, String> {
        let mode = match (self.at, self.rename, self.to) {
            (Some(at), _, _) => {
                let (line, column) = parse_position(&at)?;
                RunMode::At { line, column }
            }
            (None, Some(offset), Some(name)) => RunMode::Rename {
                offset,
                name,
                write: self.write,
            },
            (None, Some(_), None) => return Err("--rename needs --to NAME".to_string()),
            _ if self.watch => RunMode::Watch,
            _ => RunMode::Print,
        };

        Ok(RunConfig {
            path: self.file,
            mode,
            json: self.json,
            config_path: self.config,
        })
    }
}

/// Parse `LINE:COL` (1-indexed) into a 0-indexed position
fn parse_position(value: &str) -> Result<(usize, usize), String> {
    let (line, column) = value
        .split_once(':')
        .ok_or_else(|| format!("Expected LINE:COL, got '{}'", value))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| format!("Invalid position '{}': expected positive numbers", value))
    };
    Ok((parse(line)? - 1, parse(column)? - 1))
}
