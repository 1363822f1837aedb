//! Outline configuration persistence
//!
//! Stores user preferences in `~/.config/json-outline/config.yaml`

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::outline::{DEFAULT_PARSE_BUDGET, DEFAULT_PREVIEW_LEN};

/// Configuration that persists across sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineConfig {
    /// Maximum characters shown for a scalar preview
    #[serde(default = "default_preview_len")]
    pub preview_len: usize,

    /// Sibling values parsed per cooperative step
    #[serde(default = "default_parse_budget")]
    pub parse_budget: usize,

    /// Watch mode debounce delay
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Keep focus in the outline when revealing a node
    #[serde(default = "default_preserve_focus")]
    pub preserve_focus: bool,
}

fn default_preview_len() -> usize {
    DEFAULT_PREVIEW_LEN
}

fn default_parse_budget() -> usize {
    DEFAULT_PARSE_BUDGET
}

fn default_debounce_ms() -> u64 {
    50
}

fn default_preserve_focus() -> bool {
    true
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            preview_len: default_preview_len(),
            parse_budget: default_parse_budget(),
            debounce_ms: default_debounce_ms(),
            preserve_focus: default_preserve_focus(),
        }
    }
}

impl OutlineConfig {
    /// Load config from the user config dir, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load config from `path`, falling back to defaults on any problem
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to the user config dir
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;
        self.save_to(&path)
    }

    /// Save config to `path`, creating its directory if needed
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }
}
