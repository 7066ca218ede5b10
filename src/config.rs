//! Panel configuration persistence.
//!
//! Stores animation timings, the expanded-body line cap and the fallback link
//! color as JSON at `~/.local/share/notification-list/config.json`. Loaded once
//! on startup; missing or malformed files fall back to defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::Result;

/// Default config file path.
fn default_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("notification-list")
        .join("config.json")
}

/// Persisted panel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Expand/collapse tween duration in seconds.
    #[serde(default = "default_animation_time")]
    pub animation_time: f64,
    /// Insert/move/remove/clear tween duration in seconds.
    #[serde(default = "default_message_animation_time")]
    pub message_animation_time: f64,
    /// How many collapsed-heights an expanded body may claim.
    #[serde(default = "default_expand_lines")]
    pub expand_lines: u32,
    /// Link color used until the theme provides one.
    #[serde(default = "default_link_color")]
    pub link_color: String,
    /// Path the config was loaded from (not serialized).
    #[serde(skip)]
    path: PathBuf,
}

fn default_animation_time() -> f64 { 0.2 }
fn default_message_animation_time() -> f64 { 0.1 }
fn default_expand_lines() -> u32 { 6 }
fn default_link_color() -> String { "#ccccff".into() }

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            animation_time: default_animation_time(),
            message_animation_time: default_message_animation_time(),
            expand_lines: default_expand_lines(),
            link_color: default_link_color(),
            path: default_path(),
        }
    }
}

impl PanelConfig {
    /// Load from the default location, falling back to defaults on any error.
    pub fn load() -> Self {
        Self::load_from(&default_path())
    }

    /// Load from `path`, falling back to defaults on any error.
    pub fn load_from(path: &Path) -> Self {
        let mut config = match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        };
        config.path = path.to_path_buf();
        if config.expand_lines == 0 {
            config.expand_lines = 1;
        }
        config
    }

    /// Where this config is saved.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist current config to disk.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
