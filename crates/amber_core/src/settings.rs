//! Library settings stored as `settings.toml`.

use crate::error::{AmberError, Result};
use crate::validity::resolve_path;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the settings file inside the library directory.
pub const SETTINGS_FILE: &str = "settings.toml";

/// User settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Directory receiving backup copies. Unset until the user chooses one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<String>,

    /// Reopen the last viewed folder on startup (default: true).
    #[serde(default = "default_open_last_folder")]
    pub open_last_folder: bool,
}

fn default_open_last_folder() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backup_path: None,
            open_last_folder: default_open_last_folder(),
        }
    }
}

impl Settings {
    /// Load settings from a library directory. A missing file yields defaults.
    pub fn load(library_dir: &Path) -> Result<Self> {
        let path = library_dir.join(SETTINGS_FILE);
        if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| AmberError::ConfigError(format!("failed to read settings: {}", e)))?;
            toml::from_str(&content)
                .map_err(|e| AmberError::ConfigError(format!("failed to parse settings: {}", e)))
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a library directory.
    pub fn save(&self, library_dir: &Path) -> Result<()> {
        let path = library_dir.join(SETTINGS_FILE);
        let content = toml::to_string_pretty(self)
            .map_err(|e| AmberError::ConfigError(format!("failed to serialize settings: {}", e)))?;
        fs::write(&path, content)
            .map_err(|e| AmberError::ConfigError(format!("failed to write settings: {}", e)))?;
        Ok(())
    }

    /// The configured backup directory with `~` expanded, if set.
    pub fn backup_root(&self) -> Option<PathBuf> {
        self.backup_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(resolve_path)
    }

    /// Points backups at an existing directory. On error the current value is
    /// kept.
    pub fn set_backup_path(&mut self, path: &str) -> Result<()> {
        let trimmed = path.trim();
        let resolved = resolve_path(trimmed);
        if trimmed.is_empty() || !resolved.is_dir() {
            return Err(AmberError::BackupRootInvalid(resolved));
        }
        self.backup_path = Some(trimmed.to_string());
        Ok(())
    }
}
