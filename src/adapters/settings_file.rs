//! JSON settings file adapter
//!
//! The flat `com/...` map is written as a single JSON object in the
//! platform config directory, e.g. `~/.config/comport-panel/settings.json`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::domain::{PanelError, PanelResult, SettingsMap};
use crate::ports::SettingsStore;

const SETTINGS_FILE_NAME: &str = "settings.json";

/// Settings stored in a JSON file at a fixed path
pub struct JsonSettingsFile {
    path: PathBuf,
}

impl JsonSettingsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Settings file in the platform config directory, if one can be determined
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "comport-panel")
            .map(|dirs| dirs.config_dir().join(SETTINGS_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonSettingsFile {
    fn load(&self) -> PanelResult<Option<SettingsMap>> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(PanelError::SettingsLoadFailed(format!(
                    "Failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };

        serde_json::from_str(&json).map(Some).map_err(|e| {
            PanelError::SettingsLoadFailed(format!("Failed to parse {}: {e}", self.path.display()))
        })
    }

    fn save(&mut self, entries: &SettingsMap) -> PanelResult<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| {
                PanelError::SettingsSaveFailed(format!("Failed to create {}: {e}", dir.display()))
            })?;
        }
        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| PanelError::SettingsSaveFailed(format!("Serialization error: {e}")))?;
        std::fs::write(&self.path, json).map_err(|e| {
            PanelError::SettingsSaveFailed(format!("Failed to write {}: {e}", self.path.display()))
        })
    }
}

/// In-memory store, for tests and for running without a settings file
#[derive(Debug, Default, Clone)]
pub struct MemorySettingsStore {
    entries: Option<SettingsMap>,
    saves: usize,
}

impl MemorySettingsStore {
    pub fn with_entries(entries: SettingsMap) -> Self {
        Self {
            entries: Some(entries),
            saves: 0,
        }
    }

    pub fn entries(&self) -> Option<&SettingsMap> {
        self.entries.as_ref()
    }

    /// Number of successful `save` calls
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> PanelResult<Option<SettingsMap>> {
        Ok(self.entries.clone())
    }

    fn save(&mut self, entries: &SettingsMap) -> PanelResult<()> {
        self.entries = Some(entries.clone());
        self.saves += 1;
        Ok(())
    }
}
