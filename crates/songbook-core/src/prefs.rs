//! The one persisted display preference.

use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiPrefs {
    #[serde(rename = "darkMode", default = "default_dark_mode")]
    pub dark_mode: bool,
}

impl Default for UiPrefs {
    fn default() -> Self {
        Self {
            dark_mode: default_dark_mode(),
        }
    }
}

fn default_dark_mode() -> bool {
    true
}

impl UiPrefs {
    /// Missing or unreadable files yield the defaults.
    pub fn load(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_defaults_to_dark() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = UiPrefs::load(&dir.path().join("ui_state.json"));
        assert!(prefs.dark_mode);
    }

    #[test]
    fn test_toggle_persists_under_dark_mode_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ui_state.json");
        UiPrefs { dark_mode: false }.save(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["darkMode"], serde_json::Value::Bool(false));
        assert!(!UiPrefs::load(&path).dark_mode);
    }

    #[test]
    fn test_corrupt_file_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ui_state.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(UiPrefs::load(&path), UiPrefs::default());
    }
}
