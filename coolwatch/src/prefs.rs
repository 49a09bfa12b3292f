//! Persisted UI preferences.
//!
//! A small JSON file in the platform config directory. Only preferences
//! worth keeping across sessions live here; everything else is page
//! state with page lifetime.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Preferences {
    /// Last selected location (city) filter on the dashboard. Restored
    /// on startup only if the city still exists, else silently dropped.
    #[serde(default)]
    pub location_filter: Option<String>,
}

fn prefs_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("coolwatch").join("preferences.json"))
}

impl Preferences {
    /// Load preferences, falling back to defaults on any failure.
    pub fn load() -> Self {
        let Some(path) = prefs_path() else {
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring malformed preferences");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Persist preferences, best effort.
    pub fn store(&self) {
        let Some(path) = prefs_path() else {
            return;
        };

        if let Err(e) = self.write_to(&path) {
            tracing::warn!(path = %path.display(), error = %e, "Failed to store preferences");
        }
    }

    fn write_to(&self, path: &std::path::Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
