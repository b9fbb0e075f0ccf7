//! Named synthesis presets
//!
//! One JSON file per preset under the presets directory; the file's existence
//! is the record, same as the voice model store. `save` overwrites
//! unconditionally and there is no protected sentinel.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A saved (voice, speed, pitch) combination for quick reuse
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preset {
    pub voice: String,
    pub speed: f64,
    pub pitch: f64,
    pub created_at: DateTime<Utc>,
}

/// Repository over the presets directory
#[derive(Debug, Clone)]
pub struct PresetStore {
    dir: PathBuf,
}

/// Reject names that could resolve outside the presets directory
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Validation("preset name is required".to_string()));
    }
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(Error::Validation(format!(
            "'{name}' is not a valid preset name"
        )));
    }
    Ok(())
}

impl PresetStore {
    /// Create a store over `dir`, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// List preset names, skipping unparseable files with a warning
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            tracing::warn!(path = %self.dir.display(), "failed to read presets directory");
            return Vec::new();
        };

        let mut names = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|n| n.to_str()) else {
                continue;
            };
            match self.get(name) {
                Ok(_) => names.push(name.to_string()),
                Err(e) => {
                    tracing::warn!(preset = %name, error = %e, "skipping unreadable preset");
                }
            }
        }
        names
    }

    /// Load a preset by name
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` when no file exists for the name
    pub fn get(&self, name: &str) -> Result<Preset> {
        validate_name(name)?;
        let path = self.path_for(name);
        if !path.exists() {
            return Err(Error::NotFound(format!("preset '{name}'")));
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save a preset, overwriting any existing one with the same name
    ///
    /// # Errors
    ///
    /// Returns error for an empty name or a write failure
    pub fn save(&self, name: &str, voice: &str, speed: f64, pitch: f64) -> Result<Preset> {
        validate_name(name)?;

        let preset = Preset {
            voice: voice.to_string(),
            speed,
            pitch,
            created_at: Utc::now(),
        };

        let path = self.path_for(name);
        std::fs::write(&path, serde_json::to_string_pretty(&preset)?)?;
        tracing::info!(preset = %name, path = %path.display(), "preset saved");
        Ok(preset)
    }

    /// Delete a preset
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` when no file exists for the name
    pub fn delete(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        let path = self.path_for(name);
        if !path.exists() {
            return Err(Error::NotFound(format!("preset '{name}'")));
        }
        std::fs::remove_file(&path)?;
        tracing::info!(preset = %name, "preset deleted");
        Ok(())
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }
}
