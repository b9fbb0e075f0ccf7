//! Voice model store
//!
//! Owns the on-disk representation of a named voice under the model root:
//! `<root>/<name>/<name>.mp3` (reference audio), `<root>/<name>/<name>.txt`
//! (matching transcript), optional `<name>.png` image and `sample.mp3`
//! preview. Existence of the audio/transcript pair *is* the record — there is
//! no index or sidecar metadata, and a directory missing either file is
//! invisible to every read path.

mod validate;

pub use validate::{audio_details, validate_audio, MIN_AUDIO_BYTES};

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Sentinel voice name for the engine's built-in voice
///
/// Carries no files and rejects every mutation.
pub const DEFAULT_VOICE: &str = "default";

/// Directory names under the model root that never belong to a voice
const RESERVED_DIRS: &[&str] = &["presets"];

/// Reject names that could resolve outside a model's own directory
///
/// Every store operation goes through this before touching the filesystem,
/// so a name is only ever a single path component under the root.
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Validation("voice name is required".to_string()));
    }
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(Error::Validation(format!(
            "'{name}' is not a valid voice name"
        )));
    }
    if RESERVED_DIRS.contains(&name) {
        return Err(Error::Validation(format!("'{name}' is a reserved name")));
    }
    Ok(())
}

/// Default (speed, pitch) pair applied when no preset is chosen
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VoiceSettings {
    pub speed: f64,
    pub pitch: f64,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            speed: 1.0,
            pitch: 0.0,
        }
    }
}

/// A named, on-disk voice model bundle
#[derive(Debug, Clone)]
pub struct VoiceModel {
    pub name: String,
    pub description: String,
    pub default_settings: VoiceSettings,
    root: PathBuf,
}

impl VoiceModel {
    /// Directory holding this model's files
    #[must_use]
    pub fn model_dir(&self) -> PathBuf {
        self.root.join(&self.name)
    }

    /// Reference audio sample path
    #[must_use]
    pub fn voice_path(&self) -> PathBuf {
        self.model_dir().join(format!("{}.mp3", self.name))
    }

    /// Transcript path (exact text of the reference audio)
    #[must_use]
    pub fn transcript_path(&self) -> PathBuf {
        self.model_dir().join(format!("{}.txt", self.name))
    }

    /// Optional cosmetic image path
    #[must_use]
    pub fn image_path(&self) -> PathBuf {
        self.model_dir().join(format!("{}.png", self.name))
    }

    /// Optional preview audio path
    #[must_use]
    pub fn sample_path(&self) -> PathBuf {
        self.model_dir().join("sample.mp3")
    }

    /// Whether this model is valid: both required files exist on disk
    #[must_use]
    pub fn exists(&self) -> bool {
        if self.name == DEFAULT_VOICE {
            return true;
        }
        self.voice_path().exists() && self.transcript_path().exists()
    }

    /// Read the transcript text, empty when unreadable
    #[must_use]
    pub fn transcript(&self) -> String {
        if self.name == DEFAULT_VOICE {
            return String::new();
        }
        std::fs::read_to_string(self.transcript_path()).unwrap_or_else(|e| {
            tracing::warn!(voice = %self.name, error = %e, "failed to read transcript");
            String::new()
        })
    }
}

/// Repository over the model root directory
///
/// Exclusively owns the `models/` tree. Concrete discovery happens by
/// directory scanning; callers only see the repository contract.
#[derive(Debug, Clone)]
pub struct VoiceModelStore {
    root: PathBuf,
}

impl VoiceModelStore {
    /// Create a store over `root`, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns error if the root directory cannot be created
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// List available voice names, `"default"` always first
    ///
    /// A name appears only if its directory holds both the `<name>.mp3` and
    /// `<name>.txt` files. Order beyond "default first" follows directory
    /// listing order and is not guaranteed stable.
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        let mut names = vec![DEFAULT_VOICE.to_string()];

        let Ok(entries) = std::fs::read_dir(&self.root) else {
            tracing::warn!(path = %self.root.display(), "failed to read model root");
            return names;
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name == DEFAULT_VOICE {
                continue;
            }
            let audio = path.join(format!("{name}.mp3"));
            let transcript = path.join(format!("{name}.txt"));
            if audio.exists() && transcript.exists() {
                names.push(name.to_string());
            }
        }

        names
    }

    /// Look up a voice model by name
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` when the required file pair is missing, even
    /// if a directory with that name exists.
    pub fn get(&self, name: &str) -> Result<VoiceModel> {
        if name == DEFAULT_VOICE {
            return Ok(self.default_model());
        }
        validate_name(name)?;

        let model = VoiceModel {
            name: name.to_string(),
            description: format!("Voice model for {name}"),
            default_settings: VoiceSettings::default(),
            root: self.root.clone(),
        };

        if !model.exists() {
            return Err(Error::NotFound(format!("voice model '{name}'")));
        }

        Ok(model)
    }

    /// Register a new voice model from a caller-supplied audio file
    ///
    /// Copies the audio to `<name>.mp3`, writes the transcript to
    /// `<name>.txt`, copies the optional image, and seeds `sample.mp3` from
    /// the audio. On failure, partial files are left in place — callers retry
    /// or clean up manually; no rollback is attempted.
    ///
    /// # Errors
    ///
    /// Returns error for the default name, invalid source audio, or any
    /// copy/write failure.
    pub fn create(
        &self,
        name: &str,
        source_audio: &Path,
        transcript_text: &str,
        image: Option<&Path>,
    ) -> Result<VoiceModel> {
        if name == DEFAULT_VOICE {
            return Err(Error::Protected(
                "cannot create a model named 'default'".to_string(),
            ));
        }
        validate_name(name)?;
        validate_audio(source_audio)?;

        let model = VoiceModel {
            name: name.to_string(),
            description: format!("Voice model for {name}"),
            default_settings: VoiceSettings::default(),
            root: self.root.clone(),
        };

        std::fs::create_dir_all(model.model_dir())?;
        std::fs::copy(source_audio, model.voice_path())?;
        std::fs::write(model.transcript_path(), transcript_text)?;

        if let Some(image_path) = image {
            if image_path.exists() {
                std::fs::copy(image_path, model.image_path())?;
            }
        }

        // Preview defaults to the reference audio itself
        std::fs::copy(source_audio, model.sample_path())?;

        tracing::info!(voice = %name, dir = %model.model_dir().display(), "voice model saved");
        Ok(model)
    }

    /// Rename a voice model directory and its files
    ///
    /// # Errors
    ///
    /// Returns error for the default voice, an unknown source, or an existing
    /// target name.
    pub fn rename(&self, name: &str, new_name: &str) -> Result<()> {
        if name == DEFAULT_VOICE {
            return Err(Error::Protected(
                "cannot rename the default voice model".to_string(),
            ));
        }
        validate_name(name)?;
        if new_name == DEFAULT_VOICE {
            return Err(Error::Validation(format!(
                "'{new_name}' is not a valid voice name"
            )));
        }
        validate_name(new_name)?;

        let model = self.get(name)?;
        let new_dir = self.root.join(new_name);
        if new_dir.exists() {
            return Err(Error::Validation(format!(
                "voice model '{new_name}' already exists"
            )));
        }

        std::fs::rename(model.model_dir(), &new_dir)?;

        // The inner files keep the old basename after the directory rename
        for (old, new) in [
            (format!("{name}.mp3"), format!("{new_name}.mp3")),
            (format!("{name}.txt"), format!("{new_name}.txt")),
            (format!("{name}.png"), format!("{new_name}.png")),
        ] {
            let old_path = new_dir.join(old);
            if old_path.exists() {
                std::fs::rename(old_path, new_dir.join(new))?;
            }
        }

        tracing::info!(from = %name, to = %new_name, "voice model renamed");
        Ok(())
    }

    /// Overwrite a model's transcript, recreating the directory if missing
    ///
    /// # Errors
    ///
    /// Returns error for the default voice or a write failure
    pub fn update_transcript(&self, name: &str, text: &str) -> Result<()> {
        let model = self.mutable_model(name)?;
        std::fs::create_dir_all(model.model_dir())?;
        std::fs::write(model.transcript_path(), text)?;
        tracing::info!(voice = %name, "transcript updated");
        Ok(())
    }

    /// Replace a model's image file
    ///
    /// # Errors
    ///
    /// Returns error for the default voice, a missing source, or a copy failure
    pub fn update_image(&self, name: &str, source: &Path) -> Result<()> {
        let model = self.mutable_model(name)?;
        if !source.exists() {
            return Err(Error::Validation(format!(
                "image file not found: {}",
                source.display()
            )));
        }
        std::fs::create_dir_all(model.model_dir())?;
        std::fs::copy(source, model.image_path())?;
        tracing::info!(voice = %name, "image updated");
        Ok(())
    }

    /// Replace a model's preview audio
    ///
    /// # Errors
    ///
    /// Returns error for the default voice, a missing source, or a copy failure
    pub fn update_sample(&self, name: &str, source: &Path) -> Result<()> {
        let model = self.mutable_model(name)?;
        if !source.exists() {
            return Err(Error::Validation(format!(
                "sample file not found: {}",
                source.display()
            )));
        }
        std::fs::create_dir_all(model.model_dir())?;
        std::fs::copy(source, model.sample_path())?;
        tracing::info!(voice = %name, "preview sample updated");
        Ok(())
    }

    /// Hard-delete a voice model directory recursively
    ///
    /// # Errors
    ///
    /// Returns error for the default voice or when no directory exists
    pub fn delete(&self, name: &str) -> Result<()> {
        if name == DEFAULT_VOICE {
            return Err(Error::Protected(
                "cannot remove the default voice model".to_string(),
            ));
        }
        validate_name(name)?;

        let dir = self.root.join(name);
        if !dir.is_dir() {
            return Err(Error::NotFound(format!("voice model '{name}'")));
        }

        std::fs::remove_dir_all(&dir)?;
        tracing::info!(voice = %name, dir = %dir.display(), "voice model deleted");
        Ok(())
    }

    /// The sentinel default model (no files, immutable)
    #[must_use]
    pub fn default_model(&self) -> VoiceModel {
        VoiceModel {
            name: DEFAULT_VOICE.to_string(),
            description: "Built-in engine voice".to_string(),
            default_settings: VoiceSettings::default(),
            root: self.root.clone(),
        }
    }

    /// Resolve a model for mutation, rejecting the default sentinel
    fn mutable_model(&self, name: &str) -> Result<VoiceModel> {
        if name == DEFAULT_VOICE {
            return Err(Error::Protected(
                "cannot modify the default voice model".to_string(),
            ));
        }
        validate_name(name)?;
        Ok(VoiceModel {
            name: name.to_string(),
            description: format!("Voice model for {name}"),
            default_settings: VoiceSettings::default(),
            root: self.root.clone(),
        })
    }
}
