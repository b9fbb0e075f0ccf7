//! Configuration management for the voxgate gateway
//!
//! Defaults mirror the expected local layout (`models/`, `uploads/`,
//! `audio/cache/`, ...). An optional `voxgate.toml` file is a partial overlay
//! on top of defaults; environment variables and CLI flags win over the file.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

/// Default sampling parameters applied when a request omits them
#[derive(Debug, Clone, Copy)]
pub struct SynthesisDefaults {
    /// Speech speed multiplier
    pub speed: f64,

    /// Pitch adjustment
    pub pitch: f64,

    /// Generation temperature
    pub temperature: f64,

    /// Nucleus sampling top-p
    pub top_p: f64,

    /// Repetition penalty
    pub repetition_penalty: f64,

    /// Random seed
    pub seed: i64,
}

impl Default for SynthesisDefaults {
    fn default() -> Self {
        Self {
            speed: 1.0,
            pitch: 0.0,
            temperature: 0.7,
            top_p: 0.7,
            repetition_penalty: 1.2,
            seed: 0,
        }
    }
}

/// Voxgate gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the voice model tree (owned exclusively by the model store)
    pub models_dir: PathBuf,

    /// Where uploaded audio lands before transcription
    pub upload_dir: PathBuf,

    /// Where transcripts of uploads are written
    pub transcript_dir: PathBuf,

    /// Non-cached synthesis output directory
    pub output_dir: PathBuf,

    /// Content-addressed audio cache (owned exclusively by the cache)
    pub cache_dir: PathBuf,

    /// TTS engine RPC endpoint
    pub tts_url: String,

    /// Speech-recognition engine endpoint; `None` disables transcription
    pub stt_url: Option<String>,

    /// HTTP API port
    pub port: u16,

    /// Default sampling parameters
    pub defaults: SynthesisDefaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("models"),
            upload_dir: PathBuf::from("uploads"),
            transcript_dir: PathBuf::from("transcripts"),
            output_dir: PathBuf::from("audio/generated"),
            cache_dir: PathBuf::from("audio/cache"),
            tts_url: "http://127.0.0.1:7860".to_string(),
            stt_url: None,
            port: 8000,
            defaults: SynthesisDefaults::default(),
        }
    }
}

impl Config {
    /// Build the configuration from the TOML overlay plus environment variables
    ///
    /// Precedence: defaults < `voxgate.toml` < environment.
    #[must_use]
    pub fn load(config_path: Option<&Path>) -> Self {
        let file = config_path.map_or_else(
            || load_config_file(Path::new("voxgate.toml")),
            load_config_file,
        );

        let mut config = Self::default();

        if let Some(dirs) = file.dirs {
            if let Some(v) = dirs.models {
                config.models_dir = v;
            }
            if let Some(v) = dirs.uploads {
                config.upload_dir = v;
            }
            if let Some(v) = dirs.transcripts {
                config.transcript_dir = v;
            }
            if let Some(v) = dirs.output {
                config.output_dir = v;
            }
            if let Some(v) = dirs.cache {
                config.cache_dir = v;
            }
        }

        if let Some(engines) = file.engines {
            if let Some(v) = engines.tts_url {
                config.tts_url = v;
            }
            config.stt_url = engines.stt_url;
        }

        if let Some(server) = file.server {
            if let Some(v) = server.port {
                config.port = v;
            }
        }

        if let Ok(url) = std::env::var("VOXGATE_TTS_URL") {
            config.tts_url = url;
        }
        if let Ok(url) = std::env::var("VOXGATE_STT_URL") {
            config.stt_url = Some(url);
        }

        config
    }

    /// Create every data directory the gateway writes into
    ///
    /// # Errors
    ///
    /// Returns error if a directory cannot be created
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [
            &self.models_dir,
            &self.upload_dir,
            &self.transcript_dir,
            &self.output_dir,
            &self.cache_dir,
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

/// Top-level TOML configuration file schema
///
/// All fields are optional; the file is a partial overlay on top of defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    /// Data directory overrides
    #[serde(default)]
    pub dirs: Option<DirsFileConfig>,

    /// External engine endpoints
    #[serde(default)]
    pub engines: Option<EnginesFileConfig>,

    /// Server/runtime configuration
    #[serde(default)]
    pub server: Option<ServerFileConfig>,
}

/// Data directory overrides
#[derive(Debug, Default, Deserialize)]
pub struct DirsFileConfig {
    pub models: Option<PathBuf>,
    pub uploads: Option<PathBuf>,
    pub transcripts: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub cache: Option<PathBuf>,
}

/// External engine endpoints
#[derive(Debug, Default, Deserialize)]
pub struct EnginesFileConfig {
    /// TTS engine RPC endpoint (e.g. `http://127.0.0.1:7860`)
    pub tts_url: Option<String>,

    /// Speech-recognition engine endpoint
    pub stt_url: Option<String>,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// API server port
    pub port: Option<u16>,
}

/// Load the TOML config file from `path`
///
/// Returns `ConfigFile::default()` if the file doesn't exist or can't be parsed.
#[must_use]
pub fn load_config_file(path: &Path) -> ConfigFile {
    if !path.exists() {
        return ConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                ConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            ConfigFile::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_expected_layout() {
        let config = Config::default();
        assert_eq!(config.models_dir, PathBuf::from("models"));
        assert_eq!(config.cache_dir, PathBuf::from("audio/cache"));
        assert_eq!(config.port, 8000);
        assert!(config.stt_url.is_none());
    }

    #[test]
    fn synthesis_defaults() {
        let d = SynthesisDefaults::default();
        assert!((d.speed - 1.0).abs() < f64::EPSILON);
        assert!((d.temperature - 0.7).abs() < f64::EPSILON);
        assert_eq!(d.seed, 0);
    }

    #[test]
    fn overlay_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voxgate.toml");
        std::fs::write(
            &path,
            r#"
[dirs]
models = "/tmp/vox/models"

[engines]
tts_url = "http://localhost:9999"

[server]
port = 8080
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path));
        assert_eq!(config.models_dir, PathBuf::from("/tmp/vox/models"));
        assert_eq!(config.tts_url, "http://localhost:9999");
        assert_eq!(config.port, 8080);
        // Unset fields keep defaults
        assert_eq!(config.cache_dir, PathBuf::from("audio/cache"));
    }

    #[test]
    fn missing_file_uses_defaults() {
        let config = Config::load(Some(Path::new("/nonexistent/voxgate.toml")));
        assert_eq!(config.port, 8000);
    }
}
