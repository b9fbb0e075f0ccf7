//! Synthesis request pipeline
//!
//! Resolves a voice name to reference material, checks the audio cache,
//! dispatches to the external TTS engine, and normalizes the reply into a
//! single destination file. A stale or missing voice name degrades to the
//! default-voice path with a warning carried in the result — it never fails
//! the request outright.

mod backend;

pub use backend::{
    resolve_reply, BackendCall, HttpTtsBackend, ResolvedAudioPath, TtsBackend,
    DEFAULT_CALL_TIMEOUT,
};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cache::{write_atomic, AudioCache, CacheKey};
use crate::config::SynthesisDefaults;
use crate::store::{VoiceModelStore, DEFAULT_VOICE};
use crate::{Error, Result};

/// One synthesis request; ephemeral beyond its derived cache key
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice: String,
    pub speed: f64,
    pub pitch: f64,
    pub use_cache: bool,
    pub temperature: f64,
    pub top_p: f64,
    pub repetition_penalty: f64,
    pub seed: i64,
}

impl SynthesisRequest {
    /// A request for `text` with every knob at its default
    #[must_use]
    pub fn new(text: impl Into<String>, defaults: &SynthesisDefaults) -> Self {
        Self {
            text: text.into(),
            voice: DEFAULT_VOICE.to_string(),
            speed: defaults.speed,
            pitch: defaults.pitch,
            use_cache: false,
            temperature: defaults.temperature,
            top_p: defaults.top_p,
            repetition_penalty: defaults.repetition_penalty,
            seed: defaults.seed,
        }
    }

    /// Cache key over every field that affects synthesized output
    #[must_use]
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::derive(
            &self.text,
            &self.voice,
            self.speed,
            self.pitch,
            self.temperature,
            self.top_p,
            self.repetition_penalty,
            self.seed,
        )
    }
}

/// Result of a completed synthesis call
#[derive(Debug, Clone)]
pub struct SynthesisOutcome {
    /// Destination audio file (cache path or a fresh output path)
    pub audio_file: PathBuf,

    /// Voice name the request asked for
    pub voice: String,

    /// Whether the result was served from cache
    pub cache_hit: bool,

    /// Wall-clock seconds for reference resolution + dispatch; zero on a hit
    pub processing_time: f64,

    /// Surfaced when the request degraded (e.g. unknown voice name)
    pub warning: Option<String>,
}

/// Reference material resolved for a non-default voice
#[derive(Debug, Default)]
struct ResolvedReference {
    audio: Option<PathBuf>,
    text: String,
    warning: Option<String>,
}

/// Drives synthesis requests against the injected engine handle
pub struct Synthesizer {
    backend: Arc<dyn TtsBackend>,
    store: VoiceModelStore,
    cache: AudioCache,
    output_dir: PathBuf,
    call_timeout: Duration,
}

impl Synthesizer {
    /// Create a synthesizer over an engine handle, model store, and cache
    pub fn new(
        backend: Arc<dyn TtsBackend>,
        store: VoiceModelStore,
        cache: AudioCache,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            backend,
            store,
            cache,
            output_dir: output_dir.into(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Override the application-level bound on one engine call
    #[must_use]
    pub const fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Run one synthesis request end to end
    ///
    /// # Errors
    ///
    /// Returns a single human-readable error for any failure during reference
    /// resolution, dispatch, or artifact persistence; the full diagnostic
    /// context is logged here, never propagated raw.
    pub async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesisOutcome> {
        let key = request.cache_key();

        if request.use_cache {
            if let Some(path) = self.cache.lookup(&key) {
                tracing::info!(key = %key, path = %path.display(), "cache hit");
                return Ok(SynthesisOutcome {
                    audio_file: path,
                    voice: request.voice.clone(),
                    cache_hit: true,
                    processing_time: 0.0,
                    warning: None,
                });
            }
        }

        let started = Instant::now();
        let reference = self.resolve_reference(&request.voice);
        if let Some(warning) = &reference.warning {
            tracing::warn!(voice = %request.voice, "{warning}");
        }

        let call = BackendCall {
            text: request.text.clone(),
            reference_audio: reference.audio.clone(),
            reference_text: reference.text.clone(),
            max_new_tokens: 0,
            chunk_length: 200,
            top_p: request.top_p,
            repetition_penalty: request.repetition_penalty,
            temperature: request.temperature,
            seed: request.seed,
            speed: request.speed,
            pitch: request.pitch,
        };

        let reply = tokio::time::timeout(self.call_timeout, self.backend.synthesize(&call))
            .await
            .map_err(|_| {
                tracing::error!(
                    voice = %request.voice,
                    timeout_secs = self.call_timeout.as_secs(),
                    "synthesis call timed out"
                );
                Error::Tts("speech synthesis timed out".to_string())
            })?
            .map_err(|e| synthesis_error(&request.voice, &reference, &e))?;

        let resolved =
            resolve_reply(&reply).map_err(|e| synthesis_error(&request.voice, &reference, &e))?;

        let engine_path = resolved.as_path();
        if !engine_path.exists() {
            let e = Error::Backend(format!(
                "engine reply references a missing file: {}",
                engine_path.display()
            ));
            return Err(synthesis_error(&request.voice, &reference, &e));
        }

        let bytes = std::fs::read(engine_path)
            .map_err(|e| synthesis_error(&request.voice, &reference, &Error::Io(e)))?;
        let destination = if request.use_cache {
            self.cache.store(&key, &bytes)?
        } else {
            let path = self.output_path();
            write_atomic(&path, &bytes)?;
            path
        };

        let processing_time = started.elapsed().as_secs_f64();
        tracing::info!(
            voice = %request.voice,
            path = %destination.display(),
            seconds = processing_time,
            "synthesis complete"
        );

        Ok(SynthesisOutcome {
            audio_file: destination,
            voice: request.voice.clone(),
            cache_hit: false,
            processing_time,
            warning: reference.warning,
        })
    }

    /// Resolve reference audio/text for a voice name
    ///
    /// Unknown names degrade to no reference material with a warning; the
    /// default voice uses none by definition.
    fn resolve_reference(&self, voice: &str) -> ResolvedReference {
        if voice == DEFAULT_VOICE {
            return ResolvedReference::default();
        }

        let model = match self.store.get(voice) {
            Ok(model) => model,
            Err(_) => {
                return ResolvedReference {
                    warning: Some(format!(
                        "voice model '{voice}' not found, synthesizing without reference material"
                    )),
                    ..ResolvedReference::default()
                };
            }
        };

        let audio_path = model.voice_path();
        let transcript_path = model.transcript_path();

        // Fall back to the sibling .txt with the audio's basename when the
        // canonical transcript is missing
        let (text, warning) = if transcript_path.exists() {
            (model.transcript(), None)
        } else {
            let sibling = audio_path.with_extension("txt");
            if sibling.exists() {
                (
                    std::fs::read_to_string(&sibling).unwrap_or_default(),
                    None,
                )
            } else {
                (
                    String::new(),
                    Some(format!("no transcript found for voice model '{voice}'")),
                )
            }
        };

        tracing::info!(voice = %voice, audio = %audio_path.display(), "using voice reference");
        ResolvedReference {
            audio: Some(audio_path),
            text,
            warning,
        }
    }

    /// Fresh collision-safe output path: `tts_<timestamp>_<shortRandomId>.mp3`
    fn output_path(&self) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let unique = uuid::Uuid::new_v4().simple().to_string();
        self.output_dir
            .join(format!("tts_{timestamp}_{}.mp3", &unique[..8]))
    }

}

/// Log full diagnostic context and collapse to one caller-facing message
fn synthesis_error(voice: &str, reference: &ResolvedReference, e: &Error) -> Error {
    let resolved_audio = reference
        .audio
        .as_ref()
        .map_or_else(|| "none".to_string(), |p| p.display().to_string());
    tracing::error!(
        voice = %voice,
        reference_audio = %resolved_audio,
        reference_text_len = reference.text.len(),
        error = %e,
        "speech synthesis failed"
    );
    Error::Tts(format!("speech synthesis failed: {e}"))
}
