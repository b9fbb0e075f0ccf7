//! Transcription adapter over an external speech-recognition engine
//!
//! Flattens the engine's segment stream into one transcript string and
//! preserves language metadata unchanged. An unconfigured engine is reported
//! as `Unavailable` — distinct from a per-call failure — so callers can tell
//! "never configured" apart from "failed this time".

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::Deserialize;

use crate::{Error, Result};

/// One recognized segment from the engine
#[derive(Debug, Clone, Deserialize)]
pub struct Segment {
    pub text: String,
}

/// Stream-level metadata from the engine
#[derive(Debug, Clone, Deserialize)]
pub struct SegmentInfo {
    pub language: String,
    pub language_probability: f64,
}

/// External speech-recognition engine boundary
///
/// Input is a local audio file path; output is the segment list plus info.
/// Zero segments means an empty transcript, not an error.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Recognize speech in the file at `audio`
    ///
    /// # Errors
    ///
    /// Returns error if recognition fails
    async fn transcribe(&self, audio: &Path) -> Result<(Vec<Segment>, SegmentInfo)>;
}

/// A completed transcription
#[derive(Debug, Clone)]
pub struct Transcription {
    pub transcript: String,
    pub language: String,
    pub language_probability: f64,
    pub processing_time: f64,
}

/// Wraps an optional engine handle behind the adapter contract
pub struct Transcriber {
    engine: Option<Arc<dyn SpeechEngine>>,
}

impl Transcriber {
    /// Create an adapter; `None` means the engine was never configured
    #[must_use]
    pub fn new(engine: Option<Arc<dyn SpeechEngine>>) -> Self {
        Self { engine }
    }

    /// Whether an engine is configured at all
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.engine.is_some()
    }

    /// Transcribe an audio file into a flat transcript
    ///
    /// # Errors
    ///
    /// Returns `Error::Unavailable` when no engine is configured, or the
    /// engine's own error for a mid-transcription failure.
    pub async fn transcribe(&self, audio: &Path) -> Result<Transcription> {
        let engine = self.engine.as_ref().ok_or_else(|| {
            Error::Unavailable("transcription service is not available".to_string())
        })?;

        let started = Instant::now();
        let (segments, info) = engine.transcribe(audio).await?;

        let transcript = segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let processing_time = started.elapsed().as_secs_f64();
        tracing::info!(
            audio = %audio.display(),
            language = %info.language,
            segments = segments.len(),
            seconds = processing_time,
            "transcription complete"
        );

        Ok(Transcription {
            transcript,
            language: info.language,
            language_probability: info.language_probability,
            processing_time,
        })
    }
}

/// Reply schema from the HTTP speech-recognition server
#[derive(Deserialize)]
struct EngineReply {
    #[serde(default)]
    segments: Vec<Segment>,
    language: String,
    language_probability: f64,
}

/// HTTP speech-recognition engine client
pub struct HttpSpeechEngine {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSpeechEngine {
    /// Create a client against the engine at `base_url`
    ///
    /// # Errors
    ///
    /// Returns error if the URL is empty
    pub fn new(base_url: String) -> Result<Self> {
        if base_url.is_empty() {
            return Err(Error::Config(
                "speech-recognition engine URL required".to_string(),
            ));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
        })
    }
}

#[async_trait]
impl SpeechEngine for HttpSpeechEngine {
    async fn transcribe(&self, audio: &Path) -> Result<(Vec<Segment>, SegmentInfo)> {
        let bytes = tokio::fs::read(audio).await?;
        let filename = audio
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav")
            .to_string();

        tracing::debug!(audio_bytes = bytes.len(), "starting transcription");

        let form = reqwest::multipart::Form::new().part(
            "file",
            reqwest::multipart::Part::bytes(bytes)
                .file_name(filename)
                .mime_str("application/octet-stream")
                .map_err(|e| Error::Stt(e.to_string()))?,
        );

        let response = self
            .client
            .post(format!("{}/transcribe", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "transcription request failed");
                Error::Stt(format!("transcription request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "transcription engine error");
            return Err(Error::Stt(format!(
                "transcription engine error {status}: {body}"
            )));
        }

        let reply: EngineReply = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse transcription reply");
            Error::Stt(format!("unreadable transcription reply: {e}"))
        })?;

        Ok((
            reply.segments,
            SegmentInfo {
                language: reply.language,
                language_probability: reply.language_probability,
            },
        ))
    }
}
