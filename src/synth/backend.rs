//! External TTS engine boundary
//!
//! The engine is reached through a single injected handle with one call:
//! text + optional reference material + sampling parameters in, a reply whose
//! shape is not fixed out. The reply is decoded into [`ResolvedAudioPath`]
//! immediately at this boundary; no polymorphism leaks past it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::{Error, Result};

/// Default bound on a single engine round-trip
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(120);

/// One synthesis call to the external engine
#[derive(Debug, Clone, Serialize)]
pub struct BackendCall {
    pub text: String,

    /// Reference audio path; omitted entirely on the default-voice path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_audio: Option<PathBuf>,

    pub reference_text: String,
    pub max_new_tokens: u32,
    pub chunk_length: u32,
    pub top_p: f64,
    pub repetition_penalty: f64,
    pub temperature: f64,
    pub seed: i64,
    pub speed: f64,
    pub pitch: f64,
}

/// Engine-local path to the synthesized audio, decoded from the raw reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAudioPath(pub PathBuf);

impl ResolvedAudioPath {
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

/// Handle to the external TTS engine
///
/// Created once at startup and shared across all synthesis calls; request
/// isolation is the engine's responsibility, not serialized here.
#[async_trait]
pub trait TtsBackend: Send + Sync {
    /// Dispatch one synthesis call, returning the engine's raw reply
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or an engine-side error
    async fn synthesize(&self, call: &BackendCall) -> Result<serde_json::Value>;
}

/// Decode the engine's polymorphic reply into a single audio path
///
/// Tolerated shapes: a bare path string, or a sequence whose first element is
/// a path string. Anything else is a hard failure.
///
/// # Errors
///
/// Returns `Error::Backend` for any unrecognized reply shape
pub fn resolve_reply(reply: &serde_json::Value) -> Result<ResolvedAudioPath> {
    match reply {
        serde_json::Value::String(path) => Ok(ResolvedAudioPath(PathBuf::from(path))),
        serde_json::Value::Array(items) => match items.first() {
            Some(serde_json::Value::String(path)) => Ok(ResolvedAudioPath(PathBuf::from(path))),
            _ => Err(Error::Backend(format!("unexpected reply format: {reply}"))),
        },
        _ => Err(Error::Backend(format!("unexpected reply format: {reply}"))),
    }
}

/// HTTP TTS engine client (local RPC server sharing the filesystem)
pub struct HttpTtsBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTtsBackend {
    /// Create a client against the engine at `base_url`
    ///
    /// # Errors
    ///
    /// Returns error if the URL is empty or the client cannot be built
    pub fn new(base_url: String) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_CALL_TIMEOUT)
    }

    /// Create a client with an explicit call timeout
    ///
    /// # Errors
    ///
    /// Returns error if the URL is empty or the client cannot be built
    pub fn with_timeout(base_url: String, timeout: Duration) -> Result<Self> {
        if base_url.is_empty() {
            return Err(Error::Config("TTS engine URL required".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build TTS client: {e}")))?;

        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl TtsBackend for HttpTtsBackend {
    async fn synthesize(&self, call: &BackendCall) -> Result<serde_json::Value> {
        let url = format!("{}/synthesize", self.base_url);
        tracing::debug!(
            url = %url,
            text_len = call.text.len(),
            has_reference = call.reference_audio.is_some(),
            "dispatching synthesis call"
        );

        let response = self
            .client
            .post(&url)
            .json(call)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "TTS engine request failed");
                Error::Backend(format!("TTS engine request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "TTS engine error");
            return Err(Error::Backend(format!("TTS engine error {status}: {body}")));
        }

        let reply = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "failed to parse TTS engine reply");
            Error::Backend(format!("unreadable TTS engine reply: {e}"))
        })?;

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_bare_path_string() {
        let resolved = resolve_reply(&json!("/tmp/out.mp3")).unwrap();
        assert_eq!(resolved.as_path(), Path::new("/tmp/out.mp3"));
    }

    #[test]
    fn resolves_sequence_with_leading_path() {
        let resolved = resolve_reply(&json!(["/tmp/out.mp3", 1.25])).unwrap();
        assert_eq!(resolved.as_path(), Path::new("/tmp/out.mp3"));
    }

    #[test]
    fn rejects_other_shapes() {
        assert!(resolve_reply(&json!(42)).is_err());
        assert!(resolve_reply(&json!({"path": "/tmp/out.mp3"})).is_err());
        assert!(resolve_reply(&json!([])).is_err());
        assert!(resolve_reply(&json!([42, "/tmp/out.mp3"])).is_err());
        assert!(resolve_reply(&serde_json::Value::Null).is_err());
    }

    #[test]
    fn default_voice_call_omits_reference_audio() {
        let call = BackendCall {
            text: "hello".to_string(),
            reference_audio: None,
            reference_text: String::new(),
            max_new_tokens: 0,
            chunk_length: 200,
            top_p: 0.7,
            repetition_penalty: 1.2,
            temperature: 0.7,
            seed: 0,
            speed: 1.0,
            pitch: 0.0,
        };
        let value = serde_json::to_value(&call).unwrap();
        assert!(value.get("reference_audio").is_none());
        assert_eq!(value["reference_text"], "");
    }
}
