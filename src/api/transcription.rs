//! Audio upload and transcription endpoint

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiState};
use crate::Error;

/// Build the transcription router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/transcribe", post(transcribe))
        .with_state(state)
}

const ALLOWED_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a"];

/// Upload metadata carried alongside the raw audio body
#[derive(Debug, Deserialize)]
pub struct UploadParams {
    /// Original filename; its extension selects the stored format
    pub filename: String,
}

/// Transcription response contract
#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub success: bool,
    pub transcript: String,
    pub audio_file: String,
    pub transcript_file: String,
    pub processing_time: f64,
    pub language: String,
    pub language_probability: f64,
}

/// Accept an audio upload, transcribe it, and persist both artifacts
async fn transcribe(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<Json<TranscribeResponse>, ApiError> {
    if body.is_empty() {
        return Err(Error::Validation("empty audio data".to_string()).into());
    }

    let extension = params
        .filename
        .rsplit('.')
        .next()
        .map(str::to_lowercase)
        .unwrap_or_default();

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(Error::Validation(format!(
            "unsupported file format '{extension}', supported: {}",
            ALLOWED_EXTENSIONS.join(", ")
        ))
        .into());
    }

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let unique = uuid::Uuid::new_v4().simple().to_string();
    let base = format!("{timestamp}_{}", &unique[..8]);

    let audio_path = state.upload_dir.join(format!("{base}.{extension}"));
    tokio::fs::write(&audio_path, &body).await.map_err(Error::from)?;

    let result = state.transcriber.transcribe(&audio_path).await?;

    let transcript_path = state.transcript_dir.join(format!("{base}.txt"));
    tokio::fs::write(&transcript_path, &result.transcript)
        .await
        .map_err(Error::from)?;

    Ok(Json(TranscribeResponse {
        success: true,
        transcript: result.transcript,
        audio_file: audio_path.display().to_string(),
        transcript_file: transcript_path.display().to_string(),
        processing_time: result.processing_time,
        language: result.language,
        language_probability: result.language_probability,
    }))
}
