//! Text-to-speech endpoint

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiState};
use crate::store::DEFAULT_VOICE;
use crate::synth::SynthesisRequest;

/// Build the TTS router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/synthesize", post(synthesize))
        .with_state(state)
}

/// Wire shape of a synthesis request; omitted knobs fall back to the
/// configured defaults
#[derive(Debug, Deserialize)]
pub struct TtsRequest {
    pub text: String,
    pub voice: Option<String>,
    pub speed: Option<f64>,
    pub pitch: Option<f64>,
    #[serde(default)]
    pub use_cache: bool,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub repetition_penalty: Option<f64>,
    pub seed: Option<i64>,
}

/// Synthesis response contract
#[derive(Debug, Serialize)]
pub struct SynthesizeResponse {
    pub success: bool,
    pub text: String,
    pub audio_file: String,
    pub voice: String,
    pub cache_hit: bool,
    pub processing_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Generate speech from text
async fn synthesize(
    State(state): State<Arc<ApiState>>,
    Json(body): Json<TtsRequest>,
) -> Result<Json<SynthesizeResponse>, ApiError> {
    if body.text.is_empty() {
        return Err(crate::Error::Validation("text is required".to_string()).into());
    }

    let d = state.defaults;
    let request = SynthesisRequest {
        text: body.text.clone(),
        voice: body.voice.unwrap_or_else(|| DEFAULT_VOICE.to_string()),
        speed: body.speed.unwrap_or(d.speed),
        pitch: body.pitch.unwrap_or(d.pitch),
        use_cache: body.use_cache,
        temperature: body.temperature.unwrap_or(d.temperature),
        top_p: body.top_p.unwrap_or(d.top_p),
        repetition_penalty: body.repetition_penalty.unwrap_or(d.repetition_penalty),
        seed: body.seed.unwrap_or(d.seed),
    };

    let outcome = state.synthesizer.synthesize(&request).await?;

    Ok(Json(SynthesizeResponse {
        success: true,
        text: body.text,
        audio_file: outcome.audio_file.display().to_string(),
        voice: outcome.voice,
        cache_hit: outcome.cache_hit,
        processing_time: outcome.processing_time,
        warning: outcome.warning,
    }))
}
