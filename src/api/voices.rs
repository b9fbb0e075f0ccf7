//! Voice model management endpoints
//!
//! Raw filesystem paths never leave this boundary; detail responses expose
//! `has_audio`/`has_transcript` booleans and read-only display info instead.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiState};
use crate::store::{audio_details, VoiceSettings};

/// Build the voices router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{name}", get(detail).delete(remove))
        .route("/{name}/rename", put(rename))
        .route("/{name}/transcript", put(update_transcript))
        .route("/{name}/image", put(update_image))
        .route("/{name}/sample", put(update_sample))
        .with_state(state)
}

/// Summary entry in the voice list
#[derive(Debug, Serialize)]
pub struct VoiceSummary {
    pub name: String,
    pub description: String,
    pub default_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct ListResponse {
    success: bool,
    voices: Vec<VoiceSummary>,
}

/// List available voice models, default first
async fn list(State(state): State<Arc<ApiState>>) -> Json<ListResponse> {
    let voices = state
        .store
        .list()
        .into_iter()
        .filter_map(|name| state.store.get(&name).ok())
        .map(|model| VoiceSummary {
            name: model.name.clone(),
            description: model.description.clone(),
            default_settings: model.default_settings,
        })
        .collect();

    Json(ListResponse {
        success: true,
        voices,
    })
}

/// Detailed view of a single voice model
#[derive(Debug, Serialize)]
pub struct VoiceDetail {
    pub name: String,
    pub description: String,
    pub default_settings: VoiceSettings,
    pub has_audio: bool,
    pub has_transcript: bool,
    pub transcript: String,
    pub audio_details: String,
}

#[derive(Debug, Serialize)]
struct DetailResponse {
    success: bool,
    voice: VoiceDetail,
}

/// Get details for a specific voice model
async fn detail(
    State(state): State<Arc<ApiState>>,
    Path(name): Path<String>,
) -> Result<Json<DetailResponse>, ApiError> {
    let model = state.store.get(&name)?;

    let has_audio = model.voice_path().exists();
    let detail = VoiceDetail {
        name: model.name.clone(),
        description: model.description.clone(),
        default_settings: model.default_settings,
        has_audio,
        has_transcript: model.transcript_path().exists(),
        transcript: model.transcript(),
        audio_details: if has_audio {
            audio_details(&model.voice_path())
        } else {
            "system default voice".to_string()
        },
    };

    Ok(Json(DetailResponse {
        success: true,
        voice: detail,
    }))
}

/// Registration payload: pairs a previously uploaded audio file with its transcript
#[derive(Debug, Deserialize)]
pub struct CreateVoiceRequest {
    pub name: String,
    pub audio_path: PathBuf,
    pub transcript: String,
    #[serde(default)]
    pub image_path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    success: bool,
    message: String,
}

/// Register a new voice model
async fn create(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<CreateVoiceRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let model = state.store.create(
        &request.name,
        &request.audio_path,
        &request.transcript,
        request.image_path.as_deref(),
    )?;

    Ok(Json(MessageResponse {
        success: true,
        message: format!("voice model '{}' created", model.name),
    }))
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub new_name: String,
}

/// Rename a voice model
async fn rename(
    State(state): State<Arc<ApiState>>,
    Path(name): Path<String>,
    Json(request): Json<RenameRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.store.rename(&name, &request.new_name)?;
    Ok(Json(MessageResponse {
        success: true,
        message: format!("voice model '{name}' renamed to '{}'", request.new_name),
    }))
}

#[derive(Debug, Deserialize)]
pub struct TranscriptUpdate {
    pub transcript: String,
}

/// Replace a voice model's transcript
async fn update_transcript(
    State(state): State<Arc<ApiState>>,
    Path(name): Path<String>,
    Json(request): Json<TranscriptUpdate>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.store.update_transcript(&name, &request.transcript)?;
    Ok(Json(MessageResponse {
        success: true,
        message: format!("transcript for '{name}' updated"),
    }))
}

#[derive(Debug, Deserialize)]
pub struct FileUpdate {
    pub path: PathBuf,
}

/// Replace a voice model's image
async fn update_image(
    State(state): State<Arc<ApiState>>,
    Path(name): Path<String>,
    Json(request): Json<FileUpdate>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.store.update_image(&name, &request.path)?;
    Ok(Json(MessageResponse {
        success: true,
        message: format!("image for '{name}' updated"),
    }))
}

/// Replace a voice model's preview sample
async fn update_sample(
    State(state): State<Arc<ApiState>>,
    Path(name): Path<String>,
    Json(request): Json<FileUpdate>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.store.update_sample(&name, &request.path)?;
    Ok(Json(MessageResponse {
        success: true,
        message: format!("preview sample for '{name}' updated"),
    }))
}

#[derive(Debug, Serialize)]
struct DeleteResponse {
    success: bool,
    message: String,
    files_deleted: bool,
}

/// Delete a voice model
async fn remove(
    State(state): State<Arc<ApiState>>,
    Path(name): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    state.store.delete(&name)?;
    Ok(Json(DeleteResponse {
        success: true,
        message: format!("voice model '{name}' deleted"),
        files_deleted: true,
    }))
}
