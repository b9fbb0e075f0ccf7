//! Preset endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiState};
use crate::presets::Preset;

/// Build the presets router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(list).post(save))
        .route("/{name}", get(detail).delete(remove))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct ListResponse {
    success: bool,
    presets: Vec<String>,
}

/// List preset names
async fn list(State(state): State<Arc<ApiState>>) -> Json<ListResponse> {
    Json(ListResponse {
        success: true,
        presets: state.presets.list(),
    })
}

#[derive(Debug, Serialize)]
struct DetailResponse {
    success: bool,
    preset: Preset,
}

/// Get a single preset
async fn detail(
    State(state): State<Arc<ApiState>>,
    Path(name): Path<String>,
) -> Result<Json<DetailResponse>, ApiError> {
    let preset = state.presets.get(&name)?;
    Ok(Json(DetailResponse {
        success: true,
        preset,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SavePresetRequest {
    pub name: String,
    pub voice: String,
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default)]
    pub pitch: f64,
}

const fn default_speed() -> f64 {
    1.0
}

/// Save a preset, overwriting any existing one
async fn save(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<SavePresetRequest>,
) -> Result<Json<DetailResponse>, ApiError> {
    let preset = state
        .presets
        .save(&request.name, &request.voice, request.speed, request.pitch)?;
    Ok(Json(DetailResponse {
        success: true,
        preset,
    }))
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    success: bool,
    message: String,
}

/// Delete a preset
async fn remove(
    State(state): State<Arc<ApiState>>,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.presets.delete(&name)?;
    Ok(Json(MessageResponse {
        success: true,
        message: format!("preset '{name}' deleted"),
    }))
}
