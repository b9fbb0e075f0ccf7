//! HTTP API server for the voxgate gateway
//!
//! Thin routing only: handlers validate the request shape, call into the core
//! components, and map every failure to the uniform `{success:false, error}`
//! body. No internal error type crosses this boundary raw.

pub mod health;
pub mod presets;
pub mod transcription;
pub mod tts;
pub mod voices;

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::SynthesisDefaults;
use crate::presets::PresetStore;
use crate::store::VoiceModelStore;
use crate::synth::Synthesizer;
use crate::transcribe::Transcriber;
use crate::{Error, Result};

/// Shared state for API handlers
pub struct ApiState {
    pub store: VoiceModelStore,
    pub presets: PresetStore,
    pub synthesizer: Synthesizer,
    pub transcriber: Transcriber,
    pub upload_dir: PathBuf,
    pub transcript_dir: PathBuf,
    pub defaults: SynthesisDefaults,
}

/// Uniform API failure: `{success:false, error}` with a taxonomy-driven status
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        #[derive(serde::Serialize)]
        struct ErrorBody {
            success: bool,
            error: String,
        }

        let status = match &self.0 {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Protected(_) => StatusCode::FORBIDDEN,
            Error::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
}

impl ApiServer {
    /// Create a server over shared state
    #[must_use]
    pub fn new(state: ApiState, port: u16) -> Self {
        Self {
            state: Arc::new(state),
            port,
        }
    }

    /// Build the router with all routes
    fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .nest("/tts", tts::router(self.state.clone()))
            .nest("/transcription", transcription::router(self.state.clone()))
            .nest("/voices", voices::router(self.state.clone()))
            .nest("/presets", presets::router(self.state.clone()))
            .merge(health::router(self.state.clone()))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if the server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(port = self.port, "API server listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }
}
