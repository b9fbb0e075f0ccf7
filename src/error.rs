//! Error types for the voxgate gateway

use thiserror::Error;

/// Result type alias for voxgate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the voxgate gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Input rejected before any side effect (bad name, bad audio file)
    #[error("validation error: {0}")]
    Validation(String),

    /// Voice model or preset not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Mutation attempted on the protected default voice
    #[error("protected resource: {0}")]
    Protected(String),

    /// Engine never initialized (configuration/startup issue, not per-request)
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// Unexpected reply shape or RPC failure from an external engine
    #[error("backend error: {0}")]
    Backend(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
