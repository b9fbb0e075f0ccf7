//! Voxgate - local voice-model registry and speech synthesis gateway
//!
//! This library provides the core functionality for the voxgate gateway:
//! - On-disk voice model store (reference audio + matching transcript)
//! - Content-addressed audio cache keyed by synthesis parameters
//! - Synthesis pipeline against an external TTS engine
//! - Transcription adapter over an external speech-recognition engine
//! - Named synthesis presets
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   HTTP API (axum)                   │
//! │   /tts  │  /transcription  │  /voices  │  /presets │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 Voxgate core                         │
//! │  Model store │ Audio cache │ Synthesizer │ Adapter  │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │            External engines (local RPC)             │
//! │     TTS synthesis      │    Speech recognition      │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod presets;
pub mod store;
pub mod synth;
pub mod transcribe;

pub use cache::{AudioCache, CacheKey};
pub use config::{Config, SynthesisDefaults};
pub use error::{Error, Result};
pub use presets::{Preset, PresetStore};
pub use store::{VoiceModel, VoiceModelStore, DEFAULT_VOICE};
pub use synth::{
    BackendCall, HttpTtsBackend, SynthesisOutcome, SynthesisRequest, Synthesizer, TtsBackend,
};
pub use transcribe::{HttpSpeechEngine, SpeechEngine, Transcriber, Transcription};
