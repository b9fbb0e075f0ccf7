//! Synthesis pipeline integration tests
//!
//! Exercises the full request path against a fake engine handle, without any
//! external TTS server.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use voxgate::synth::BackendCall;
use voxgate::{
    AudioCache, Error, SynthesisDefaults, SynthesisRequest, Synthesizer, TtsBackend,
    VoiceModelStore,
};

/// How the fake engine shapes its reply
#[derive(Clone, Copy)]
enum ReplyShape {
    PathString,
    SequenceWithPath,
    Garbage,
    DirectoryPath,
}

/// Fake TTS engine that writes a file per call and records every call
struct FakeEngine {
    out_dir: PathBuf,
    shape: ReplyShape,
    calls: AtomicUsize,
    captured: Mutex<Vec<BackendCall>>,
}

impl FakeEngine {
    fn new(out_dir: &Path, shape: ReplyShape) -> Self {
        Self {
            out_dir: out_dir.to_path_buf(),
            shape,
            calls: AtomicUsize::new(0),
            captured: Mutex::new(Vec::new()),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_call(&self) -> BackendCall {
        self.captured.lock().unwrap().last().unwrap().clone()
    }
}

#[async_trait]
impl TtsBackend for FakeEngine {
    async fn synthesize(&self, call: &BackendCall) -> voxgate::Result<serde_json::Value> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.captured.lock().unwrap().push(call.clone());

        if matches!(self.shape, ReplyShape::DirectoryPath) {
            let dir = self.out_dir.join(format!("engine_out_{n}.d"));
            std::fs::create_dir_all(&dir)?;
            return Ok(serde_json::json!(dir.display().to_string()));
        }

        let path = self.out_dir.join(format!("engine_out_{n}.mp3"));
        std::fs::write(&path, format!("audio for: {}", call.text))?;
        let path_str = path.display().to_string();

        Ok(match self.shape {
            ReplyShape::PathString => serde_json::json!(path_str),
            ReplyShape::SequenceWithPath => serde_json::json!([path_str, 1.25]),
            ReplyShape::Garbage => serde_json::json!({"unexpected": true}),
            // Handled by the early return above
            ReplyShape::DirectoryPath => unreachable!(),
        })
    }
}

struct Fixture {
    _dir: tempfile::TempDir,
    engine: Arc<FakeEngine>,
    synth: Synthesizer,
    store: VoiceModelStore,
    root: PathBuf,
}

fn fixture(shape: ReplyShape) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    let store = VoiceModelStore::new(root.join("models")).unwrap();
    let cache = AudioCache::new(root.join("cache")).unwrap();
    let engine = Arc::new(FakeEngine::new(&root, shape));
    let synth = Synthesizer::new(
        engine.clone(),
        store.clone(),
        cache,
        root.join("generated"),
    );
    std::fs::create_dir_all(root.join("generated")).unwrap();

    Fixture {
        _dir: dir,
        engine,
        synth,
        store,
        root,
    }
}

fn request(text: &str) -> SynthesisRequest {
    SynthesisRequest::new(text, &SynthesisDefaults::default())
}

fn register_voice(fx: &Fixture, name: &str, transcript: &str) {
    let audio = fx.root.join("source.mp3");
    let mut bytes = b"ID3\x04\x00\x00\x00\x00\x00\x00".to_vec();
    bytes.resize(2048, 0xAA);
    std::fs::write(&audio, bytes).unwrap();
    fx.store.create(name, &audio, transcript, None).unwrap();
}

#[tokio::test]
async fn cached_request_is_idempotent() {
    let fx = fixture(ReplyShape::PathString);
    let mut req = request("hello world");
    req.use_cache = true;

    let first = fx.synth.synthesize(&req).await.unwrap();
    assert!(!first.cache_hit);
    assert!(first.processing_time >= 0.0);

    let second = fx.synth.synthesize(&req).await.unwrap();
    assert!(second.cache_hit);
    assert!((second.processing_time - 0.0).abs() < f64::EPSILON);
    assert_eq!(first.audio_file, second.audio_file);

    // The engine was only dispatched once
    assert_eq!(fx.engine.call_count(), 1);
}

#[tokio::test]
async fn uncached_requests_produce_distinct_outputs() {
    let fx = fixture(ReplyShape::PathString);
    let req = request("same text twice");

    let first = fx.synth.synthesize(&req).await.unwrap();
    let second = fx.synth.synthesize(&req).await.unwrap();

    assert!(!first.cache_hit);
    assert!(!second.cache_hit);
    assert_ne!(first.audio_file, second.audio_file);
    assert!(!std::fs::read(&first.audio_file).unwrap().is_empty());
    assert!(!std::fs::read(&second.audio_file).unwrap().is_empty());
    assert_eq!(fx.engine.call_count(), 2);
}

#[tokio::test]
async fn unknown_voice_degrades_with_warning() {
    let fx = fixture(ReplyShape::PathString);
    let mut req = request("hello");
    req.voice = "ghost".to_string();

    let outcome = fx.synth.synthesize(&req).await.unwrap();

    assert_eq!(outcome.voice, "ghost");
    assert!(outcome.warning.as_deref().unwrap().contains("ghost"));

    // Degraded to the default-like path: no reference material dispatched
    let call = fx.engine.last_call();
    assert!(call.reference_audio.is_none());
    assert_eq!(call.reference_text, "");
}

#[tokio::test]
async fn registered_voice_supplies_reference_material() {
    let fx = fixture(ReplyShape::PathString);
    register_voice(&fx, "alice", "the quick brown fox");

    let mut req = request("hello");
    req.voice = "alice".to_string();

    let outcome = fx.synth.synthesize(&req).await.unwrap();
    assert!(outcome.warning.is_none());

    let call = fx.engine.last_call();
    let reference = call.reference_audio.unwrap();
    assert!(reference.ends_with("alice/alice.mp3"));
    assert_eq!(call.reference_text, "the quick brown fox");
}

#[tokio::test]
async fn default_voice_omits_reference_material() {
    let fx = fixture(ReplyShape::SequenceWithPath);
    let outcome = fx.synth.synthesize(&request("plain")).await.unwrap();

    assert!(outcome.warning.is_none());
    let call = fx.engine.last_call();
    assert!(call.reference_audio.is_none());
    assert_eq!(call.reference_text, "");
}

#[tokio::test]
async fn sequence_reply_shape_is_accepted() {
    let fx = fixture(ReplyShape::SequenceWithPath);
    let outcome = fx.synth.synthesize(&request("tuple shape")).await.unwrap();
    assert_eq!(
        std::fs::read(&outcome.audio_file).unwrap(),
        b"audio for: tuple shape"
    );
}

#[tokio::test]
async fn garbage_reply_shape_is_a_hard_failure() {
    let fx = fixture(ReplyShape::Garbage);
    let err = fx.synth.synthesize(&request("whatever")).await.unwrap_err();
    assert!(matches!(err, Error::Tts(_)));
    // Human-readable message, no raw internals beyond the engine reply shape
    assert!(err.to_string().contains("speech synthesis failed"));
}

#[tokio::test]
async fn unreadable_engine_artifact_is_a_synthesis_failure() {
    // The reply path exists but cannot be read as a file
    let fx = fixture(ReplyShape::DirectoryPath);
    let err = fx.synth.synthesize(&request("whatever")).await.unwrap_err();
    assert!(matches!(err, Error::Tts(_)));
    assert!(err.to_string().contains("speech synthesis failed"));
}

#[tokio::test]
async fn changed_parameters_change_the_cache_entry() {
    let fx = fixture(ReplyShape::PathString);

    let mut base = request("hello");
    base.use_cache = true;
    let first = fx.synth.synthesize(&base).await.unwrap();

    let mut faster = base.clone();
    faster.speed = 1.5;
    let second = fx.synth.synthesize(&faster).await.unwrap();

    assert!(!second.cache_hit);
    assert_ne!(first.audio_file, second.audio_file);
    assert_eq!(fx.engine.call_count(), 2);
}
