//! Voice model registry end-to-end tests

use std::path::{Path, PathBuf};

use voxgate::{Error, PresetStore, VoiceModelStore, DEFAULT_VOICE};

fn store() -> (tempfile::TempDir, VoiceModelStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = VoiceModelStore::new(dir.path().join("models")).unwrap();
    (dir, store)
}

/// A 2 KB WAV-shaped sample file
fn sample_wav(dir: &Path) -> PathBuf {
    let path = dir.join("sample.wav");
    let mut bytes = b"RIFF\x24\x08\x00\x00WAVEfmt ".to_vec();
    bytes.resize(2048, 0x55);
    std::fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn create_list_get_transcript_roundtrip() {
    // Scenario: register "alice" from a 2 KB sample and read everything back
    let (dir, store) = store();
    let audio = sample_wav(dir.path());

    store.create("alice", &audio, "hello world", None).unwrap();

    let names = store.list();
    assert_eq!(names[0], DEFAULT_VOICE);
    assert!(names.contains(&"alice".to_string()));

    let alice = store.get("alice").unwrap();
    assert_eq!(
        std::fs::read_to_string(alice.transcript_path()).unwrap(),
        "hello world"
    );
    assert_eq!(
        std::fs::read(alice.voice_path()).unwrap(),
        std::fs::read(&audio).unwrap()
    );
}

#[test]
fn zero_byte_audio_never_registers() {
    let (dir, store) = store();
    let empty = dir.path().join("empty.wav");
    std::fs::write(&empty, b"").unwrap();

    let err = store.create("alice", &empty, "hello", None).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(!store.list().contains(&"alice".to_string()));
}

#[test]
fn default_voice_resists_every_mutation() {
    let (dir, store) = store();
    let audio = sample_wav(dir.path());

    assert!(matches!(
        store.create(DEFAULT_VOICE, &audio, "x", None),
        Err(Error::Protected(_))
    ));
    assert!(matches!(
        store.rename(DEFAULT_VOICE, "voice2"),
        Err(Error::Protected(_))
    ));
    assert!(matches!(
        store.delete(DEFAULT_VOICE),
        Err(Error::Protected(_))
    ));
    assert!(matches!(
        store.update_transcript(DEFAULT_VOICE, "x"),
        Err(Error::Protected(_))
    ));
    assert!(matches!(
        store.update_sample(DEFAULT_VOICE, &audio),
        Err(Error::Protected(_))
    ));

    // Still resolvable and still first in the listing
    assert!(store.get(DEFAULT_VOICE).is_ok());
    assert_eq!(store.list()[0], DEFAULT_VOICE);
}

#[test]
fn delete_then_get_is_not_found() {
    let (dir, store) = store();
    let audio = sample_wav(dir.path());
    store.create("alice", &audio, "hi", None).unwrap();

    store.delete("alice").unwrap();
    assert!(matches!(store.get("alice"), Err(Error::NotFound(_))));
    assert!(!store.list().contains(&"alice".to_string()));
}

#[test]
fn rename_keeps_content_under_new_name() {
    let (dir, store) = store();
    let audio = sample_wav(dir.path());
    store.create("alice", &audio, "original text", None).unwrap();

    store.rename("alice", "alicia").unwrap();

    let renamed = store.get("alicia").unwrap();
    assert_eq!(renamed.transcript(), "original text");
    assert!(renamed.voice_path().ends_with("alicia/alicia.mp3"));
    assert!(matches!(store.get("alice"), Err(Error::NotFound(_))));
}

#[test]
fn traversal_name_cannot_escape_the_model_root() {
    let (dir, store) = store();
    // An unrelated file beside the model root
    let precious = dir.path().join("precious.txt");
    std::fs::write(&precious, b"keep").unwrap();

    assert!(matches!(store.delete(".."), Err(Error::Validation(_))));

    let audio = sample_wav(dir.path());
    assert!(matches!(
        store.create("../escaped", &audio, "oops", None),
        Err(Error::Validation(_))
    ));

    assert!(precious.exists());
    assert!(!dir.path().join("escaped").exists());
}

#[test]
fn preset_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let presets = PresetStore::new(dir.path().join("presets")).unwrap();

    presets.save("narration", "alice", 0.9, -2.0).unwrap();
    presets.save("chipmunk", "alice", 1.8, 8.0).unwrap();

    let mut names = presets.list();
    names.sort();
    assert_eq!(names, vec!["chipmunk", "narration"]);

    let narration = presets.get("narration").unwrap();
    assert_eq!(narration.voice, "alice");
    assert!((narration.speed - 0.9).abs() < f64::EPSILON);

    presets.delete("chipmunk").unwrap();
    assert_eq!(presets.list(), vec!["narration"]);
    assert!(matches!(presets.get("chipmunk"), Err(Error::NotFound(_))));
}
