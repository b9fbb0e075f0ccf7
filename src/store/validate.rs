//! Reference audio validation
//!
//! Rejects files that cannot plausibly serve as a voice reference: missing,
//! empty, below the minimum size, or not a recognizable audio container.
//! A failure of the container check itself never blocks an upload; only
//! genuine validation failures reject the file.

use std::io::Read;
use std::path::Path;

use crate::{Error, Result};

/// Files under this size are treated as corrupt or too short to condition on
pub const MIN_AUDIO_BYTES: u64 = 1000;

/// Validate an audio file for use as a voice model reference
///
/// # Errors
///
/// Returns `Error::Validation` with a human-readable reason when the file is
/// missing, empty, under [`MIN_AUDIO_BYTES`], or has no recognizable audio
/// container signature.
pub fn validate_audio(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(Error::Validation("audio file does not exist".to_string()));
    }

    let size = std::fs::metadata(path)?.len();
    if size == 0 {
        return Err(Error::Validation(
            "the audio file is empty, upload a valid file".to_string(),
        ));
    }

    if size < MIN_AUDIO_BYTES {
        return Err(Error::Validation(
            "the audio file is too short or possibly corrupted".to_string(),
        ));
    }

    match probe_container(path) {
        Some(true) => Ok(()),
        Some(false) => Err(Error::Validation(
            "the audio file appears to be corrupted".to_string(),
        )),
        // The probe itself failed; let a plausibly-valid upload through
        None => {
            tracing::debug!(path = %path.display(), "could not verify audio container");
            Ok(())
        }
    }
}

/// Check the file header for a known audio container signature
///
/// Returns `None` when the header could not be read at all.
fn probe_container(path: &Path) -> Option<bool> {
    let mut header = [0u8; 12];
    let mut file = std::fs::File::open(path).ok()?;
    let read = file.read(&mut header).ok()?;
    if read < 12 {
        return Some(false);
    }

    let recognized = matches!(&header[0..4], b"RIFF" | b"OggS" | b"fLaC")
        || header.starts_with(b"ID3")
        // Bare MPEG frame sync (MP3 without an ID3 tag)
        || (header[0] == 0xFF && header[1] & 0xE0 == 0xE0)
        // ISO BMFF (M4A/MP4): "ftyp" at offset 4
        || &header[4..8] == b"ftyp";

    Some(recognized)
}

/// Human-readable details for a reference audio file
///
/// Duration is reported for WAV only (probed with `hound`, best-effort).
#[must_use]
pub fn audio_details(path: &Path) -> String {
    let Ok(meta) = std::fs::metadata(path) else {
        return "no file details available".to_string();
    };

    #[allow(clippy::cast_precision_loss)]
    let size_mb = meta.len() as f64 / (1024.0 * 1024.0);

    let duration = hound::WavReader::open(path).map_or_else(
        |_| "unknown".to_string(),
        |reader| {
            let spec = reader.spec();
            let secs = f64::from(reader.duration()) / f64::from(spec.sample_rate);
            format!("{secs:.2} seconds")
        },
    );

    format!(
        "file size: {size_mb:.2} MB\nduration: {duration}\npath: {}",
        path.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_bytes(dir: &Path, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn rejects_missing_file() {
        let err = validate_audio(Path::new("/nonexistent/clip.mp3")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn rejects_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_bytes(dir.path(), "empty.mp3", b"");
        let err = validate_audio(&path).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn rejects_undersized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_bytes(dir.path(), "tiny.mp3", &[0xFF; 100]);
        let err = validate_audio(&path).unwrap_err();
        assert!(err.to_string().contains("too short"));
    }

    #[test]
    fn rejects_unrecognized_container() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_bytes(dir.path(), "junk.mp3", &[0x00; 2048]);
        assert!(validate_audio(&path).is_err());
    }

    #[test]
    fn accepts_id3_tagged_mp3() {
        let dir = tempfile::tempdir().unwrap();
        let mut bytes = b"ID3\x04\x00\x00\x00\x00\x00\x00".to_vec();
        bytes.resize(2048, 0);
        let path = write_bytes(dir.path(), "tagged.mp3", &bytes);
        assert!(validate_audio(&path).is_ok());
    }

    #[test]
    fn accepts_riff_wav() {
        let dir = tempfile::tempdir().unwrap();
        let mut bytes = b"RIFF\x24\x08\x00\x00WAVE".to_vec();
        bytes.resize(2048, 0);
        let path = write_bytes(dir.path(), "clip.wav", &bytes);
        assert!(validate_audio(&path).is_ok());
    }

    #[test]
    fn accepts_bare_mpeg_frame() {
        let dir = tempfile::tempdir().unwrap();
        let mut bytes = vec![0xFF, 0xFB, 0x90, 0x00];
        bytes.resize(2048, 0);
        let path = write_bytes(dir.path(), "bare.mp3", &bytes);
        assert!(validate_audio(&path).is_ok());
    }
}
