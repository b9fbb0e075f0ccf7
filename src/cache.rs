//! Content-addressed audio cache
//!
//! Maps a synthesis request's parameters to a previously generated artifact at
//! `<dir>/<digest>.mp3`. The file's existence *is* the cache entry — no index,
//! no expiry, no eviction. Entries are immutable: a digest is written at most
//! once and never overwritten.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::Result;

/// Deterministic digest over the request fields that affect synthesized output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key from the normalized field concatenation
    ///
    /// Same fields in the same order always yield the same key; changing any
    /// field changes it.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn derive(
        text: &str,
        voice: &str,
        speed: f64,
        pitch: f64,
        temperature: f64,
        top_p: f64,
        repetition_penalty: f64,
        seed: i64,
    ) -> Self {
        let material = format!(
            "{text}_{voice}_{speed}_{pitch}_{temperature}_{top_p}_{repetition_penalty}_{seed}"
        );
        let digest = Sha256::digest(material.as_bytes());
        Self(hex::encode(digest))
    }

    /// Hex digest string
    #[must_use]
    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cache over a single directory of `<digest>.mp3` artifacts
#[derive(Debug, Clone)]
pub struct AudioCache {
    dir: PathBuf,
}

impl AudioCache {
    /// Create a cache over `dir`, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Artifact path for a key, whether or not it exists yet
    #[must_use]
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{key}.mp3"))
    }

    /// Look up a cached artifact; a hit exists iff the file does
    #[must_use]
    pub fn lookup(&self, key: &CacheKey) -> Option<PathBuf> {
        let path = self.path_for(key);
        path.exists().then_some(path)
    }

    /// Store synthesized bytes under a key
    ///
    /// Skips the write when an artifact already exists (existing content is
    /// authoritative). Writes go through a temp file renamed into place so a
    /// concurrent reader never observes partial content.
    ///
    /// # Errors
    ///
    /// Returns error on write or rename failure
    pub fn store(&self, key: &CacheKey, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path_for(key);
        if path.exists() {
            tracing::debug!(key = %key, "cache entry already present, keeping existing content");
            return Ok(path);
        }

        write_atomic(&path, bytes)?;
        tracing::debug!(key = %key, bytes = bytes.len(), "cached synthesized audio");
        Ok(path)
    }
}

/// Write bytes to `path` via a sibling temp file and rename
///
/// # Errors
///
/// Returns error on write or rename failure
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension(format!("tmp-{}", &uuid::Uuid::new_v4().simple().to_string()[..8]));
    std::fs::write(&tmp, bytes)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(text: &str, voice: &str, speed: f64, pitch: f64) -> CacheKey {
        CacheKey::derive(text, voice, speed, pitch, 0.7, 0.7, 1.2, 0)
    }

    #[test]
    fn identical_fields_hash_identically() {
        assert_eq!(key("hello", "alice", 1.0, 0.0), key("hello", "alice", 1.0, 0.0));
    }

    #[test]
    fn each_field_changes_the_key() {
        let base = key("hello", "alice", 1.0, 0.0);
        assert_ne!(base, key("hello!", "alice", 1.0, 0.0));
        assert_ne!(base, key("hello", "bob", 1.0, 0.0));
        assert_ne!(base, key("hello", "alice", 1.5, 0.0));
        assert_ne!(base, key("hello", "alice", 1.0, 2.0));
        assert_ne!(base, CacheKey::derive("hello", "alice", 1.0, 0.0, 0.9, 0.7, 1.2, 0));
        assert_ne!(base, CacheKey::derive("hello", "alice", 1.0, 0.0, 0.7, 0.7, 1.2, 7));
    }

    #[test]
    fn lookup_misses_then_hits() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AudioCache::new(dir.path()).unwrap();
        let k = key("hi", "default", 1.0, 0.0);

        assert!(cache.lookup(&k).is_none());
        let path = cache.store(&k, b"mp3 bytes").unwrap();
        assert_eq!(cache.lookup(&k), Some(path));
    }

    #[test]
    fn store_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AudioCache::new(dir.path()).unwrap();
        let k = key("hi", "default", 1.0, 0.0);

        cache.store(&k, b"first").unwrap();
        let path = cache.store(&k, b"second").unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"first");
    }

    #[test]
    fn atomic_write_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let cache = AudioCache::new(dir.path()).unwrap();
        cache.store(&key("x", "default", 1.0, 0.0), b"bytes").unwrap();

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .filter(|e| e.path().extension().is_some_and(|x| x != "mp3"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
