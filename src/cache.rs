//! On-disk cache for expensive intermediate artifacts.
//!
//! Artifacts are stored as MessagePack blobs in one directory. The file name
//! is the SHA-256 of the artifact kind and a caller-chosen stable key (usually
//! the source video path), so a cache hit returns exactly the bytes written by
//! the earlier run.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

/// Errors raised by the artifact cache. None of them is fatal to the
/// pipeline, which recomputes on any failure.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode artifact: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("failed to decode artifact: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

/// Kind of a cached artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Raw tracker output.
    Tracks,
    /// Per-frame camera movement sequence.
    CameraMovements,
}

impl ArtifactKind {
    fn tag(self) -> &'static str {
        match self {
            ArtifactKind::Tracks => "tracks",
            ArtifactKind::CameraMovements => "camera_movements",
        }
    }
}

/// Directory of cached artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactCache {
    dir: PathBuf,
}

impl ArtifactCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing an artifact.
    pub fn path_for(&self, kind: ArtifactKind, key: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(kind.tag().as_bytes());
        hasher.update([0u8]);
        hasher.update(key.as_bytes());
        self.dir
            .join(format!("{}-{:x}.msgpack", kind.tag(), hasher.finalize()))
    }

    /// Load an artifact. A missing file is `Ok(None)`.
    pub fn load<T: DeserializeOwned>(
        &self,
        kind: ArtifactKind,
        key: &str,
    ) -> Result<Option<T>, CacheError> {
        let path = self.path_for(kind, key);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), bytes = bytes.len(), "cache hit");
        Ok(Some(rmp_serde::from_slice(&bytes)?))
    }

    /// Store an artifact, replacing any earlier version.
    pub fn store<T: Serialize>(
        &self,
        kind: ArtifactKind,
        key: &str,
        value: &T,
    ) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)?;
        let bytes = rmp_serde::to_vec_named(value)?;
        let path = self.path_for(kind, key);
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, &path)?;
        debug!(path = %path.display(), bytes = bytes.len(), "artifact cached");
        Ok(())
    }

    /// Remove an artifact if present.
    pub fn remove(&self, kind: ArtifactKind, key: &str) -> Result<(), CacheError> {
        match fs::remove_file(self.path_for(kind, key)) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}
