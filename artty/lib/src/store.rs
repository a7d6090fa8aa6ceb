//! Persistence for the art cache.
//!
//! The cache is stored as a single JSON snapshot. Every write goes to a temporary
//! file in the same directory and is renamed over the old snapshot, so a reader
//! (or a crash) only ever sees a complete file.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::art::ArtPiece;
use crate::error::{ArtError, Result};

/// Everything the cache persists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    /// Format version the snapshot was built against.
    pub version: String,

    /// Corpus location used by the last refresh.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_location: Option<String>,

    /// Version marker reported by that corpus.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corpus_version: Option<String>,

    #[serde(default)]
    pub pieces: BTreeMap<String, ArtPiece>,
}

impl CacheSnapshot {
    /// An empty snapshot for `version`.
    pub fn empty(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            source_location: None,
            corpus_version: None,
            pieces: BTreeMap::new(),
        }
    }
}

/// Only the version, for snapshots from another version whose body no longer
/// parses.
#[derive(Deserialize)]
struct VersionHeader {
    version: String,
}

/// Trait for cache storage backends.
pub trait CacheStore {
    /// Loads the stored snapshot, or `None` if nothing has been stored yet.
    ///
    /// A snapshot written by a version other than `running_version` may come
    /// back with only its version filled in when its body no longer parses.
    ///
    /// ## Errors
    ///
    /// Returns [`ArtError::Persist`] if the snapshot exists but cannot be read,
    /// including a snapshot of `running_version` whose body does not parse.
    fn load(&self, running_version: &str) -> Result<Option<CacheSnapshot>>;

    /// Replaces the stored snapshot.
    ///
    /// ## Errors
    ///
    /// Returns [`ArtError::Persist`] if the snapshot cannot be written. The
    /// previous snapshot must survive a failed save.
    fn save(&self, snapshot: &CacheSnapshot) -> Result<()>;
}

/// JSON file-based cache storage with atomic replacement.
#[derive(Debug, Clone)]
pub struct JsonCacheStore {
    path: PathBuf,
}

impl JsonCacheStore {
    /// Creates a store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CacheStore for JsonCacheStore {
    fn load(&self, running_version: &str) -> Result<Option<CacheSnapshot>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(ArtError::persist(&self.path, err)),
        };

        match serde_json::from_str::<CacheSnapshot>(&contents) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(err) => {
                // A snapshot from another format version may not parse, but its
                // version still decides staleness; the pieces are never read.
                let header = match serde_json::from_str::<VersionHeader>(&contents) {
                    Ok(header) if header.version != running_version => header,
                    _ => return Err(ArtError::persist(&self.path, err)),
                };
                tracing::debug!(
                    path = %self.path.display(),
                    version = %header.version,
                    "cache body unreadable, keeping version only"
                );
                Ok(Some(CacheSnapshot {
                    corpus_version: None,
                    source_location: None,
                    pieces: BTreeMap::new(),
                    version: header.version,
                }))
            }
        }
    }

    fn save(&self, snapshot: &CacheSnapshot) -> Result<()> {
        let json =
            serde_json::to_vec(snapshot).map_err(|err| ArtError::persist(&self.path, err))?;
        write_atomic(&self.path, &json)?;

        tracing::debug!(
            path = %self.path.display(),
            pieces = snapshot.pieces.len(),
            "wrote art cache"
        );
        Ok(())
    }
}

/// Writes `contents` to `path` via a temporary file and a rename.
///
/// ## Errors
///
/// Returns [`ArtError::Persist`] if the directory cannot be created or the
/// write or rename fails. `path` is left untouched on failure.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|err| ArtError::persist(path, err))?;

    let mut file = NamedTempFile::new_in(parent).map_err(|err| ArtError::persist(path, err))?;
    file.write_all(contents)
        .and_then(|()| file.as_file().sync_all())
        .map_err(|err| ArtError::persist(path, err))?;
    file.persist(path)
        .map_err(|err| ArtError::persist(path, err.error))?;

    Ok(())
}
