//! Sources of art corpora for cache refreshes.
//!
//! A corpus is the full set of pieces a cache is rebuilt from. It can come from
//! a local directory of images and pre-rendered pieces, from a remote JSON
//! document fetched once with a bounded timeout, or from the local mirror of the
//! last successful download. [`LayeredSource`] combines a downloaded corpus with
//! the locally generated pieces.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::art::ArtPiece;
use crate::error::{ArtError, Result};
use crate::generator::{generate, is_supported_image};
use crate::store::write_atomic;

/// Default timeout for remote corpus fetches.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// A complete set of art pieces plus the source's version marker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corpus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub pieces: Vec<ArtPiece>,
}

/// Trait for places a corpus can be fetched from.
pub trait CorpusSource {
    /// Human-readable location, recorded in the cache.
    fn location(&self) -> String;

    /// Fetches the whole corpus.
    ///
    /// ## Errors
    ///
    /// Returns an error if the corpus cannot be read, downloaded, or decoded.
    fn fetch(&self) -> Result<Corpus>;
}

/// A local directory of `*.json` pieces and `*.png`/`*.jpg` images.
///
/// Images are run through the generator on every fetch. Files are read in name
/// order, so when two files produce the same piece name the later one wins.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_piece(path: &Path) -> Result<ArtPiece> {
        let contents = std::fs::read_to_string(path).map_err(|err| ArtError::Fetch {
            location: path.display().to_string(),
            message: err.to_string(),
        })?;
        serde_json::from_str(&contents).map_err(|err| ArtError::Fetch {
            location: path.display().to_string(),
            message: format!("invalid art piece: {err}"),
        })
    }
}

impl CorpusSource for DirectorySource {
    fn location(&self) -> String {
        self.dir.display().to_string()
    }

    fn fetch(&self) -> Result<Corpus> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(dir = %self.dir.display(), "corpus directory missing, empty corpus");
                return Ok(Corpus::default());
            }
            Err(err) => {
                return Err(ArtError::Fetch {
                    location: self.location(),
                    message: err.to_string(),
                });
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        let mut pieces = Vec::new();
        for path in paths {
            let is_json = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

            if is_json {
                pieces.push(Self::read_piece(&path)?);
            } else if is_supported_image(&path) {
                pieces.push(generate(&path, None)?);
            }
        }

        Ok(Corpus {
            version: None,
            pieces,
        })
    }
}

/// A remote JSON corpus fetched with a single blocking request.
///
/// Fetching has no side effects; persisting the result is up to the caller
/// (see [`MirrorSource::save`]).
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Bounds the whole request; expiry is reported as a fetch failure.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn fetch_error(&self, message: impl std::fmt::Display) -> ArtError {
        ArtError::Fetch {
            location: self.url.clone(),
            message: message.to_string(),
        }
    }
}

impl CorpusSource for HttpSource {
    fn location(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> Result<Corpus> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("artty/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| self.fetch_error(err))?;

        tracing::debug!(url = %self.url, timeout = ?self.timeout, "fetching art corpus");

        let response = client
            .get(&self.url)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|err| self.fetch_error(err))?;
        let corpus: Corpus = response
            .json()
            .map_err(|err| self.fetch_error(format!("invalid corpus: {err}")))?;

        for piece in &corpus.pieces {
            piece.validate().map_err(|err| self.fetch_error(err))?;
        }

        Ok(corpus)
    }
}

/// The last downloaded corpus, kept as a single JSON file.
///
/// The whole corpus (version marker included) is replaced in one atomic write,
/// so a rebuild from the mirror never sees half of one download and half of
/// another. A missing mirror reads as an empty corpus.
#[derive(Debug, Clone)]
pub struct MirrorSource {
    path: PathBuf,
}

impl MirrorSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the mirror with `corpus`.
    ///
    /// ## Errors
    ///
    /// Returns [`ArtError::Persist`] if the file cannot be written; the
    /// previous mirror is left as it was.
    pub fn save(&self, corpus: &Corpus) -> Result<()> {
        let json =
            serde_json::to_vec_pretty(corpus).map_err(|err| ArtError::persist(&self.path, err))?;
        write_atomic(&self.path, &json)?;

        tracing::debug!(
            path = %self.path.display(),
            pieces = corpus.pieces.len(),
            version = ?corpus.version,
            "mirrored art corpus"
        );
        Ok(())
    }
}

impl CorpusSource for MirrorSource {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<Corpus> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Corpus::default());
            }
            Err(err) => {
                return Err(ArtError::Fetch {
                    location: self.location(),
                    message: err.to_string(),
                });
            }
        };

        serde_json::from_str(&contents).map_err(|err| ArtError::Fetch {
            location: self.location(),
            message: format!("invalid corpus: {err}"),
        })
    }
}

/// A corpus that has already been fetched.
///
/// Lets a caller fetch once, refresh the cache from the result, and only then
/// persist the same corpus elsewhere.
#[derive(Debug, Clone)]
pub struct Prefetched {
    location: String,
    corpus: Corpus,
}

impl Prefetched {
    pub fn new(location: impl Into<String>, corpus: Corpus) -> Self {
        Self {
            location: location.into(),
            corpus,
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }
}

impl CorpusSource for Prefetched {
    fn location(&self) -> String {
        self.location.clone()
    }

    fn fetch(&self) -> Result<Corpus> {
        Ok(self.corpus.clone())
    }
}

/// A base corpus with local pieces layered on top.
///
/// The base supplies the location and version marker. Local pieces come after
/// the base ones, so a local piece replaces a base piece of the same name.
pub struct LayeredSource<'a> {
    base: &'a dyn CorpusSource,
    local: &'a dyn CorpusSource,
}

impl<'a> LayeredSource<'a> {
    pub fn new(base: &'a dyn CorpusSource, local: &'a dyn CorpusSource) -> Self {
        Self { base, local }
    }
}

impl CorpusSource for LayeredSource<'_> {
    fn location(&self) -> String {
        self.base.location()
    }

    fn fetch(&self) -> Result<Corpus> {
        let mut corpus = self.base.fetch()?;
        corpus.pieces.extend(self.local.fetch()?.pieces);
        Ok(corpus)
    }
}

/// Writes one piece to `dir/<name>.json`, replacing any previous file.
///
/// ## Errors
///
/// Returns [`ArtError::InvalidPiece`] for an unsafe name or
/// [`ArtError::Persist`] if the file cannot be written.
pub fn write_piece(dir: &Path, piece: &ArtPiece) -> Result<PathBuf> {
    piece.validate()?;
    let path = dir.join(format!("{}.json", piece.name));
    let json = serde_json::to_vec_pretty(piece).map_err(|err| ArtError::persist(&path, err))?;
    write_atomic(&path, &json)?;
    Ok(path)
}
