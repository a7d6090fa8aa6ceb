//! Error types for the art corpus pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while generating, caching, or selecting art.
#[derive(Debug, Error)]
pub enum ArtError {
    /// A file or an art piece could not be found.
    #[error("not found: {0}")]
    NotFound(String),

    /// An image exists but could not be decoded as PNG or JPEG.
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A corpus could not be fetched (network, status, or format failure).
    #[error("failed to fetch art corpus from {location}: {message}")]
    Fetch { location: String, message: String },

    /// The filters left nothing to choose from.
    #[error("no art matches the current filters")]
    NoMatch,

    /// Cache or configuration state could not be read or written.
    #[error("failed to persist {path}: {message}")]
    Persist { path: PathBuf, message: String },

    /// The cache was built for another version and must be refreshed first.
    #[error("art cache is stale (built for {found}, running {expected}); refresh it first")]
    StaleCache { found: String, expected: String },

    /// An include/exclude pattern is not a valid regex.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// A piece violates the data model (non-rectangular grid, unsafe name).
    #[error("invalid art piece {name:?}: {reason}")]
    InvalidPiece { name: String, reason: String },

    /// The configuration file is unreadable.
    #[error("invalid config {path}: {message}")]
    Config { path: PathBuf, message: String },
}

impl ArtError {
    /// Shorthand for a persistence failure on `path`.
    pub(crate) fn persist(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::Persist {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Returns true when the error only means the filters matched nothing.
    pub fn is_no_match(&self) -> bool {
        matches!(self, Self::NoMatch)
    }
}

/// Convenience Result type for arTTY operations.
pub type Result<T> = std::result::Result<T, ArtError>;
