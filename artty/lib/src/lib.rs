//! Art corpus pipeline for arTTY.
//!
//! This library turns raster images into terminal art, keeps a versioned cache
//! of art pieces, and selects pieces to display.
//!
//! ## Generation
//!
//! - [`color`] - Quantizes RGBA pixels onto the xterm 256-color palette
//! - [`sampler`] - Fixed-stride downsampling of source images
//! - [`filename`] - Parses the `<name>[_<width>x<height>].<ext>` convention
//! - [`generator`] - Builds an [`ArtPiece`] from an image file
//!
//! ## Storage
//!
//! - [`ArtCache`] - Versioned cache with stale detection and refresh
//! - [`CacheStore`] / [`JsonCacheStore`] - Atomic JSON snapshot storage
//! - [`CorpusSource`] - [`DirectorySource`], [`HttpSource`], [`MirrorSource`] and
//!   [`LayeredSource`] for refreshes
//!
//! ## Selection and display
//!
//! - [`select()`] - Include/exclude/fit filtering with list, first and random picks
//! - [`render`] - Half-block rendering with 256-color escape codes
//! - [`Config`] / [`ArtPaths`] - Saved CLI defaults and file locations
//!
//! ## Examples
//!
//! ```no_run
//! use artty_lib::{ArtCache, Criteria, JsonCacheStore, Mode, select, VERSION};
//!
//! let cache = ArtCache::load(JsonCacheStore::new("/tmp/artty/cache.json"), VERSION)?;
//! let criteria = Criteria { include: Some("^d".to_string()), ..Criteria::default() };
//! for piece in select(&cache, &criteria, Mode::List)?.into_vec() {
//!     println!("{}", piece.name);
//! }
//! # Ok::<(), artty_lib::ArtError>(())
//! ```

pub mod art;
pub mod cache;
pub mod color;
pub mod config;
pub mod corpus;
mod error;
pub mod filename;
pub mod generator;
pub mod paths;
pub mod render;
pub mod sampler;
pub mod select;
pub mod store;

pub use art::{ArtPiece, Cell};
pub use cache::{ArtCache, CacheState, RefreshOutcome};
pub use config::Config;
pub use corpus::{
    Corpus, CorpusSource, DirectorySource, HttpSource, LayeredSource, MirrorSource, Prefetched,
};
pub use error::{ArtError, Result};
pub use generator::generate;
pub use paths::ArtPaths;
pub use select::{Criteria, FitBounds, Mode, Selection, select};
pub use store::{CacheSnapshot, CacheStore, JsonCacheStore};

/// Cache format version; a cache stored under any other version is stale.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
