//! The versioned art cache.
//!
//! The cache is loaded once at startup and passed by reference to whatever
//! needs it. A cache whose stored version differs from the running version is
//! *stale*: its pieces are not exposed and it cannot be mutated until a
//! successful [`ArtCache::refresh`].
//!
//! Every mutation is persisted before it is applied in memory, so a failed write
//! leaves both the in-memory cache and the snapshot on disk as they were.

use std::collections::BTreeMap;

use crate::art::ArtPiece;
use crate::corpus::CorpusSource;
use crate::error::{ArtError, Result};
use crate::store::{CacheSnapshot, CacheStore};

/// Whether the cache can be trusted for reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Built for the running version.
    Valid,
    /// Built for another version; must be refreshed first.
    Stale,
}

/// Result of a [`ArtCache::refresh`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The cache was rebuilt with this many pieces.
    Refreshed(usize),
    /// Nothing was done; the cache was already refreshed in this process.
    Skipped,
}

/// The persisted, versioned collection of art pieces.
#[derive(Debug)]
pub struct ArtCache<S: CacheStore> {
    store: S,
    running_version: String,
    snapshot: CacheSnapshot,
    state: CacheState,
    refreshed: bool,
}

impl<S: CacheStore> ArtCache<S> {
    /// Loads the cache from `store` for the program version `running_version`.
    ///
    /// A missing snapshot yields an empty, valid cache. A snapshot stored by a
    /// different version yields a stale cache.
    ///
    /// ## Errors
    ///
    /// Propagates [`ArtError::Persist`] if the snapshot cannot be read.
    pub fn load(store: S, running_version: impl Into<String>) -> Result<Self> {
        let running_version = running_version.into();

        let (snapshot, state) = match store.load(&running_version)? {
            None => (CacheSnapshot::empty(&running_version), CacheState::Valid),
            Some(snapshot) if snapshot.version == running_version => (snapshot, CacheState::Valid),
            Some(snapshot) => {
                tracing::info!(
                    stored = %snapshot.version,
                    running = %running_version,
                    "art cache version mismatch, cache is stale"
                );
                (snapshot, CacheState::Stale)
            }
        };

        Ok(Self {
            store,
            running_version,
            snapshot,
            state,
            refreshed: false,
        })
    }

    pub fn state(&self) -> CacheState {
        self.state
    }

    pub fn is_stale(&self) -> bool {
        self.state == CacheState::Stale
    }

    /// The version stored with the current snapshot.
    pub fn version(&self) -> &str {
        &self.snapshot.version
    }

    /// The corpus location of the last refresh, if any.
    pub fn source_location(&self) -> Option<&str> {
        self.snapshot.source_location.as_deref()
    }

    /// The version marker reported by the last refreshed corpus, if any.
    pub fn corpus_version(&self) -> Option<&str> {
        self.snapshot.corpus_version.as_deref()
    }

    /// All pieces, in stored (name) order.
    ///
    /// ## Errors
    ///
    /// Returns [`ArtError::StaleCache`] if the cache needs a refresh.
    pub fn pieces(&self) -> Result<impl Iterator<Item = &ArtPiece>> {
        self.ensure_valid()?;
        Ok(self.snapshot.pieces.values())
    }

    /// Looks up one piece by name.
    ///
    /// ## Errors
    ///
    /// Returns [`ArtError::StaleCache`] if the cache needs a refresh.
    pub fn get(&self, name: &str) -> Result<Option<&ArtPiece>> {
        self.ensure_valid()?;
        Ok(self.snapshot.pieces.get(name))
    }

    /// Piece names in stored order.
    ///
    /// ## Errors
    ///
    /// Returns [`ArtError::StaleCache`] if the cache needs a refresh.
    pub fn names(&self) -> Result<Vec<&str>> {
        Ok(self.pieces()?.map(|piece| piece.name.as_str()).collect())
    }

    /// Number of stored pieces (zero for a stale cache).
    pub fn len(&self) -> usize {
        match self.state {
            CacheState::Valid => self.snapshot.pieces.len(),
            CacheState::Stale => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Adds a piece, replacing any piece with the same name, and persists.
    ///
    /// ## Errors
    ///
    /// - [`ArtError::StaleCache`] if the cache needs a refresh
    /// - [`ArtError::InvalidPiece`] if the piece breaks the data model
    /// - [`ArtError::Persist`] if the snapshot cannot be written
    pub fn add(&mut self, piece: ArtPiece) -> Result<()> {
        self.ensure_valid()?;
        piece.validate()?;

        let name = piece.name.clone();
        let mut next = self.snapshot.clone();
        let replaced = next.pieces.insert(name.clone(), piece).is_some();
        self.commit(next)?;

        tracing::debug!(%name, replaced, "added art piece");
        Ok(())
    }

    /// Removes the piece called `name` and persists.
    ///
    /// ## Errors
    ///
    /// - [`ArtError::StaleCache`] if the cache needs a refresh
    /// - [`ArtError::NotFound`] if no such piece exists
    /// - [`ArtError::Persist`] if the snapshot cannot be written
    pub fn remove(&mut self, name: &str) -> Result<ArtPiece> {
        self.ensure_valid()?;

        let mut next = self.snapshot.clone();
        let removed = next
            .pieces
            .remove(name)
            .ok_or_else(|| ArtError::NotFound(format!("art {name:?}")))?;
        self.commit(next)?;

        tracing::debug!(%name, "removed art piece");
        Ok(removed)
    }

    /// Rebuilds the cache from `source`.
    ///
    /// Without `force`, a valid cache that was already refreshed by this
    /// instance is left alone. Otherwise the corpus is fetched, every piece is
    /// validated, and the result replaces all pieces wholesale under the running
    /// version.
    ///
    /// ## Errors
    ///
    /// Returns the source's error, [`ArtError::InvalidPiece`], or
    /// [`ArtError::Persist`]. On any error the previous cache is kept as is,
    /// both in memory and on disk.
    pub fn refresh(&mut self, source: &dyn CorpusSource, force: bool) -> Result<RefreshOutcome> {
        if !force && self.refreshed && self.state == CacheState::Valid {
            tracing::debug!("art cache already refreshed, skipping");
            return Ok(RefreshOutcome::Skipped);
        }

        let location = source.location();
        let corpus = source.fetch()?;

        let mut pieces = BTreeMap::new();
        for piece in corpus.pieces {
            piece.validate()?;
            pieces.insert(piece.name.clone(), piece);
        }
        let count = pieces.len();

        self.commit(CacheSnapshot {
            version: self.running_version.clone(),
            source_location: Some(location.clone()),
            corpus_version: corpus.version,
            pieces,
        })?;
        self.state = CacheState::Valid;
        self.refreshed = true;

        tracing::info!(%location, pieces = count, "refreshed art cache");
        Ok(RefreshOutcome::Refreshed(count))
    }

    fn ensure_valid(&self) -> Result<()> {
        match self.state {
            CacheState::Valid => Ok(()),
            CacheState::Stale => Err(ArtError::StaleCache {
                found: self.snapshot.version.clone(),
                expected: self.running_version.clone(),
            }),
        }
    }

    fn commit(&mut self, next: CacheSnapshot) -> Result<()> {
        self.store.save(&next)?;
        self.snapshot = next;
        Ok(())
    }
}
