//! Filtering and picking art from the cache.

use rand::Rng;
use rand::seq::SliceRandom;
use regex::Regex;

use crate::art::ArtPiece;
use crate::cache::ArtCache;
use crate::error::{ArtError, Result};
use crate::store::CacheStore;

/// Maximum piece size, in grid cells, that still fits the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitBounds {
    pub width: usize,
    pub height: usize,
}

impl FitBounds {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Bounds for a terminal of `columns` x `rows` character cells.
    ///
    /// The renderer draws two grid rows per terminal line, so the height
    /// allowance is doubled.
    pub const fn for_terminal(columns: usize, rows: usize) -> Self {
        Self::new(columns, rows * 2)
    }

    /// Returns true if `piece` is no larger than the bounds on either axis.
    pub fn fits(&self, piece: &ArtPiece) -> bool {
        piece.width() <= self.width && piece.height() <= self.height
    }
}

/// Read-only filters applied to the cache.
///
/// Patterns are unanchored regular expressions matched against piece names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    /// Keep only pieces whose name matches.
    pub include: Option<String>,
    /// Drop pieces whose name matches.
    pub exclude: Option<String>,
    /// Drop pieces larger than these bounds.
    pub fit: Option<FitBounds>,
    /// Return exactly this piece, ignoring every other filter.
    pub name: Option<String>,
}

impl Criteria {
    /// Criteria selecting one piece by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// How many pieces [`select`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Every matching piece, in stored order.
    List,
    /// The first matching piece in stored order.
    First,
    /// One matching piece chosen uniformly at random.
    Random,
}

/// The outcome of a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<'a> {
    Many(Vec<&'a ArtPiece>),
    One(&'a ArtPiece),
}

impl<'a> Selection<'a> {
    /// The selected pieces as a list.
    pub fn into_vec(self) -> Vec<&'a ArtPiece> {
        match self {
            Self::Many(pieces) => pieces,
            Self::One(piece) => vec![piece],
        }
    }

    /// The first selected piece.
    pub fn first(&self) -> Option<&'a ArtPiece> {
        match self {
            Self::Many(pieces) => pieces.first().copied(),
            Self::One(piece) => Some(*piece),
        }
    }
}

/// Applies `criteria` to `cache` and picks according to `mode`.
///
/// Random picks use the thread RNG; see [`select_with_rng`] for a seeded pick.
///
/// ## Errors
///
/// - [`ArtError::StaleCache`] if the cache needs a refresh
/// - [`ArtError::NotFound`] if an explicit name is not in the cache
/// - [`ArtError::Pattern`] if a pattern is not a valid regex
/// - [`ArtError::NoMatch`] if nothing survives the filters
pub fn select<'a, S: CacheStore>(
    cache: &'a ArtCache<S>,
    criteria: &Criteria,
    mode: Mode,
) -> Result<Selection<'a>> {
    select_with_rng(cache, criteria, mode, &mut rand::thread_rng())
}

/// Like [`select`], drawing random picks from `rng`.
///
/// ## Errors
///
/// See [`select`].
pub fn select_with_rng<'a, S: CacheStore, R: Rng + ?Sized>(
    cache: &'a ArtCache<S>,
    criteria: &Criteria,
    mode: Mode,
    rng: &mut R,
) -> Result<Selection<'a>> {
    if let Some(name) = &criteria.name {
        let piece = cache
            .get(name)?
            .ok_or_else(|| ArtError::NotFound(format!("art {name:?}")))?;
        return Ok(match mode {
            Mode::List => Selection::Many(vec![piece]),
            Mode::First | Mode::Random => Selection::One(piece),
        });
    }

    let matches = filter(cache, criteria)?;
    tracing::debug!(matches = matches.len(), ?mode, "filtered art");

    match mode {
        Mode::List if matches.is_empty() => Err(ArtError::NoMatch),
        Mode::List => Ok(Selection::Many(matches)),
        Mode::First => matches.first().copied().map(Selection::One).ok_or(ArtError::NoMatch),
        Mode::Random => matches
            .choose(rng)
            .copied()
            .map(Selection::One)
            .ok_or(ArtError::NoMatch),
    }
}

/// Applies include, exclude and fit filters, keeping stored order.
///
/// `criteria.name` is not considered here.
///
/// ## Errors
///
/// Returns [`ArtError::StaleCache`] or [`ArtError::Pattern`].
pub fn filter<'a, S: CacheStore>(
    cache: &'a ArtCache<S>,
    criteria: &Criteria,
) -> Result<Vec<&'a ArtPiece>> {
    let include = compile(criteria.include.as_deref())?;
    let exclude = compile(criteria.exclude.as_deref())?;

    Ok(cache
        .pieces()?
        .filter(|piece| include.as_ref().is_none_or(|re| re.is_match(&piece.name)))
        .filter(|piece| exclude.as_ref().is_none_or(|re| !re.is_match(&piece.name)))
        .filter(|piece| criteria.fit.is_none_or(|bounds| bounds.fits(piece)))
        .collect())
}

/// Compiles a pattern; empty or missing patterns filter nothing.
fn compile(pattern: Option<&str>) -> Result<Option<Regex>> {
    match pattern.filter(|p| !p.is_empty()) {
        Some(pattern) => Ok(Some(Regex::new(pattern)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tempfile::TempDir;

    use super::*;
    use crate::art::Cell;
    use crate::corpus::{Corpus, CorpusSource};
    use crate::store::JsonCacheStore;

    struct Pieces(Vec<ArtPiece>);

    impl CorpusSource for Pieces {
        fn location(&self) -> String {
            "fixture".to_string()
        }

        fn fetch(&self) -> Result<Corpus> {
            Ok(Corpus {
                version: None,
                pieces: self.0.clone(),
            })
        }
    }

    fn block(name: &str, width: usize, height: usize) -> ArtPiece {
        ArtPiece::new(name, vec![vec![Cell::Color(16); width]; height])
    }

    fn fixture(pieces: Vec<ArtPiece>) -> (ArtCache<JsonCacheStore>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonCacheStore::new(temp_dir.path().join("cache.json"));
        let mut cache = ArtCache::load(store, "1.0.0").unwrap();
        cache.refresh(&Pieces(pieces), true).unwrap();
        (cache, temp_dir)
    }

    fn names(selection: Selection<'_>) -> Vec<String> {
        selection.into_vec().iter().map(|p| p.name.clone()).collect()
    }

    #[test]
    fn include_pattern_keeps_matching_names() {
        let (cache, _dir) = fixture(vec![block("cat", 1, 1), block("dog", 1, 1)]);
        let criteria = Criteria {
            include: Some("^d".to_string()),
            ..Criteria::default()
        };

        let selected = select(&cache, &criteria, Mode::List).unwrap();
        assert_eq!(names(selected), vec!["dog"]);
    }

    #[test]
    fn exclude_pattern_drops_matching_names() {
        let (cache, _dir) = fixture(vec![
            block("cat", 1, 1),
            block("catfish", 1, 1),
            block("dog", 1, 1),
        ]);
        let criteria = Criteria {
            include: Some("cat|dog".to_string()),
            exclude: Some("fish".to_string()),
            ..Criteria::default()
        };

        let selected = select(&cache, &criteria, Mode::List).unwrap();
        assert_eq!(names(selected), vec!["cat", "dog"]);
    }

    #[test]
    fn fit_drops_oversized_pieces() {
        let (cache, _dir) = fixture(vec![block("small", 40, 20), block("wide", 120, 40)]);
        let criteria = Criteria {
            fit: Some(FitBounds::new(80, 24)),
            ..Criteria::default()
        };

        let selected = select(&cache, &criteria, Mode::List).unwrap();
        assert_eq!(names(selected), vec!["small"]);
    }

    #[test]
    fn terminal_bounds_double_the_rows() {
        assert_eq!(FitBounds::for_terminal(80, 24), FitBounds::new(80, 48));
    }

    #[test]
    fn explicit_name_ignores_other_filters() {
        let (cache, _dir) = fixture(vec![block("cat", 1, 1), block("huge", 500, 500)]);
        let criteria = Criteria {
            include: Some("^c".to_string()),
            exclude: Some("huge".to_string()),
            fit: Some(FitBounds::new(1, 1)),
            name: Some("huge".to_string()),
        };

        let selected = select(&cache, &criteria, Mode::First).unwrap();
        assert_eq!(selected.first().unwrap().name, "huge");

        let listed = select(&cache, &criteria, Mode::List).unwrap();
        assert_eq!(names(listed), vec!["huge"]);
    }

    #[test]
    fn explicit_name_missing_is_not_found() {
        let (cache, _dir) = fixture(vec![block("cat", 1, 1)]);
        let err = select(&cache, &Criteria::named("dog"), Mode::First).unwrap_err();
        assert!(matches!(err, ArtError::NotFound(_)));
    }

    #[test]
    fn empty_result_is_no_match_in_every_mode() {
        let (cache, _dir) = fixture(vec![block("cat", 1, 1)]);
        let criteria = Criteria {
            include: Some("^z".to_string()),
            ..Criteria::default()
        };

        for mode in [Mode::List, Mode::First, Mode::Random] {
            let err = select(&cache, &criteria, mode).unwrap_err();
            assert!(err.is_no_match(), "{mode:?} should be NoMatch");
        }
    }

    #[test]
    fn empty_cache_is_no_match() {
        let (cache, _dir) = fixture(Vec::new());
        assert!(select(&cache, &Criteria::default(), Mode::First)
            .unwrap_err()
            .is_no_match());
    }

    #[test]
    fn first_mode_uses_stored_order() {
        let (cache, _dir) = fixture(vec![block("zebra", 1, 1), block("ant", 1, 1)]);
        let selected = select(&cache, &Criteria::default(), Mode::First).unwrap();
        assert_eq!(selected.first().unwrap().name, "ant");
    }

    #[test]
    fn random_mode_picks_from_filtered_set() {
        let (cache, _dir) = fixture(vec![
            block("cat", 1, 1),
            block("cow", 1, 1),
            block("dog", 1, 1),
        ]);
        let criteria = Criteria {
            include: Some("^c".to_string()),
            ..Criteria::default()
        };
        let mut rng = StdRng::seed_from_u64(7);

        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..64 {
            let selection = select_with_rng(&cache, &criteria, Mode::Random, &mut rng).unwrap();
            seen.insert(selection.first().unwrap().name.clone());
        }

        assert_eq!(seen.into_iter().collect::<Vec<_>>(), vec!["cat", "cow"]);
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let (cache, _dir) = fixture(vec![block("cat", 1, 1)]);
        let criteria = Criteria {
            include: Some("(".to_string()),
            ..Criteria::default()
        };
        assert!(matches!(
            select(&cache, &criteria, Mode::List),
            Err(ArtError::Pattern(_))
        ));
    }

    #[test]
    fn empty_patterns_filter_nothing() {
        let (cache, _dir) = fixture(vec![block("cat", 1, 1)]);
        let criteria = Criteria {
            include: Some(String::new()),
            exclude: Some(String::new()),
            ..Criteria::default()
        };
        assert_eq!(names(select(&cache, &criteria, Mode::List).unwrap()), vec!["cat"]);
    }

    #[test]
    fn stale_cache_is_never_selected_from() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cache.json");
        {
            let mut old = ArtCache::load(JsonCacheStore::new(&path), "0.1.0").unwrap();
            old.add(block("cat", 1, 1)).unwrap();
        }

        let cache = ArtCache::load(JsonCacheStore::new(&path), "1.0.0").unwrap();
        let err = select(&cache, &Criteria::named("cat"), Mode::First).unwrap_err();
        assert!(matches!(err, ArtError::StaleCache { .. }));
        let err = select(&cache, &Criteria::default(), Mode::List).unwrap_err();
        assert!(matches!(err, ArtError::StaleCache { .. }));
    }
}
