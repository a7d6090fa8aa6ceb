//! Filesystem locations used by arTTY.

use std::path::{Path, PathBuf};

/// Environment variable that relocates every arTTY file under one directory.
pub const HOME_ENV: &str = "ARTTY_HOME";

const APP_DIR: &str = "artty";

/// Expands a leading `~` to the user's home directory.
///
/// Paths without a leading `~`, and `~user` forms, are returned unchanged.
///
/// ## Examples
///
/// ```
/// use artty_lib::paths::expand_path;
///
/// assert_eq!(expand_path("/tmp/logo.png"), std::path::PathBuf::from("/tmp/logo.png"));
/// ```
pub fn expand_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();

    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };

    match dirs::home_dir() {
        Some(home) if rest.as_os_str().is_empty() => home,
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

/// Where configuration, the cache snapshot, and the local corpus live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtPaths {
    /// Saved CLI defaults (`rc.json`).
    pub config_file: PathBuf,
    /// The art cache snapshot (`cache.json`).
    pub cache_file: PathBuf,
    /// Generated and hand-made pieces, one file each.
    pub corpus_dir: PathBuf,
    /// The last downloaded corpus (`corpus.json`).
    pub mirror_file: PathBuf,
}

impl ArtPaths {
    /// Puts every file under `root`.
    pub fn under(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            config_file: root.join("rc.json"),
            cache_file: root.join("cache.json"),
            corpus_dir: root.join("art"),
            mirror_file: root.join("corpus.json"),
        }
    }

    /// Resolves the default locations.
    ///
    /// `$ARTTY_HOME` wins when set; otherwise the platform config, cache and
    /// data directories are used, falling back to `~/.artty`.
    pub fn discover() -> Self {
        if let Some(root) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Self::under(expand_path(PathBuf::from(root)));
        }

        let fallback = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".artty");
        let dir = |base: Option<PathBuf>| {
            base.map(|b| b.join(APP_DIR))
                .unwrap_or_else(|| fallback.clone())
        };

        let data = dir(dirs::data_dir());
        Self {
            config_file: dir(dirs::config_dir()).join("rc.json"),
            cache_file: dir(dirs::cache_dir()).join("cache.json"),
            corpus_dir: data.join("art"),
            mirror_file: data.join("corpus.json"),
        }
    }
}
