//! Saved defaults for the arTTY CLI.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::corpus::DEFAULT_FETCH_TIMEOUT;
use crate::error::{ArtError, Result};
use crate::select::{Criteria, FitBounds};
use crate::store::write_atomic;

/// Persistent CLI defaults, saved with `--save`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Always draw this piece.
    pub art: Option<String>,
    pub clear_screen: bool,
    /// Exclude art whose name matches this pattern.
    pub exclude: String,
    /// Only use art that fits the terminal.
    pub fit: bool,
    /// Only use art whose name matches this pattern.
    #[serde(rename = "match")]
    pub matching: String,
    pub random: bool,
    /// Remote corpus for `--update`.
    pub corpus_url: Option<String>,
    pub fetch_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            art: None,
            clear_screen: false,
            exclude: String::new(),
            fit: false,
            matching: String::new(),
            random: false,
            corpus_url: None,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT.as_secs(),
        }
    }
}

impl Config {
    /// Loads the config at `path`, or the defaults if it does not exist.
    ///
    /// ## Errors
    ///
    /// Returns [`ArtError::Config`] if the file exists but cannot be read or
    /// parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(err) => return Err(config_error(path, err)),
        };

        serde_json::from_str(&contents).map_err(|err| config_error(path, err))
    }

    /// Writes the config to `path` atomically.
    ///
    /// ## Errors
    ///
    /// Returns [`ArtError::Persist`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self).map_err(|err| ArtError::persist(path, err))?;
        write_atomic(path, &json)
    }

    /// Clears every filter (`--all`).
    pub fn clear_filters(&mut self) {
        self.exclude.clear();
        self.fit = false;
        self.matching.clear();
    }

    /// Resets to plain defaults (`--plain`), keeping the corpus settings.
    pub fn reset_plain(&mut self) {
        *self = Self {
            corpus_url: std::mem::take(&mut self.corpus_url),
            fetch_timeout_secs: self.fetch_timeout_secs,
            ..Self::default()
        };
    }

    /// The remote fetch timeout.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }

    /// Builds selection criteria; `terminal` bounds are used only when `fit`
    /// is enabled.
    pub fn criteria(&self, terminal: Option<FitBounds>) -> Criteria {
        let pattern = |p: &str| (!p.is_empty()).then(|| p.to_string());

        Criteria {
            include: pattern(&self.matching),
            exclude: pattern(&self.exclude),
            fit: if self.fit { terminal } else { None },
            name: self.art.clone().filter(|name| !name.is_empty()),
        }
    }
}

fn config_error(path: &Path, err: impl std::fmt::Display) -> ArtError {
    ArtError::Config {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
