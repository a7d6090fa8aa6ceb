//! Parsing of the `<name>[_<width>x<height>].<ext>` art filename convention.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

/// Matches a file stem with an optional trailing `_WIDTHxHEIGHT` suffix.
static STEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<stem>.+?)(?:_(?P<width>\d+)x(?P<height>\d+))?$")
        .expect("Invalid art filename regex")
});

/// The pieces of an art source filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtFilename {
    /// The file stem without extension or dimension suffix.
    pub stem: String,
    /// Target grid width, if the name encodes one.
    pub width: Option<u32>,
    /// Target grid height, if the name encodes one.
    pub height: Option<u32>,
}

impl ArtFilename {
    /// Returns the encoded `(width, height)` when both are present.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.width.zip(self.height)
    }
}

/// Parses the final component of `path`.
///
/// Dimensions are only reported when both are present and non-zero; a zero
/// dimension means "use the native size". Returns `None` when the path has no
/// usable file name.
///
/// ## Examples
///
/// ```
/// use artty_lib::filename::parse_art_filename;
///
/// let parsed = parse_art_filename("~/art/logo_10x5.png").unwrap();
/// assert_eq!(parsed.stem, "logo");
/// assert_eq!(parsed.dimensions(), Some((10, 5)));
///
/// let parsed = parse_art_filename("tux.png").unwrap();
/// assert_eq!(parsed.stem, "tux");
/// assert_eq!(parsed.dimensions(), None);
/// ```
pub fn parse_art_filename(path: impl AsRef<Path>) -> Option<ArtFilename> {
    let file_stem = path.as_ref().file_stem()?.to_str()?;
    let captures = STEM_RE.captures(file_stem)?;

    let dimension = |name: &str| {
        captures
            .name(name)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .filter(|value| *value > 0)
    };
    let (width, height) = match (dimension("width"), dimension("height")) {
        (Some(width), Some(height)) => (Some(width), Some(height)),
        _ => (None, None),
    };

    Some(ArtFilename {
        stem: captures["stem"].to_string(),
        width,
        height,
    })
}
