//! Converts raster images into art pieces.

use std::path::Path;

use image::RgbaImage;

use crate::art::{ArtPiece, Cell};
use crate::color::quantize;
use crate::error::{ArtError, Result};
use crate::filename::parse_art_filename;
use crate::paths::expand_path;
use crate::sampler::sample;

/// File extensions the generator can decode.
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Returns true if `path` has a supported image extension (case-insensitive).
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

/// Generates an art piece from the image at `filename`.
///
/// `~` is expanded first. The piece is named `name` when given and non-empty,
/// otherwise after the file stem with any `_WxH` suffix removed. A `_WxH`
/// suffix also sets the target grid size; without one every source pixel
/// becomes a cell. Nothing is written anywhere.
///
/// ## Errors
///
/// - [`ArtError::NotFound`] if the file does not exist
/// - [`ArtError::Decode`] if it is not a readable PNG or JPEG
/// - [`ArtError::InvalidPiece`] if no usable name can be derived
pub fn generate(filename: impl AsRef<Path>, name: Option<&str>) -> Result<ArtPiece> {
    let path = expand_path(filename);

    if !path.is_file() {
        return Err(ArtError::NotFound(path.display().to_string()));
    }

    let image = image::open(&path)
        .map_err(|source| ArtError::Decode {
            path: path.clone(),
            source,
        })?
        .to_rgba8();

    let parsed = parse_art_filename(&path);
    let name = match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => name.to_string(),
        None => parsed.as_ref().map(|p| p.stem.clone()).unwrap_or_default(),
    };
    let (width, height) = parsed
        .and_then(|p| p.dimensions())
        .unwrap_or_else(|| image.dimensions());

    let piece = ArtPiece::new(name, pixels(&image, width, height));
    piece.validate()?;

    tracing::debug!(
        name = %piece.name,
        source = %path.display(),
        width = piece.width(),
        height = piece.height(),
        "generated art piece"
    );

    Ok(piece)
}

/// Samples and quantizes `image` into a cell grid of roughly `width` x `height`.
pub fn pixels(image: &RgbaImage, width: u32, height: u32) -> Vec<Vec<Cell>> {
    let (source_width, source_height) = image.dimensions();

    sample(source_width, source_height, width, height)
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|(x, y)| {
                    let [r, g, b, a] = image.get_pixel(x, y).0;
                    quantize(r, g, b, a)
                })
                .collect()
        })
        .collect()
}
