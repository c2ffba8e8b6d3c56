use std::io::Cursor;

use anyhow::Context as _;

use crate::foundation::core::Size;
use crate::foundation::error::{CollageError, CollageResult};

/// Decode an image's header and return its intrinsic pixel size.
///
/// Raster formats go through `image`; anything it cannot identify is tried as SVG.
pub fn decode_intrinsic_size(bytes: &[u8]) -> CollageResult<Size> {
    if image::guess_format(bytes).is_ok() {
        let (w, h) = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .context("guess image format")?
            .into_dimensions()
            .context("decode image dimensions")?;
        return Ok(Size::new(f64::from(w), f64::from(h)));
    }

    let tree = parse_svg(bytes)?;
    let size = tree.size();
    Ok(Size::new(
        f64::from(size.width()),
        f64::from(size.height()),
    ))
}

/// Parse standalone SVG bytes with default options.
pub fn parse_svg(bytes: &[u8]) -> CollageResult<usvg::Tree> {
    let opts = usvg::Options::default();
    usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| CollageError::validation(format!("unsupported image data: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
