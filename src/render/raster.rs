use std::io::Cursor;
use std::sync::Arc;

use crate::document::Document;
use crate::foundation::core::{Rgba8, Size};
use crate::foundation::error::{CollageError, CollageResult};
use crate::render::fonts::usvg_options;

/// Largest accepted raster edge, in pixels.
pub const MAX_DIM: u32 = 16_384;

/// An encoded raster of a finished document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// PNG bytes.
    pub png: Vec<u8>,
}

/// Flattens a self-contained document onto an opaque background and encodes it as PNG.
#[derive(Clone, Debug)]
pub struct Rasterizer {
    fontdb: Arc<usvg::fontdb::Database>,
    background: Rgba8,
}

impl Rasterizer {
    /// Create a rasterizer drawing text with `fontdb`.
    ///
    /// The background alpha is forced to 255 so the exported PNG never shows through.
    pub fn new(fontdb: Arc<usvg::fontdb::Database>, background: Rgba8) -> Self {
        if !background.is_opaque() {
            tracing::warn!(alpha = background.a, "background must be opaque, dropping alpha");
        }
        Self {
            fontdb,
            background: Rgba8 { a: 255, ..background },
        }
    }

    /// Rasterize `doc` at its declared size.
    ///
    /// Only `data:` image references are drawn; anything still pointing elsewhere is left out.
    #[tracing::instrument(skip(self, doc))]
    pub fn rasterize(&self, doc: &Document) -> CollageResult<RasterImage> {
        let svg = doc.to_svg_string();
        let tree = self.parse(&svg)?;
        let (width, height) = declared_size(doc, &tree)?;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| CollageError::rasterization("failed to allocate pixmap"))?;
        let bg = self.background;
        pixmap.fill(resvg::tiny_skia::Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));

        let sx = (width as f32) / tree.size().width();
        let sy = (height as f32) / tree.size().height();
        let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);
        resvg::render(&tree, xform, &mut pixmap.as_mut());

        let png = encode_png(&pixmap)?;
        tracing::info!(width, height, bytes = png.len(), "rasterized collage");
        Ok(RasterImage { width, height, png })
    }

    fn parse(&self, svg: &str) -> CollageResult<usvg::Tree> {
        let opts = usvg_options(self.fontdb.clone());
        usvg::Tree::from_str(svg, &opts)
            .map_err(|e| CollageError::rasterization(format!("document is not drawable: {e}")))
    }
}

/// Pixel size of the raster: the root's `width`/`height`, falling back to the parsed tree size.
pub fn declared_size(doc: &Document, tree: &usvg::Tree) -> CollageResult<(u32, u32)> {
    let root = doc.expect_element(doc.root())?;
    let fallback = Size::new(
        f64::from(tree.size().width()),
        f64::from(tree.size().height()),
    );
    let dim = |name: &str, fallback: f64| -> f64 {
        match root.attr(name) {
            Some(_) => root.length(name).map_or(fallback, |l| l.value()),
            None => fallback,
        }
    };
    let w = to_px(dim("width", fallback.width))?;
    let h = to_px(dim("height", fallback.height))?;
    Ok((w, h))
}

fn to_px(v: f64) -> CollageResult<u32> {
    if !v.is_finite() || v <= 0.0 {
        return Err(CollageError::rasterization(format!(
            "document has invalid size {v}"
        )));
    }
    let px = v.ceil();
    if px > f64::from(MAX_DIM) {
        return Err(CollageError::rasterization(format!(
            "raster size too large: {px} (max {MAX_DIM})"
        )));
    }
    Ok(px as u32)
}

fn encode_png(pixmap: &resvg::tiny_skia::Pixmap) -> CollageResult<Vec<u8>> {
    let rgba: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    let img = image::RgbaImage::from_raw(pixmap.width(), pixmap.height(), rgba)
        .ok_or_else(|| CollageError::rasterization("pixel buffer size mismatch"))?;

    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .map_err(|e| CollageError::rasterization(format!("png encoding failed: {e}")))?;
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
