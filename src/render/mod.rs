//! Rasterization of finished collages.

/// Font database and resolver shared by measurement and drawing.
pub mod fonts;
/// SVG to PNG.
pub mod raster;
