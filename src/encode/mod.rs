//! Export boundary for finished rasters.

/// Sinks receiving the encoded collage.
pub mod sink;
