//! Raster asset handling: fetching, intrinsic-size decoding and inlining as `data:` URLs.

/// `data:` URL encoding and decoding.
pub mod data_url;
/// Intrinsic image size probing.
pub mod decode;
/// The embedding barrier.
pub mod embed;
/// Resource fetchers.
pub mod fetch;
