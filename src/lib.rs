//! Collage turns a hand-arranged SVG photo collage into a finished PNG.
//!
//! A run over a loaded [`Document`] does, in order:
//!
//! - mat every photo in the `photos` layer with a frame (following an optional rectangular clip)
//! - frame every multi-line note in that layer, sized from measured line widths and baselines
//! - attach one shared drop-shadow filter to the `photos` and `postits` layers
//! - inline every external image as a `data:` URL, waiting for all fetches to finish
//! - rasterize onto an opaque background and hand the PNG to an [`ExportSink`]
//!
//! [`process_collage`] runs the whole sequence; each stage is also usable on its own.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Fetching, decoding and inlining image assets.
pub mod assets;
/// The SVG element tree.
pub mod document;
/// Shadow filter injection.
pub mod effects;
/// Export sinks.
pub mod encode;
/// Photo and note frames.
pub mod frames;
/// End-to-end collage processing.
pub mod pipeline;
/// Rasterization.
pub mod render;

pub use crate::assets::embed::{EmbedOpts, EmbedReport, embed_images};
pub use crate::assets::fetch::{FetchedResource, HttpFetcher, ResourceFetcher};
pub use crate::document::{Document, Element, NodeId};
pub use crate::effects::shadow::{ShadowHandle, apply_shadows, ensure_shadow_filter};
pub use crate::encode::sink::{ExportSink, FileSink, InMemorySink};
pub use crate::foundation::core::{Affine, Length, Point, Rect, Rgba8, Size};
pub use crate::foundation::error::{CollageError, CollageResult};
pub use crate::foundation::transform::{compose, format_transform, parse_transform};
pub use crate::frames::measure::{FixedAdvanceMeasure, TextMeasure, UsvgTextMeasure};
pub use crate::frames::note::{NoteFramer, NoteGeometry};
pub use crate::frames::photo::PhotoFramer;
pub use crate::frames::synth::{FrameSpec, create_frame};
pub use crate::pipeline::{CollageOpts, CollageReport, process_collage};
pub use crate::render::raster::{RasterImage, Rasterizer};
