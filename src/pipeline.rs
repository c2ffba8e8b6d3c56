use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::assets::embed::{EmbedOpts, EmbedReport, embed_images};
use crate::assets::fetch::ResourceFetcher;
use crate::document::Document;
use crate::effects::shadow::apply_shadows;
use crate::encode::sink::ExportSink;
use crate::foundation::core::Rgba8;
use crate::foundation::error::{CollageError, CollageResult};
use crate::frames::measure::TextMeasure;
use crate::frames::note::NoteFramer;
use crate::frames::photo::PhotoFramer;
use crate::render::fonts::build_fontdb;
use crate::render::raster::Rasterizer;

/// Layer holding photos and the notes pinned among them.
pub const PHOTO_LAYER: &str = "photos";

/// Suggested name of the exported raster.
pub const DEFAULT_FILE_NAME: &str = "collage.png";

/// Knobs for one collage run.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollageOpts {
    /// Border added around each photo.
    pub photo_frame_thickness: f64,
    /// Border added around each note.
    pub note_frame_thickness: f64,
    /// Row height for single-line notes; `None` derives it from the font size.
    pub note_row_height: Option<f64>,
    /// Raster background. Must be opaque.
    pub background: Rgba8,
    /// Name handed to the export sink.
    pub file_name: String,
    /// Fetch worker count during embedding.
    pub threads: Option<usize>,
    /// Base for relative image locators.
    pub base_url: Option<String>,
    /// Extra fonts for measurement and drawing.
    pub fonts_dir: Option<PathBuf>,
}

impl Default for CollageOpts {
    fn default() -> Self {
        Self {
            photo_frame_thickness: 3.0,
            note_frame_thickness: 5.0,
            note_row_height: None,
            background: Rgba8::WHITE,
            file_name: DEFAULT_FILE_NAME.to_owned(),
            threads: None,
            base_url: None,
            fonts_dir: None,
        }
    }
}

impl CollageOpts {
    /// Load options from a JSON file. Missing fields keep their defaults.
    pub fn from_path(path: &Path) -> CollageResult<Self> {
        let f = File::open(path).with_context(|| format!("open options '{}'", path.display()))?;
        let opts: Self = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| CollageError::serde(format!("{}: {e}", path.display())))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Reject values no stage can work with.
    pub fn validate(&self) -> CollageResult<()> {
        for (name, v) in [
            ("photo_frame_thickness", self.photo_frame_thickness),
            ("note_frame_thickness", self.note_frame_thickness),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(CollageError::validation(format!(
                    "'{name}' must be finite and >= 0, got {v}"
                )));
            }
        }
        if let Some(h) = self.note_row_height
            && (!h.is_finite() || h < 0.0)
        {
            return Err(CollageError::validation(format!(
                "'note_row_height' must be finite and >= 0, got {h}"
            )));
        }
        if self.threads == Some(0) {
            return Err(CollageError::validation("'threads' must be >= 1 when set"));
        }
        if self.file_name.trim().is_empty() {
            return Err(CollageError::validation("'file_name' must not be empty"));
        }
        if !self.background.is_opaque() {
            return Err(CollageError::validation(format!(
                "'background' must be opaque, got alpha {}",
                self.background.a
            )));
        }
        Ok(())
    }
}

/// What a successful run did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollageReport {
    /// Frames inserted around photos.
    pub photo_frames: usize,
    /// Frames inserted around notes.
    pub note_frames: usize,
    /// Whether the shadow filter had to be created.
    pub shadow_created: bool,
    /// Embedding counts.
    pub embed: EmbedReport,
    /// Raster width in pixels.
    pub width: u32,
    /// Raster height in pixels.
    pub height: u32,
    /// Name the raster was saved under.
    pub file_name: String,
    /// Encoded size in bytes.
    pub bytes: usize,
}

/// Frame, shadow, inline and rasterize `doc`, then save the PNG through `sink`.
///
/// Stages run in order and the first error stops the run; nothing is saved unless every stage
/// succeeded. `doc` keeps whatever the completed stages did to it.
#[tracing::instrument(skip_all, fields(file_name = %opts.file_name))]
pub fn process_collage(
    doc: &mut Document,
    opts: &CollageOpts,
    fetcher: &dyn ResourceFetcher,
    measure: &dyn TextMeasure,
    sink: &mut dyn ExportSink,
) -> CollageResult<CollageReport> {
    opts.validate()?;

    let photo_frames = PhotoFramer {
        thickness: opts.photo_frame_thickness,
        fetcher,
        base_url: opts.base_url.as_deref(),
    }
    .apply(doc, PHOTO_LAYER)?;

    let note_frames = NoteFramer {
        thickness: opts.note_frame_thickness,
        single_line_row_height: opts.note_row_height,
        measure,
    }
    .apply(doc, PHOTO_LAYER)?;

    let shadow = apply_shadows(doc)?;

    let embed = embed_images(
        doc,
        fetcher,
        &EmbedOpts {
            threads: opts.threads,
            base_url: opts.base_url.clone(),
        },
    )?;

    let fontdb = build_fontdb(opts.fonts_dir.as_deref());
    let raster = Rasterizer::new(fontdb, opts.background).rasterize(doc)?;
    sink.save(&opts.file_name, &raster.png)?;

    Ok(CollageReport {
        photo_frames: photo_frames.len(),
        note_frames: note_frames.len(),
        shadow_created: shadow.created,
        embed,
        width: raster.width,
        height: raster.height,
        file_name: opts.file_name.clone(),
        bytes: raster.png.len(),
    })
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
