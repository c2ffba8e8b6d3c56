use crate::document::{Document, NodeId};
use crate::foundation::core::Length;
use crate::foundation::error::{CollageError, CollageResult};
use crate::foundation::transform::format_transform;
use crate::frames::measure::{FontProps, TextMeasure};
use crate::frames::synth::FrameSpec;

/// Single-line notes without a configured row height use this multiple of their font size.
pub const SINGLE_LINE_ROW_FACTOR: f64 = 1.25;

/// Box computed for one note before the frame thickness is added.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoteGeometry {
    /// Number of lines (element children) in the note.
    pub lines: usize,
    /// Widest measured line.
    pub width: f64,
    /// Distance between consecutive baselines.
    pub row_height: f64,
    /// Top edge: the note's own `y` minus one row.
    pub top: f64,
    /// `row_height × (lines + 1)`.
    pub height: f64,
}

/// Frames every multi-line text block sitting directly in the photo layer.
#[derive(Clone, Copy)]
pub struct NoteFramer<'a> {
    /// Border thickness added on every side.
    pub thickness: f64,
    /// Row height for notes whose lines share one baseline.
    pub single_line_row_height: Option<f64>,
    /// Line width oracle.
    pub measure: &'a dyn TextMeasure,
}

impl std::fmt::Debug for NoteFramer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteFramer")
            .field("thickness", &self.thickness)
            .field("single_line_row_height", &self.single_line_row_height)
            .finish_non_exhaustive()
    }
}

impl<'a> NoteFramer<'a> {
    /// Create a framer using the font-size based single-line fallback.
    pub fn new(thickness: f64, measure: &'a dyn TextMeasure) -> Self {
        Self {
            thickness,
            single_line_row_height: None,
            measure,
        }
    }

    /// Insert a frame before each note in `layer`; returns the frame nodes.
    #[tracing::instrument(skip(self, doc), fields(thickness = self.thickness))]
    pub fn apply(&self, doc: &mut Document, layer: &str) -> CollageResult<Vec<NodeId>> {
        let Some(layer) = doc.layer(layer) else {
            return Ok(Vec::new());
        };

        let mut frames = Vec::new();
        for note in doc.child_elements_by_tag(layer, "text") {
            match self.geometry(doc, note)? {
                Some(geom) => frames.push(self.frame_note(doc, note, &geom)?),
                None => tracing::warn!(
                    note = %doc.id_or_synthetic(note),
                    "skipping note without lines"
                ),
            }
        }
        tracing::info!(count = frames.len(), "framed notes");
        Ok(frames)
    }

    /// Measure a note. `None` when it has no lines.
    pub fn geometry(&self, doc: &Document, note: NodeId) -> CollageResult<Option<NoteGeometry>> {
        let lines: Vec<NodeId> = doc.element_children(note).collect();
        if lines.is_empty() {
            return Ok(None);
        }

        let mut width = 0.0_f64;
        let mut baselines: Option<(f64, f64)> = None;
        let mut with_baseline = 0_usize;
        for &line in &lines {
            width = width.max(self.measure.text_length(doc, line)?);

            let el = doc.expect_element(line)?;
            if el.attr("y").is_none() {
                continue;
            }
            // `y=""` carries no baseline either.
            let y = match el.length("y")? {
                Length::List(items) if items.is_empty() => continue,
                len => len.value(),
            };
            with_baseline += 1;
            baselines = Some(match baselines {
                Some((lo, hi)) => (lo.min(y), hi.max(y)),
                None => (y, y),
            });
        }

        let row_height = match baselines {
            Some((lo, hi)) if hi > lo => (hi - lo) / (with_baseline - 1) as f64,
            _ => self.single_line_row(doc, note)?,
        };
        let top = doc.expect_element(note)?.length("y")?.value() - row_height;
        let height = row_height * (lines.len() + 1) as f64;

        Ok(Some(NoteGeometry {
            lines: lines.len(),
            width,
            row_height,
            top,
            height,
        }))
    }

    fn single_line_row(&self, doc: &Document, note: NodeId) -> CollageResult<f64> {
        match self.single_line_row_height {
            Some(h) if h.is_finite() && h >= 0.0 => Ok(h),
            Some(h) => Err(CollageError::validation(format!(
                "note row height must be finite and >= 0, got {h}"
            ))),
            None => Ok(FontProps::resolve(doc, note).font_size() * SINGLE_LINE_ROW_FACTOR),
        }
    }

    fn frame_note(
        &self,
        doc: &mut Document,
        note: NodeId,
        geom: &NoteGeometry,
    ) -> CollageResult<NodeId> {
        let el = doc.expect_element(note)?;
        let fill = el.presentation("stroke");
        let transform = el.transform()?;

        let frame_spec = FrameSpec::around(
            &doc.id_or_synthetic(note),
            &el.length("x")?,
            &Length::from(geom.top),
            &Length::from(geom.width),
            &Length::from(geom.height),
            self.thickness,
            fill.as_deref(),
        )?;
        tracing::debug!(
            id = %frame_spec.id,
            rect = ?frame_spec.rect(),
            row_height = geom.row_height,
            "note frame"
        );

        let el = doc.expect_element_mut(note)?;
        el.remove_style_property("stroke");
        el.remove_attr("stroke");

        let frame = frame_spec.create_element(doc);
        doc.expect_element_mut(frame)?
            .set_attr("transform", format_transform(transform));
        doc.insert_before(frame, note)?;
        Ok(frame)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frames/note.rs"]
mod tests;
