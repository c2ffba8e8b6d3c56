use crate::assets::data_url::{encode_data_url, is_data_url};
use crate::assets::decode::decode_intrinsic_size;
use crate::assets::embed::resolve_locator;
use crate::assets::fetch::{ResourceFetcher, truncate_for_log};
use crate::document::{Document, NodeId};
use crate::foundation::error::{CollageError, CollageResult};
use crate::foundation::transform::{compose, format_transform};
use crate::frames::synth::FrameSpec;

/// Where an image's visible bounds come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClipResolution {
    /// No clip, or a clip without rectangles: the image's own bounds.
    Unclipped,
    /// The single rectangle inside the referenced clip.
    Rect(NodeId),
}

/// Frames every raster image in the photo layer.
#[derive(Clone, Copy)]
pub struct PhotoFramer<'a> {
    /// Border thickness added on every side.
    pub thickness: f64,
    /// Used to decode images whose size is not declared.
    pub fetcher: &'a dyn ResourceFetcher,
    /// Base for relative image locators during decoding.
    pub base_url: Option<&'a str>,
}

impl std::fmt::Debug for PhotoFramer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoFramer")
            .field("thickness", &self.thickness)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl<'a> PhotoFramer<'a> {
    /// Create a framer with no base URL.
    pub fn new(thickness: f64, fetcher: &'a dyn ResourceFetcher) -> Self {
        Self {
            thickness,
            fetcher,
            base_url: None,
        }
    }

    /// Insert a frame before each image under `layer`; returns the frame nodes.
    ///
    /// Missing layers are not an error: there is simply nothing to frame.
    #[tracing::instrument(skip(self, doc), fields(thickness = self.thickness))]
    pub fn apply(&self, doc: &mut Document, layer: &str) -> CollageResult<Vec<NodeId>> {
        let Some(layer) = doc.layer(layer) else {
            return Ok(Vec::new());
        };

        let mut frames = Vec::new();
        for image in doc.descendants_by_tag(layer, "image") {
            self.ensure_decoded(doc, image)?;
            frames.push(self.frame_image(doc, image)?);
        }
        tracing::info!(count = frames.len(), "framed photos");
        Ok(frames)
    }

    fn frame_image(&self, doc: &mut Document, image: NodeId) -> CollageResult<NodeId> {
        let img = doc.expect_element(image)?;
        let image_transform = img.transform()?;

        let (bounds_el, transform) = match resolve_clip(doc, image)? {
            ClipResolution::Unclipped => (img, image_transform),
            ClipResolution::Rect(rect) => {
                let rect = doc.expect_element(rect)?;
                (rect, compose(image_transform, Some(rect.transform()?)))
            }
        };

        let frame_spec = FrameSpec::around(
            &doc.id_or_synthetic(image),
            &bounds_el.length("x")?,
            &bounds_el.length("y")?,
            &bounds_el.length("width")?,
            &bounds_el.length("height")?,
            self.thickness,
            None,
        )?;
        tracing::debug!(id = %frame_spec.id, rect = ?frame_spec.rect(), "photo frame");

        let frame = frame_spec.create_element(doc);
        doc.expect_element_mut(frame)?
            .set_attr("transform", format_transform(transform));
        doc.insert_before(frame, image)?;
        Ok(frame)
    }

    /// Make sure the image declares a size, decoding its pixels when it does not.
    ///
    /// The fetched bytes are inlined right away so embedding does not fetch the image again.
    fn ensure_decoded(&self, doc: &mut Document, image: NodeId) -> CollageResult<()> {
        let el = doc.expect_element(image)?;
        if declared_attr(el.attr("width")) && declared_attr(el.attr("height")) {
            return Ok(());
        }

        let href = el.href().ok_or_else(|| {
            CollageError::validation(format!(
                "image {} has neither a size nor a source",
                doc.id_or_synthetic(image)
            ))
        })?;
        let already_inline = is_data_url(href);
        let url = resolve_locator(href, self.base_url)?;
        let res = self.fetcher.fetch(&url)?;
        let size = decode_intrinsic_size(&res.bytes)?;
        tracing::debug!(url = %truncate_for_log(&url), ?size, "decoded intrinsic size");

        let el = doc.expect_element_mut(image)?;
        if !already_inline {
            el.set_href(encode_data_url(&res.bytes, res.content_type.as_deref()));
        }
        if !declared_attr(el.attr("width")) {
            el.set_attr("width", size.width.to_string());
        }
        if !declared_attr(el.attr("height")) {
            el.set_attr("height", size.height.to_string());
        }
        Ok(())
    }
}

fn declared_attr(v: Option<&str>) -> bool {
    v.is_some_and(|v| !v.trim().is_empty())
}

/// Resolve the effective clip of an image.
///
/// Zero rectangles behave like no clip. More than one is rejected as ambiguous.
pub fn resolve_clip(doc: &Document, image: NodeId) -> CollageResult<ClipResolution> {
    let el = doc.expect_element(image)?;
    let Some(raw) = el.attr("clip-path") else {
        return Ok(ClipResolution::Unclipped);
    };
    let source = || truncate_for_log(el.href().unwrap_or_default());

    if raw.trim() == "none" {
        return Ok(ClipResolution::Unclipped);
    }
    let id = parse_clip_ref(raw).ok_or_else(|| {
        CollageError::invalid_clip(source(), format!("expected url(#id), got \"{raw}\""))
    })?;
    let holder = doc.get_element_by_id(id).ok_or_else(|| {
        CollageError::invalid_clip(source(), format!("no element with id \"{id}\""))
    })?;

    let rects = doc.descendants_by_tag(holder, "rect");
    match rects.as_slice() {
        [] => Ok(ClipResolution::Unclipped),
        [rect] => Ok(ClipResolution::Rect(*rect)),
        _ => Err(CollageError::ambiguous_clip(source())),
    }
}

/// Extract `id` from `url(#id)`, allowing optional quotes inside the parentheses.
pub fn parse_clip_ref(raw: &str) -> Option<&str> {
    let inner = raw.trim().strip_prefix("url(")?.strip_suffix(')')?.trim();
    let inner = inner
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| inner.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .unwrap_or(inner);
    inner.strip_prefix('#').filter(|id| !id.is_empty())
}

#[cfg(test)]
#[path = "../../tests/unit/frames/photo.rs"]
mod tests;
