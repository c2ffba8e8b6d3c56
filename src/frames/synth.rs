use crate::document::{Document, NodeId};
use crate::foundation::core::{Length, Point, Rect, Size};
use crate::foundation::error::{CollageError, CollageResult};

/// Fill used for photo frames: a warm off-white.
pub const DEFAULT_FRAME_FILL: &str = "#fffaf5";

/// Resolved geometry and paint of a frame, before it becomes an element.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameSpec {
    /// Element id, `<target>_frame`.
    pub id: String,
    /// Top-left corner in the target's coordinate space.
    pub origin: Point,
    /// Frame extent.
    pub size: Size,
    /// Fill color.
    pub fill: String,
}

impl FrameSpec {
    /// Compute a frame around `(x, y, width, height)` grown by `thickness` on every side.
    ///
    /// A zero thickness yields the target bounds exactly.
    pub fn around(
        target_id: &str,
        x: &Length,
        y: &Length,
        width: &Length,
        height: &Length,
        thickness: f64,
        fill: Option<&str>,
    ) -> CollageResult<Self> {
        if !thickness.is_finite() || thickness < 0.0 {
            return Err(CollageError::validation(format!(
                "frame thickness must be finite and >= 0, got {thickness}"
            )));
        }
        let x0 = x.value() - thickness;
        let y0 = y.value() - thickness;
        let w = width.value() + thickness * 2.0;
        let h = height.value() + thickness * 2.0;
        Ok(Self {
            id: format!("{target_id}_frame"),
            origin: Point::new(x0, y0),
            size: Size::new(w, h),
            fill: fill.unwrap_or(DEFAULT_FRAME_FILL).to_owned(),
        })
    }

    /// Frame rectangle in the target's coordinate space.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.origin, self.size)
    }

    /// Inline style of the frame rectangle.
    pub fn style(&self) -> String {
        format!(
            "fill: {}; fill-rule: evenodd; stroke-width: 1;stroke-linejoin:round;stroke-miterlimit:4;stroke-dasharray:none;",
            self.fill
        )
    }

    /// Materialize the frame as a detached `<rect>` in `doc`.
    ///
    /// The caller inserts it and assigns its transform.
    pub fn create_element(&self, doc: &mut Document) -> NodeId {
        let node = doc.create_element("rect");
        if let Some(el) = doc.element_mut(node) {
            el.set_attr("id", self.id.as_str());
            el.set_attr("style", self.style());
            el.set_attr("x", self.origin.x.to_string());
            el.set_attr("y", self.origin.y.to_string());
            el.set_attr("width", self.size.width.to_string());
            el.set_attr("height", self.size.height.to_string());
        }
        node
    }
}

/// Build a detached frame element for `target_id`; see [`FrameSpec::around`].
pub fn create_frame(
    doc: &mut Document,
    target_id: &str,
    x: &Length,
    y: &Length,
    width: &Length,
    height: &Length,
    thickness: f64,
    fill: Option<&str>,
) -> CollageResult<NodeId> {
    let frame_spec = FrameSpec::around(target_id, x, y, width, height, thickness, fill)?;
    Ok(frame_spec.create_element(doc))
}

#[cfg(test)]
#[path = "../../tests/unit/frames/synth.rs"]
mod tests;
