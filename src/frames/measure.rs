use std::path::Path;
use std::sync::Arc;

use crate::document::{Document, NodeId, escape_xml};
use crate::foundation::core::{DEFAULT_FONT_SIZE, Length};
use crate::foundation::error::{CollageError, CollageResult};
use crate::render::fonts::{build_fontdb, usvg_options};

/// Inherited font properties forwarded to text layout.
const FONT_PROPERTIES: &[&str] = &[
    "font-family",
    "font-size",
    "font-weight",
    "font-style",
    "font-stretch",
    "letter-spacing",
    "word-spacing",
];

/// Measures the rendered advance of a line of note text.
pub trait TextMeasure {
    /// Rendered length of the text content of `line`, in user units.
    fn text_length(&self, doc: &Document, line: NodeId) -> CollageResult<f64>;
}

/// Font declarations that apply to a node, resolved through its ancestors.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FontProps {
    decls: Vec<(&'static str, String)>,
}

impl FontProps {
    /// Resolve inherited font properties for `node` (nearest declaration wins).
    pub fn resolve(doc: &Document, node: NodeId) -> Self {
        let decls = FONT_PROPERTIES
            .iter()
            .filter_map(|&name| {
                doc.ancestors_or_self(node)
                    .filter_map(|n| doc.element(n))
                    .find_map(|e| e.presentation(name))
                    .map(|v| (name, v))
            })
            .collect();
        Self { decls }
    }

    /// Value of one resolved property.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.decls
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Font size in user units, falling back to 16.
    pub fn font_size(&self) -> f64 {
        self.get("font-size")
            .and_then(|v| Length::parse_scalar(v).ok())
            .map(|l| l.value())
            .filter(|v| *v > 0.0)
            .unwrap_or(DEFAULT_FONT_SIZE)
    }

    /// The properties as an inline style string.
    pub fn to_style(&self) -> String {
        self.decls
            .iter()
            .map(|(k, v)| format!("{k}:{v}"))
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Text content with SVG default whitespace handling (trimmed, runs collapsed).
pub fn normalized_text(doc: &Document, node: NodeId) -> String {
    doc.text_content(node)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lays text out with `usvg` against real fonts and reports the width of the result.
///
/// Without any usable font the text disappears from the layout and measures `0`.
#[derive(Clone, Debug)]
pub struct UsvgTextMeasure {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl UsvgTextMeasure {
    /// Measure with system fonts plus any fonts found in `fonts_dir`.
    pub fn new(fonts_dir: Option<&Path>) -> Self {
        Self {
            fontdb: build_fontdb(fonts_dir),
        }
    }

    /// Measure with an existing font database.
    pub fn with_fontdb(fontdb: Arc<usvg::fontdb::Database>) -> Self {
        Self { fontdb }
    }
}

impl TextMeasure for UsvgTextMeasure {
    fn text_length(&self, doc: &Document, line: NodeId) -> CollageResult<f64> {
        let text = normalized_text(doc, line);
        if text.is_empty() {
            return Ok(0.0);
        }
        let props = FontProps::resolve(doc, line);
        let svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1"><text style="{}">{}</text></svg>"#,
            escape_xml(&props.to_style(), true),
            escape_xml(&text, false),
        );

        let opts = usvg_options(self.fontdb.clone());
        let tree = usvg::Tree::from_str(&svg, &opts)
            .map_err(|e| CollageError::validation(format!("cannot lay out note text: {e}")))?;
        Ok(first_text_width(tree.root()).map_or(0.0, f64::from))
    }
}

fn first_text_width(group: &usvg::Group) -> Option<f32> {
    group.children().iter().find_map(|node| match node {
        usvg::Node::Text(text) => Some(text.bounding_box().width()),
        usvg::Node::Group(g) => first_text_width(g),
        _ => None,
    })
}

/// Font-less measurement: every character advances by `advance` em.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedAdvanceMeasure {
    /// Advance per character as a fraction of the font size.
    pub advance: f64,
}

impl Default for FixedAdvanceMeasure {
    fn default() -> Self {
        Self { advance: 0.5 }
    }
}

impl TextMeasure for FixedAdvanceMeasure {
    fn text_length(&self, doc: &Document, line: NodeId) -> CollageResult<f64> {
        let chars = normalized_text(doc, line).chars().count();
        let size = FontProps::resolve(doc, line).font_size();
        Ok(chars as f64 * size * self.advance)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/frames/measure.rs"]
mod tests;
