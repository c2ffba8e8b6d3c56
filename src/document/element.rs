use crate::foundation::core::{Affine, Length};
use crate::foundation::error::CollageResult;
use crate::foundation::transform::parse_transform;

/// One `name="value"` pair. Names keep their namespace prefix (`xlink:href`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified attribute name.
    pub name: String,
    /// Raw attribute value.
    pub value: String,
}

/// An element node: tag name plus ordered attributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attrs: Vec<Attribute>,
}

impl Element {
    /// Create an element without attributes.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
        }
    }

    /// Tag name. SVG elements use their local name, foreign ones keep a prefix.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Return `true` if this element has the given tag.
    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    /// Attributes in document order.
    pub fn attrs(&self) -> &[Attribute] {
        &self.attrs
    }

    /// Look up an attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|a| a.name == name) {
            Some(a) => a.value = value,
            None => self.attrs.push(Attribute {
                name: name.to_owned(),
                value,
            }),
        }
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attrs.iter().position(|a| a.name == name)?;
        Some(self.attrs.remove(pos).value)
    }

    /// The `id` attribute.
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Image source locator (`href`, falling back to `xlink:href`).
    pub fn href(&self) -> Option<&str> {
        self.attr("href").or_else(|| self.attr("xlink:href"))
    }

    /// Overwrite the source locator, keeping whichever href spelling the element already uses.
    pub fn set_href(&mut self, value: impl Into<String>) {
        let name = if self.attr("href").is_none() && self.attr("xlink:href").is_some() {
            "xlink:href"
        } else {
            "href"
        };
        self.set_attr(name, value);
    }

    /// Read a geometry attribute as a [`Length`].
    ///
    /// Text positioning attributes are length lists, everything else is a scalar. An absent
    /// attribute reads as `0`.
    pub fn length(&self, name: &str) -> CollageResult<Length> {
        let Some(raw) = self.attr(name) else {
            return Ok(Length::Scalar(0.0));
        };
        if self.has_list_lengths(name) {
            Length::parse_list(raw)
        } else {
            Length::parse_scalar(raw)
        }
    }

    fn has_list_lengths(&self, name: &str) -> bool {
        matches!(self.tag.as_str(), "text" | "tspan") && matches!(name, "x" | "y" | "dx" | "dy")
    }

    /// Parse this element's own `transform` attribute (identity when absent).
    pub fn transform(&self) -> CollageResult<Affine> {
        parse_transform(self.attr("transform"))
    }

    /// Value of one declaration in the inline `style` attribute.
    pub fn style_property(&self, name: &str) -> Option<String> {
        let style = self.attr("style")?;
        parse_declarations(style)
            .into_iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Set one declaration in the inline `style` attribute.
    pub fn set_style_property(&mut self, name: &str, value: &str) {
        let mut decls = self
            .attr("style")
            .map(parse_declarations)
            .unwrap_or_default();
        match decls.iter_mut().find(|(k, _)| k == name) {
            Some(d) => d.1 = value.to_owned(),
            None => decls.push((name.to_owned(), value.to_owned())),
        }
        self.set_attr("style", format_declarations(&decls));
    }

    /// Remove one declaration from the inline `style` attribute.
    ///
    /// The attribute itself is dropped once no declarations remain.
    pub fn remove_style_property(&mut self, name: &str) -> Option<String> {
        let mut decls = parse_declarations(self.attr("style")?);
        let pos = decls.iter().position(|(k, _)| k == name)?;
        let (_, old) = decls.remove(pos);
        if decls.is_empty() {
            self.remove_attr("style");
        } else {
            self.set_attr("style", format_declarations(&decls));
        }
        Some(old)
    }

    /// Resolve a presentation property: inline style first, then the attribute.
    pub fn presentation(&self, name: &str) -> Option<String> {
        self.style_property(name)
            .or_else(|| self.attr(name).map(str::to_owned))
            .filter(|v| !v.is_empty())
    }
}

fn parse_declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (k, v) = decl.split_once(':')?;
            let k = k.trim();
            if k.is_empty() {
                return None;
            }
            Some((k.to_owned(), v.trim().to_owned()))
        })
        .collect()
}

fn format_declarations(decls: &[(String, String)]) -> String {
    decls
        .iter()
        .map(|(k, v)| format!("{k}:{v}"))
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
#[path = "../../tests/unit/document/element.rs"]
mod tests;
