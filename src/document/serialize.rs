use std::fmt::Write as _;

use super::{Document, NodeId, NodeKind};

pub(super) fn write_document(doc: &Document) -> String {
    let mut out = String::with_capacity(4096);
    write_node(doc, doc.root(), &mut out);
    out
}

fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    let el = match doc.kind(id) {
        NodeKind::Text(t) => {
            escape_into(t, false, out);
            return;
        }
        NodeKind::Element(el) => el,
    };

    out.push('<');
    out.push_str(el.tag());
    if id == doc.root() {
        for (prefix, uri) in doc.namespaces() {
            match prefix {
                Some(p) => {
                    let _ = write!(out, " xmlns:{p}=\"");
                }
                None => out.push_str(" xmlns=\""),
            }
            escape_into(uri, true, out);
            out.push('"');
        }
    }
    for a in el.attrs() {
        if a.name == "xmlns" || a.name.starts_with("xmlns:") {
            continue;
        }
        let _ = write!(out, " {}=\"", a.name);
        escape_into(&a.value, true, out);
        out.push('"');
    }

    let children = doc.children(id);
    if children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for &c in children {
        write_node(doc, c, out);
    }
    let _ = write!(out, "</{}>", el.tag());
}

/// Escape character data (`attr == false`) or a double-quoted attribute value.
pub(crate) fn escape_xml(s: &str, attr: bool) -> String {
    let mut out = String::with_capacity(s.len());
    escape_into(s, attr, &mut out);
    out
}

fn escape_into(s: &str, attr: bool, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attr => out.push_str("&quot;"),
            '\n' if attr => out.push_str("&#10;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/serialize.rs"]
mod tests;
