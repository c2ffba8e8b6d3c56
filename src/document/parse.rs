use anyhow::Context as _;

use super::{Document, Element, NodeId, NodeKind, SVG_NS, XLINK_NS};
use crate::foundation::error::{CollageError, CollageResult};

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

pub(super) fn parse_document(text: &str) -> CollageResult<Document> {
    let opts = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let xml = roxmltree::Document::parse_with_options(text, opts).context("parse svg document")?;

    let root_el = xml.root_element();
    if root_el.tag_name().name() != "svg" {
        return Err(CollageError::validation(format!(
            "document root must be <svg>, found <{}>",
            root_el.tag_name().name()
        )));
    }

    let mut namespaces: Vec<(Option<String>, String)> = vec![
        (None, SVG_NS.to_owned()),
        (Some("xlink".to_owned()), XLINK_NS.to_owned()),
    ];
    for node in root_el.descendants().filter(|n| n.is_element()) {
        for ns in node.namespaces() {
            let prefix = ns.name().map(str::to_owned);
            if prefix.as_deref() == Some("xml") || namespaces.iter().any(|(p, _)| *p == prefix) {
                continue;
            }
            namespaces.push((prefix, ns.uri().to_owned()));
        }
    }

    let mut doc = Document {
        nodes: Vec::new(),
        root: NodeId(0),
        namespaces,
    };
    build(&mut doc, root_el, None);
    Ok(doc)
}

fn build(doc: &mut Document, node: roxmltree::Node<'_, '_>, parent: Option<NodeId>) {
    let id = if node.is_element() {
        let tag = node.tag_name();
        let mut el = Element::new(qualified(node, tag.namespace(), tag.name()));
        for a in node.attributes() {
            el.set_attr(&qualified(node, a.namespace(), a.name()), a.value());
        }
        doc.push_node(NodeKind::Element(el))
    } else if node.is_text() {
        doc.create_text(node.text().unwrap_or_default())
    } else {
        return;
    };

    if let Some(p) = parent {
        doc.nodes[id.0].parent = Some(p);
        doc.nodes[p.0].children.push(id);
    }

    for child in node.children() {
        build(doc, child, Some(id));
    }
}

fn qualified(node: roxmltree::Node<'_, '_>, ns: Option<&str>, local: &str) -> String {
    let prefix = match ns {
        None | Some(SVG_NS) => None,
        Some(XLINK_NS) => Some("xlink"),
        Some(XML_NS) => Some("xml"),
        Some(uri) => node.lookup_prefix(uri),
    };
    match prefix {
        Some(p) if !p.is_empty() => format!("{p}:{local}"),
        _ => local.to_owned(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/parse.rs"]
mod tests;
