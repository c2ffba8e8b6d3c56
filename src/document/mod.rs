//! Addressable SVG element tree.
//!
//! This is the input boundary of the pipeline: a loaded collage document whose elements can be
//! found by id, tag or layer, read for geometry and mutated in place.

mod element;
mod parse;
mod serialize;

pub use element::{Attribute, Element};
pub(crate) use serialize::escape_xml;

use crate::foundation::error::{CollageError, CollageResult};

/// SVG namespace URI.
pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
/// XLink namespace URI.
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Index of a node inside its [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena index of this node.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Payload of a tree node.
#[derive(Clone, Debug)]
pub enum NodeKind {
    /// An element.
    Element(Element),
    /// Character data.
    Text(String),
}

#[derive(Clone, Debug)]
struct NodeData {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// An SVG document held as an arena of nodes.
///
/// Nodes are never freed. Elements created with [`Document::create_element`] stay detached (and
/// invisible to queries) until they are inserted.
#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
    /// Namespace declarations emitted on the root element, `(prefix, uri)`.
    namespaces: Vec<(Option<String>, String)>,
}

impl Document {
    /// Create a document holding an empty `<svg>` root.
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Element(Element::new("svg")),
            }],
            root: NodeId(0),
            namespaces: vec![
                (None, SVG_NS.to_owned()),
                (Some("xlink".to_owned()), XLINK_NS.to_owned()),
            ],
        }
    }

    /// Parse SVG text into a document.
    pub fn parse(text: &str) -> CollageResult<Self> {
        parse::parse_document(text)
    }

    /// Serialize the document to SVG text.
    pub fn to_svg_string(&self) -> String {
        serialize::write_document(self)
    }

    /// The root `<svg>` element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Payload of a node.
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    /// Borrow a node as an element, if it is one.
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes.get(id.0)?.kind {
            NodeKind::Element(e) => Some(e),
            NodeKind::Text(_) => None,
        }
    }

    /// Mutably borrow a node as an element, if it is one.
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(id.0)?.kind {
            NodeKind::Element(e) => Some(e),
            NodeKind::Text(_) => None,
        }
    }

    /// Borrow an element, failing with a validation error for text or unknown nodes.
    pub fn expect_element(&self, id: NodeId) -> CollageResult<&Element> {
        self.element(id)
            .ok_or_else(|| CollageError::validation(format!("node {} is not an element", id.0)))
    }

    /// Mutable variant of [`Document::expect_element`].
    pub fn expect_element_mut(&mut self, id: NodeId) -> CollageResult<&mut Element> {
        self.element_mut(id)
            .ok_or_else(|| CollageError::validation(format!("node {} is not an element", id.0)))
    }

    /// Parent of a node (`None` for the root and detached nodes).
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// All children of a node, in order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Element children of a node, in order.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.element(c).is_some())
    }

    /// All descendants of a node in document order, excluding the node itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev().copied());
        }
        out
    }

    /// Descendant elements of `under` with the given tag, in document order.
    pub fn descendants_by_tag(&self, under: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(under)
            .into_iter()
            .filter(|&n| self.element(n).is_some_and(|e| e.is(tag)))
            .collect()
    }

    /// Direct child elements of `parent` with the given tag.
    pub fn child_elements_by_tag(&self, parent: NodeId, tag: &str) -> Vec<NodeId> {
        self.element_children(parent)
            .filter(|&n| self.element(n).is_some_and(|e| e.is(tag)))
            .collect()
    }

    /// Find the first attached element with the given `id` attribute.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .find(|&n| self.element(n).and_then(Element::id) == Some(id))
    }

    /// A layer group: the `<g>` element whose id is `name`.
    pub fn layer(&self, name: &str) -> Option<NodeId> {
        self.get_element_by_id(name)
            .filter(|&n| self.element(n).is_some_and(|e| e.is("g")))
    }

    /// Allocate a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push_node(NodeKind::Element(Element::new(tag)))
    }

    /// Allocate a detached text node.
    pub(crate) fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push_node(NodeKind::Text(text.into()))
    }

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    /// Append a detached node as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> CollageResult<()> {
        self.check_insertable(parent, child)?;
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    /// Insert a detached node immediately before `reference`, in the same parent.
    pub fn insert_before(&mut self, node: NodeId, reference: NodeId) -> CollageResult<()> {
        let parent = self.parent(reference).ok_or_else(|| {
            CollageError::validation("cannot insert before a node without a parent")
        })?;
        self.check_insertable(parent, node)?;
        let pos = self.nodes[parent.0]
            .children
            .iter()
            .position(|&c| c == reference)
            .ok_or_else(|| CollageError::validation("reference node not found in its parent"))?;
        self.nodes[node.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(pos, node);
        Ok(())
    }

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> CollageResult<()> {
        if child == self.root || self.nodes[child.0].parent.is_some() {
            return Err(CollageError::validation(
                "only detached nodes can be inserted",
            ));
        }
        if self.element(parent).is_none() {
            return Err(CollageError::validation("text nodes cannot have children"));
        }
        let mut cur = Some(parent);
        while let Some(n) = cur {
            if n == child {
                return Err(CollageError::validation("cannot insert a node into itself"));
            }
            cur = self.parent(n);
        }
        Ok(())
    }

    /// Concatenated character data of a node and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        if let NodeKind::Text(t) = self.kind(id) {
            out.push_str(t);
        }
        for n in self.descendants(id) {
            if let NodeKind::Text(t) = self.kind(n) {
                out.push_str(t);
            }
        }
        out
    }

    /// Walk from `id` up to the root, nearest first (including `id`).
    pub fn ancestors_or_self(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |&n| self.parent(n))
    }

    /// Fallback identifier for elements without an `id`: tag plus arena index.
    pub fn id_or_synthetic(&self, id: NodeId) -> String {
        match self.element(id) {
            Some(e) => match e.id() {
                Some(s) => s.to_owned(),
                None => format!("{}{}", e.tag(), id.0),
            },
            None => format!("node{}", id.0),
        }
    }

    pub(crate) fn namespaces(&self) -> &[(Option<String>, String)] {
        &self.namespaces
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/tree.rs"]
mod tests;
