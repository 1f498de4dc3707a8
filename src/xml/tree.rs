//! Namespace-aware element tree
//!
//! Built in one pass over the quick-xml event stream. Elements are stored in
//! document (pre-)order, so every subtree is a contiguous index range and
//! descendant scans need no recursion.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;

use super::entities::{decode_entity, decode_xml_entities};
use crate::error::{CatalogueError, Result};

/// Index of an element inside its [`Document`]
pub type NodeId = usize;

/// A single element
#[derive(Debug, Clone)]
pub struct Element {
    /// Resolved namespace URI, if the element is bound to one
    pub namespace: Option<String>,
    /// Name without prefix
    pub local_name: String,
    /// Name as written, e.g. `tva:MediaUri`
    pub qualified_name: String,
    /// Attributes keyed by qualified name, values unescaped
    pub attributes: Vec<(String, String)>,
    /// Concatenated, trimmed character data directly inside this element
    pub text: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// One past the last descendant
    subtree_end: NodeId,
}

/// Parsed document
#[derive(Debug, Clone)]
pub struct Document {
    elements: Vec<Element>,
}

impl Document {
    /// Parse an XML payload into a tree
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = NsReader::from_str(xml);

        let mut elements: Vec<Element> = Vec::with_capacity(256);
        let mut stack: Vec<NodeId> = Vec::new();

        loop {
            let (ns, event) = reader.read_resolved_event()?;
            let namespace = namespace_uri(ns);

            match event {
                Event::Start(ref e) => {
                    let id = push_element(&mut elements, stack.last().copied(), namespace, e);
                    stack.push(id);
                }
                Event::Empty(ref e) => {
                    let id = push_element(&mut elements, stack.last().copied(), namespace, e);
                    elements[id].subtree_end = id + 1;
                }
                Event::Text(ref e) => {
                    if let Some(&id) = stack.last() {
                        let raw = String::from_utf8_lossy(e.as_ref());
                        elements[id].text.push_str(&decode_xml_entities(&raw));
                    }
                }
                Event::CData(ref e) => {
                    if let Some(&id) = stack.last() {
                        elements[id].text.push_str(&String::from_utf8_lossy(e.as_ref()));
                    }
                }
                Event::GeneralRef(ref e) => {
                    if let Some(&id) = stack.last() {
                        let name = String::from_utf8_lossy(e.as_ref());
                        match decode_entity(&name) {
                            Some(text) => elements[id].text.push_str(&text),
                            None => {
                                let text = &mut elements[id].text;
                                text.push('&');
                                text.push_str(&name);
                                text.push(';');
                            }
                        }
                    }
                }
                Event::End(_) => {
                    if let Some(id) = stack.pop() {
                        let end = elements.len();
                        let element = &mut elements[id];
                        element.subtree_end = end;
                        let trimmed = element.text.trim();
                        if trimmed.len() != element.text.len() {
                            element.text = trimmed.to_string();
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if elements.is_empty() {
            return Err(CatalogueError::EmptyDocument);
        }

        // Unclosed elements at EOF still get a usable range
        let end = elements.len();
        for id in stack {
            elements[id].subtree_end = end;
        }

        Ok(Self { elements })
    }

    /// The document element
    pub fn root(&self) -> NodeId {
        0
    }

    pub fn element(&self, id: NodeId) -> &Element {
        &self.elements[id]
    }

    pub fn local_name(&self, id: NodeId) -> &str {
        &self.elements[id].local_name
    }

    pub fn namespace(&self, id: NodeId) -> Option<&str> {
        self.elements[id].namespace.as_deref()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.elements[id].parent
    }

    /// Attribute value by qualified name (`priority`, `xml:lang`)
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.elements[id]
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Text content, `None` when the element carries no text
    pub fn text(&self, id: NodeId) -> Option<&str> {
        let text = self.elements[id].text.as_str();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Direct child elements with the given local name, in document order
    pub fn children<'a>(&'a self, id: NodeId, local: &'a str) -> impl Iterator<Item = NodeId> + 'a {
        self.elements[id]
            .children
            .iter()
            .copied()
            .filter(move |&child| self.elements[child].local_name == local)
    }

    /// All direct child elements
    pub fn child_elements(&self, id: NodeId) -> &[NodeId] {
        &self.elements[id].children
    }

    pub fn first_child(&self, id: NodeId, local: &str) -> Option<NodeId> {
        self.children(id, local).next()
    }

    /// Descendant elements (not including `id`) with the given local name
    pub fn descendants<'a>(&'a self, id: NodeId, local: &'a str) -> impl Iterator<Item = NodeId> + 'a {
        (id + 1..self.elements[id].subtree_end)
            .filter(move |&node| self.elements[node].local_name == local)
    }

    /// Descendant elements matching both namespace URI and local name
    pub fn descendants_ns<'a>(
        &'a self,
        id: NodeId,
        namespace: &'a str,
        local: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.descendants(id, local)
            .filter(move |&node| self.elements[node].namespace.as_deref() == Some(namespace))
    }

    pub fn first_descendant(&self, id: NodeId, local: &str) -> Option<NodeId> {
        self.descendants(id, local).next()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

fn namespace_uri(ns: ResolveResult<'_>) -> Option<String> {
    match ns {
        ResolveResult::Bound(Namespace(uri)) => Some(String::from_utf8_lossy(uri).into_owned()),
        _ => None,
    }
}

fn push_element(
    elements: &mut Vec<Element>,
    parent: Option<NodeId>,
    namespace: Option<String>,
    e: &BytesStart<'_>,
) -> NodeId {
    let id = elements.len();
    let attributes = e
        .attributes()
        .flatten()
        .map(|attr| {
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let raw = String::from_utf8_lossy(attr.value.as_ref());
            (key, decode_xml_entities(&raw))
        })
        .collect();

    elements.push(Element {
        namespace,
        local_name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
        qualified_name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
        attributes,
        text: String::new(),
        parent,
        children: Vec::new(),
        subtree_end: id + 1,
    });

    if let Some(parent) = parent {
        elements[parent].children.push(id);
    }
    id
}
