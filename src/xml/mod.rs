//! Element navigation over parsed service list documents
//!
//! Contains the tree builder and the extraction policies every builder in
//! the crate goes through, so "required" and "optional" mean the same thing
//! everywhere.

mod entities;
mod tree;

pub use entities::{decode_entity, decode_xml_entities};
pub use tree::{Document, Element, NodeId};

use crate::error::{CatalogueError, Result};

/// First-of-required: text of the first `local` child, or a `MissingField` error.
pub fn required_child_text<'d>(doc: &'d Document, node: NodeId, local: &str) -> Result<&'d str> {
    doc.first_child(node, local)
        .and_then(|child| doc.text(child))
        .ok_or_else(|| CatalogueError::missing(doc.local_name(node), local))
}

/// First-of-optional-or-absent: text of the first `local` child, if any.
pub fn optional_child_text<'d>(doc: &'d Document, node: NodeId, local: &str) -> Option<&'d str> {
    doc.first_child(node, local).and_then(|child| doc.text(child))
}

pub fn required_attribute<'d>(doc: &'d Document, node: NodeId, name: &str) -> Result<&'d str> {
    doc.attribute(node, name)
        .ok_or_else(|| CatalogueError::missing(doc.local_name(node), name))
}

/// Attribute value, with empty strings treated as absent
pub fn optional_attribute<'d>(doc: &'d Document, node: NodeId, name: &str) -> Option<&'d str> {
    doc.attribute(node, name).filter(|value| !value.is_empty())
}

/// Texts of every `local` child that carries text, in document order
pub fn child_texts(doc: &Document, node: NodeId, local: &str) -> Vec<String> {
    doc.children(node, local)
        .filter_map(|child| doc.text(child))
        .map(str::to_string)
        .collect()
}
