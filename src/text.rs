//! Language-tagged text values
//!
//! TV-Anytime inherits `xml:lang` from ancestors, so a text without its own
//! tag takes the nearest declared one.

use serde::{Deserialize, Serialize};

use crate::xml::{Document, NodeId};

/// Tag used when no ancestor declares a language
pub const DEFAULT_LANG: &str = "default";

/// Ancestor walk limit; deeper chains are treated as untagged
const MAX_LANG_DEPTH: usize = 64;

/// A text value with its resolved language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub lang: String,
    pub text: String,
}

impl LocalizedText {
    pub fn new(lang: &str, text: &str) -> Self {
        Self {
            lang: lang.to_string(),
            text: text.to_string(),
        }
    }
}

/// `xml:lang` of the element or its nearest tagged ancestor
pub fn element_language(doc: &Document, node: NodeId) -> &str {
    let mut current = Some(node);
    for _ in 0..MAX_LANG_DEPTH {
        let Some(id) = current else { break };
        if let Some(lang) = doc.attribute(id, "xml:lang").filter(|l| !l.is_empty()) {
            return lang;
        }
        current = doc.parent(id);
    }
    DEFAULT_LANG
}

/// Text and language of a text-bearing element; `None` if it has no text
pub fn localized_text(doc: &Document, node: NodeId) -> Option<LocalizedText> {
    let text = doc.text(node)?;
    Some(LocalizedText::new(element_language(doc, node), text))
}

/// Localized texts of every `local` child of `node`
pub fn localized_children(doc: &Document, node: NodeId, local: &str) -> Vec<LocalizedText> {
    doc.children(node, local)
        .filter_map(|child| localized_text(doc, child))
        .collect()
}

/// Choose the variant to show for `lang`.
///
/// A single variant always wins. Otherwise: exact language match, then the
/// `default`-tagged variant, then the first in document order.
pub fn pick<'a>(texts: &'a [LocalizedText], lang: &str) -> Option<&'a str> {
    match texts {
        [] => None,
        [only] => Some(only.text.as_str()),
        _ => texts
            .iter()
            .find(|t| t.lang == lang)
            .or_else(|| texts.iter().find(|t| t.lang == DEFAULT_LANG))
            .or_else(|| texts.first())
            .map(|t| t.text.as_str()),
    }
}
