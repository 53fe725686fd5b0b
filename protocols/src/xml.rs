//! Helpers over [`xmltree`] element trees.
//!
//! UPnP documents present a repeated element either as one node or as a
//! sequence depending on cardinality; [`children`] normalizes both cases
//! into a single iteration path so callers never branch on it.

use xmltree::{Element, XMLNode};

/// All child elements with the given local name, in document order.
///
/// Matching ignores namespace prefixes; gateway documents are inconsistent
/// about them.
pub fn children<'a>(parent: &'a Element, name: &str) -> Vec<&'a Element> {
    parent
        .children
        .iter()
        .filter_map(XMLNode::as_element)
        .filter(|element| element.name == name)
        .collect()
}

/// First child element with the given local name.
pub fn child<'a>(parent: &'a Element, name: &str) -> Option<&'a Element> {
    parent
        .children
        .iter()
        .filter_map(XMLNode::as_element)
        .find(|element| element.name == name)
}

/// Text content of an element, empty if it has none.
pub fn text(element: &Element) -> String {
    element
        .get_text()
        .map(|content| content.into_owned())
        .unwrap_or_default()
}

/// Text content of the first child with the given local name.
pub fn child_text(parent: &Element, name: &str) -> Option<String> {
    child(parent, name).map(text)
}

/// Escape a value for placement inside an element body.
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
