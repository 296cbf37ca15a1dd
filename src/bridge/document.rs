//! Rebuilding a tree document from a configuration section.

use crate::config::ConfigSection;

/// A tree-shaped document: objects, arrays and string scalars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document {
    /// Properties in section order.
    Object(Vec<(String, Document)>),
    Array(Vec<Document>),
    Scalar(Option<String>),
}

impl Document {
    pub fn empty_object() -> Self {
        Document::Object(Vec::new())
    }

    /// Looks up a property of an object.
    pub fn get(&self, key: &str) -> Option<&Document> {
        match self {
            Document::Object(properties) => properties
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Document::Scalar(value) => value.as_deref(),
            _ => None,
        }
    }
}

/// Rebuilds `section` as an object holding a single property named after
/// the section.
///
/// Sections carry no object/array tag, so every section with children is
/// rebuilt as an object; index-keyed children (`"0"`, `"1"`, ...) come back
/// as properties, never as array elements. A section without a key yields
/// an empty object.
pub fn reconstruct(section: &ConfigSection) -> Document {
    let mut root = Document::empty_object();
    append(&mut root, section);
    root
}

fn append(builder: &mut Document, section: &ConfigSection) {
    if section.key().trim().is_empty() {
        return;
    }

    let node = if section.has_children() {
        let mut child = Document::empty_object();
        for grandchild in section.children() {
            append(&mut child, grandchild);
        }
        child
    } else {
        Document::Scalar(section.value().map(str::to_string))
    };

    match builder {
        Document::Object(properties) => properties.push((section.key().to_string(), node)),
        // Unreachable from `reconstruct`, which only ever builds objects.
        Document::Array(items) => items.push(node),
        Document::Scalar(_) => {}
    }
}
