use std::fmt;

use super::BindError;

/// An array or collection element that failed to bind and was skipped.
#[derive(Debug)]
pub struct SkippedElement {
    /// Path of the element's section.
    pub path: String,
    /// Position of the element among its section's children.
    pub index: usize,
    pub error: BindError,
}

impl fmt::Display for SkippedElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element {} at '{}': {}", self.index, self.path, self.error)
    }
}

/// What a successful bind call had to give up on.
///
/// Array slots that failed are left at their default value; collection
/// elements that failed are not added. An empty report means every element
/// was bound.
#[derive(Debug, Default)]
pub struct BindReport {
    skipped: Vec<SkippedElement>,
}

impl BindReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn skipped(&self) -> &[SkippedElement] {
        &self.skipped
    }

    pub fn into_skipped(self) -> Vec<SkippedElement> {
        self.skipped
    }

    pub(crate) fn record(&mut self, path: &str, index: usize, error: BindError) {
        self.skipped.push(SkippedElement {
            path: path.to_string(),
            index,
            error,
        });
    }
}
