//! The hierarchical key-value tree that binding reads from.

use std::borrow::Cow;

use toml::{Table, Value};

/// Separator between the keys that make up a section path.
pub const PATH_SEPARATOR: char = '.';

/// A node of the configuration tree.
///
/// Every section has a `key` (unique among its siblings) and a `path` made of
/// its ancestors' keys joined with `.`. Leaves carry a string value; interior
/// nodes carry ordered children. A section with children never reports a
/// value, so callers can treat `value()` as "this is a scalar leaf".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSection {
    key: String,
    path: String,
    value: Option<String>,
    children: Vec<ConfigSection>,
}

impl ConfigSection {
    /// Creates an empty root section.
    pub fn root() -> Self {
        Self::default()
    }

    fn detached(parent: &str, key: &str) -> Self {
        Self {
            key: key.to_string(),
            path: join_path(parent, key),
            value: None,
            children: Vec::new(),
        }
    }

    /// Builds a tree from a TOML table.
    ///
    /// Tables and arrays become children (array elements are keyed `0..n`),
    /// every other value is rendered to its string form.
    pub fn from_table(table: &Table) -> Self {
        let mut root = Self::root();
        for (key, value) in table {
            root.children.push(Self::from_value("", key, value));
        }
        root
    }

    fn from_value(parent: &str, key: &str, value: &Value) -> Self {
        let mut section = Self::detached(parent, key);
        match value {
            Value::Table(table) => {
                for (child_key, child) in table {
                    let child = Self::from_value(&section.path, child_key, child);
                    section.children.push(child);
                }
            }
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    let child = Self::from_value(&section.path, &index.to_string(), item);
                    section.children.push(child);
                }
            }
            Value::String(s) => section.value = Some(s.clone()),
            Value::Integer(i) => section.value = Some(i.to_string()),
            Value::Float(f) => section.value = Some(f.to_string()),
            Value::Boolean(b) => section.value = Some(b.to_string()),
            Value::Datetime(dt) => section.value = Some(dt.to_string()),
        }
        section
    }

    /// Builds a tree from `(dotted.path, value)` pairs.
    ///
    /// Children appear in the order their first entry was seen. Setting a
    /// value on a path that later gains children leaves it an interior node.
    pub fn from_entries<I, P, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (P, V)>,
        P: AsRef<str>,
        V: Into<String>,
    {
        let mut root = Self::root();
        for (path, value) in entries {
            root.insert(path.as_ref(), value.into());
        }
        root
    }

    /// Sets the value at `path`, creating intermediate sections on the way.
    pub fn insert(&mut self, path: &str, value: impl Into<String>) {
        let mut current = self;
        for segment in path.split(PATH_SEPARATOR) {
            let index = match current.position(segment) {
                Some(index) => index,
                None => {
                    let child = Self::detached(&current.path, segment);
                    current.children.push(child);
                    current.children.len() - 1
                }
            };
            current = &mut current.children[index];
        }
        current.value = Some(value.into());
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|child| child.key.eq_ignore_ascii_case(key))
    }

    /// The section's own key; empty for the root.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The dot-joined keys from the root down to this section.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The scalar value of a leaf. Sections with children have none.
    pub fn value(&self) -> Option<&str> {
        if self.children.is_empty() {
            self.value.as_deref()
        } else {
            None
        }
    }

    /// Children in discovery order.
    pub fn children(&self) -> &[ConfigSection] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// True when the section has neither a value nor children.
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.children.is_empty()
    }

    /// Returns the child named `key` (ASCII case-insensitive).
    ///
    /// A missing child yields an empty section carrying the would-be path, so
    /// lookups can be chained without checking each step.
    pub fn section(&self, key: &str) -> ConfigSection {
        match self.position(key) {
            Some(index) => self.children[index].clone(),
            None => Self::detached(&self.path, key),
        }
    }

    /// Borrowing variant of [`section`](Self::section).
    pub fn child(&self, key: &str) -> Option<&ConfigSection> {
        self.position(key).map(|index| &self.children[index])
    }

    /// Like [`section`](Self::section), but borrows the child when it exists.
    pub fn section_ref(&self, key: &str) -> Cow<'_, ConfigSection> {
        match self.child(key) {
            Some(child) => Cow::Borrowed(child),
            None => Cow::Owned(Self::detached(&self.path, key)),
        }
    }

    /// Walks a dotted path below this section.
    pub fn get(&self, path: &str) -> Option<&ConfigSection> {
        path.split(PATH_SEPARATOR)
            .try_fold(self, |section, segment| section.child(segment))
    }

    /// Visits every leaf value mutably, depth first.
    pub(crate) fn for_each_value_mut<E>(
        &mut self,
        f: &mut impl FnMut(&mut String) -> Result<(), E>,
    ) -> Result<(), E> {
        if let Some(value) = self.value.as_mut() {
            f(value)?;
        }
        for child in &mut self.children {
            child.for_each_value_mut(f)?;
        }
        Ok(())
    }
}

fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}{PATH_SEPARATOR}{key}")
    }
}
