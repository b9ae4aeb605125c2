//! Core, format-agnostic types for langcsv.
//! Loaders decode into these; emitters serialize these.

use std::fmt::{Display, Formatter};

use indexmap::IndexMap;

/// A scalar found at the leaf of a translation tree.
///
/// Only strings, numbers and nulls take part in the CSV table. Anything else the
/// loaders meet at a leaf position (booleans, for example) is kept as
/// [`LeafValue::Unsupported`] with its literal text, and dropped when the tree
/// is flattened.
#[derive(Debug, Clone, PartialEq)]
pub enum LeafValue {
    String(String),
    /// Decimal text of a numeric literal, as it reads once cast to a string.
    Number(String),
    Null,
    /// Literal text of a value that cannot be represented in the table.
    Unsupported(String),
}

impl LeafValue {
    /// Coerces the value to the text written in the `Original` column.
    ///
    /// Returns `None` for unsupported values.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            LeafValue::String(s) | LeafValue::Number(s) => Some(s),
            LeafValue::Null => Some(""),
            LeafValue::Unsupported(_) => None,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, LeafValue::Unsupported(_))
    }
}

impl From<&str> for LeafValue {
    fn from(value: &str) -> Self {
        LeafValue::String(value.to_string())
    }
}

impl From<String> for LeafValue {
    fn from(value: String) -> Self {
        LeafValue::String(value)
    }
}

impl Display for LeafValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LeafValue::Unsupported(raw) => write!(f, "{}", raw),
            other => write!(f, "{}", other.as_text().unwrap_or_default()),
        }
    }
}

/// One position in a translation tree: either a nested level or a leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Branch(TranslationTree),
    Leaf(LeafValue),
}

impl Node {
    pub fn as_branch(&self) -> Option<&TranslationTree> {
        match self {
            Node::Branch(tree) => Some(tree),
            Node::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafValue> {
        match self {
            Node::Leaf(value) => Some(value),
            Node::Branch(_) => None,
        }
    }
}

impl From<TranslationTree> for Node {
    fn from(value: TranslationTree) -> Self {
        Node::Branch(value)
    }
}

impl From<LeafValue> for Node {
    fn from(value: LeafValue) -> Self {
        Node::Leaf(value)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::Leaf(LeafValue::from(value))
    }
}

/// A nested key-value tree of translations.
///
/// Keys keep their insertion order at every level; that order decides the row
/// order of an exported CSV and the entry order of emitted files.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TranslationTree {
    entries: IndexMap<String, Node>,
}

impl TranslationTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `node` under `key`, replacing any previous node in place.
    pub fn insert(&mut self, key: impl Into<String>, node: impl Into<Node>) -> Option<Node> {
        self.entries.insert(key.into(), node.into())
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.get(key)
    }

    /// Iterates over the direct children in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Node> {
        self.entries.iter()
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entry(&mut self, key: String) -> indexmap::map::Entry<'_, String, Node> {
        self.entries.entry(key)
    }
}

impl<'a> IntoIterator for &'a TranslationTree {
    type Item = (&'a String, &'a Node);
    type IntoIter = indexmap::map::Iter<'a, String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<K: Into<String>, N: Into<Node>> FromIterator<(K, N)> for TranslationTree {
    fn from_iter<T: IntoIterator<Item = (K, N)>>(iter: T) -> Self {
        let mut tree = TranslationTree::new();
        for (key, node) in iter {
            tree.insert(key, node);
        }
        tree
    }
}

/// A translation tree together with its locale-rooted, extension-less path,
/// e.g. `en/auth` or `vendor/package/es/test`.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationFile {
    pub path: String,
    pub tree: TranslationTree,
}

impl TranslationFile {
    pub fn new(path: impl Into<String>, tree: TranslationTree) -> Self {
        Self {
            path: path.into(),
            tree,
        }
    }

    /// The locale derived from this file's path.
    pub fn locale(&self) -> Option<&str> {
        crate::locale::extract_locale(&self.path)
    }
}
