//! Flattening a translation tree into dotted keys and building it back.

use indexmap::IndexMap;

use crate::types::{LeafValue, Node, TranslationTree};

/// Joins the segments of a [dotted key](TranslationTree::flatten).
pub const KEY_SEPARATOR: char = '.';

/// Deepest nesting accepted from translation files and dotted keys. Matches
/// the recursion limit `serde_json` applies to JSON files.
pub const MAX_DEPTH: usize = 128;

/// Number of levels a dotted key spans.
pub fn key_depth(key: &str) -> usize {
    key.split(KEY_SEPARATOR).count()
}

impl TranslationTree {
    /// Flattens the tree into `(dotted key, text)` pairs.
    ///
    /// Traversal is depth-first in insertion order. Only string, number and null
    /// leaves are emitted (coerced to text); unsupported leaves and empty
    /// branches produce nothing. When two paths collapse to the same dotted key
    /// (a key that itself contains `.`), the later value replaces the earlier one
    /// at the earlier position.
    ///
    /// # Example
    /// ```rust
    /// use langcsv::TranslationTree;
    ///
    /// let mut tree = TranslationTree::new();
    /// tree.set_dotted("auth.failed", "Failed");
    /// tree.set_dotted("auth.throttle", "Slow down");
    /// assert_eq!(
    ///     tree.flatten(),
    ///     vec![
    ///         ("auth.failed".to_string(), "Failed".to_string()),
    ///         ("auth.throttle".to_string(), "Slow down".to_string()),
    ///     ]
    /// );
    /// ```
    pub fn flatten(&self) -> Vec<(String, String)> {
        let mut out = IndexMap::new();
        flatten_into(self, "", &mut out);
        out.into_iter().collect()
    }

    /// Assigns `value` at `key`, splitting the key on `.` and creating nested
    /// levels as needed.
    ///
    /// Any intermediate segment that is missing or currently holds a leaf is
    /// replaced by a fresh level. The final segment is overwritten.
    pub fn set_dotted(&mut self, key: &str, value: impl Into<LeafValue>) {
        let segments: Vec<&str> = key.split(KEY_SEPARATOR).collect();
        set_path(self, &segments, value.into());
    }

    /// Looks up the node at a dotted key.
    pub fn get_dotted(&self, key: &str) -> Option<&Node> {
        let mut segments = key.split(KEY_SEPARATOR);
        let first = segments.next()?;
        let mut node = self.get(first)?;
        for segment in segments {
            node = node.as_branch()?.get(segment)?;
        }
        Some(node)
    }

    /// Builds a tree from `(dotted key, value)` pairs, assigning in order.
    pub fn unflatten<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<LeafValue>,
    {
        let mut tree = TranslationTree::new();
        for (key, value) in pairs {
            tree.set_dotted(key.as_ref(), value);
        }
        tree
    }

    /// Number of leaves that would survive flattening.
    pub fn leaf_count(&self) -> usize {
        self.iter()
            .map(|(_, node)| match node {
                Node::Branch(child) => child.leaf_count(),
                Node::Leaf(value) if value.is_supported() => 1,
                Node::Leaf(_) => 0,
            })
            .sum()
    }
}

fn flatten_into(tree: &TranslationTree, prefix: &str, out: &mut IndexMap<String, String>) {
    for (key, node) in tree {
        let dotted = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}{}{}", prefix, KEY_SEPARATOR, key)
        };
        match node {
            Node::Branch(child) if !child.is_empty() => flatten_into(child, &dotted, out),
            // An empty level is a non-scalar leaf.
            Node::Branch(_) => {}
            Node::Leaf(value) => {
                if let Some(text) = value.as_text() {
                    out.insert(dotted, text.to_string());
                }
            }
        }
    }
}

fn set_path(tree: &mut TranslationTree, segments: &[&str], value: LeafValue) {
    match segments {
        [] => {}
        [last] => {
            tree.insert(*last, Node::Leaf(value));
        }
        [head, rest @ ..] => {
            let node = tree
                .entry(head.to_string())
                .or_insert_with(|| Node::Branch(TranslationTree::new()));
            match node {
                Node::Branch(child) => set_path(child, rest, value),
                Node::Leaf(_) => {
                    let mut child = TranslationTree::new();
                    set_path(&mut child, rest, value);
                    *node = Node::Branch(child);
                }
            }
        }
    }
}
