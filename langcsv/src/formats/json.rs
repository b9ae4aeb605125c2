//! Support for JSON translation files (`lang/en/auth.json`).
//!
//! Objects map to levels, arrays to levels keyed by index. Output is pretty
//! printed with a 4-space indent, keeps key order and leaves non-ASCII text
//! unescaped.

use std::io::{BufRead, Write};

use serde::Serialize;
use serde_json::{Map, Number, Value, ser::PrettyFormatter};

use crate::{
    error::Error,
    traits::Parser,
    types::{LeafValue, Node, TranslationTree},
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Format {
    pub tree: TranslationTree,
}

impl Format {
    pub fn new(tree: TranslationTree) -> Self {
        Self { tree }
    }
}

impl Parser for Format {
    /// Parses a JSON document whose top level is an object.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let value: Value = serde_json::from_reader(reader).map_err(Error::Parse)?;
        match value {
            Value::Object(map) => Ok(Format {
                tree: tree_from_map(map),
            }),
            _ => Err(Error::NotAMapping),
        }
    }

    /// Writes the tree as pretty JSON followed by a newline.
    fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        let value = Value::Object(map_from_tree(&self.tree));
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
        value.serialize(&mut serializer).map_err(Error::Parse)?;
        writer.write_all(b"\n").map_err(Error::Io)
    }
}

fn tree_from_map(map: Map<String, Value>) -> TranslationTree {
    map.into_iter()
        .map(|(key, value)| (key, node_from_value(value)))
        .collect()
}

fn node_from_value(value: Value) -> Node {
    match value {
        Value::Object(map) => Node::Branch(tree_from_map(map)),
        Value::Array(items) => Node::Branch(
            items
                .into_iter()
                .enumerate()
                .map(|(index, item)| (index.to_string(), node_from_value(item)))
                .collect(),
        ),
        Value::String(s) => Node::Leaf(LeafValue::String(s)),
        Value::Number(n) => Node::Leaf(LeafValue::Number(n.to_string())),
        Value::Null => Node::Leaf(LeafValue::Null),
        Value::Bool(b) => Node::Leaf(LeafValue::Unsupported(b.to_string())),
    }
}

fn map_from_tree(tree: &TranslationTree) -> Map<String, Value> {
    tree.iter()
        .map(|(key, node)| {
            let value = match node {
                Node::Branch(child) => Value::Object(map_from_tree(child)),
                Node::Leaf(leaf) => value_from_leaf(leaf),
            };
            (key.clone(), value)
        })
        .collect()
}

fn value_from_leaf(leaf: &LeafValue) -> Value {
    match leaf {
        LeafValue::String(s) => Value::String(s.clone()),
        LeafValue::Number(text) => number_value(text),
        LeafValue::Null => Value::Null,
        LeafValue::Unsupported(raw) => serde_json::from_str(raw).unwrap_or(Value::Null),
    }
}

/// JSON number for numeric text; text that is not a finite number stays a string.
fn number_value(text: &str) -> Value {
    if let Ok(int) = text.parse::<i64>() {
        return Value::Number(Number::from(int));
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(text.to_string()))
}
