//! Simplified Value Types
//!
//! The emitted representation of a completed element: either a bare string
//! or a node carrying any of name, attributes, text, script body, ordered
//! markup, and content keys. The shape is the smallest unambiguous one for
//! the content it holds; which parts are populated is decided by the
//! simplifier, not by the element's syntax.
//!
//! A node never holds both `$markup` and content keys or `$text` for the
//! same content: `$markup` is a total alternative representation of the
//! node's children, not a supplement.
//!
//! Values serialize (via the hand-written `serde::Serialize` impls) to the
//! JSON shape language directly: reserved keys are spelled `$name`,
//! `$attrs`, `$text`, `$script` and `$markup`; a content key that occurred
//! once is emitted bare, repeated occurrences become an array; a single text
//! run is a string, several are an array of strings.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A simplified value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Plain text: no attributes, no children
    Scalar(String),
    /// Anything richer than plain text
    Node(Node),
}

/// The object form of a simplified value
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node {
    /// `$name`: present only when identity is not implied by position
    pub name: Option<String>,
    /// `$attrs`: attributes kept apart from content keys
    pub attrs: IndexMap<String, String>,
    /// `$text`: prose runs, in document order
    pub text: Vec<String>,
    /// `$script`: raw script body, untouched by normalize/trim
    pub script: Option<String>,
    /// `$markup`: ordered text/child sequence when document order matters
    pub markup: Option<Vec<Value>>,
    /// Content keys: child values by tag name, first-seen order
    pub children: IndexMap<String, Vec<Value>>,
}

impl Node {
    /// Create an empty node carrying only a name
    pub fn named(name: impl Into<String>) -> Self {
        Node {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Append a child value under a content key, preserving first-seen order
    pub fn push_child(&mut self, name: impl Into<String>, value: Value) {
        self.children.entry(name.into()).or_default().push(value);
    }

    /// Add an attribute, preserving insertion order
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Add a text run
    pub fn with_text(mut self, run: impl Into<String>) -> Self {
        self.text.push(run.into());
        self
    }

    /// Add a child value under a content key
    pub fn with_child(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push_child(name, value.into());
        self
    }

    /// Get the values recorded under a content key
    pub fn child(&self, name: &str) -> Option<&[Value]> {
        self.children.get(name).map(Vec::as_slice)
    }

    /// True when the node has no attributes and no content of any kind
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
            && self.text.is_empty()
            && self.script.is_none()
            && self.markup.is_none()
            && self.children.is_empty()
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Value {
        Value::Node(node)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Value {
        Value::Scalar(text.to_string())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Scalar(text) => serializer.serialize_str(text),
            Value::Node(node) => node.serialize(serializer),
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(name) = &self.name {
            map.serialize_entry("$name", name)?;
        }
        if !self.attrs.is_empty() {
            map.serialize_entry("$attrs", &self.attrs)?;
        }
        match self.text.len() {
            0 => {}
            1 => map.serialize_entry("$text", &self.text[0])?,
            _ => map.serialize_entry("$text", &self.text)?,
        }
        if let Some(script) = &self.script {
            map.serialize_entry("$script", script)?;
        }
        for (key, values) in &self.children {
            match values.len() {
                0 => {}
                1 => map.serialize_entry(key, &values[0])?,
                _ => map.serialize_entry(key, &OneOrMany(values))?,
            }
        }
        if let Some(markup) = &self.markup {
            map.serialize_entry("$markup", markup)?;
        }
        map.end()
    }
}

/// Repeated content-key values serialize as a plain array
struct OneOrMany<'a>(&'a [Value]);

impl Serialize for OneOrMany<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for value in self.0 {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}
