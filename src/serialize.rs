//! Markup Serializer
//!
//! The stateless inverse of the shape language: renders a value back to
//! markup text. Order is preserved but shape is not: a flattened attribute
//! key comes back as a child element, and whitespace is whatever the
//! simplifier kept.

use memchr::{memchr, memchr3};

use crate::value::{Node, Value};

/// Render a value as markup text
pub fn to_xml(value: &Value) -> String {
    let mut out = String::new();
    match value {
        Value::Scalar(text) => escape_text(&mut out, text),
        Value::Node(node) => write_node(&mut out, node),
    }
    out
}

fn write_node(out: &mut String, node: &Node) {
    match &node.name {
        Some(name) => write_element(out, name, node),
        // No name to wrap with; render the content bare
        None => write_content(out, node),
    }
}

fn write_element(out: &mut String, tag: &str, node: &Node) {
    out.push('<');
    out.push_str(tag);
    for (key, value) in &node.attrs {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        escape_attr(out, value);
        out.push('"');
    }
    out.push('>');
    write_content(out, node);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn write_content(out: &mut String, node: &Node) {
    for run in &node.text {
        escape_text(out, run);
    }
    if let Some(script) = &node.script {
        // Script bodies are emitted verbatim inside a nested script element
        out.push_str("<script>");
        out.push_str(script);
        out.push_str("</script>");
    }
    for (key, values) in &node.children {
        for value in values {
            write_keyed(out, key, value);
        }
    }
    if let Some(markup) = &node.markup {
        for value in markup {
            match value {
                Value::Scalar(text) => escape_text(out, text),
                Value::Node(child) => write_node(out, child),
            }
        }
    }
}

/// Render a content-key value as one `<key>…</key>` element
fn write_keyed(out: &mut String, key: &str, value: &Value) {
    match value {
        Value::Scalar(text) => {
            out.push('<');
            out.push_str(key);
            out.push('>');
            escape_text(out, text);
            out.push_str("</");
            out.push_str(key);
            out.push('>');
        }
        Value::Node(node) => write_element(out, key, node),
    }
}

fn escape_text(out: &mut String, text: &str) {
    if memchr3(b'&', b'<', b'>', text.as_bytes()).is_none() {
        out.push_str(text);
        return;
    }
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(out: &mut String, value: &str) {
    let bytes = value.as_bytes();
    if memchr3(b'&', b'<', b'"', bytes).is_none() && memchr(b'>', bytes).is_none() {
        out.push_str(value);
        return;
    }
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}
