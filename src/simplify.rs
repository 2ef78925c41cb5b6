//! Content Simplifier
//!
//! Reduces a closed frame to the smallest unambiguous value shape. Pure
//! function of the frame and the resolved options; the builder calls it
//! exactly once per element close.
//!
//! Shape decision, first match wins:
//! - plain text, no attributes, no children: bare scalar
//! - attributes with a single text fragment: `$attrs` + `$text`
//! - no mixed content: flattened node; attributes become direct content keys
//!   only when the element has attributes alone, otherwise they stay under
//!   `$attrs` so they cannot collide with content keys
//! - mixed content (or `MarkupMode::Always`): `$markup` keeps text and child
//!   elements in document order, each child carrying its own `$name`
//!
//! Whitespace handling is per run: a run that is entirely whitespace never
//! counts as content under any option combination; surviving runs get
//! normalize (unless CDATA) and trim applied per the options. Script frames
//! skip both and collect their raw character data into `$script`.

use indexmap::IndexMap;

use crate::builder::{Frame, Piece};
use crate::options::{FlowOptions, MarkupMode};
use crate::value::{Node, Value};

/// A frame piece after whitespace processing
enum Item {
    Text(String),
    Child(String, Value),
}

/// Reduce a closed frame to its value
pub fn simplify(frame: Frame, options: &FlowOptions) -> Value {
    if frame.is_script {
        return simplify_script(frame);
    }

    let items = process_pieces(frame.pieces, options);
    let attrs = frame.attrs;

    if use_markup(&items, options) {
        return Value::Node(Node {
            attrs,
            markup: Some(
                items
                    .into_iter()
                    .map(|item| match item {
                        Item::Text(text) => Value::Scalar(text),
                        Item::Child(name, value) => Value::Node(inject_name(name, value)),
                    })
                    .collect(),
            ),
            ..Default::default()
        });
    }

    let mut text = Vec::new();
    let mut children: IndexMap<String, Vec<Value>> = IndexMap::new();
    for item in items {
        match item {
            Item::Text(run) => text.push(run),
            Item::Child(name, value) => children.entry(name).or_default().push(value),
        }
    }

    if attrs.is_empty() && children.is_empty() && text.len() <= 1 {
        return Value::Scalar(text.pop().unwrap_or_default());
    }

    if children.is_empty() && text.is_empty() {
        // Attributes alone: flatten them as direct content keys
        let mut node = Node::default();
        for (key, value) in attrs {
            node.push_child(key, Value::Scalar(value));
        }
        return Value::Node(node);
    }

    Value::Node(Node {
        attrs,
        text,
        children,
        ..Default::default()
    })
}

/// Attach a `$name` to a value about to lose its positional identity,
/// promoting a scalar to a node when needed
pub fn inject_name(name: String, value: Value) -> Node {
    match value {
        Value::Scalar(text) => {
            let mut node = Node::named(name);
            if !text.is_empty() {
                node.text.push(text);
            }
            node
        }
        Value::Node(mut node) => {
            node.name = Some(name);
            node
        }
    }
}

fn simplify_script(frame: Frame) -> Value {
    let mut script = String::new();
    let mut children: IndexMap<String, Vec<Value>> = IndexMap::new();
    for piece in frame.pieces {
        match piece {
            Piece::Run { content, .. } => script.push_str(&content),
            Piece::Child { name, value } => children.entry(name).or_default().push(value),
        }
    }

    if frame.attrs.is_empty() && children.is_empty() {
        return Value::Scalar(script);
    }

    Value::Node(Node {
        attrs: frame.attrs,
        script: Some(script),
        children,
        ..Default::default()
    })
}

/// Apply the per-run whitespace rules, dropping runs that are whitespace-only
fn process_pieces(pieces: Vec<Piece>, options: &FlowOptions) -> Vec<Item> {
    let mut items = Vec::with_capacity(pieces.len());
    for piece in pieces {
        match piece {
            Piece::Run { content, cdata } => {
                if content.trim().is_empty() {
                    continue;
                }
                let mut run = if options.normalize && !cdata {
                    collapse_whitespace(&content)
                } else {
                    content
                };
                if options.trim {
                    run = run.trim().to_string();
                }
                items.push(Item::Text(run));
            }
            Piece::Child { name, value } => items.push(Item::Child(name, value)),
        }
    }
    items
}

/// Decide whether document order must survive into `$markup`
fn use_markup(items: &[Item], options: &FlowOptions) -> bool {
    match options.preserve_markup {
        MarkupMode::Never => false,
        MarkupMode::Always => !items.is_empty(),
        MarkupMode::Selective => has_mixed_content(items),
    }
}

/// Mixed content: some text run has a child element before it and some text
/// run has a child element after it. Covers both a run interleaved between
/// two children and text on both sides of a single child.
fn has_mixed_content(items: &[Item]) -> bool {
    let is_child = |item: &Item| matches!(item, Item::Child(..));
    let (Some(first), Some(last)) = (
        items.iter().position(is_child),
        items.iter().rposition(is_child),
    ) else {
        return false;
    };
    // Some run must have a child before it, and some run a child after it;
    // text confined to one edge is not mixed.
    let text_follows = items[first + 1..].iter().any(|i| matches!(i, Item::Text(_)));
    let text_precedes = items[..last].iter().any(|i| matches!(i, Item::Text(_)));
    text_follows && text_precedes
}

/// Collapse every whitespace run to a single space
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            pending = true;
        } else {
            if pending {
                out.push(' ');
                pending = false;
            }
            out.push(ch);
        }
    }
    if pending {
        out.push(' ');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn frame(name: &str) -> Frame {
        Frame::new(name.to_string(), Vec::new())
    }

    fn text(frame: &mut Frame, content: &str) {
        frame.push_text(content.to_string(), false);
    }

    fn child(frame: &mut Frame, name: &str, value: Value) {
        frame.pieces.push(Piece::Child {
            name: name.to_string(),
            value,
        });
    }

    fn attrs(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_pure_text_collapses_to_scalar() {
        let mut f = frame("p");
        text(&mut f, "hello");
        assert_eq!(
            simplify(f, &FlowOptions::default()),
            Value::Scalar("hello".into())
        );
    }

    #[test]
    fn test_empty_element_is_empty_scalar() {
        assert_eq!(
            simplify(frame("br"), &FlowOptions::default()),
            Value::Scalar(String::new())
        );
    }

    #[test]
    fn test_attributes_alone_flatten() {
        let mut f = frame("person");
        f.attrs = attrs(&[("name", "Bill"), ("id", "1")]);
        let value = simplify(f, &FlowOptions::default());
        let Value::Node(node) = value else {
            panic!("expected node");
        };
        assert!(node.attrs.is_empty());
        assert_eq!(node.child("name"), Some(&[Value::Scalar("Bill".into())][..]));
        assert_eq!(node.child("id"), Some(&[Value::Scalar("1".into())][..]));
    }

    #[test]
    fn test_attributes_with_text_stay_separate() {
        let mut f = frame("person");
        f.attrs = attrs(&[("id", "1")]);
        text(&mut f, "some text");
        let Value::Node(node) = simplify(f, &FlowOptions::default()) else {
            panic!("expected node");
        };
        assert_eq!(node.attrs.get("id").map(String::as_str), Some("1"));
        assert_eq!(node.text, vec!["some text".to_string()]);
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_attributes_with_children_stay_separate() {
        let mut f = frame("person");
        f.attrs = attrs(&[("id", "1")]);
        child(&mut f, "thing", Value::Scalar("x".into()));
        let Value::Node(node) = simplify(f, &FlowOptions::default()) else {
            panic!("expected node");
        };
        assert_eq!(node.attrs.get("id").map(String::as_str), Some("1"));
        assert_eq!(node.child("thing"), Some(&[Value::Scalar("x".into())][..]));
    }

    #[test]
    fn test_repeated_children_group_in_order() {
        let mut f = frame("list");
        child(&mut f, "item", Value::Scalar("a".into()));
        child(&mut f, "other", Value::Scalar("x".into()));
        child(&mut f, "item", Value::Scalar("b".into()));
        let Value::Node(node) = simplify(f, &FlowOptions::default()) else {
            panic!("expected node");
        };
        let keys: Vec<_> = node.children.keys().cloned().collect();
        assert_eq!(keys, vec!["item".to_string(), "other".to_string()]);
        assert_eq!(
            node.child("item"),
            Some(&[Value::Scalar("a".into()), Value::Scalar("b".into())][..])
        );
    }

    #[test]
    fn test_whitespace_only_runs_never_count() {
        let mut f = frame("list");
        text(&mut f, "\n  ");
        child(&mut f, "item", Value::Scalar("a".into()));
        text(&mut f, "\n  ");
        child(&mut f, "item", Value::Scalar("b".into()));
        text(&mut f, "\n");
        let Value::Node(node) = simplify(f, &FlowOptions::default()) else {
            panic!("expected node");
        };
        assert!(node.markup.is_none());
        assert!(node.text.is_empty());
        assert_eq!(node.child("item").map(<[Value]>::len), Some(2));
    }

    #[test]
    fn test_whitespace_only_runs_dropped_without_normalize_or_trim() {
        let options = FlowOptions {
            normalize: false,
            trim: false,
            ..Default::default()
        };
        let mut f = frame("list");
        child(&mut f, "item", Value::Scalar("a".into()));
        text(&mut f, "  \n  ");
        child(&mut f, "item", Value::Scalar("b".into()));
        let Value::Node(node) = simplify(f, &options) else {
            panic!("expected node");
        };
        assert!(node.markup.is_none());
        assert!(node.text.is_empty());
    }

    #[test]
    fn test_text_before_children_is_not_mixed() {
        let mut f = frame("a");
        text(&mut f, "intro");
        child(&mut f, "p", Value::Scalar("x".into()));
        child(&mut f, "q", Value::Scalar("y".into()));
        let Value::Node(node) = simplify(f, &FlowOptions::default()) else {
            panic!("expected node");
        };
        assert!(node.markup.is_none());
        assert_eq!(node.text, vec!["intro".to_string()]);
    }

    #[test]
    fn test_text_between_children_is_mixed() {
        let mut f = frame("a");
        child(&mut f, "p", Value::Scalar("x".into()));
        text(&mut f, "middle");
        child(&mut f, "q", Value::Scalar("y".into()));
        let Value::Node(node) = simplify(f, &FlowOptions::default()) else {
            panic!("expected node");
        };
        let markup = node.markup.expect("markup");
        assert_eq!(markup.len(), 3);
        assert_eq!(markup[1], Value::Scalar("middle".into()));
    }

    #[test]
    fn test_text_on_both_sides_of_a_child_is_mixed() {
        let mut f = frame("a");
        text(&mut f, "before");
        child(&mut f, "p", Value::Scalar("x".into()));
        text(&mut f, "after");
        let Value::Node(node) = simplify(f, &FlowOptions::default()) else {
            panic!("expected node");
        };
        assert!(node.markup.is_some());
    }

    #[test]
    fn test_text_at_both_edges_is_mixed() {
        let mut f = frame("a");
        text(&mut f, "before");
        child(&mut f, "p", Value::Scalar("x".into()));
        child(&mut f, "q", Value::Scalar("y".into()));
        text(&mut f, "after");
        let Value::Node(node) = simplify(f, &FlowOptions::default()) else {
            panic!("expected node");
        };
        // Runs surround the children, so order between them carries meaning
        let markup = node.markup.expect("markup");
        assert_eq!(markup.len(), 4);
        assert_eq!(markup[0], Value::Scalar("before".into()));
        assert_eq!(markup[3], Value::Scalar("after".into()));
    }

    #[test]
    fn test_text_after_children_is_not_mixed() {
        let mut f = frame("a");
        child(&mut f, "p", Value::Scalar("x".into()));
        child(&mut f, "q", Value::Scalar("y".into()));
        text(&mut f, "outro");
        let Value::Node(node) = simplify(f, &FlowOptions::default()) else {
            panic!("expected node");
        };
        assert!(node.markup.is_none());
        assert_eq!(node.text, vec!["outro".to_string()]);
    }

    #[test]
    fn test_markup_children_carry_their_names() {
        let mut f = frame("a");
        text(&mut f, "before");
        child(&mut f, "p", Value::Scalar("x".into()));
        text(&mut f, "after");
        let Value::Node(node) = simplify(f, &FlowOptions::default()) else {
            panic!("expected node");
        };
        let markup = node.markup.expect("markup");
        let Value::Node(p) = &markup[1] else {
            panic!("expected node in markup");
        };
        assert_eq!(p.name.as_deref(), Some("p"));
        assert_eq!(p.text, vec!["x".to_string()]);
    }

    #[test]
    fn test_never_mode_collects_interleaved_text() {
        let options = FlowOptions {
            preserve_markup: MarkupMode::Never,
            ..Default::default()
        };
        let mut f = frame("a");
        text(&mut f, "one");
        child(&mut f, "p", Value::Scalar("x".into()));
        text(&mut f, "two");
        child(&mut f, "p", Value::Scalar("y".into()));
        let Value::Node(node) = simplify(f, &options) else {
            panic!("expected node");
        };
        assert!(node.markup.is_none());
        assert_eq!(node.text, vec!["one".to_string(), "two".to_string()]);
        assert_eq!(node.child("p").map(<[Value]>::len), Some(2));
    }

    #[test]
    fn test_always_mode_forces_markup_for_content() {
        let options = FlowOptions {
            preserve_markup: MarkupMode::Always,
            ..Default::default()
        };
        let mut f = frame("p");
        text(&mut f, "just text");
        let Value::Node(node) = simplify(f, &options) else {
            panic!("expected node");
        };
        assert_eq!(
            node.markup,
            Some(vec![Value::Scalar("just text".into())])
        );
    }

    #[test]
    fn test_always_mode_still_flattens_attributes_alone() {
        let options = FlowOptions {
            preserve_markup: MarkupMode::Always,
            ..Default::default()
        };
        let mut f = frame("thing");
        f.attrs = attrs(&[("id", "999"), ("ref", "blah")]);
        let Value::Node(node) = simplify(f, &options) else {
            panic!("expected node");
        };
        assert!(node.markup.is_none());
        assert_eq!(node.child("id"), Some(&[Value::Scalar("999".into())][..]));
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        let mut f = frame("p");
        text(&mut f, "a  lot\n\tof   space");
        assert_eq!(
            simplify(f, &FlowOptions::default()),
            Value::Scalar("a lot of space".into())
        );
    }

    #[test]
    fn test_trim_false_keeps_edge_space() {
        let options = FlowOptions {
            trim: false,
            ..Default::default()
        };
        let mut f = frame("p");
        text(&mut f, "some text.  ");
        assert_eq!(simplify(f, &options), Value::Scalar("some text. ".into()));
    }

    #[test]
    fn test_normalize_false_keeps_inner_space() {
        let options = FlowOptions {
            normalize: false,
            ..Default::default()
        };
        let mut f = frame("p");
        text(&mut f, " extra    space ");
        assert_eq!(simplify(f, &options), Value::Scalar("extra    space".into()));
    }

    #[test]
    fn test_cdata_skips_normalize_but_not_trim() {
        let mut f = frame("p");
        f.push_text("kept    inside".to_string(), true);
        child(&mut f, "q", Value::Scalar("x".into()));
        let Value::Node(node) = simplify(f, &FlowOptions::default()) else {
            panic!("expected node");
        };
        assert_eq!(node.text, vec!["kept    inside".to_string()]);
    }

    #[test]
    fn test_script_without_attributes_is_raw_scalar() {
        let mut f = frame("script");
        f.is_script = true;
        text(&mut f, "var x   =   3;  ");
        assert_eq!(
            simplify(f, &FlowOptions::default()),
            Value::Scalar("var x   =   3;  ".into())
        );
    }

    #[test]
    fn test_script_with_attributes_keeps_script_slot() {
        let mut f = frame("script");
        f.is_script = true;
        f.attrs = attrs(&[("type", "text/javascript")]);
        text(&mut f, "//comment");
        let Value::Node(node) = simplify(f, &FlowOptions::default()) else {
            panic!("expected node");
        };
        assert_eq!(node.script.as_deref(), Some("//comment"));
        assert!(node.text.is_empty());
    }
}
