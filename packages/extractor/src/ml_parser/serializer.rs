//! Renders a node tree back to markup.
//!
//! Attributes are written in the canonical quoting form used for tag pair
//! placeholders, so a document that round-trips through the parser and this
//! serializer can differ from its source only in attribute quoting and
//! character reference spelling.

use super::ast::{Attribute, Element, Node};
use super::tags::is_verbatim_text_element;
use crate::i18n::escaping::{escape, serialize_attribute, EscapingContext};

pub fn serialize_nodes(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(&mut out, node, false);
    }
    out
}

/// `verbatim` is set for children of `script` and `style`, whose text was
/// never decoded and is written back as is.
pub fn write_node(out: &mut String, node: &Node, verbatim: bool) {
    match node {
        Node::Element(el) => {
            out.push_str(&start_tag(&el.name, &el.attrs));
            write_children(out, el);
            if !el.is_void {
                out.push_str(&end_tag(&el.name));
            }
        }
        Node::Text(text) if verbatim => out.push_str(&text.value),
        Node::Text(text) => out.push_str(&escape(&text.value, EscapingContext::Html)),
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(&comment.value);
            out.push_str("-->");
        }
        Node::Declaration(decl) => out.push_str(&decl.value),
    }
}

pub fn write_children(out: &mut String, el: &Element) {
    let verbatim = is_verbatim_text_element(&el.name);
    for child in &el.children {
        write_node(out, child, verbatim);
    }
}

/// `<name a="1" b>` for the given attributes, in order.
pub fn start_tag<'a>(name: &str, attrs: impl IntoIterator<Item = &'a Attribute>) -> String {
    let mut out = format!("<{}", name);
    for attr in attrs {
        out.push(' ');
        out.push_str(&serialize_attribute(&attr.name, attr.value.as_deref()));
    }
    out.push('>');
    out
}

pub fn end_tag(name: &str) -> String {
    format!("</{}>", name)
}
