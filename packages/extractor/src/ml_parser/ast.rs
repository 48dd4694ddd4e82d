//! ML Parser AST
//!
//! The host tree the message walker traverses.

use crate::parse_util::ParseSourceSpan;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(Text),
    Comment(Comment),
    /// `<!doctype ...>` and other markup declarations, kept verbatim.
    Declaration(Declaration),
}

impl Node {
    pub fn source_span(&self) -> &ParseSourceSpan {
        match self {
            Node::Element(n) => &n.source_span,
            Node::Text(n) => &n.source_span,
            Node::Comment(n) => &n.source_span,
            Node::Declaration(n) => &n.source_span,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }
}

/// Text node. `value` has character references decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub value: String,
    pub source_span: ParseSourceSpan,
}

impl Text {
    pub fn new(value: String, source_span: ParseSourceSpan) -> Self {
        Text { value, source_span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub value: String,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub value: String,
    pub source_span: ParseSourceSpan,
}

/// Attribute node. A bare attribute (`<p hidden>`) has no value.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: Option<String>,
    pub source_span: ParseSourceSpan,
}

impl Attribute {
    pub fn new(name: String, value: Option<String>, source_span: ParseSourceSpan) -> Self {
        Attribute {
            name,
            value,
            source_span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<Attribute>,
    pub children: Vec<Node>,
    pub is_void: bool,
    pub source_span: ParseSourceSpan,
    pub start_source_span: ParseSourceSpan,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&Attribute> {
        self.attrs.iter().find(|attr| attr.name == name)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Value of `name`, with bare attributes reading as the empty string.
    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attr(name)
            .map(|attr| attr.value.as_deref().unwrap_or(""))
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }
}
