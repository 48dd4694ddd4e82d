//! Markup Parser
//!
//! Converts HTML-like source text into a tree of [`Node`]s. The parser keeps a
//! stack of open elements the same way a tree builder does, reporting
//! unexpected and unclosed tags as [`ParseError`]s instead of guessing the
//! full HTML5 implied-end-tag rules.

use super::ast::{Attribute, Comment, Declaration, Element, Node, Text};
use super::tags::{decode_entities, is_raw_text_element, is_verbatim_text_element, is_void_element};
use crate::parse_util::{ParseError, ParseErrorLevel, ParseLocation, ParseSourceFile, ParseSourceSpan};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ParseTreeResult {
    pub root_nodes: Vec<Node>,
    pub errors: Vec<ParseError>,
}

impl ParseTreeResult {
    pub fn new(root_nodes: Vec<Node>, errors: Vec<ParseError>) -> Self {
        ParseTreeResult { root_nodes, errors }
    }

    /// The root nodes, or the first error-level problem found while parsing.
    pub fn into_result(self) -> Result<Vec<Node>, ParseError> {
        match self
            .errors
            .into_iter()
            .find(|e| e.level == ParseErrorLevel::Error)
        {
            Some(err) => Err(err),
            None => Ok(self.root_nodes),
        }
    }
}

/// Default limit on open elements while parsing a document.
pub const DEFAULT_MAX_DOCUMENT_DEPTH: usize = 512;

#[derive(Debug, Clone, Copy)]
pub struct HtmlParser {
    max_depth: usize,
}

impl Default for HtmlParser {
    fn default() -> Self {
        HtmlParser {
            max_depth: DEFAULT_MAX_DOCUMENT_DEPTH,
        }
    }
}

impl HtmlParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit how many elements may be open at once. Deeper markup is an
    /// error and stops the parse.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn parse(&self, source: &str, url: &str) -> ParseTreeResult {
        let mut builder = TreeBuilder::new(ParseSourceFile::new(source, url), self.max_depth);
        builder.build();
        ParseTreeResult::new(builder.root_nodes, builder.errors)
    }

    /// Parse `source`, failing on the first error-level problem. Warnings are logged.
    pub fn parse_document(&self, source: &str, url: &str) -> crate::Result<Vec<Node>> {
        let result = self.parse(source, url);
        for warning in result
            .errors
            .iter()
            .filter(|e| e.level == ParseErrorLevel::Warning)
        {
            tracing::warn!(location = %warning.span.start, "{}", warning.msg);
        }
        Ok(result.into_result()?)
    }
}

/// Parse `source` with the default nesting limit, failing on the first
/// malformed construct.
pub fn parse_document(source: &str, url: &str) -> crate::Result<Vec<Node>> {
    HtmlParser::new().parse_document(source, url)
}

struct TreeBuilder {
    file: ParseSourceFile,
    src: Arc<str>,
    line_starts: Vec<usize>,
    pos: usize,
    stack: Vec<Element>,
    max_depth: usize,
    // Set once nesting exceeds `max_depth`; nothing after it is parsed.
    too_deep: bool,
    root_nodes: Vec<Node>,
    errors: Vec<ParseError>,
}

impl TreeBuilder {
    fn new(file: ParseSourceFile, max_depth: usize) -> Self {
        let src = file.content.clone();
        let line_starts = std::iter::once(0)
            .chain(src.match_indices('\n').map(|(idx, _)| idx + 1))
            .collect();
        TreeBuilder {
            file,
            src,
            line_starts,
            pos: 0,
            stack: Vec::new(),
            max_depth,
            too_deep: false,
            root_nodes: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn build(&mut self) {
        while self.pos < self.src.len() && !self.too_deep {
            let rest = &self.src[self.pos..];
            if rest.starts_with("<!--") {
                self.consume_comment();
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                self.consume_declaration();
            } else if rest.starts_with("</") && starts_with_name(&rest[2..]) {
                self.consume_end_tag();
            } else if rest.starts_with('<') && starts_with_name(&rest[1..]) {
                self.consume_start_tag();
            } else {
                self.consume_text();
            }
        }
        let end = self.src.len();
        while let Some(el) = self.stack.last() {
            if !self.too_deep {
                let span = el.start_source_span.clone();
                let msg = format!("Unclosed element \"{}\"", el.name);
                self.errors.push(ParseError::new(span, msg));
            }
            self.close_top(end);
        }
    }

    fn location(&self, offset: usize) -> ParseLocation {
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        ParseLocation::new(self.file.clone(), offset, line, offset - self.line_starts[line])
    }

    fn span(&self, start: usize, end: usize) -> ParseSourceSpan {
        ParseSourceSpan::new(self.location(start), self.location(end))
    }

    fn add_to_parent(&mut self, node: Node) {
        let siblings = match self.stack.last_mut() {
            Some(parent) => &mut parent.children,
            None => &mut self.root_nodes,
        };
        siblings.push(node);
    }

    fn close_top(&mut self, end: usize) {
        if let Some(mut el) = self.stack.pop() {
            el.source_span = self.span(el.source_span.start.offset, end);
            self.add_to_parent(Node::Element(el));
        }
    }

    fn consume_comment(&mut self) {
        let start = self.pos;
        let body_start = start + 4;
        let (value_end, end) = match self.src[body_start..].find("-->") {
            Some(idx) => (body_start + idx, body_start + idx + 3),
            None => {
                let span = self.span(start, self.src.len());
                self.errors.push(ParseError::new(span, "Unterminated comment"));
                (self.src.len(), self.src.len())
            }
        };
        let node = Node::Comment(Comment {
            value: self.src[body_start..value_end].to_string(),
            source_span: self.span(start, end),
        });
        self.pos = end;
        self.add_to_parent(node);
    }

    fn consume_declaration(&mut self) {
        let start = self.pos;
        let end = match self.src[start..].find('>') {
            Some(idx) => start + idx + 1,
            None => {
                let span = self.span(start, self.src.len());
                self.errors.push(ParseError::new(span, "Unterminated declaration"));
                self.src.len()
            }
        };
        let node = Node::Declaration(Declaration {
            value: self.src[start..end].to_string(),
            source_span: self.span(start, end),
        });
        self.pos = end;
        self.add_to_parent(node);
    }

    fn consume_text(&mut self) {
        let start = self.pos;
        // A '<' that does not open a tag is literal text.
        let first = self.src[start..].chars().next().map_or(1, char::len_utf8);
        let end = self.src[start + first..]
            .find('<')
            .map(|idx| start + first + idx)
            .unwrap_or(self.src.len());
        self.pos = end;
        let value = decode_entities(&self.src[start..end]);
        self.push_text(value, start, end);
    }

    fn push_text(&mut self, value: String, start: usize, end: usize) {
        let span = self.span(start, end);
        let siblings = match self.stack.last_mut() {
            Some(parent) => &mut parent.children,
            None => &mut self.root_nodes,
        };
        if let Some(Node::Text(prev)) = siblings.last_mut() {
            if prev.source_span.end.offset == start {
                prev.value.push_str(&value);
                prev.source_span.end = span.end;
                return;
            }
        }
        siblings.push(Node::Text(Text::new(value, span)));
    }

    fn read_name(&mut self) -> String {
        let rest = &self.src[self.pos..];
        let len = rest
            .find(|c: char| c.is_whitespace() || matches!(c, '/' | '>' | '=' | '"' | '\''))
            .unwrap_or(rest.len());
        self.pos += len;
        rest[..len].to_ascii_lowercase()
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.src[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn consume_start_tag(&mut self) {
        let start = self.pos;
        self.pos += 1;
        let name = self.read_name();
        let mut attrs = Vec::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            let rest = &self.src[self.pos..];
            if rest.is_empty() {
                let span = self.span(start, self.pos);
                self.errors
                    .push(ParseError::new(span, format!("Unterminated start tag \"{}\"", name)));
                break;
            }
            if rest.starts_with('>') {
                self.pos += 1;
                break;
            }
            if rest.starts_with("/>") {
                self.pos += 2;
                self_closing = true;
                break;
            }
            match self.consume_attribute() {
                Some(attr) if attrs.iter().any(|a: &Attribute| a.name == attr.name) => {
                    // Keep the first occurrence.
                    let msg = format!("Duplicate attribute \"{}\" on \"{}\"", attr.name, name);
                    self.errors.push(ParseError::warning(attr.source_span, msg));
                }
                Some(attr) => attrs.push(attr),
                // Stray '/', '=' or quote: skip it.
                None => self.pos += 1,
            }
        }

        let start_span = self.span(start, self.pos);
        let is_void = is_void_element(&name);
        let mut element = Element {
            name,
            attrs,
            children: Vec::new(),
            is_void,
            source_span: start_span.clone(),
            start_source_span: start_span,
        };

        if is_void || self_closing {
            self.add_to_parent(Node::Element(element));
        } else if is_raw_text_element(&element.name) {
            self.consume_raw_text(&mut element);
            self.add_to_parent(Node::Element(element));
        } else if self.stack.len() >= self.max_depth {
            let msg = format!(
                "Element \"{}\" exceeds the nesting limit of {} levels",
                element.name, self.max_depth
            );
            self.errors.push(ParseError::new(element.start_source_span.clone(), msg));
            self.too_deep = true;
            self.add_to_parent(Node::Element(element));
        } else {
            self.stack.push(element);
        }
    }

    fn consume_attribute(&mut self) -> Option<Attribute> {
        let start = self.pos;
        let name = self.read_name();
        if name.is_empty() {
            return None;
        }
        let name_end = self.pos;
        self.skip_whitespace();
        if !self.src[self.pos..].starts_with('=') {
            self.pos = name_end;
            return Some(Attribute::new(name, None, self.span(start, name_end)));
        }
        self.pos += 1;
        self.skip_whitespace();

        let rest = &self.src[self.pos..];
        let raw_value = match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => match rest[1..].find(quote) {
                Some(idx) => {
                    self.pos += idx + 2;
                    &rest[1..idx + 1]
                }
                None => {
                    let span = self.span(start, self.src.len());
                    self.errors.push(ParseError::new(
                        span,
                        format!("Unterminated attribute value for \"{}\"", name),
                    ));
                    self.pos = self.src.len();
                    &rest[1..]
                }
            },
            _ => {
                let len = rest
                    .find(|c: char| c.is_whitespace() || c == '>')
                    .unwrap_or(rest.len());
                self.pos += len;
                &rest[..len]
            }
        };
        let value = decode_entities(raw_value);
        Some(Attribute::new(name, Some(value), self.span(start, self.pos)))
    }

    fn consume_raw_text(&mut self, element: &mut Element) {
        let start = self.pos;
        let closing = format!("</{}", element.name);
        let lowered = self.src[start..].to_ascii_lowercase();
        let (content_end, end) = match lowered.find(&closing) {
            Some(idx) => {
                let content_end = start + idx;
                let end = self.src[content_end..]
                    .find('>')
                    .map(|gt| content_end + gt + 1)
                    .unwrap_or(self.src.len());
                (content_end, end)
            }
            None => {
                let span = element.start_source_span.clone();
                self.errors.push(ParseError::new(
                    span,
                    format!("Unclosed element \"{}\"", element.name),
                ));
                (self.src.len(), self.src.len())
            }
        };
        if content_end > start {
            let raw = &self.src[start..content_end];
            let value = if is_verbatim_text_element(&element.name) {
                raw.to_string()
            } else {
                decode_entities(raw)
            };
            element
                .children
                .push(Node::Text(Text::new(value, self.span(start, content_end))));
        }
        self.pos = end;
        element.source_span = self.span(element.source_span.start.offset, end);
    }

    fn consume_end_tag(&mut self) {
        let start = self.pos;
        self.pos += 2;
        let name = self.read_name();
        let end = self.src[self.pos..]
            .find('>')
            .map(|idx| self.pos + idx + 1)
            .unwrap_or(self.src.len());
        self.pos = end;

        match self.stack.iter().rposition(|el| el.name == name) {
            Some(idx) => {
                while self.stack.len() > idx + 1 {
                    if let Some(el) = self.stack.last() {
                        let span = el.start_source_span.clone();
                        let msg = format!("Unclosed element \"{}\"", el.name);
                        self.errors.push(ParseError::new(span, msg));
                    }
                    self.close_top(start);
                }
                self.close_top(end);
            }
            None => {
                let span = self.span(start, end);
                let msg = format!("Unexpected closing tag \"{}\"", name);
                self.errors.push(ParseError::new(span, msg));
            }
        }
    }
}

fn starts_with_name(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}
