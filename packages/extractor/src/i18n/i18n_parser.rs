//! I18n Parser Module
//!
//! Builds [`Message`]s from marked text or marked element content.

use crate::config::ExtractorConfig;
use crate::error::{I18nError, LintError, Result};
use crate::i18n::digest::{compute_message_id, DigestOptions};
use crate::i18n::escaping::EscapingContext;
use crate::i18n::i18n_ast::{Message, Part, Placeholder, PlaceholderKind};
use crate::i18n::serializers::placeholder::{
    validate_placeholder_name, CanonicalKey, DraftPart, PlaceholderCandidate, PlaceholderRegistry,
    TagPairCandidate,
};
use crate::ml_parser::ast::{Element, Node};
use crate::ml_parser::serializer::{end_tag, start_tag};
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EXPRESSION_RE: Regex = Regex::new(r"(?s)\{\{\s*(.*?)\s*\}\}").unwrap();
}

const EXPRESSION_COMMENT: &str = "Embedded expression";
const MEANING_SEPARATOR: char = '|';
const COMMENT_MARKER: &str = "//";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedComment {
    pub meaning: Option<String>,
    pub comment: String,
}

/// Split `meaning|comment`. Without a separator the whole string is the comment.
pub fn parse_raw_comment(raw_comment: &str) -> std::result::Result<ParsedComment, LintError> {
    match raw_comment.split_once(MEANING_SEPARATOR) {
        None => Ok(ParsedComment {
            meaning: None,
            comment: raw_comment.trim().to_string(),
        }),
        Some((meaning, comment)) => {
            let meaning = meaning.trim();
            if meaning.is_empty() {
                return Err(LintError::EmptyMeaning);
            }
            Ok(ParsedComment {
                meaning: Some(meaning.to_string()),
                comment: comment.trim().to_string(),
            })
        }
    }
}

/// Parse the inside of `{{ ... }}`, including an optional trailing
/// `// directive(NAME|example)` comment.
pub fn parse_expression(
    text: &str,
    directive: &str,
) -> std::result::Result<PlaceholderCandidate, LintError> {
    let text = text.trim();
    let Some((expr, raw_comment)) = text.rsplit_once(COMMENT_MARKER) else {
        return Ok(PlaceholderCandidate::new(PlaceholderKind::Expression, text)
            .with_comment(EXPRESSION_COMMENT));
    };
    let raw_comment = raw_comment.trim();
    let malformed = || LintError::MalformedPlaceholderComment {
        directive: directive.to_string(),
        comment: raw_comment.to_string(),
    };
    let inner = raw_comment
        .strip_prefix(directive)
        .and_then(|rest| rest.strip_prefix('('))
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(malformed)?
        .trim();

    let (name, example) = match inner.split_once(MEANING_SEPARATOR) {
        Some((name, example)) => (name.trim(), Some(example.trim())),
        None => (inner, None),
    };
    validate_placeholder_name(name)?;

    let mut candidate = PlaceholderCandidate::new(PlaceholderKind::Expression, expr.trim())
        .with_name(name)
        .with_comment(EXPRESSION_COMMENT);
    if let Some(example) = example.filter(|e| !e.is_empty()) {
        candidate = candidate.with_example(example);
    }
    Ok(candidate)
}

/// One message while its content is being parsed.
#[derive(Debug, Clone)]
struct MessageDraft {
    meaning: Option<String>,
    comment: String,
    parts: Vec<DraftPart>,
    context: EscapingContext,
    /// Element (by tag pair key) and attribute holding an embedded message.
    embedded_in: Option<(CanonicalKey, String)>,
}

impl MessageDraft {
    fn new(raw_comment: &str, context: EscapingContext) -> Result<Self> {
        let ParsedComment { meaning, comment } = parse_raw_comment(raw_comment)?;
        Ok(MessageDraft {
            meaning,
            comment,
            parts: Vec::new(),
            context,
            embedded_in: None,
        })
    }
}

/// Builds one message. Owns the registry shared by the message and every
/// sub-message found in its content; the registry is dropped by [`Self::build`].
#[derive(Debug)]
pub struct MessageBuilder<'c> {
    config: &'c ExtractorConfig,
    registry: PlaceholderRegistry,
    draft: MessageDraft,
    embedded: Vec<MessageDraft>,
}

impl<'c> MessageBuilder<'c> {
    /// Message from raw text, e.g. an attribute value.
    pub fn from_text(
        config: &'c ExtractorConfig,
        raw_comment: &str,
        text: &str,
        context: EscapingContext,
    ) -> Result<Self> {
        let mut registry = PlaceholderRegistry::new();
        let mut draft = MessageDraft::new(raw_comment, context)?;
        let mut parser = ContentParser::new(config, &mut registry);
        parser.parse_text(text, &mut draft.parts)?;
        let embedded = parser.embedded;
        Ok(MessageBuilder {
            config,
            registry,
            draft,
            embedded,
        })
    }

    /// Message from the entire content of `element`.
    pub fn from_element(
        config: &'c ExtractorConfig,
        raw_comment: &str,
        element: &Element,
    ) -> Result<Self> {
        let mut registry = PlaceholderRegistry::new();
        let mut draft = MessageDraft::new(raw_comment, EscapingContext::Html)?;
        let mut parser = ContentParser::new(config, &mut registry);
        parser.parse_children(&element.children, &mut draft.parts)?;
        let embedded = parser.embedded;
        Ok(MessageBuilder {
            config,
            registry,
            draft,
            embedded,
        })
    }

    /// Finalize placeholder names and compute ids.
    pub fn build(self) -> Result<Message> {
        let MessageBuilder {
            config,
            mut registry,
            draft,
            embedded,
        } = self;
        let placeholders_by_name = registry.finalize_names()?;

        let embedded_messages = embedded
            .into_iter()
            .map(|sub| {
                let used = referenced_names(&registry, &sub.parts, &placeholders_by_name)?;
                resolve(config, &registry, sub, used, Vec::new())
            })
            .collect::<Result<Vec<_>>>()?;

        let message = resolve(
            config,
            &registry,
            draft,
            placeholders_by_name,
            embedded_messages,
        )?;
        tracing::debug!(
            id = message.id(),
            placeholders = message.placeholders_by_name().len(),
            embedded = message.embedded_messages().len(),
            "built message"
        );
        Ok(message)
    }
}

fn resolve(
    config: &ExtractorConfig,
    registry: &PlaceholderRegistry,
    draft: MessageDraft,
    placeholders_by_name: IndexMap<String, Placeholder>,
    embedded_messages: Vec<Message>,
) -> Result<Message> {
    let parts = registry.resolve_parts(&draft.parts)?;
    let id = compute_message_id(
        draft.meaning.as_deref(),
        &parts,
        DigestOptions::new(draft.context, config.html_whitespace),
    );
    Ok(Message::new(
        id,
        draft.meaning,
        draft.comment,
        parts,
        placeholders_by_name,
        draft.context,
        embedded_messages,
        draft.embedded_in,
    ))
}

/// The subset of `all` referenced by `parts`, in registry order.
fn referenced_names(
    registry: &PlaceholderRegistry,
    parts: &[DraftPart],
    all: &IndexMap<String, Placeholder>,
) -> Result<IndexMap<String, Placeholder>> {
    fn collect(parts: &[Part], names: &mut Vec<String>) {
        for part in parts {
            match part {
                Part::Text(_) => {}
                Part::Placeholder(ph) => names.push(ph.name.clone()),
                Part::TagPair(tag_pair) => {
                    names.push(tag_pair.begin_placeholder.name.clone());
                    names.push(tag_pair.end_placeholder.name.clone());
                    collect(&tag_pair.parts, names);
                }
            }
        }
    }
    let mut names = Vec::new();
    collect(&registry.resolve_parts(parts)?, &mut names);
    Ok(all
        .iter()
        .filter(|(name, _)| names.contains(name))
        .map(|(name, ph)| (name.clone(), ph.clone()))
        .collect())
}

/// Walks message content, registering every placeholder and tag pair with the
/// registry it was handed.
struct ContentParser<'a> {
    config: &'a ExtractorConfig,
    registry: &'a mut PlaceholderRegistry,
    embedded: Vec<MessageDraft>,
    depth: usize,
}

impl<'a> ContentParser<'a> {
    fn new(config: &'a ExtractorConfig, registry: &'a mut PlaceholderRegistry) -> Self {
        ContentParser {
            config,
            registry,
            embedded: Vec::new(),
            depth: 0,
        }
    }

    /// Split `text` into literal runs and `{{ }}` expression placeholders.
    fn parse_text(&mut self, text: &str, parts: &mut Vec<DraftPart>) -> Result<()> {
        let mut last = 0;
        for caps in EXPRESSION_RE.captures_iter(text) {
            let (Some(whole), Some(expr)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            push_text(parts, &text[last..whole.start()]);
            last = whole.end();
            // `{{ }}` has nothing to stand in for.
            if expr.as_str().trim().is_empty() {
                continue;
            }
            let candidate = parse_expression(expr.as_str(), &self.config.placeholder_directive)?;
            let id = self.registry.intern_simple_placeholder(candidate)?;
            parts.push(DraftPart::Placeholder(id));
        }
        push_text(parts, &text[last..]);
        Ok(())
    }

    fn parse_children(&mut self, children: &[Node], parts: &mut Vec<DraftPart>) -> Result<()> {
        for child in children {
            match child {
                Node::Text(text) => self.parse_text(&text.value, parts)?,
                Node::Element(el) => {
                    let part = self.parse_element(el)?;
                    parts.push(part);
                }
                Node::Comment(_) | Node::Declaration(_) => {}
            }
        }
        Ok(())
    }

    fn parse_element(&mut self, el: &Element) -> Result<DraftPart> {
        if self.depth >= self.config.max_depth {
            return Err(I18nError::NestingTooDeep {
                limit: self.config.max_depth,
            });
        }
        let canonical_key = self.registry.reserve_tag_slot(&el.name);
        self.parse_embedded_attributes(el, &canonical_key)?;

        let (begin, end) = begin_end_tags(el, self.config);
        let mut parts = Vec::new();
        self.depth += 1;
        let parsed = self.parse_children(&el.children, &mut parts);
        self.depth -= 1;
        parsed?;

        let id = self.registry.intern_tag_pair(TagPairCandidate {
            tag: el.name.clone(),
            begin,
            end,
            parts,
            canonical_key,
        })?;
        Ok(DraftPart::TagPair(id))
    }

    /// Marked attributes inside message content become sub-messages sharing
    /// this registry.
    fn parse_embedded_attributes(&mut self, el: &Element, key: &CanonicalKey) -> Result<()> {
        for attr in &el.attrs {
            let Some(target) = self.config.marked_attribute(&attr.name) else {
                continue;
            };
            let value = el.attr_value(target).ok_or_else(|| LintError::MissingMarkedAttribute {
                attr: target.to_string(),
            })?;
            let raw_comment = attr.value.as_deref().unwrap_or("");
            let mut draft = MessageDraft::new(raw_comment, EscapingContext::AttributeValue)?;
            draft.embedded_in = Some((key.clone(), target.to_string()));
            self.parse_text(value, &mut draft.parts)?;
            self.embedded.push(draft);
        }
        Ok(())
    }
}

fn push_text(parts: &mut Vec<DraftPart>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(DraftPart::Text(prev)) = parts.last_mut() {
        prev.push_str(text);
    } else {
        parts.push(DraftPart::Text(text.to_string()));
    }
}

/// True for attributes that only carry localization markers.
pub fn is_marker_attribute(name: &str, config: &ExtractorConfig) -> bool {
    name == config.node_marker || config.marked_attribute(name).is_some()
}

/// Canonical begin and end markup of `el`, without localization markers.
/// Void elements have an empty end.
pub fn begin_end_tags(el: &Element, config: &ExtractorConfig) -> (String, String) {
    let attrs = el
        .attrs
        .iter()
        .filter(|attr| !is_marker_attribute(&attr.name, config));
    let begin = start_tag(&el.name, attrs);
    let end = if el.is_void {
        String::new()
    } else {
        end_tag(&el.name)
    };
    (begin, end)
}

/// Convenience for the common case of a message with no markup.
pub fn build_text_message(
    config: &ExtractorConfig,
    raw_comment: &str,
    text: &str,
    context: EscapingContext,
) -> Result<Message> {
    MessageBuilder::from_text(config, raw_comment, text, context)?.build()
}

