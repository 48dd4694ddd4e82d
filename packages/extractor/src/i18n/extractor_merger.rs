//! Extractor Merger Module
//!
//! Extracts translatable messages from a markup tree and merges translations
//! back into it.
//!
//! Extraction walks the tree breadth first. A marked attribute becomes a
//! message of its own. An element carrying the node marker becomes a message
//! built from its whole content and is not descended into.

use crate::config::{ErrorPolicy, ExtractorConfig};
use crate::error::{I18nError, LintError, Result};
use crate::i18n::escaping::{escape, EscapingContext};
use crate::i18n::i18n_ast::{Message, Part, TagPair};
use crate::i18n::i18n_parser::{build_text_message, is_marker_attribute, MessageBuilder};
use crate::i18n::serializers::placeholder::CanonicalKey;
use crate::i18n::translation_bundle::TranslationBundle;
use crate::ml_parser::ast::{Attribute, Element, Node};
use crate::ml_parser::serializer::{end_tag, start_tag, write_node};
use crate::ml_parser::tags::is_verbatim_text_element;
use indexmap::IndexMap;
use std::collections::{HashMap, VecDeque};

/// Callbacks fired as messages are built, so a caller can substitute
/// translations without walking the tree a second time.
pub trait OnParse {
    /// A message replacing the value of `attr` on `element`.
    fn on_attribute_message(&mut self, _message: &Message, _element: &Element, _attr: &str) {}

    /// A message replacing the content of `element`.
    fn on_node_message(&mut self, _message: &Message, _element: &Element) {}
}

/// Callbacks that ignore everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOnParse;

impl OnParse for NoopOnParse {}

#[derive(Debug, Default)]
pub struct ExtractionResult {
    /// Messages by id, in discovery order.
    pub messages: IndexMap<String, Message>,
    /// Errors of skipped messages. Always empty under [`ErrorPolicy::Abort`].
    pub errors: Vec<I18nError>,
}

/// Extract translatable messages from a markup tree.
pub fn extract_messages(nodes: &[Node], config: &ExtractorConfig) -> Result<ExtractionResult> {
    extract_messages_with(nodes, config, &mut NoopOnParse)
}

/// Like [`extract_messages`], reporting each message to `on_parse`.
pub fn extract_messages_with(
    nodes: &[Node],
    config: &ExtractorConfig,
    on_parse: &mut dyn OnParse,
) -> Result<ExtractionResult> {
    let mut extractor = Extractor {
        config,
        on_parse,
        result: ExtractionResult::default(),
    };
    extractor.walk(nodes)?;
    tracing::debug!(
        messages = extractor.result.messages.len(),
        errors = extractor.result.errors.len(),
        "extracted messages"
    );
    Ok(extractor.result)
}

struct Extractor<'a> {
    config: &'a ExtractorConfig,
    on_parse: &'a mut dyn OnParse,
    result: ExtractionResult,
}

impl<'a> Extractor<'a> {
    fn walk(&mut self, nodes: &[Node]) -> Result<()> {
        let mut queue: VecDeque<&Element> = nodes.iter().filter_map(Node::as_element).collect();
        while let Some(el) = queue.pop_front() {
            self.visit_attributes(el)?;
            if el.has_attr(&self.config.node_marker) {
                self.visit_node_message(el)?;
            } else {
                queue.extend(el.child_elements());
            }
        }
        Ok(())
    }

    fn visit_attributes(&mut self, el: &Element) -> Result<()> {
        for attr in &el.attrs {
            let Some(target) = self.config.marked_attribute(&attr.name) else {
                continue;
            };
            let comment = attr.value.as_deref().unwrap_or("");
            let built = match el.attr_value(target) {
                Some(value) => build_text_message(
                    self.config,
                    comment,
                    value,
                    EscapingContext::AttributeValue,
                ),
                None => Err(LintError::MissingMarkedAttribute {
                    attr: target.to_string(),
                }
                .into()),
            };
            let Some(message) = self.check(built, el)? else {
                continue;
            };
            self.on_parse.on_attribute_message(&message, el, target);
            self.record(message);
        }
        Ok(())
    }

    fn visit_node_message(&mut self, el: &Element) -> Result<()> {
        let comment = el.attr_value(&self.config.node_marker).unwrap_or("");
        let built = MessageBuilder::from_element(self.config, comment, el).and_then(|b| b.build());
        let Some(message) = self.check(built, el)? else {
            return Ok(());
        };
        self.on_parse.on_node_message(&message, el);

        let embedded = message.embedded_messages().to_vec();
        self.record(message);

        let descendants = descendant_elements(el);
        for sub in embedded {
            if let Some((key, attr)) = sub.embedded_in() {
                if let Some(holder) = element_for_key(&descendants, key) {
                    self.on_parse.on_attribute_message(&sub, holder, attr);
                }
            }
            self.record(sub);
        }
        Ok(())
    }

    /// Apply the error policy to one built message.
    fn check(&mut self, built: Result<Message>, el: &Element) -> Result<Option<Message>> {
        match built {
            Ok(message) => Ok(Some(message)),
            Err(err) => match self.config.error_policy {
                ErrorPolicy::Abort => Err(err),
                ErrorPolicy::Skip => {
                    tracing::warn!(
                        element = %el.name,
                        location = %el.start_source_span.start,
                        "skipping message: {}",
                        err
                    );
                    self.result.errors.push(err);
                    Ok(None)
                }
            },
        }
    }

    fn record(&mut self, message: Message) {
        let id = message.id().to_string();
        if self.result.messages.contains_key(&id) {
            tracing::debug!(id = %id, "duplicate message id, replacing earlier message");
        }
        self.result.messages.insert(id, message);
    }
}

/// Elements strictly inside `el`, in document order. Tag pairs of a message
/// built from `el` are numbered in this same order.
pub fn descendant_elements(el: &Element) -> Vec<&Element> {
    fn visit<'e>(el: &'e Element, out: &mut Vec<&'e Element>) {
        for child in el.child_elements() {
            out.push(child);
            visit(child, out);
        }
    }
    let mut out = Vec::new();
    visit(el, &mut out);
    out
}

fn element_for_key<'e>(descendants: &[&'e Element], key: &CanonicalKey) -> Option<&'e Element> {
    match key {
        CanonicalKey::Tag { seq, .. } => descendants.get(seq.checked_sub(1)?).copied(),
        CanonicalKey::Placeholder { .. } => None,
    }
}

/// Re-serialize `nodes` with every marked message replaced by its translation.
/// Marker attributes are dropped from the output.
pub fn merge_translations(
    nodes: &[Node],
    bundle: &TranslationBundle,
    config: &ExtractorConfig,
) -> Result<String> {
    let merger = Merger { config, bundle };
    let mut out = String::new();
    for node in nodes {
        merger.write_node(&mut out, node, false)?;
    }
    Ok(out)
}

/// The source message of an element-level marker, with lookups from its
/// tag pairs back to the elements they came from.
struct ContentScope<'m> {
    source: &'m Message,
    tags: HashMap<&'m str, &'m TagPair>,
    descendants: Vec<&'m Element>,
}

impl<'m> ContentScope<'m> {
    fn new(source: &'m Message, el: &'m Element) -> Self {
        fn collect<'p>(parts: &'p [Part], tags: &mut HashMap<&'p str, &'p TagPair>) {
            for part in parts {
                if let Part::TagPair(tag_pair) = part {
                    tags.insert(tag_pair.begin_placeholder.name.as_str(), tag_pair);
                    collect(&tag_pair.parts, tags);
                }
            }
        }
        let mut tags = HashMap::new();
        collect(source.parts(), &mut tags);
        ContentScope {
            source,
            tags,
            descendants: descendant_elements(el),
        }
    }
}

struct Merger<'a> {
    config: &'a ExtractorConfig,
    bundle: &'a TranslationBundle,
}

impl<'a> Merger<'a> {
    fn write_node(&self, out: &mut String, node: &Node, verbatim: bool) -> Result<()> {
        match node {
            Node::Element(el) => self.write_element(out, el),
            other => {
                write_node(out, other, verbatim);
                Ok(())
            }
        }
    }

    fn write_element(&self, out: &mut String, el: &Element) -> Result<()> {
        let attrs = self.translate_attrs(el, None)?;
        out.push_str(&start_tag(&el.name, &attrs));

        if el.has_attr(&self.config.node_marker) {
            match self.translate_content(el) {
                Ok(content) => out.push_str(&content),
                Err(err) => {
                    self.recover(err, el)?;
                    self.write_children(out, el)?;
                }
            }
        } else {
            self.write_children(out, el)?;
        }

        if !el.is_void {
            out.push_str(&end_tag(&el.name));
        }
        Ok(())
    }

    fn write_children(&self, out: &mut String, el: &Element) -> Result<()> {
        let verbatim = is_verbatim_text_element(&el.name);
        for child in &el.children {
            self.write_node(out, child, verbatim)?;
        }
        Ok(())
    }

    fn recover(&self, err: I18nError, el: &Element) -> Result<()> {
        match self.config.error_policy {
            ErrorPolicy::Abort => Err(err),
            ErrorPolicy::Skip => {
                tracing::warn!(
                    element = %el.name,
                    location = %el.start_source_span.start,
                    "keeping source text: {}",
                    err
                );
                Ok(())
            }
        }
    }

    /// Attributes of `el` with markers removed and marked values translated.
    /// Inside an element-level message, `embedded` names the outer message and
    /// the tag pair of `el`, whose embedded messages are used as sources.
    fn translate_attrs(
        &self,
        el: &Element,
        embedded: Option<(&Message, &CanonicalKey)>,
    ) -> Result<Vec<Attribute>> {
        let mut attrs = Vec::with_capacity(el.attrs.len());
        for attr in &el.attrs {
            if is_marker_attribute(&attr.name, self.config) {
                continue;
            }
            let marker = format!("{}{}", self.config.attribute_marker_prefix, attr.name);
            let Some(comment) = el.attr(&marker) else {
                attrs.push(attr.clone());
                continue;
            };
            let comment = comment.value.as_deref().unwrap_or("");
            let value = attr.value.as_deref().unwrap_or("");
            let translated = match self.translate_attr_value(&attr.name, comment, value, embedded) {
                Ok(translated) => translated,
                Err(err) => {
                    self.recover(err, el)?;
                    value.to_string()
                }
            };
            attrs.push(Attribute {
                value: Some(translated),
                ..attr.clone()
            });
        }
        Ok(attrs)
    }

    fn translate_attr_value(
        &self,
        attr: &str,
        comment: &str,
        value: &str,
        embedded: Option<(&Message, &CanonicalKey)>,
    ) -> Result<String> {
        let source = match embedded {
            None => build_text_message(self.config, comment, value, EscapingContext::AttributeValue)?,
            Some((outer, key)) => outer
                .embedded_messages()
                .iter()
                .find(|message| message.embedded_in() == Some((key, attr)))
                .cloned()
                .ok_or_else(|| {
                    I18nError::Internal(format!(
                        "no embedded message for attribute `{}` of {}",
                        attr, key
                    ))
                })?,
        };
        let parts = self.bundle.translate(&source)?;
        let mut out = String::new();
        // Attribute serialization escapes the value.
        self.render_parts(&source, parts, EscapingContext::Raw, None, &mut out)?;
        Ok(out)
    }

    fn translate_content(&self, el: &Element) -> Result<String> {
        let comment = el.attr_value(&self.config.node_marker).unwrap_or("");
        let source = MessageBuilder::from_element(self.config, comment, el)?.build()?;
        let parts = self.bundle.translate(&source)?;
        let scope = ContentScope::new(&source, el);
        let mut out = String::new();
        self.render_parts(&source, parts, EscapingContext::Html, Some(&scope), &mut out)?;
        Ok(out)
    }

    /// Render translated parts. Placeholders and tag markup always come from
    /// the source message so a translation can only move them around.
    fn render_parts(
        &self,
        source: &Message,
        parts: &[Part],
        context: EscapingContext,
        scope: Option<&ContentScope<'_>>,
        out: &mut String,
    ) -> Result<()> {
        for part in parts {
            match part {
                Part::Text(text) => out.push_str(&escape(text, context)),
                Part::Placeholder(ph) => {
                    let source_ph = source.placeholder(&ph.name).unwrap_or(ph);
                    out.push_str(&escape(&source_ph.source_text(), context));
                }
                Part::TagPair(tag_pair) => {
                    let name = tag_pair.begin_placeholder.name.as_str();
                    let (source_tag, holder) = scope
                        .and_then(|scope| {
                            let source_tag = *scope.tags.get(name)?;
                            let holder =
                                element_for_key(&scope.descendants, &source_tag.canonical_key)?;
                            Some((source_tag, holder))
                        })
                        .ok_or_else(|| {
                            I18nError::Internal(format!("no source element for tag pair `{}`", name))
                        })?;
                    let outer = scope.map(|scope| scope.source).unwrap_or(source);
                    let attrs =
                        self.translate_attrs(holder, Some((outer, &source_tag.canonical_key)))?;
                    out.push_str(&start_tag(&holder.name, &attrs));
                    self.render_parts(source, &tag_pair.parts, context, scope, out)?;
                    out.push_str(&source_tag.end);
                }
            }
        }
        Ok(())
    }
}
