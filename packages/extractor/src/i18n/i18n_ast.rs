//! I18n AST Module
//!
//! The content tree of one built message: literal text, named placeholders
//! and tag pairs that nest further parts.

use crate::i18n::escaping::{escape, EscapingContext};
use crate::i18n::serializers::placeholder::CanonicalKey;
use indexmap::IndexMap;
use smallvec::SmallVec;

/// Sample renderings of a placeholder. Almost always zero or one.
pub type Examples = SmallVec<[String; 1]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PlaceholderKind {
    /// An embedded `{{ expression }}`.
    Expression,
    /// A placeholder with no more specific kind.
    Generic,
    /// Begin anchor of a tag pair.
    TagBegin,
    /// End anchor of a tag pair.
    TagEnd,
}

impl PlaceholderKind {
    /// Type name written into message fingerprints. These strings are part of
    /// every message id and must never change.
    pub fn stable_type_name(self) -> &'static str {
        match self {
            PlaceholderKind::Expression => "Expression",
            PlaceholderKind::Generic => "Placeholder",
            PlaceholderKind::TagBegin => "TagPairBegin",
            PlaceholderKind::TagEnd => "TagPairEnd",
        }
    }

    pub fn is_tag_anchor(self) -> bool {
        matches!(self, PlaceholderKind::TagBegin | PlaceholderKind::TagEnd)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub kind: PlaceholderKind,
    pub name: String,
    /// Source expression or markup this placeholder stands in for.
    pub text: String,
    pub examples: Examples,
    pub comment: Option<String>,
}

impl Placeholder {
    /// The source form of this placeholder.
    pub fn source_text(&self) -> String {
        match self.kind {
            PlaceholderKind::Expression => format!("{{{{{}}}}}", self.text),
            _ => self.text.clone(),
        }
    }
}

/// One markup element spanning a region of a message. Tag pairs are never
/// merged with one another, even when identical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPair {
    pub tag: String,
    pub begin: String,
    pub end: String,
    pub parts: Vec<Part>,
    pub canonical_key: CanonicalKey,
    pub begin_placeholder: Placeholder,
    pub end_placeholder: Placeholder,
}

impl TagPair {
    pub const STABLE_TYPE_NAME: &'static str = "HtmlTagPair";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    Placeholder(Placeholder),
    TagPair(TagPair),
}

/// One localizable unit. Built by
/// [`MessageBuilder`](crate::i18n::i18n_parser::MessageBuilder) and immutable
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    id: String,
    meaning: Option<String>,
    comment: String,
    parts: Vec<Part>,
    placeholders_by_name: IndexMap<String, Placeholder>,
    context: EscapingContext,
    embedded_messages: Vec<Message>,
    embedded_in: Option<(CanonicalKey, String)>,
}

impl Message {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: String,
        meaning: Option<String>,
        comment: String,
        parts: Vec<Part>,
        placeholders_by_name: IndexMap<String, Placeholder>,
        context: EscapingContext,
        embedded_messages: Vec<Message>,
        embedded_in: Option<(CanonicalKey, String)>,
    ) -> Self {
        Message {
            id,
            meaning,
            comment,
            parts,
            placeholders_by_name,
            context,
            embedded_messages,
            embedded_in,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn meaning(&self) -> Option<&str> {
        self.meaning.as_deref()
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn placeholders_by_name(&self) -> &IndexMap<String, Placeholder> {
        &self.placeholders_by_name
    }

    pub fn placeholder(&self, name: &str) -> Option<&Placeholder> {
        self.placeholders_by_name.get(name)
    }

    /// The context this message was extracted from.
    pub fn context(&self) -> EscapingContext {
        self.context
    }

    /// Messages for marked attributes inside this message's content. They
    /// share this message's placeholder namespace.
    pub fn embedded_messages(&self) -> &[Message] {
        &self.embedded_messages
    }

    /// For an embedded message, the tag pair of the element carrying the
    /// marked attribute, and the attribute name.
    pub fn embedded_in(&self) -> Option<(&CanonicalKey, &str)> {
        self.embedded_in
            .as_ref()
            .map(|(key, attr)| (key, attr.as_str()))
    }

    /// A translation of this message: same id, meaning and placeholders, new parts.
    pub fn with_translated_parts(&self, parts: Vec<Part>) -> Message {
        Message {
            parts,
            ..self.clone()
        }
    }

    /// Replace the embedded messages, e.g. with their translations.
    pub fn with_embedded_messages(mut self, embedded_messages: Vec<Message>) -> Message {
        self.embedded_messages = embedded_messages;
        self
    }

    /// Render the parts back to markup escaped for `context`.
    pub fn render(&self, context: EscapingContext) -> String {
        let mut out = String::new();
        render_parts(&self.parts, context, &mut out);
        out
    }
}

fn render_parts(parts: &[Part], context: EscapingContext, out: &mut String) {
    for part in parts {
        match part {
            Part::Text(text) => out.push_str(&escape(text, context)),
            Part::Placeholder(ph) => out.push_str(&escape(&ph.source_text(), context)),
            Part::TagPair(tag_pair) => {
                out.push_str(&tag_pair.begin);
                render_parts(&tag_pair.parts, context, out);
                out.push_str(&tag_pair.end);
            }
        }
    }
}
