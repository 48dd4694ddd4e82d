//! Placeholder Registry
//!
//! Interns the placeholders and tag pairs of one message (and its embedded
//! sub-messages) and gives each a name that is unique across all of them.
//! Naming is deferred until the whole message is parsed so that
//! auto-generated names never collide with explicit names seen later, and so
//! that tags are numbered in document order rather than in the order their
//! subtrees finish parsing.

use crate::error::{I18nError, LintError, Result};
use crate::i18n::i18n_ast::{Examples, Part, Placeholder, PlaceholderKind, TagPair};
use indexmap::IndexMap;
use smallvec::smallvec;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Name reserved for grouping the embedded messages of a message.
pub const RESERVED_PLACEHOLDER_NAME: &str = "EMBEDDED_MESSAGES";

/// Deduplication key of a registry entry. Distinct from the final name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CanonicalKey {
    /// Reservation for a tag pair, unique per occurrence.
    Tag { tag: String, seq: usize },
    /// Simple placeholders dedupe on kind and source text.
    Placeholder { kind: PlaceholderKind, text: String },
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalKey::Tag { tag, seq } => write!(f, "TAG_{}_{}", tag, seq),
            CanonicalKey::Placeholder { kind, text } => {
                write!(f, "{}({})", kind.stable_type_name(), text)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaceholderId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagPairId(usize);

/// A message part while the message is still being parsed. Placeholders and
/// tag pairs live in the registry until names are final.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftPart {
    Text(String),
    Placeholder(PlaceholderId),
    TagPair(TagPairId),
}

/// A simple (non tag) placeholder offered to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderCandidate {
    pub kind: PlaceholderKind,
    /// Explicit, already validated name. `None` asks the registry to pick one.
    pub name: Option<String>,
    pub text: String,
    pub examples: Examples,
    pub comment: Option<String>,
}

impl PlaceholderCandidate {
    pub fn new(kind: PlaceholderKind, text: impl Into<String>) -> Self {
        PlaceholderCandidate {
            kind,
            name: None,
            text: text.into(),
            examples: Examples::new(),
            comment: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.examples.push(example.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// A tag pair whose children have been parsed, ready to fill its reserved slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPairCandidate {
    pub tag: String,
    pub begin: String,
    pub end: String,
    pub parts: Vec<DraftPart>,
    pub canonical_key: CanonicalKey,
}

#[derive(Debug, Clone)]
struct TagPairEntry {
    candidate: TagPairCandidate,
    begin_name: Option<String>,
    end_name: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    /// A tag was seen but its children are still being parsed.
    Reserved,
    Placeholder(PlaceholderId),
    TagPair(TagPairId),
}

/// Registry scoped to one outer message. Create one per marker and drop it
/// once the message is built.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderRegistry {
    by_canonical: IndexMap<CanonicalKey, Slot>,
    placeholders: Vec<PlaceholderCandidate>,
    tag_pairs: Vec<TagPairEntry>,
    // Explicit names claimed so far, and which entry claimed them.
    explicit_names: HashMap<String, CanonicalKey>,
    names_seen: HashSet<String>,
    counts_by_prefix: HashMap<String, usize>,
    tag_counter: usize,
    finalized: bool,
}

impl PlaceholderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Note a tag at its position in the document before its children are
    /// parsed. The returned key must later be passed to [`Self::intern_tag_pair`].
    pub fn reserve_tag_slot(&mut self, tag: &str) -> CanonicalKey {
        self.tag_counter += 1;
        let key = CanonicalKey::Tag {
            tag: tag.to_string(),
            seq: self.tag_counter,
        };
        tracing::trace!(key = %key, "reserved tag slot");
        self.by_canonical.insert(key.clone(), Slot::Reserved);
        key
    }

    /// Register a simple placeholder, merging it with an existing entry of the
    /// same kind and text. Returns the handle of the entry that represents it.
    pub fn intern_simple_placeholder(
        &mut self,
        candidate: PlaceholderCandidate,
    ) -> Result<PlaceholderId> {
        if candidate.kind.is_tag_anchor() {
            return Err(I18nError::Internal(format!(
                "tag anchor `{}` cannot be interned as a simple placeholder",
                candidate.text
            )));
        }
        let key = CanonicalKey::Placeholder {
            kind: candidate.kind,
            text: candidate.text.clone(),
        };

        match self.by_canonical.get(&key).copied() {
            Some(Slot::Placeholder(id)) => {
                let existing_name = self.placeholders[id.0].name.clone();
                match (existing_name, candidate.name) {
                    (Some(first), Some(second)) if first != second => {
                        return Err(LintError::ConflictingPlaceholderNames {
                            text: candidate.text,
                            first,
                            second,
                        }
                        .into());
                    }
                    (None, Some(name)) => {
                        self.claim_explicit_name(&name, &key)?;
                        self.placeholders[id.0].name = Some(name);
                    }
                    _ => {}
                }
                let existing = &mut self.placeholders[id.0];
                for example in candidate.examples {
                    if !existing.examples.contains(&example) {
                        existing.examples.push(example);
                    }
                }
                if existing.comment.is_none() {
                    existing.comment = candidate.comment;
                }
                Ok(id)
            }
            Some(_) => Err(I18nError::Internal(format!(
                "canonical key {} does not hold a placeholder",
                key
            ))),
            None => {
                if let Some(name) = &candidate.name {
                    self.claim_explicit_name(name, &key)?;
                }
                let id = PlaceholderId(self.placeholders.len());
                self.placeholders.push(candidate);
                self.by_canonical.insert(key, Slot::Placeholder(id));
                Ok(id)
            }
        }
    }

    /// Fill the slot reserved for this tag pair. Tag pairs are never deduplicated.
    pub fn intern_tag_pair(&mut self, candidate: TagPairCandidate) -> Result<TagPairId> {
        let key = candidate.canonical_key.clone();
        match self.by_canonical.get(&key) {
            Some(Slot::Reserved) => {}
            Some(_) => {
                return Err(I18nError::Internal(format!("tag slot {} filled twice", key)));
            }
            None => {
                return Err(I18nError::Internal(format!("tag slot {} was never reserved", key)));
            }
        }
        let id = TagPairId(self.tag_pairs.len());
        self.tag_pairs.push(TagPairEntry {
            candidate,
            begin_name: None,
            end_name: None,
        });
        // Overwriting keeps the reservation's position.
        self.by_canonical.insert(key, Slot::TagPair(id));
        Ok(id)
    }

    fn claim_explicit_name(&mut self, name: &str, key: &CanonicalKey) -> Result<()> {
        match self.explicit_names.get(name) {
            Some(owner) if owner != key => Err(LintError::DuplicatePlaceholderName {
                name: name.to_string(),
                first: owner.to_string(),
                second: key.to_string(),
            }
            .into()),
            Some(_) => Ok(()),
            None => {
                self.explicit_names.insert(name.to_string(), key.clone());
                self.names_seen.insert(name.to_string());
                Ok(())
            }
        }
    }

    /// Assign a name to every entry still lacking one, in insertion order,
    /// and return every placeholder (tag anchors included) keyed by name.
    pub fn finalize_names(&mut self) -> Result<IndexMap<String, Placeholder>> {
        if !self.finalized {
            let slots: Vec<Slot> = self.by_canonical.values().copied().collect();
            for slot in slots {
                match slot {
                    Slot::Placeholder(id) => self.ensure_placeholder_name(id),
                    Slot::TagPair(id) => self.ensure_tag_pair_names(id),
                    Slot::Reserved => {
                        return Err(I18nError::Internal(
                            "a reserved tag slot was never filled".to_string(),
                        ));
                    }
                }
            }
            self.finalized = true;
        }

        let mut result = IndexMap::new();
        for slot in self.by_canonical.values() {
            match *slot {
                Slot::Placeholder(id) => {
                    let ph = self.placeholder(id)?;
                    result.insert(ph.name.clone(), ph);
                }
                Slot::TagPair(id) => {
                    let (begin, end) = self.tag_anchors(id)?;
                    result.insert(begin.name.clone(), begin);
                    result.insert(end.name.clone(), end);
                }
                Slot::Reserved => {
                    return Err(I18nError::Internal(
                        "a reserved tag slot was never filled".to_string(),
                    ));
                }
            }
        }
        Ok(result)
    }

    /// Convert draft parts into final parts. Names must be final.
    pub fn resolve_parts(&self, parts: &[DraftPart]) -> Result<Vec<Part>> {
        parts
            .iter()
            .map(|part| {
                Ok(match part {
                    DraftPart::Text(text) => Part::Text(text.clone()),
                    DraftPart::Placeholder(id) => Part::Placeholder(self.placeholder(*id)?),
                    DraftPart::TagPair(id) => Part::TagPair(self.tag_pair(*id)?),
                })
            })
            .collect()
    }

    fn placeholder(&self, id: PlaceholderId) -> Result<Placeholder> {
        let candidate = self
            .placeholders
            .get(id.0)
            .ok_or_else(|| I18nError::Internal(format!("unknown placeholder {:?}", id)))?;
        let name = candidate.name.clone().ok_or_else(|| {
            I18nError::Internal(format!("placeholder `{}` has no name", candidate.text))
        })?;
        Ok(Placeholder {
            kind: candidate.kind,
            name,
            text: candidate.text.clone(),
            examples: candidate.examples.clone(),
            comment: candidate.comment.clone(),
        })
    }

    fn tag_entry(&self, id: TagPairId) -> Result<&TagPairEntry> {
        self.tag_pairs
            .get(id.0)
            .ok_or_else(|| I18nError::Internal(format!("unknown tag pair {:?}", id)))
    }

    fn tag_anchors(&self, id: TagPairId) -> Result<(Placeholder, Placeholder)> {
        let entry = self.tag_entry(id)?;
        let tag = &entry.candidate.tag;
        let (Some(begin_name), Some(end_name)) = (&entry.begin_name, &entry.end_name) else {
            return Err(I18nError::Internal(format!("tag pair <{}> has no names", tag)));
        };
        let begin = Placeholder {
            kind: PlaceholderKind::TagBegin,
            name: begin_name.clone(),
            text: entry.candidate.begin.clone(),
            examples: smallvec![entry.candidate.begin.clone()],
            comment: Some(format!("Begin HTML <{}> tag", tag)),
        };
        let end = Placeholder {
            kind: PlaceholderKind::TagEnd,
            name: end_name.clone(),
            text: entry.candidate.end.clone(),
            examples: smallvec![entry.candidate.end.clone()],
            comment: Some(format!("End HTML </{}> tag", tag)),
        };
        Ok((begin, end))
    }

    fn tag_pair(&self, id: TagPairId) -> Result<TagPair> {
        let (begin_placeholder, end_placeholder) = self.tag_anchors(id)?;
        let entry = self.tag_entry(id)?;
        Ok(TagPair {
            tag: entry.candidate.tag.clone(),
            begin: entry.candidate.begin.clone(),
            end: entry.candidate.end.clone(),
            parts: self.resolve_parts(&entry.candidate.parts)?,
            canonical_key: entry.candidate.canonical_key.clone(),
            begin_placeholder,
            end_placeholder,
        })
    }

    fn ensure_placeholder_name(&mut self, id: PlaceholderId) {
        if self.placeholders[id.0].name.is_some() {
            return;
        }
        let base = name_hint_for_kind(self.placeholders[id.0].kind);
        let mut name = base.to_string();
        while self.names_seen.contains(&name) {
            name = format!("{}_{}", base, self.next_count(base));
        }
        tracing::trace!(name = %name, text = %self.placeholders[id.0].text, "named placeholder");
        self.names_seen.insert(name.clone());
        self.placeholders[id.0].name = Some(name);
    }

    fn ensure_tag_pair_names(&mut self, id: TagPairId) {
        if self.tag_pairs[id.0].begin_name.is_some() {
            return;
        }
        let hint = name_hint_for_tag(&self.tag_pairs[id.0].candidate.tag);
        let begin_base = format!("{}_BEGIN", hint);
        let end_base = format!("{}_END", hint);
        let mut begin_name = begin_base.clone();
        let mut end_name = end_base.clone();
        while self.names_seen.contains(&begin_name) || self.names_seen.contains(&end_name) {
            let count = self.next_count(&begin_base);
            begin_name = format!("{}_{}", begin_base, count);
            end_name = format!("{}_{}", end_base, count);
        }
        tracing::trace!(begin = %begin_name, end = %end_name, "named tag pair");
        self.names_seen.insert(begin_name.clone());
        self.names_seen.insert(end_name.clone());
        let entry = &mut self.tag_pairs[id.0];
        entry.begin_name = Some(begin_name);
        entry.end_name = Some(end_name);
    }

    fn next_count(&mut self, prefix: &str) -> usize {
        let count = self.counts_by_prefix.entry(prefix.to_string()).or_insert(0);
        *count += 1;
        *count
    }
}

fn name_hint_for_kind(kind: PlaceholderKind) -> &'static str {
    match kind {
        PlaceholderKind::Expression => "EXPRESSION",
        PlaceholderKind::Generic | PlaceholderKind::TagBegin | PlaceholderKind::TagEnd => "PH",
    }
}

/// Base name for a tag's anchors. The alias table is part of every message
/// id: entries may never be changed or removed.
fn name_hint_for_tag(tag: &str) -> String {
    let upper: String = tag
        .to_uppercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    let upper = upper.trim_matches('_');
    match upper {
        "" => "TAG".to_string(),
        "A" => "LINK".to_string(),
        other => other.to_string(),
    }
}

/// Check a name supplied by an author rather than synthesized.
pub fn validate_placeholder_name(name: &str) -> std::result::Result<(), LintError> {
    let invalid = |reason| LintError::InvalidPlaceholderName {
        name: name.to_string(),
        reason,
    };
    if name.is_empty() {
        return Err(invalid("empty name"));
    }
    if name.starts_with('_') || name.ends_with('_') {
        return Err(invalid("can't begin or end with an underscore"));
    }
    let stripped: String = name.chars().filter(|&c| c != '_').collect();
    if !stripped.chars().all(|c| c.is_alphanumeric() && !c.is_lowercase()) {
        return Err(invalid(
            "it may only be composed of capital letters, digits and underscores",
        ));
    }
    if name == RESERVED_PLACEHOLDER_NAME {
        return Err(invalid("this name is reserved"));
    }
    Ok(())
}
