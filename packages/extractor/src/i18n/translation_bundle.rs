//! Translation Bundle Module
//!
//! A container for translated messages, keyed by the id of the source message.

use crate::error::{I18nError, Result};
use crate::i18n::i18n_ast::{Message, Part};
use indexmap::IndexMap;
use serde::Deserialize;

/// What to do when a source message has no translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingTranslationStrategy {
    Error,
    /// Keep the source text and log a warning.
    #[default]
    Warning,
    /// Keep the source text silently.
    Ignore,
}

#[derive(Debug, Clone, Default)]
pub struct TranslationBundle {
    translations: IndexMap<String, Message>,
    missing_translation_strategy: MissingTranslationStrategy,
    locale: Option<String>,
}

impl TranslationBundle {
    pub fn new(missing_translation_strategy: MissingTranslationStrategy) -> Self {
        TranslationBundle {
            translations: IndexMap::new(),
            missing_translation_strategy,
            locale: None,
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    /// Add a translation under its own id, along with its embedded messages.
    pub fn add(&mut self, translation: Message) {
        for embedded in translation.embedded_messages() {
            self.add(embedded.clone());
        }
        self.insert(translation.id().to_string(), translation);
    }

    /// Add a translation for the source message `id`.
    pub fn insert(&mut self, id: impl Into<String>, translation: Message) {
        self.translations.insert(id.into(), translation);
    }

    pub fn has(&self, id: &str) -> bool {
        self.translations.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Message> {
        self.translations.get(id)
    }

    pub fn len(&self) -> usize {
        self.translations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.translations.is_empty()
    }

    /// The translated parts for `source`. Falls back to the source parts when
    /// no translation exists, unless the strategy is [`MissingTranslationStrategy::Error`].
    pub fn translate<'a>(&'a self, source: &'a Message) -> Result<&'a [Part]> {
        let Some(translation) = self.translations.get(source.id()) else {
            let locale = self
                .locale
                .as_ref()
                .map(|locale| format!(" for locale \"{}\"", locale))
                .unwrap_or_default();
            match self.missing_translation_strategy {
                MissingTranslationStrategy::Error => {
                    return Err(I18nError::MissingTranslation {
                        id: source.id().to_string(),
                    });
                }
                MissingTranslationStrategy::Warning => {
                    tracing::warn!(id = source.id(), "missing translation{}", locale);
                }
                MissingTranslationStrategy::Ignore => {}
            }
            return Ok(source.parts());
        };
        check_compatible(source, translation.parts())?;
        Ok(translation.parts())
    }
}

/// Every placeholder a translation refers to must exist in the source with
/// the same kind.
fn check_compatible(source: &Message, parts: &[Part]) -> Result<()> {
    let incompatible = |reason: String| I18nError::IncompatibleTranslation {
        id: source.id().to_string(),
        reason,
    };
    for part in parts {
        let referenced = match part {
            Part::Text(_) => continue,
            Part::Placeholder(ph) => vec![ph],
            Part::TagPair(tag_pair) => vec![&tag_pair.begin_placeholder, &tag_pair.end_placeholder],
        };
        for ph in referenced {
            match source.placeholder(&ph.name) {
                None => return Err(incompatible(format!("unknown placeholder `{}`", ph.name))),
                Some(known) if known.kind != ph.kind => {
                    return Err(incompatible(format!(
                        "placeholder `{}` is a {} in the source",
                        ph.name,
                        known.kind.stable_type_name()
                    )));
                }
                Some(_) => {}
            }
        }
        if let Part::TagPair(tag_pair) = part {
            check_compatible(source, &tag_pair.parts)?;
        }
    }
    Ok(())
}
