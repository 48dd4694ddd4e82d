//! Pseudo-translation
//!
//! Produces a fake translation that is visibly different from the source yet
//! structurally identical, for spotting untranslated strings and layout
//! problems with longer text.

use crate::i18n::i18n_ast::{Message, Part, TagPair};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

const UMLAUT: char = '\u{0308}';

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());

/// `word` becomes `word ẅör̈d̈`.
pub fn pseudo_translate_word(word: &str) -> String {
    let mut out = String::with_capacity(word.len() * 4 + 1);
    out.push_str(word);
    out.push(' ');
    for ch in word.chars() {
        out.push(ch);
        if ('!'..='~').contains(&ch) {
            out.push(UMLAUT);
        }
    }
    out
}

pub fn pseudo_translate_text(text: &str) -> String {
    WORD_RE
        .replace_all(text, |caps: &Captures| pseudo_translate_word(&caps[0]))
        .into_owned()
}

fn pseudo_translate_parts(parts: &[Part]) -> Vec<Part> {
    parts
        .iter()
        .map(|part| match part {
            Part::Text(text) => Part::Text(pseudo_translate_text(text)),
            Part::Placeholder(_) => part.clone(),
            Part::TagPair(tag_pair) => Part::TagPair(TagPair {
                parts: pseudo_translate_parts(&tag_pair.parts),
                ..tag_pair.clone()
            }),
        })
        .collect()
}

/// Pseudo-translate the text of `message` and of its embedded messages. Ids
/// and placeholders are left alone.
pub fn pseudo_translate(message: &Message) -> Message {
    let embedded = message
        .embedded_messages()
        .iter()
        .map(pseudo_translate)
        .collect();
    message
        .with_translated_parts(pseudo_translate_parts(message.parts()))
        .with_embedded_messages(embedded)
}
