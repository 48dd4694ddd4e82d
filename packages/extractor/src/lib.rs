#![deny(clippy::all)]

//! Localization message extraction.
//!
//! Finds marked text in HTML-like markup, turns each marked span into a
//! [`Message`] with named placeholders and a content-derived id, and merges
//! translations back into the markup.

pub mod config;
pub mod error;
pub mod i18n;
pub mod ml_parser;
pub mod parse_util;

// Re-exports
pub use config::{ErrorPolicy, ExtractorConfig, HtmlWhitespace};
pub use error::{I18nError, LintError, Result};
pub use i18n::{
    extract_messages, merge_translations, pseudo_translate, EscapingContext, Message,
    MessageBuilder, Part, Placeholder, PlaceholderKind, TagPair, TranslationBundle,
};
pub use ml_parser::parse_document;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
