//! I18n Module
//!
//! Message extraction: the message model, the builder, fingerprinting, the
//! document walker and translation merge.

pub mod digest;
pub mod escaping;
pub mod extractor_merger;
pub mod i18n_ast;
pub mod i18n_parser;
pub mod pseudo_translation;
pub mod serializers;
pub mod translation_bundle;

// Re-export commonly used items
pub use digest::{compute_message_id, digest, DigestOptions};
pub use escaping::EscapingContext;
pub use extractor_merger::{
    extract_messages, extract_messages_with, merge_translations, ExtractionResult, NoopOnParse,
    OnParse,
};
pub use i18n_ast::{Message, Part, Placeholder, PlaceholderKind, TagPair};
pub use i18n_parser::MessageBuilder;
pub use pseudo_translation::pseudo_translate;
pub use translation_bundle::{MissingTranslationStrategy, TranslationBundle};
