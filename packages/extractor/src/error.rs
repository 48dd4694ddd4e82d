//! Errors raised while building and merging messages.

use crate::parse_util::ParseError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, I18nError>;

/// Author-facing problems. Only fixing the input makes them go away.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LintError {
    #[error("meaning was explicitly specified but is empty")]
    EmptyMeaning,

    #[error("expression has a comment but it wasn't valid {directive}() syntax: `{comment}`")]
    MalformedPlaceholderComment { directive: String, comment: String },

    #[error("invalid placeholder name: `{name}`: {reason}")]
    InvalidPlaceholderName { name: String, reason: &'static str },

    #[error("the expression `{text}` occurs more than once with different placeholder names `{first}` and `{second}`")]
    ConflictingPlaceholderNames {
        text: String,
        first: String,
        second: String,
    },

    #[error("placeholder name `{name}` is used by both {first} and {second}")]
    DuplicatePlaceholderName {
        name: String,
        first: String,
        second: String,
    },

    #[error("attribute `{attr}` is marked for translation but missing")]
    MissingMarkedAttribute { attr: String },
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum I18nError {
    #[error(transparent)]
    Lint(#[from] LintError),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("malformed markup: {0}")]
    Markup(#[from] ParseError),

    #[error("markup nesting exceeds the limit of {limit} levels")]
    NestingTooDeep { limit: usize },

    #[error("no translation for message {id}")]
    MissingTranslation { id: String },

    #[error("translation for message {id} is incompatible with the source: {reason}")]
    IncompatibleTranslation { id: String, reason: String },
}

impl I18nError {
    pub fn is_lint(&self) -> bool {
        matches!(self, I18nError::Lint(_))
    }
}
