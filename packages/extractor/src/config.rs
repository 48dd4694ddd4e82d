//! Extractor Config
//!
//! Marker conventions and limits shared by the builder and the walker.

use crate::ml_parser::parser::DEFAULT_MAX_DOCUMENT_DEPTH;
use serde::Deserialize;

/// What the walker does when one message fails to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Fail the whole document pass.
    #[default]
    Abort,
    /// Record the error, log it and move on to the next marker.
    Skip,
}

/// How text in the HTML escaping context contributes to message ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HtmlWhitespace {
    /// Runs of whitespace fingerprint as a single space.
    #[default]
    Collapse,
    Preserve,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractorConfig {
    /// Element-level marker attribute, e.g. `<p i18n="meaning|comment">`.
    pub node_marker: String,
    /// Attribute-level marker prefix, e.g. `i18n-title` marks `title`.
    pub attribute_marker_prefix: String,
    /// Directive recognised in trailing expression comments: `{{x // i18n-ph(NAME|example)}}`.
    pub placeholder_directive: String,
    /// Maximum element nesting inside a single message.
    pub max_depth: usize,
    /// Maximum element nesting of a whole document.
    pub max_document_depth: usize,
    pub error_policy: ErrorPolicy,
    pub html_whitespace: HtmlWhitespace,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        ExtractorConfig {
            node_marker: "i18n".to_string(),
            attribute_marker_prefix: "i18n-".to_string(),
            placeholder_directive: "i18n-ph".to_string(),
            max_depth: 128,
            max_document_depth: DEFAULT_MAX_DOCUMENT_DEPTH,
            error_policy: ErrorPolicy::Abort,
            html_whitespace: HtmlWhitespace::Collapse,
        }
    }
}

impl ExtractorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node_marker(mut self, marker: impl Into<String>) -> Self {
        self.node_marker = marker.into();
        self
    }

    pub fn with_attribute_marker_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.attribute_marker_prefix = prefix.into();
        self
    }

    pub fn with_placeholder_directive(mut self, directive: impl Into<String>) -> Self {
        self.placeholder_directive = directive.into();
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_document_depth(mut self, max_document_depth: usize) -> Self {
        self.max_document_depth = max_document_depth;
        self
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    pub fn with_html_whitespace(mut self, mode: HtmlWhitespace) -> Self {
        self.html_whitespace = mode;
        self
    }

    /// Name of the attribute translated by an attribute-level marker, if `attr` is one.
    pub fn marked_attribute<'a>(&self, attr: &'a str) -> Option<&'a str> {
        attr.strip_prefix(self.attribute_marker_prefix.as_str())
            .filter(|target| !target.is_empty())
    }
}
