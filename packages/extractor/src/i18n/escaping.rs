//! Escaping Contexts
//!
//! A message can appear as plain text, as HTML text or inside an attribute
//! value. The context decides how it is escaped when substituted back into a
//! document; it never changes which message it is. `1,"2",3` as element text
//! and `title="1,&quot;2&quot;,3"` with `i18n-title` are the same message.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EscapingContext {
    /// No escaping.
    Raw,
    /// Element content: structural escaping only, whitespace is insignificant.
    Html,
    /// Attribute value: structural escaping plus double quotes.
    AttributeValue,
}

impl EscapingContext {
    pub fn is_whitespace_insensitive(self) -> bool {
        matches!(self, EscapingContext::Html)
    }
}

pub fn escape(text: &str, context: EscapingContext) -> String {
    match context {
        EscapingContext::Raw => text.to_string(),
        EscapingContext::Html => escape_html(text, false),
        EscapingContext::AttributeValue => escape_html(text, true),
    }
}

fn escape_html(text: &str, quote: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quote => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Serialize one attribute in canonical form. Double quotes are preferred;
/// single quotes are used only when the value holds a double quote and no
/// single quote. A value holding both kinds gets its double quotes escaped.
pub fn serialize_attribute(name: &str, value: Option<&str>) -> String {
    let Some(value) = value else {
        return name.to_string();
    };
    let has_squote = value.contains('\'');
    let has_dquote = value.contains('"');
    let quote = if !has_squote && has_dquote { '\'' } else { '"' };
    let escaped = escape_html(value, has_squote && has_dquote);
    format!("{name}={quote}{escaped}{quote}")
}

/// Collapse every run of whitespace to a single space.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() && ch != '\u{00A0}' {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}
