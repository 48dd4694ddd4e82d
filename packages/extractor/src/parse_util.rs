//! Parse Utilities
//!
//! Source locations and spans for markup diagnostics.

use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct ParseSourceFile {
    pub content: Arc<str>,
    pub url: String,
}

impl ParseSourceFile {
    pub fn new(content: impl Into<Arc<str>>, url: impl Into<String>) -> Self {
        ParseSourceFile {
            content: content.into(),
            url: url.into(),
        }
    }
}

/// Zero based line and column of a byte offset in a source file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseLocation {
    pub file: ParseSourceFile,
    pub offset: usize,
    pub line: usize,
    pub col: usize,
}

impl ParseLocation {
    pub fn new(file: ParseSourceFile, offset: usize, line: usize, col: usize) -> Self {
        ParseLocation {
            file,
            offset,
            line,
            col,
        }
    }

    /// Return the source around the location, up to `max_chars` on each side
    /// and never crossing more than `max_lines` line breaks.
    pub fn get_context(&self, max_chars: usize, max_lines: usize) -> (String, String) {
        let content = &self.file.content;
        let offset = self.offset.min(content.len());

        let mut start = offset;
        let mut lines = 0;
        for (taken, (idx, ch)) in content[..offset].char_indices().rev().enumerate() {
            if taken >= max_chars {
                break;
            }
            if ch == '\n' {
                lines += 1;
                if lines >= max_lines {
                    break;
                }
            }
            start = idx;
        }

        let mut end = offset;
        lines = 0;
        for (taken, (idx, ch)) in content[offset..].char_indices().enumerate() {
            if taken >= max_chars {
                break;
            }
            if ch == '\n' {
                lines += 1;
                if lines >= max_lines {
                    break;
                }
            }
            end = offset + idx + ch.len_utf8();
        }

        (
            content[start..offset].to_string(),
            content[offset..end].to_string(),
        )
    }
}

impl fmt::Display for ParseLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.file.url, self.line, self.col)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseSourceSpan {
    pub start: ParseLocation,
    pub end: ParseLocation,
}

impl ParseSourceSpan {
    pub fn new(start: ParseLocation, end: ParseLocation) -> Self {
        ParseSourceSpan { start, end }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub span: ParseSourceSpan,
    pub msg: String,
    pub level: ParseErrorLevel,
}

impl ParseError {
    pub fn new(span: ParseSourceSpan, msg: impl Into<String>) -> Self {
        ParseError {
            span,
            msg: msg.into(),
            level: ParseErrorLevel::Error,
        }
    }

    pub fn warning(span: ParseSourceSpan, msg: impl Into<String>) -> Self {
        ParseError {
            span,
            msg: msg.into(),
            level: ParseErrorLevel::Warning,
        }
    }

    pub fn contextual_message(&self) -> String {
        let (before, after) = self.span.start.get_context(100, 3);
        let level_str = match self.level {
            ParseErrorLevel::Warning => "WARNING",
            ParseErrorLevel::Error => "ERROR",
        };
        format!("{} (\"{}[{} ->]{}\")", self.msg, before, level_str, after)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.contextual_message(), self.span.start)
    }
}

impl std::error::Error for ParseError {}
