//! ML (Markup Language) Parser Module
//!
//! Parses HTML-like documents into the tree that message extraction walks.

pub mod ast;
pub mod parser;
pub mod serializer;
pub mod tags;

pub use ast::*;
pub use parser::{parse_document, HtmlParser, ParseTreeResult};
pub use serializer::serialize_nodes;
