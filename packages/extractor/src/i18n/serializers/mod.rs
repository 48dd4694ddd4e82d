//! Serializers Module
//!
//! Placeholder naming shared by everything that writes messages out.

pub mod placeholder;

pub use placeholder::{PlaceholderCandidate, PlaceholderRegistry};
