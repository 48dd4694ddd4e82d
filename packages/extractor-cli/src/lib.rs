#![deny(clippy::all)]

//! Command line front end for message extraction.

pub use i18n_extractor as extractor;

pub mod extract_i18n;
pub mod printer;

/// CLI version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
