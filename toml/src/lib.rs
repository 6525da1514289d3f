#![deny(
    unsafe_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

//! A format-preserving TOML document model.
//!
//! `toml_weave` parses a TOML document into a tree of [`element::Element`]s
//! that together reproduce the input byte for byte, then layers a navigable
//! mapping (`navigable`) and an in-place mutator (`mutator`) on top, so a
//! document can be read, edited, and serialized back out with every
//! untouched comment, blank line, and quoting style intact.
//!
//! The pipeline: [`token::tokenize`] lexes source text, [`parser::parse`]
//! builds the element tree and sanitizes it, [`navigable::build_navigable`]
//! indexes it for lookup, and [`file::TOMLFile`] ties the whole thing
//! together as the crate's public entry point.

pub mod element;
pub mod entries;
pub mod error;
pub mod factory;
pub mod file;
pub mod mutator;
pub mod navigable;
pub mod parser;
pub mod prettify;
pub mod token;
pub mod value;

pub use error::TomlError;
pub use file::TOMLFile;
pub use value::PrimitiveValue;
