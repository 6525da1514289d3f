#![deny(
    unsafe_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

//! Shared parsing primitives used by `toml-weave`.
//!
//! This crate holds the grammar-independent pieces that the TOML document
//! model is built on: source spans, a generic recursion/resource guard, and
//! punctuated-sequence storage for comma-separated constructs.

pub mod config;
mod delimited;
mod error;
mod punctuated;
mod span;

pub use config::{ParseConfig, RecursionGuard};
pub use delimited::Delimited;
pub use error::Error;
pub use punctuated::{Punctuated, PunctuatedInner, Separated, Terminated, TrailingPolicy};
pub use span::{Span, Spanned};
