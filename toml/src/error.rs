//! The closed error taxonomy raised by every stage of `toml-weave`: lexing,
//! parsing, element-tree sanitation, navigation, and mutation.

use thiserror::Error;
use toml_weave_core::Span;

/// Every way a document can fail to parse, navigate, or mutate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TomlError {
    #[error("unexpected input at line {row}, column {col}: {preview:?}")]
    Lexer {
        row: usize,
        col: usize,
        preview: String,
    },

    #[error("expected {expected}, found {found}")]
    Parsing { expected: String, found: String },

    #[error("invalid TOML file: {reason}")]
    InvalidTOMLFile { reason: String },

    #[error("duplicate key {key:?}")]
    DuplicateKeys { key: String },

    #[error("duplicate table {name:?}")]
    DuplicateTables { name: String },

    #[error("no array of tables named {name:?}")]
    NoArrayFound { name: String },

    #[error("element at {path:?} is not a {expected} element")]
    InvalidElement { path: String, expected: &'static str },

    #[error("value at {path:?} is not a primitive")]
    NotPrimitive { path: String },

    #[error("recursion limit of {limit} exceeded at depth {depth}")]
    RecursionLimitExceeded { depth: usize, limit: usize },

    #[error("{source}")]
    Spanned {
        #[source]
        source: Box<TomlError>,
        span: Span,
    },
}

impl TomlError {
    /// Wraps `self` with the span it occurred at, nesting under an existing
    /// `Spanned` wrapper rather than stacking spans when one is already
    /// attached.
    pub fn with_span(self, span: Span) -> Self {
        match self {
            TomlError::Spanned { source, .. } => TomlError::Spanned { source, span },
            other => TomlError::Spanned {
                source: Box::new(other),
                span,
            },
        }
    }

    /// The span attached to this error, if any.
    pub fn span(&self) -> Option<&Span> {
        match self {
            TomlError::Spanned { span, .. } => Some(span),
            _ => None,
        }
    }
}

impl From<toml_weave_core::Error> for TomlError {
    fn from(err: toml_weave_core::Error) -> Self {
        match err {
            toml_weave_core::Error::RecursionLimitExceeded { depth, limit } => {
                TomlError::RecursionLimitExceeded { depth, limit }
            }
            toml_weave_core::Error::TokenLimitExceeded { consumed, limit } => {
                TomlError::Parsing {
                    expected: format!("at most {limit} tokens"),
                    found: format!("{consumed} tokens"),
                }
            }
            toml_weave_core::Error::StreamNotConsumed { remaining } => TomlError::Parsing {
                expected: "end of input".to_string(),
                found: format!("{remaining} remaining token(s)"),
            },
        }
    }
}
