//! The element tree: the typed layer `token.rs` feeds into. Every byte of a
//! parsed document lives in exactly one [`Element`]; depth-first
//! concatenation of [`Element::source`] always reproduces the input that
//! produced the tree.

use crate::error::TomlError;
use crate::token::{Token, TokenType};

/// A leaf or composite node of the element tree.
///
/// The token-wrapping variants (`Whitespace` through `Atomic`) are
/// classified as *metadata* except `Atomic`; the container variants hold
/// further elements. See `spec.md` §3 for the shape invariants each
/// constructor enforces.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Whitespace(TokenRun),
    Newline(TokenRun),
    /// A comment, plus the newline that terminates it when one is present
    /// (absent only for a trailing comment at end-of-file with no final
    /// newline).
    Comment(TokenRun),
    Operator(TokenRun),
    /// A single non-metadata value or key token.
    Atomic(TokenRun),
    Array(Container),
    InlineTable(Container),
    TableBody(Container),
    TableHeader(Container),
    /// The root container: an optional anonymous table body followed by
    /// zero or more `(TableHeader, TableBody)` pairs.
    File(Container),
}

/// A token element's backing tokens, kept as a run rather than a single
/// token since comment elements bundle their terminating newline.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenRun {
    pub tokens: Vec<Token>,
}

impl TokenRun {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }
}

/// A container element: an ordered sequence of child elements.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub children: Vec<Element>,
}

impl Container {
    fn new(children: Vec<Element>) -> Self {
        Self { children }
    }
}

fn invalid(context: &'static str, expected: &'static str) -> TomlError {
    TomlError::InvalidElement {
        path: context.to_string(),
        expected,
    }
}

impl Element {
    pub fn whitespace(tokens: Vec<Token>) -> Result<Self, TomlError> {
        if tokens.is_empty() || tokens.iter().any(|t| t.ty != TokenType::Whitespace) {
            return Err(invalid("whitespace element", "one or more whitespace tokens"));
        }
        Ok(Element::Whitespace(TokenRun::new(tokens)))
    }

    pub fn newline(tokens: Vec<Token>) -> Result<Self, TomlError> {
        if tokens.is_empty() || tokens.iter().any(|t| t.ty != TokenType::Newline) {
            return Err(invalid("newline element", "one or more newline tokens"));
        }
        Ok(Element::Newline(TokenRun::new(tokens)))
    }

    /// Builds a comment element from a comment token and, unless the
    /// comment sits at end-of-file, the newline that terminates it.
    pub fn comment(comment: Token, newline: Option<Token>) -> Result<Self, TomlError> {
        if comment.ty != TokenType::Comment {
            return Err(invalid("comment element", "a comment token"));
        }
        let mut tokens = vec![comment];
        if let Some(nl) = newline {
            if nl.ty != TokenType::Newline {
                return Err(invalid("comment element", "comment followed by newline"));
            }
            tokens.push(nl);
        }
        Ok(Element::Comment(TokenRun::new(tokens)))
    }

    pub fn operator(token: Token) -> Result<Self, TomlError> {
        use TokenType::*;
        if !matches!(
            token.ty,
            Eq | Dot | Comma | LBracket | RBracket | LDoubleBracket | RDoubleBracket | LBrace
                | RBrace
        ) {
            return Err(invalid("operator element", "a punctuation token"));
        }
        Ok(Element::Operator(TokenRun::new(vec![token])))
    }

    pub fn atomic(token: Token) -> Result<Self, TomlError> {
        if token.is_metadata() {
            return Err(invalid("atomic element", "a non-metadata value token"));
        }
        Ok(Element::Atomic(TokenRun::new(vec![token])))
    }

    pub fn array(children: Vec<Element>) -> Self {
        Element::Array(Container::new(children))
    }

    pub fn inline_table(children: Vec<Element>) -> Self {
        Element::InlineTable(Container::new(children))
    }

    pub fn table_body(children: Vec<Element>) -> Self {
        Element::TableBody(Container::new(children))
    }

    pub fn table_header(children: Vec<Element>) -> Self {
        Element::TableHeader(Container::new(children))
    }

    pub fn file(children: Vec<Element>) -> Self {
        Element::File(Container::new(children))
    }

    /// `true` for whitespace, newline, comment, and punctuation elements;
    /// `false` for atomic values and containers.
    pub fn is_metadata(&self) -> bool {
        matches!(
            self,
            Element::Whitespace(_) | Element::Newline(_) | Element::Comment(_) | Element::Operator(_)
        )
    }

    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Element::Array(_)
                | Element::InlineTable(_)
                | Element::TableBody(_)
                | Element::TableHeader(_)
                | Element::File(_)
        )
    }

    /// The children of a container element, or `None` for token elements.
    pub fn children(&self) -> Option<&[Element]> {
        match self {
            Element::Array(c)
            | Element::InlineTable(c)
            | Element::TableBody(c)
            | Element::TableHeader(c)
            | Element::File(c) => Some(&c.children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Element>> {
        match self {
            Element::Array(c)
            | Element::InlineTable(c)
            | Element::TableBody(c)
            | Element::TableHeader(c)
            | Element::File(c) => Some(&mut c.children),
            _ => None,
        }
    }

    /// The single non-metadata token backing an atomic element.
    pub fn atomic_token(&self) -> Option<&Token> {
        match self {
            Element::Atomic(run) => run.tokens.first(),
            _ => None,
        }
    }

    /// Depth-first concatenation of every token's source text. This always
    /// reproduces the exact input the element was built from.
    pub fn source(&self) -> String {
        let mut out = String::new();
        self.write_source(&mut out);
        out
    }

    fn write_source(&self, out: &mut String) {
        match self {
            Element::Whitespace(r)
            | Element::Newline(r)
            | Element::Comment(r)
            | Element::Operator(r)
            | Element::Atomic(r) => {
                for t in &r.tokens {
                    out.push_str(&t.text);
                }
            }
            Element::Array(c)
            | Element::InlineTable(c)
            | Element::TableBody(c)
            | Element::TableHeader(c)
            | Element::File(c) => {
                for child in &c.children {
                    child.write_source(out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize;

    fn first_token(source: &str) -> Token {
        tokenize(source).unwrap().into_iter().next().unwrap()
    }

    #[test]
    fn whitespace_rejects_non_whitespace_tokens() {
        let tok = first_token("key");
        assert!(Element::whitespace(vec![tok]).is_err());
    }

    #[test]
    fn atomic_rejects_metadata_tokens() {
        let tok = first_token("   ");
        assert!(Element::atomic(tok).is_err());
    }

    #[test]
    fn source_concatenates_depth_first() {
        let a = Element::atomic(first_token("1")).unwrap();
        let comma = Element::operator(first_token(",")).unwrap();
        let b = Element::atomic(first_token("2")).unwrap();
        let arr = Element::array(vec![a, comma, b]);
        assert_eq!(arr.source(), "1,2");
    }
}
