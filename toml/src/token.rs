//! Lexical tokens: the closed catalog of token types TOML source decomposes
//! into, plus the lazy, maximal-munch tokenizer that produces them.
//!
//! Every token keeps the *exact* substring of the source that produced it —
//! nothing here canonicalizes or strips anything. Escape processing and
//! numeric parsing happen later, in `value.rs`, once a token has already been
//! assigned a place in the element tree.

use logos::{Lexer, Logos};

use crate::error::TomlError;
use toml_weave_core::Span;

/// Coarse classification of a [`TokenType`], used by the parser to decide
/// whether a token counts as metadata (whitespace/newline/comment) or can
/// anchor a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    Operator,
    Whitespace,
    Newline,
    Comment,
}

/// The closed set of lexical token types TOML decomposes into.
///
/// Variants carry no parsed payload: the token's [`Token::text`] is always
/// the raw slice that matched. Priorities below mirror, tier for tier, the
/// ordering used by the Python implementation this model is based on
/// (`contoml/lexer.py`'s `TOKEN_TYPE_*` prefixes), with one override spelled
/// out in the specification: newlines are their own token type rather than
/// folded into whitespace.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    #[regex(r"[ \t]+", priority = 10)]
    Whitespace,

    #[regex(r"\n+", priority = 10)]
    Newline,

    #[regex(r"#[^\n]*", priority = 5)]
    Comment,

    #[token("=", priority = 100)]
    Eq,
    #[token(".", priority = 100)]
    Dot,
    #[token(",", priority = 100)]
    Comma,
    #[token("[[", priority = 100)]
    LDoubleBracket,
    #[token("]]", priority = 100)]
    RDoubleBracket,
    #[token("[", priority = 100)]
    LBracket,
    #[token("]", priority = 100)]
    RBracket,
    #[token("{", priority = 100)]
    LBrace,
    #[token("}", priority = 100)]
    RBrace,

    #[token("true", priority = 100)]
    True,
    #[token("false", priority = 100)]
    False,

    #[regex(r"[+-]?(0|[1-9][0-9_]*)", priority = 100)]
    Integer,

    #[regex(r"[+-]?(0|[1-9][0-9_]*)(\.[0-9_]+([eE][+-]?[0-9_]+)?|[eE][+-]?[0-9_]+)", priority = 90)]
    Float,

    #[regex(
        r"[0-9]{4}-[0-9]{2}-[0-9]{2}(T[0-9]{2}:[0-9]{2}:[0-9]{2}(\.[0-9]+)?)?([zZ]|[+-][0-9]{2}:[0-9]{2})?",
        priority = 60
    )]
    Date,

    #[regex(r"[A-Za-z0-9_-]+", priority = 40)]
    BareKey,

    #[regex(r#""([^"\\\n]|\\.)*""#, priority = 10)]
    BasicString,

    #[regex(r"'[^'\n]*'", priority = 10)]
    LiteralString,

    #[token("\"\"\"", lex_multiline_basic, priority = 10)]
    MultilineBasicString,

    #[token("'''", lex_multiline_literal, priority = 10)]
    MultilineLiteralString,
}

impl TokenType {
    pub fn kind(self) -> TokenKind {
        use TokenType::*;
        match self {
            Whitespace => TokenKind::Whitespace,
            Newline => TokenKind::Newline,
            Comment => TokenKind::Comment,
            Eq | Dot | Comma | LDoubleBracket | RDoubleBracket | LBracket | RBracket | LBrace
            | RBrace => TokenKind::Operator,
            True | False => TokenKind::Boolean,
            Integer => TokenKind::Integer,
            Float => TokenKind::Float,
            Date => TokenKind::Date,
            BareKey | BasicString | LiteralString | MultilineBasicString
            | MultilineLiteralString => TokenKind::String,
        }
    }

    /// The tie-break tier used to disambiguate equal-length matches: lower
    /// numbers are chosen first, mirroring `spec.md`'s "lower = chosen"
    /// convention (the inverse of `logos`'s own `priority` attribute, which
    /// this method does not drive — it exists for introspection/testing).
    pub fn tie_break_tier(self) -> u8 {
        use TokenType::*;
        match self {
            Eq | Dot | Comma | LDoubleBracket | RDoubleBracket | LBracket | RBracket | LBrace
            | RBrace | True | False | Integer => 0,
            Float => 1,
            Date => 40,
            BareKey => 50,
            BasicString | LiteralString | MultilineBasicString | MultilineLiteralString
            | Whitespace => 90,
            Comment => 95,
            Newline => 90,
        }
    }

    pub fn is_metadata(self) -> bool {
        matches!(
            self.kind(),
            TokenKind::Whitespace | TokenKind::Newline | TokenKind::Comment
        )
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TokenType::Whitespace => "whitespace",
            TokenType::Newline => "newline",
            TokenType::Comment => "comment",
            TokenType::Eq => "'='",
            TokenType::Dot => "'.'",
            TokenType::Comma => "','",
            TokenType::LDoubleBracket => "'[['",
            TokenType::RDoubleBracket => "']]'",
            TokenType::LBracket => "'['",
            TokenType::RBracket => "']'",
            TokenType::LBrace => "'{'",
            TokenType::RBrace => "'}'",
            TokenType::True => "true",
            TokenType::False => "false",
            TokenType::Integer => "integer",
            TokenType::Float => "float",
            TokenType::Date => "date",
            TokenType::BareKey => "bare key",
            TokenType::BasicString => "string",
            TokenType::LiteralString => "literal string",
            TokenType::MultilineBasicString => "multiline string",
            TokenType::MultilineLiteralString => "multiline literal string",
        };
        f.write_str(name)
    }
}

/// Scans `rest` for the closing delimiter of a multiline string, returning
/// the byte count (including the delimiter) to bump the lexer by.
///
/// `honor_escapes` skips the character following a `\` so an escaped
/// `\"""`-looking sequence in a basic string doesn't look like a close;
/// literal strings pass `false` since backslashes are not special there.
fn scan_multiline(rest: &str, delim: &str, honor_escapes: bool) -> Option<usize> {
    let mut chars = rest.char_indices();
    while let Some((i, c)) = chars.next() {
        if honor_escapes && c == '\\' {
            chars.next();
            continue;
        }
        if rest[i..].starts_with(delim) {
            return Some(i + delim.len());
        }
    }
    None
}

fn lex_multiline_basic(lex: &mut Lexer<TokenType>) -> Result<(), ()> {
    match scan_multiline(lex.remainder(), "\"\"\"", true) {
        Some(extra) => {
            lex.bump(extra);
            Ok(())
        }
        None => Err(()),
    }
}

fn lex_multiline_literal(lex: &mut Lexer<TokenType>) -> Result<(), ()> {
    match scan_multiline(lex.remainder(), "'''", false) {
        Some(extra) => {
            lex.bump(extra);
            Ok(())
        }
        None => Err(()),
    }
}

/// A single lexeme: its type, the exact source text it matched, its span,
/// and its 1-indexed row/column at the point it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub ty: TokenType,
    pub text: String,
    pub span: Span,
    pub row: usize,
    pub col: usize,
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        self.ty.kind()
    }

    pub fn is_metadata(&self) -> bool {
        self.ty.is_metadata()
    }
}

/// Tokenizes `source`, normalizing `\r\n` to `\n` first as the grammar
/// assumes. Stops and reports a [`TomlError::Lexer`] at the first position
/// no token type can match.
pub fn tokenize(source: &str) -> Result<Vec<Token>, TomlError> {
    let normalized = source.replace("\r\n", "\n");
    let mut lexer = TokenType::lexer(&normalized);

    let mut tokens = Vec::new();
    let mut row = 1usize;
    let mut col = 1usize;

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let text = normalized[span.clone()].to_string();

        let ty = result.map_err(|_| TomlError::Lexer {
            row,
            col,
            preview: preview(&normalized[span.start..]),
        })?;

        let token_row = row;
        let token_col = col;
        for c in text.chars() {
            if c == '\n' {
                row += 1;
                col = 1;
            } else {
                col += 1;
            }
        }

        tokens.push(Token {
            ty,
            text,
            span: Span::new(span.start, span.end),
            row: token_row,
            col: token_col,
        });
    }

    Ok(tokens)
}

fn preview(remainder: &str) -> String {
    const MAX: usize = 24;
    match remainder.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}…", &remainder[..idx]),
        None => remainder.to_string(),
    }
}
