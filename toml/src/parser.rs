//! Recursive-descent parser: turns a token sequence into the element tree
//! described in `spec.md` §4.3, over a stateless, forkable token stream.
//!
//! Two places genuinely need backtracking — the optional `.`-separated
//! segments of a dotted table-header name, and nothing else really, since
//! every other production is decidable by a one-token (or whitespace-skipping)
//! lookahead. Those use [`TokenStream::extract`]; everywhere else uses plain
//! lookahead, which reads clearer for a grammar this shallow.

use toml_weave_core::{ParseConfig, RecursionGuard};

use crate::element::{Container, Element};
use crate::error::TomlError;
use crate::token::{tokenize, Token, TokenKind, TokenType};

/// A position into a shared token buffer. Cloning is a pointer-and-index
/// copy, so forking to attempt a production and discarding the fork on
/// failure is free.
#[derive(Clone, Copy)]
pub struct TokenStream<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> TokenStream<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.pos
    }

    pub fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    pub fn peek_ty(&self) -> Option<TokenType> {
        self.peek().map(|t| t.ty)
    }

    pub fn bump(&mut self) -> Option<&'t Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    /// Bumps a token already confirmed present by a preceding `peek`/`peek_ty`
    /// check, surfacing the (otherwise-impossible) gap as a parse error
    /// instead of asserting it can't happen.
    fn bump_checked(&mut self) -> Result<&'t Token, TomlError> {
        self.bump().ok_or_else(|| parsing_error("a token", "end of input"))
    }

    /// Attempts `f` on a fork of this stream. Commits the fork's position
    /// back to `self` only if `f` succeeds, so a failed attempt never
    /// consumes input.
    pub fn extract<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, TomlError>) -> Result<T, TomlError> {
        let mut fork = *self;
        let outcome = f(&mut fork);
        if outcome.is_ok() {
            *self = fork;
        }
        outcome
    }

    /// Applies `f` only when `prior` already failed, again on a fork.
    pub fn or_extract<T>(
        &mut self,
        prior: Result<T, TomlError>,
        f: impl FnOnce(&mut Self) -> Result<T, TomlError>,
    ) -> Result<T, TomlError> {
        match prior {
            Ok(v) => Ok(v),
            Err(_) => self.extract(f),
        }
    }
}

/// Turns a failed result into an empty success, for the grammar's several
/// `{ ... }`-starred (zero-or-more) productions.
pub fn or_empty<T: Default>(result: Result<T, TomlError>) -> Result<T, TomlError> {
    match result {
        Ok(v) => Ok(v),
        Err(_) => Ok(T::default()),
    }
}

/// Materializes a capture, surfacing its retained error untouched.
pub fn value<T>(result: Result<T, TomlError>) -> Result<T, TomlError> {
    result
}

struct ParseCtx {
    config: ParseConfig,
    guard: RecursionGuard,
}

/// RAII wrapper around [`RecursionGuard::enter`]/`exit` so a `?`-propagated
/// parse error still pops the depth counter.
struct DepthGuard<'g> {
    guard: &'g mut RecursionGuard,
}

impl<'g> DepthGuard<'g> {
    fn new(guard: &'g mut RecursionGuard, limit: usize) -> Result<Self, TomlError> {
        guard.enter(limit)?;
        Ok(Self { guard })
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.guard.exit();
    }
}

fn parsing_error(expected: &str, found: &str) -> TomlError {
    TomlError::Parsing {
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

fn describe(ty: Option<TokenType>) -> String {
    ty.map(|t| t.to_string()).unwrap_or_else(|| "end of input".to_string())
}

fn starts_key(ty: TokenType) -> bool {
    ty.kind() == TokenKind::String
}

fn starts_value(ty: TokenType) -> bool {
    // A bare key is a String-kind token, but it is only ever a valid *key*:
    // TOML values must be quoted strings, a recognized scalar, or a
    // collection. Letting BareKey through here is how a malformed numeric
    // literal like `0446` (lexed whole as BareKey, since no Integer pattern
    // covers it) would otherwise silently become the string value `"0446"`
    // instead of the parse error spec.md calls for.
    if ty == TokenType::BareKey {
        return false;
    }
    matches!(
        ty.kind(),
        TokenKind::String | TokenKind::Integer | TokenKind::Float | TokenKind::Boolean | TokenKind::Date
    ) || matches!(ty, TokenType::LBracket | TokenType::LBrace)
}

fn expect_string_token(stream: &mut TokenStream<'_>) -> Result<Token, TomlError> {
    match stream.peek() {
        Some(t) if t.kind() == TokenKind::String => Ok(stream.bump_checked()?.clone()),
        other => Err(parsing_error("a key", &describe(other.map(|t| t.ty)))),
    }
}

fn expect_operator(stream: &mut TokenStream<'_>, ty: TokenType) -> Result<Element, TomlError> {
    match stream.peek_ty() {
        Some(t) if t == ty => Element::operator(stream.bump_checked()?.clone()),
        other => Err(parsing_error(&ty.to_string(), &describe(other))),
    }
}

fn consume_optional_whitespace(stream: &mut TokenStream<'_>) -> Result<Vec<Element>, TomlError> {
    if stream.peek_ty() == Some(TokenType::Whitespace) {
        Ok(vec![Element::whitespace(vec![stream.bump_checked()?.clone()])?])
    } else {
        Ok(Vec::new())
    }
}

fn consume_newline(stream: &mut TokenStream<'_>) -> Result<Element, TomlError> {
    Element::newline(vec![stream.bump_checked()?.clone()])
}

fn consume_comment(stream: &mut TokenStream<'_>) -> Result<Element, TomlError> {
    let comment = stream.bump_checked()?.clone();
    let newline = if stream.peek_ty() == Some(TokenType::Newline) {
        stream.bump().cloned()
    } else {
        None
    };
    Element::comment(comment, newline)
}

/// Consumes any run of whitespace/newline/comment elements, in any order.
/// Used inside arrays, where multi-line input with comments between
/// elements is ordinary (`spec.md`'s array EBNF is stricter than real TOML
/// here; see `DESIGN.md` for the generalization).
fn consume_metadata_run(stream: &mut TokenStream<'_>) -> Result<Vec<Element>, TomlError> {
    let mut out = Vec::new();
    loop {
        match stream.peek_ty() {
            Some(TokenType::Whitespace) => out.extend(consume_optional_whitespace(stream)?),
            Some(TokenType::Newline) => out.push(consume_newline(stream)?),
            Some(TokenType::Comment) => out.push(consume_comment(stream)?),
            _ => break,
        }
    }
    Ok(out)
}

fn parse_line_term(stream: &mut TokenStream<'_>) -> Result<Vec<Element>, TomlError> {
    match stream.peek_ty() {
        Some(TokenType::Comment) => Ok(vec![consume_comment(stream)?]),
        Some(TokenType::Newline) => Ok(vec![consume_newline(stream)?]),
        None => Ok(Vec::new()),
        other => Err(parsing_error("a newline or comment", &describe(other))),
    }
}

fn looks_like_header(stream: &TokenStream<'_>) -> bool {
    let mut probe = *stream;
    while probe.peek_ty() == Some(TokenType::Whitespace) {
        probe.bump();
    }
    matches!(probe.peek_ty(), Some(TokenType::LBracket | TokenType::LDoubleBracket))
}

fn parse_value(stream: &mut TokenStream<'_>, ctx: &mut ParseCtx) -> Result<Element, TomlError> {
    match stream.peek_ty() {
        Some(TokenType::LBracket) => parse_array(stream, ctx),
        Some(TokenType::LBrace) => parse_inline_table(stream, ctx),
        Some(ty) if starts_value(ty) => Element::atomic(stream.bump_checked()?.clone()),
        other => Err(parsing_error("a value", &describe(other))),
    }
}

fn parse_array(stream: &mut TokenStream<'_>, ctx: &mut ParseCtx) -> Result<Element, TomlError> {
    let _depth = DepthGuard::new(&mut ctx.guard, ctx.config.max_recursion_depth)?;

    let mut children = vec![expect_operator(stream, TokenType::LBracket)?];
    children.extend(consume_metadata_run(stream)?);

    if stream.peek_ty() != Some(TokenType::RBracket) {
        children.push(parse_value(stream, ctx)?);
        loop {
            children.extend(consume_metadata_run(stream)?);
            if stream.peek_ty() != Some(TokenType::Comma) {
                break;
            }
            children.push(expect_operator(stream, TokenType::Comma)?);
            children.extend(consume_metadata_run(stream)?);
            if stream.peek_ty() == Some(TokenType::RBracket) {
                break;
            }
            children.push(parse_value(stream, ctx)?);
        }
    }

    children.push(expect_operator(stream, TokenType::RBracket)?);
    Ok(Element::array(children))
}

fn parse_inline_pair(stream: &mut TokenStream<'_>, ctx: &mut ParseCtx) -> Result<Vec<Element>, TomlError> {
    let mut out = vec![Element::atomic(expect_string_token(stream)?)?];
    out.extend(consume_optional_whitespace(stream)?);
    out.push(expect_operator(stream, TokenType::Eq)?);
    out.extend(consume_optional_whitespace(stream)?);
    out.push(parse_value(stream, ctx)?);
    Ok(out)
}

fn parse_inline_table(stream: &mut TokenStream<'_>, ctx: &mut ParseCtx) -> Result<Element, TomlError> {
    let _depth = DepthGuard::new(&mut ctx.guard, ctx.config.max_recursion_depth)?;

    let mut children = vec![expect_operator(stream, TokenType::LBrace)?];
    children.extend(consume_optional_whitespace(stream)?);

    if stream.peek_ty() != Some(TokenType::RBrace) {
        children.extend(parse_inline_pair(stream, ctx)?);
        loop {
            children.extend(consume_optional_whitespace(stream)?);
            if stream.peek_ty() != Some(TokenType::Comma) {
                break;
            }
            children.push(expect_operator(stream, TokenType::Comma)?);
            children.extend(consume_optional_whitespace(stream)?);
            children.extend(parse_inline_pair(stream, ctx)?);
        }
        children.extend(consume_optional_whitespace(stream)?);
    }

    children.push(expect_operator(stream, TokenType::RBrace)?);
    Ok(Element::inline_table(children))
}

fn parse_kv_pair(stream: &mut TokenStream<'_>, ctx: &mut ParseCtx) -> Result<Vec<Element>, TomlError> {
    let mut out = vec![Element::atomic(expect_string_token(stream)?)?];
    out.extend(consume_optional_whitespace(stream)?);
    out.push(expect_operator(stream, TokenType::Eq)?);
    out.extend(consume_optional_whitespace(stream)?);
    out.push(parse_value(stream, ctx)?);
    out.extend(consume_optional_whitespace(stream)?);
    out.extend(parse_line_term(stream)?);
    Ok(out)
}

fn parse_table_body(stream: &mut TokenStream<'_>, ctx: &mut ParseCtx) -> Result<Element, TomlError> {
    let mut children = Vec::new();
    loop {
        if stream.is_empty() || looks_like_header(stream) {
            break;
        }
        match stream.peek_ty() {
            Some(TokenType::Whitespace) => children.extend(consume_optional_whitespace(stream)?),
            Some(TokenType::Newline) => children.push(consume_newline(stream)?),
            Some(TokenType::Comment) => children.push(consume_comment(stream)?),
            Some(ty) if starts_key(ty) => children.extend(parse_kv_pair(stream, ctx)?),
            other => return Err(parsing_error("a key, comment, or newline", &describe(other))),
        }
    }
    Ok(Element::table_body(children))
}

/// The optional `{ Space '.' Space String }` tail of a header name, parsed
/// with `extract` since each segment is only committed once a `.` is
/// confirmed to follow.
fn parse_header_name(stream: &mut TokenStream<'_>) -> Result<Vec<Element>, TomlError> {
    let mut out = vec![Element::atomic(expect_string_token(stream)?)?];
    loop {
        let segment = stream.extract(|s| {
            let mut seg = consume_optional_whitespace(s)?;
            seg.push(expect_operator(s, TokenType::Dot)?);
            seg.extend(consume_optional_whitespace(s)?);
            seg.push(Element::atomic(expect_string_token(s)?)?);
            Ok(seg)
        });
        match segment {
            Ok(seg) => out.extend(seg),
            Err(_) => break,
        }
    }
    Ok(out)
}

fn parse_table_header(stream: &mut TokenStream<'_>) -> Result<Element, TomlError> {
    let mut children = consume_optional_whitespace(stream)?;

    let is_array = match stream.peek_ty() {
        Some(TokenType::LDoubleBracket) => true,
        Some(TokenType::LBracket) => false,
        other => return Err(parsing_error("'[' or '[['", &describe(other))),
    };
    let (open, close) = if is_array {
        (TokenType::LDoubleBracket, TokenType::RDoubleBracket)
    } else {
        (TokenType::LBracket, TokenType::RBracket)
    };

    children.push(expect_operator(stream, open)?);
    children.extend(parse_header_name(stream)?);
    children.push(expect_operator(stream, close)?);
    children.extend(consume_optional_whitespace(stream)?);
    children.extend(parse_line_term(stream)?);

    Ok(Element::table_header(children))
}

/// Inserts an empty table body immediately after any table header not
/// already followed by one. Idempotent: re-sanitizing sanitized output is a
/// no-op.
pub fn sanitize(file: Element) -> Element {
    let Element::File(Container { children }) = file else {
        return file;
    };
    let mut out = Vec::with_capacity(children.len());
    let mut iter = children.into_iter().peekable();
    while let Some(child) = iter.next() {
        let is_header = matches!(child, Element::TableHeader(_));
        out.push(child);
        if is_header && !matches!(iter.peek(), Some(Element::TableBody(_))) {
            out.push(Element::table_body(Vec::new()));
        }
    }
    Element::File(Container { children: out })
}

/// Tokenizes, parses, and sanitizes `source` with default resource limits.
pub fn parse(source: &str) -> Result<Element, TomlError> {
    parse_with_config(source, &ParseConfig::default())
}

/// Tokenizes, parses, and sanitizes `source`, enforcing `config`'s resource
/// limits while descending into arrays and inline tables.
pub fn parse_with_config(source: &str, config: &ParseConfig) -> Result<Element, TomlError> {
    let tokens = tokenize(source)?;
    let mut stream = TokenStream::new(&tokens);
    let mut ctx = ParseCtx {
        config: config.clone(),
        guard: RecursionGuard::new(),
    };

    let mut children = vec![parse_table_body(&mut stream, &mut ctx)?];
    while !stream.is_empty() {
        children.push(parse_table_header(&mut stream, &mut ctx)?);
        children.push(parse_table_body(&mut stream, &mut ctx)?);
    }

    if !stream.is_empty() {
        return Err(TomlError::InvalidTOMLFile {
            reason: format!("{} token(s) left unconsumed after parsing", stream.remaining()),
        });
    }

    Ok(sanitize(Element::file(children)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_identity_on_a_representative_document() {
        let source = "key = \"value\" # trailing\n\n[a.b]\nx = 1\ny = [1, 2, 3]\n";
        let file = parse(source).unwrap();
        assert_eq!(file.source(), source);
    }

    #[test]
    fn empty_file_parses_to_an_empty_anonymous_body() {
        let file = parse("").unwrap();
        assert_eq!(file.source(), "");
    }

    #[test]
    fn trailing_garbage_is_an_invalid_file_error() {
        assert!(parse("key = 1\n]]]").is_err());
    }

    #[test]
    fn a_leading_zero_digit_run_in_value_position_is_a_parse_error() {
        // "0446" lexes whole as BareKey (see token.rs), and BareKey never
        // starts a value, so this must fail rather than silently becoming
        // the string value "0446".
        assert!(parse("k = 0446\n").is_err());
    }

    #[test]
    fn array_of_tables_headers_round_trip() {
        let source = "[[fruit]]\nname = \"banana\"\n\n[[fruit]]\nname = \"grapes\"\n";
        let file = parse(source).unwrap();
        assert_eq!(file.source(), source);
    }

    #[test]
    fn sanitize_inserts_empty_body_after_bare_header() {
        let source = "[a]\n[b]\nk = 1\n";
        let file = parse(source).unwrap();
        let Element::File(c) = &file else { panic!("expected a file") };
        // header, empty body, header, body
        assert_eq!(c.children.len(), 4);
        assert!(matches!(c.children[1], Element::TableBody(_)));
        assert_eq!(c.children[1].source(), "");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let file = parse("[a]\n[b]\nk = 1\n").unwrap();
        let once = sanitize(file.clone());
        let twice = sanitize(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn multiline_array_with_comments_is_accepted() {
        let source = "arr = [\n  1, # one\n  2,\n]\n";
        let file = parse(source).unwrap();
        assert_eq!(file.source(), source);
    }

    #[test]
    fn deeply_nested_arrays_hit_the_recursion_limit() {
        let mut source = String::new();
        for _ in 0..200 {
            source.push('[');
        }
        source.push('1');
        for _ in 0..200 {
            source.push(']');
        }
        let source = format!("k = {source}\n");
        let config = ParseConfig::default();
        let err = parse_with_config(&source, &config).unwrap_err();
        assert!(matches!(err, TomlError::RecursionLimitExceeded { .. }));
    }

    #[test]
    fn inline_tables_do_not_allow_embedded_newlines() {
        assert!(parse("k = { a = 1,\nb = 2 }\n").is_err());
    }
}
