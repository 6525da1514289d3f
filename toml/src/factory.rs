//! Element factory: synthesizes brand-new elements and punctuation tokens
//! from primitive values and grammar constants, per `spec.md` §4.2. Used by
//! the mutator whenever a write needs material the parser never produced.

use crate::element::Element;
use crate::error::TomlError;
use crate::token::{Token, TokenType};
use crate::value::{format_date, PrimitiveValue};
use toml_weave_core::Span;

fn synthetic(ty: TokenType, text: String) -> Token {
    Token {
        ty,
        span: Span::call_site(),
        row: 0,
        col: 0,
        text,
    }
}

/// A canonical punctuation element (`,`, `=`, `[`, `]`, `[[`, `]]`, `{`,
/// `}`, `.`, `\n`), for splicing into an existing element sequence.
pub fn punctuation(ty: TokenType) -> Result<Element, TomlError> {
    let text = match ty {
        TokenType::Comma => ",",
        TokenType::Eq => "=",
        TokenType::Dot => ".",
        TokenType::LBracket => "[",
        TokenType::RBracket => "]",
        TokenType::LDoubleBracket => "[[",
        TokenType::RDoubleBracket => "]]",
        TokenType::LBrace => "{",
        TokenType::RBrace => "}",
        TokenType::Newline => "\n",
        other => {
            return Err(TomlError::NotPrimitive {
                path: format!("{other} is not punctuation"),
            })
        }
    };
    if ty == TokenType::Newline {
        Element::newline(vec![synthetic(ty, text.to_string())])
    } else {
        Element::operator(synthetic(ty, text.to_string()))
    }
}

pub fn whitespace(text: &str) -> Result<Element, TomlError> {
    Element::whitespace(vec![synthetic(TokenType::Whitespace, text.to_string())])
}

fn is_bare_key_shape(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Escapes `s` for use inside a basic (double-quoted) string body: `\"`,
/// `\\`, control characters, and non-printables.
fn escape_basic_body(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Escapes `s` for use inside a multiline basic string body: newlines stay
/// literal, quotes and backslashes are escaped so the body can never
/// contain an unescaped `"""`.
fn escape_multiline_body(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push('\n'),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Picks the token text for a string primitive, per the escaping rules of
/// `spec.md` §4.2: empty string, bare-key-shaped strings, multi-newline
/// strings, and the basic-string fallback.
fn string_token_text(s: &str) -> (TokenType, String) {
    if s.is_empty() {
        return (TokenType::BasicString, "\"\"".to_string());
    }
    if is_bare_key_shape(s) {
        return (TokenType::BareKey, s.to_string());
    }
    if s.matches('\n').count() >= 2 {
        return (
            TokenType::MultilineBasicString,
            format!("\"\"\"{}\"\"\"", escape_multiline_body(s)),
        );
    }
    (TokenType::BasicString, format!("\"{}\"", escape_basic_body(s)))
}

/// Builds a single atomic token for a scalar primitive value.
fn scalar_token(value: &PrimitiveValue) -> Result<Token, TomlError> {
    Ok(match value {
        PrimitiveValue::Boolean(true) => synthetic(TokenType::True, "true".to_string()),
        PrimitiveValue::Boolean(false) => synthetic(TokenType::False, "false".to_string()),
        PrimitiveValue::Integer(i) => synthetic(TokenType::Integer, i.to_string()),
        PrimitiveValue::Float(f) => {
            let text = if f.fract() == 0.0 && f.is_finite() {
                format!("{f:.1}")
            } else {
                f.to_string()
            };
            synthetic(TokenType::Float, text)
        }
        PrimitiveValue::Date(d) => synthetic(TokenType::Date, format_date(d)),
        PrimitiveValue::String(s) => {
            let (ty, text) = string_token_text(s);
            synthetic(ty, text)
        }
        PrimitiveValue::Array(_) | PrimitiveValue::Table(_) => {
            return Err(TomlError::NotPrimitive {
                path: "scalar_token called on a composite value".to_string(),
            })
        }
    })
}

/// Builds the string token used in key position for `key`. Keys always
/// prefer the bare form when shape allows it, same as string values.
pub fn key_token(key: &str) -> Result<Token, TomlError> {
    let (ty, text) = string_token_text(key);
    Ok(synthetic(ty, text))
}

/// Converts a primitive value into a value element: an atomic token for
/// scalars, or a freshly built array/inline-table container for composites.
pub fn value_element(value: &PrimitiveValue) -> Result<Element, TomlError> {
    match value {
        PrimitiveValue::Array(items) => {
            let mut children = vec![punctuation(TokenType::LBracket)?];
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    children.push(punctuation(TokenType::Comma)?);
                    children.push(whitespace(" ")?);
                }
                children.push(value_element(item)?);
            }
            children.push(punctuation(TokenType::RBracket)?);
            Ok(Element::array(children))
        }
        PrimitiveValue::Table(map) => {
            let mut children = vec![punctuation(TokenType::LBrace)?, whitespace(" ")?];
            for (i, (k, v)) in map.iter().enumerate() {
                if i > 0 {
                    children.push(punctuation(TokenType::Comma)?);
                    children.push(whitespace(" ")?);
                }
                children.push(Element::atomic(key_token(k)?)?);
                children.push(whitespace(" ")?);
                children.push(punctuation(TokenType::Eq)?);
                children.push(whitespace(" ")?);
                children.push(value_element(v)?);
            }
            children.push(whitespace(" ")?);
            children.push(punctuation(TokenType::RBrace)?);
            Ok(Element::inline_table(children))
        }
        scalar => Element::atomic(scalar_token(scalar)?),
    }
}

/// Builds the `[key, ws, '=', ws, value, newline]` elements for a brand-new
/// key-value pair, used when inserting into an existing or fresh body.
pub fn kv_pair_elements(key: &str, value: &PrimitiveValue) -> Result<Vec<Element>, TomlError> {
    Ok(vec![
        Element::atomic(key_token(key)?)?,
        whitespace(" ")?,
        punctuation(TokenType::Eq)?,
        whitespace(" ")?,
        value_element(value)?,
        punctuation(TokenType::Newline)?,
    ])
}

/// Builds the `[header, newline]` elements for a table header, e.g.
/// `[a.b.c]\n` or `[[a.b.c]]\n`.
pub fn table_header_elements(path: &[String], is_array: bool) -> Result<Vec<Element>, TomlError> {
    let (open, close) = if is_array {
        (TokenType::LDoubleBracket, TokenType::RDoubleBracket)
    } else {
        (TokenType::LBracket, TokenType::RBracket)
    };
    let mut name = Vec::new();
    for (i, segment) in path.iter().enumerate() {
        if i > 0 {
            name.push(punctuation(TokenType::Dot)?);
        }
        name.push(Element::atomic(key_token(segment)?)?);
    }
    let mut children = vec![punctuation(open)?];
    children.extend(name);
    children.push(punctuation(close)?);
    Ok(vec![Element::table_header(children), punctuation(TokenType::Newline)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_becomes_basic_quotes() {
        let (ty, text) = string_token_text("");
        assert_eq!(ty, TokenType::BasicString);
        assert_eq!(text, "\"\"");
    }

    #[test]
    fn alnum_string_becomes_bare_key() {
        let (ty, text) = string_token_text("abc123");
        assert_eq!(ty, TokenType::BareKey);
        assert_eq!(text, "abc123");
    }

    #[test]
    fn string_with_space_becomes_basic_string() {
        let (ty, text) = string_token_text("a b");
        assert_eq!(ty, TokenType::BasicString);
        assert_eq!(text, "\"a b\"");
    }

    #[test]
    fn multi_newline_string_becomes_multiline_basic() {
        let (ty, _) = string_token_text("a\nb\nc");
        assert_eq!(ty, TokenType::MultilineBasicString);
    }

    #[test]
    fn kv_pair_elements_round_trip_through_source() {
        let elems = kv_pair_elements("name", &PrimitiveValue::String("banana".to_string())).unwrap();
        let source: String = elems.iter().map(|e| e.source()).collect();
        assert_eq!(source, "name = \"banana\"\n");
    }

    #[test]
    fn array_value_element_serializes_with_comma_space() {
        let v = PrimitiveValue::Array(vec![PrimitiveValue::Integer(1), PrimitiveValue::Integer(2)]);
        assert_eq!(value_element(&v).unwrap().source(), "[1, 2]");
    }
}
