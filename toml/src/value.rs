//! Value projection: converting lexical tokens to [`PrimitiveValue`]s and
//! back. Projection never touches the element tree — it only interprets or
//! synthesizes the text a single atomic token carries.

use indexmap::IndexMap;

use crate::element::Element;
use crate::error::TomlError;
use crate::token::{Token, TokenKind, TokenType};

/// A parsed TOML date/time value, distinguishing the three RFC 3339 shapes
/// TOML allows: a bare date, a local (offset-less) date-time, and an
/// offset date-time.
#[derive(Debug, Clone, PartialEq)]
pub enum TomlDate {
    Date(time::Date),
    LocalDateTime(time::PrimitiveDateTime),
    OffsetDateTime(time::OffsetDateTime),
}

/// The fully-projected value of an atomic token, or a recursively projected
/// array/table. Produced by [`primitive()`](crate::file::primitive) and
/// consumed by [`to_token_text`] when materializing new elements.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Date(TomlDate),
    Array(Vec<PrimitiveValue>),
    Table(IndexMap<String, PrimitiveValue>),
}

fn parsing_error(expected: &str, found: &str) -> TomlError {
    TomlError::Parsing {
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

fn parse_integer(text: &str) -> Result<i64, TomlError> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    cleaned
        .parse::<i64>()
        .map_err(|_| parsing_error("a representable integer", text))
}

fn parse_float(text: &str) -> Result<f64, TomlError> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    cleaned
        .parse::<f64>()
        .map_err(|_| parsing_error("a representable float", text))
}

/// Processes the escapes recognized by `spec.md` §4.4: `\"`, `\\`, `\t`,
/// `\n`, `\r`, `\uXXXX`, `\UXXXXXXXX`. Any other escape is rejected, which is
/// how scenario S6 (`"bad \a escape"`) surfaces: the lexer accepts the text,
/// projection rejects it.
fn process_escapes(body: &str, fold_lines: bool) -> Result<String, TomlError> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let Some(&next) = chars.peek() else {
            return Err(parsing_error("a character after '\\'", ""));
        };

        if fold_lines && (next == '\n' || next == ' ' || next == '\t') {
            // A backslash immediately before a run of whitespace/newlines
            // folds that whole run away, per the multiline-basic rule.
            let mut saw_newline = false;
            while matches!(chars.peek(), Some(' ' | '\t' | '\n')) {
                if chars.peek() == Some(&'\n') {
                    saw_newline = true;
                }
                chars.next();
            }
            if saw_newline {
                continue;
            }
            return Err(parsing_error(
                "a newline somewhere in the folded whitespace run",
                "only spaces/tabs",
            ));
        }

        chars.next();
        match next {
            '"' => out.push('"'),
            '\\' => out.push('\\'),
            't' => out.push('\t'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            'u' => out.push(read_unicode_escape(&mut chars, 4)?),
            'U' => out.push(read_unicode_escape(&mut chars, 8)?),
            other => {
                return Err(parsing_error(
                    "one of \\\" \\\\ \\t \\n \\r \\uXXXX \\UXXXXXXXX",
                    &format!("\\{other}"),
                ));
            }
        }
    }

    Ok(out)
}

fn read_unicode_escape(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    digits: usize,
) -> Result<char, TomlError> {
    let mut hex = String::with_capacity(digits);
    for _ in 0..digits {
        match chars.next() {
            Some(c) if c.is_ascii_hexdigit() => hex.push(c),
            _ => return Err(parsing_error("enough hex digits for a unicode escape", &hex)),
        }
    }
    let code = u32::from_str_radix(&hex, 16).map_err(|_| parsing_error("a valid hex escape", &hex))?;
    char::from_u32(code).ok_or_else(|| parsing_error("a valid unicode scalar value", &hex))
}

fn strip_quotes<'a>(text: &'a str, quote_len: usize) -> &'a str {
    &text[quote_len..text.len() - quote_len]
}

fn trim_leading_newline(body: &str) -> &str {
    body.strip_prefix('\n').unwrap_or(body)
}

fn basic_string_to_raw(text: &str) -> Result<String, TomlError> {
    process_escapes(strip_quotes(text, 1), false)
}

fn literal_string_to_raw(text: &str) -> String {
    strip_quotes(text, 1).to_string()
}

fn multiline_basic_to_raw(text: &str) -> Result<String, TomlError> {
    let body = trim_leading_newline(strip_quotes(text, 3));
    process_escapes(body, true)
}

fn multiline_literal_to_raw(text: &str) -> String {
    trim_leading_newline(strip_quotes(text, 3)).to_string()
}

fn parse_date(text: &str) -> Result<TomlDate, TomlError> {
    let bad = || parsing_error("an RFC 3339 date/time", text);

    let year: i32 = text.get(0..4).ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let month: u8 = text.get(5..7).ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let day: u8 = text.get(8..10).ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let month = time::Month::try_from(month).map_err(|_| bad())?;
    let date = time::Date::from_calendar_date(year, month, day).map_err(|_| bad())?;

    if text.len() == 10 {
        return Ok(TomlDate::Date(date));
    }

    let hh: u8 = text.get(11..13).ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let mm: u8 = text.get(14..16).ok_or_else(bad)?.parse().map_err(|_| bad())?;
    let ss: u8 = text.get(17..19).ok_or_else(bad)?.parse().map_err(|_| bad())?;

    let mut idx = 19;
    let mut nanosecond = 0u32;
    if text.as_bytes().get(idx) == Some(&b'.') {
        let start = idx + 1;
        let mut end = start;
        while text.as_bytes().get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
        let mut frac = text[start..end].to_string();
        frac.truncate(9);
        while frac.len() < 9 {
            frac.push('0');
        }
        nanosecond = frac.parse().map_err(|_| bad())?;
        idx = end;
    }

    let time = time::Time::from_hms_nano(hh, mm, ss, nanosecond).map_err(|_| bad())?;
    let naive = time::PrimitiveDateTime::new(date, time);

    match text.as_bytes().get(idx) {
        None => Ok(TomlDate::LocalDateTime(naive)),
        Some(b'Z' | b'z') => Ok(TomlDate::OffsetDateTime(naive.assume_utc())),
        Some(b'+' | b'-') => {
            let sign = if text.as_bytes()[idx] == b'-' { -1i8 } else { 1i8 };
            let oh: i8 = text.get(idx + 1..idx + 3).ok_or_else(bad)?.parse().map_err(|_| bad())?;
            let om: i8 = text.get(idx + 4..idx + 6).ok_or_else(bad)?.parse().map_err(|_| bad())?;
            let offset = time::UtcOffset::from_hms(sign * oh, sign * om, 0).map_err(|_| bad())?;
            Ok(TomlDate::OffsetDateTime(naive.assume_offset(offset)))
        }
        _ => Err(bad()),
    }
}

fn format_ymd(date: time::Date) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day())
}

fn format_hms(hour: u8, minute: u8, second: u8) -> String {
    format!("{hour:02}:{minute:02}:{second:02}")
}

pub fn format_date(date: &TomlDate) -> String {
    match date {
        TomlDate::Date(d) => format_ymd(*d),
        TomlDate::LocalDateTime(dt) => {
            format!("{}T{}", format_ymd(dt.date()), format_hms(dt.hour(), dt.minute(), dt.second()))
        }
        TomlDate::OffsetDateTime(dt) => {
            let offset = dt.offset();
            let suffix = if offset.is_utc() {
                "Z".to_string()
            } else {
                let (h, m, _) = (offset.whole_hours(), offset.minutes_past_hour(), offset.seconds_past_minute());
                format!("{}{:02}:{:02}", if h < 0 || m < 0 { "-" } else { "+" }, h.abs(), m.abs())
            };
            format!(
                "{}T{}{}",
                format_ymd(dt.date()),
                format_hms(dt.hour(), dt.minute(), dt.second()),
                suffix
            )
        }
    }
}

/// Projects a single token to its primitive value, per `spec.md` §4.4.
pub fn token_to_primitive(token: &Token) -> Result<PrimitiveValue, TomlError> {
    match token.ty {
        TokenType::Integer => parse_integer(&token.text).map(PrimitiveValue::Integer),
        TokenType::Float => parse_float(&token.text).map(PrimitiveValue::Float),
        TokenType::True => Ok(PrimitiveValue::Boolean(true)),
        TokenType::False => Ok(PrimitiveValue::Boolean(false)),
        TokenType::Date => parse_date(&token.text).map(PrimitiveValue::Date),
        TokenType::BareKey => Ok(PrimitiveValue::String(token.text.clone())),
        TokenType::BasicString => basic_string_to_raw(&token.text).map(PrimitiveValue::String),
        TokenType::LiteralString => Ok(PrimitiveValue::String(literal_string_to_raw(&token.text))),
        TokenType::MultilineBasicString => multiline_basic_to_raw(&token.text).map(PrimitiveValue::String),
        TokenType::MultilineLiteralString => {
            Ok(PrimitiveValue::String(multiline_literal_to_raw(&token.text)))
        }
        other => Err(TomlError::NotPrimitive {
            path: other.to_string(),
        }),
    }
}

/// Projects a token that occupies key position to its string value. Any
/// string-kind token type is accepted; non-string tokens are rejected even
/// when they would otherwise projectable (e.g. a numeric-looking token,
/// since the grammar's `Key` production only accepts `String`).
pub fn token_to_key(token: &Token) -> Result<String, TomlError> {
    if token.kind() != TokenKind::String {
        return Err(parsing_error("a key", &token.ty.to_string()));
    }
    match token_to_primitive(token)? {
        PrimitiveValue::String(s) => Ok(s),
        _ => unreachable!("string-kind tokens always project to PrimitiveValue::String"),
    }
}

/// One `key = value` pair found directly inside a table body or inline
/// table, with the indices of both its key and value elements so callers
/// can splice in place.
#[derive(Debug, Clone, Copy)]
pub struct PairLocation {
    pub key_index: usize,
    pub value_index: usize,
}

/// Scans a container's children for `key = value` pairs, skipping metadata
/// elements between them. Shared by table bodies, inline tables, and the
/// mutator's in-place update/insert/delete logic.
pub(crate) fn scan_pairs(children: &[Element]) -> Result<Vec<(String, PairLocation)>, TomlError> {
    let mut pairs = Vec::new();
    let mut i = 0;
    while i < children.len() {
        if let Element::Atomic(_) = &children[i] {
            let mut j = i + 1;
            while matches!(children.get(j), Some(Element::Whitespace(_))) {
                j += 1;
            }
            if matches!(children.get(j), Some(Element::Operator(r)) if r.tokens[0].ty == TokenType::Eq) {
                j += 1;
                while matches!(children.get(j), Some(Element::Whitespace(_))) {
                    j += 1;
                }
                let key_token = children[i].atomic_token().ok_or_else(|| TomlError::InvalidElement {
                    path: "pair key".to_string(),
                    expected: "an atomic token",
                })?;
                let key = token_to_key(key_token)?;
                if children.get(j).is_none() {
                    return Err(TomlError::InvalidTOMLFile {
                        reason: format!("key {key:?} has no value"),
                    });
                }
                pairs.push((key, PairLocation { key_index: i, value_index: j }));
                i = j + 1;
                continue;
            }
        }
        i += 1;
    }
    Ok(pairs)
}

/// The keys a table body or inline table defines directly, in source order.
pub fn table_keys(body: &Element) -> Result<Vec<String>, TomlError> {
    let children = body.children().ok_or_else(|| TomlError::InvalidElement {
        path: "table body".to_string(),
        expected: "a container element",
    })?;
    Ok(scan_pairs(children)?.into_iter().map(|(k, _)| k).collect())
}

/// Looks up a single direct key in a table body or inline table, returning
/// the value element it's bound to.
pub fn find_value_element<'e>(body: &'e Element, key: &str) -> Result<Option<&'e Element>, TomlError> {
    let children = body.children().ok_or_else(|| TomlError::InvalidElement {
        path: "table body".to_string(),
        expected: "a container element",
    })?;
    let Some((_, loc)) = scan_pairs(children)?.into_iter().find(|(k, _)| k == key) else {
        return Ok(None);
    };
    Ok(Some(&children[loc.value_index]))
}

/// Projects a value element (atomic, array, or inline table) to its
/// primitive value, recursing into composite containers.
pub fn element_to_primitive(elem: &Element) -> Result<PrimitiveValue, TomlError> {
    match elem {
        Element::Atomic(_) => {
            let token = elem.atomic_token().ok_or_else(|| TomlError::InvalidElement {
                path: "atomic value".to_string(),
                expected: "an atomic token",
            })?;
            token_to_primitive(token)
        }
        Element::Array(_) => {
            let children = elem.children().ok_or_else(|| TomlError::InvalidElement {
                path: "array value".to_string(),
                expected: "a container element",
            })?;
            let items = children
                .iter()
                .filter(|c| matches!(c, Element::Atomic(_) | Element::Array(_) | Element::InlineTable(_)))
                .map(element_to_primitive)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(PrimitiveValue::Array(items))
        }
        Element::InlineTable(_) => {
            let children = elem.children().ok_or_else(|| TomlError::InvalidElement {
                path: "inline table value".to_string(),
                expected: "a container element",
            })?;
            let mut map = IndexMap::new();
            for (key, loc) in scan_pairs(children)? {
                map.insert(key, element_to_primitive(&children[loc.value_index])?);
            }
            Ok(PrimitiveValue::Table(map))
        }
        other => Err(TomlError::NotPrimitive {
            path: format!("{other:?} is not a value element"),
        }),
    }
}

/// Projects a table body's direct `key = value` pairs into a primitive map,
/// without descending into `[header]` sections (those are separate entries,
/// assembled by [`crate::navigable`]).
pub fn table_body_to_primitive(body: &Element) -> Result<IndexMap<String, PrimitiveValue>, TomlError> {
    let children = body.children().ok_or_else(|| TomlError::InvalidElement {
        path: "table body".to_string(),
        expected: "a container element",
    })?;
    let mut map = IndexMap::new();
    for (key, loc) in scan_pairs(children)? {
        map.insert(key, element_to_primitive(&children[loc.value_index])?);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize;

    fn token_of(source: &str) -> Token {
        tokenize(source).unwrap().into_iter().next().unwrap()
    }

    #[test]
    fn basic_string_processes_escapes() {
        let t = token_of(r#""a\tb\né""#);
        assert_eq!(
            token_to_primitive(&t).unwrap(),
            PrimitiveValue::String("a\tb\né".to_string())
        );
    }

    #[test]
    fn unknown_escape_is_rejected() {
        let t = token_of(r#""bad \a escape""#);
        assert!(token_to_primitive(&t).is_err());
    }

    #[test]
    fn literal_string_is_verbatim() {
        let t = token_of(r"'no \n escapes'");
        assert_eq!(
            token_to_primitive(&t).unwrap(),
            PrimitiveValue::String(r"no \n escapes".to_string())
        );
    }

    #[test]
    fn multiline_basic_trims_one_leading_newline_and_folds_backslash_lines() {
        let t = token_of("\"\"\"\nfoo\\\n    bar\"\"\"");
        assert_eq!(
            token_to_primitive(&t).unwrap(),
            PrimitiveValue::String("foobar".to_string())
        );
    }

    #[test]
    fn integer_strips_underscores() {
        let t = token_of("1_000_000");
        assert_eq!(token_to_primitive(&t).unwrap(), PrimitiveValue::Integer(1_000_000));
    }

    #[test]
    fn negative_underscored_integer_projects_correctly() {
        let t = token_of("-1_2_3_4_5");
        assert_eq!(token_to_primitive(&t).unwrap(), PrimitiveValue::Integer(-12345));
    }

    #[test]
    fn underscored_float_with_exponent_projects_correctly() {
        let t = token_of("9_224_617.445_991_228_313");
        assert_eq!(token_to_primitive(&t).unwrap(), PrimitiveValue::Float(9_224_617.445_991_228_313));
    }

    #[test]
    fn date_only_parses_to_date_variant() {
        let t = token_of("1979-05-27");
        match token_to_primitive(&t).unwrap() {
            PrimitiveValue::Date(TomlDate::Date(d)) => {
                assert_eq!(d.year(), 1979);
            }
            other => panic!("expected Date, got {other:?}"),
        }
    }

    #[test]
    fn offset_date_time_round_trips_through_format_date() {
        let t = token_of("1979-05-27T07:32:00Z");
        let PrimitiveValue::Date(date) = token_to_primitive(&t).unwrap() else {
            panic!("expected a date");
        };
        assert_eq!(format_date(&date), "1979-05-27T07:32:00Z");
    }
}
