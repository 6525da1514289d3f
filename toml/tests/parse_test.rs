//! Parsing tests for the TOML element tree, exercised through the public
//! crate surface rather than `parser` internals.

use toml_weave::element::Element;
use toml_weave::parser::parse;
use toml_weave::TomlError;

#[test]
fn bare_keys_and_quoted_keys_both_parse() {
    let file = parse("a = 1\n\"b c\" = 2\n").unwrap();
    assert_eq!(file.source(), "a = 1\n\"b c\" = 2\n");
}

#[test]
fn dotted_table_headers_nest_under_one_root() {
    let file = parse("[a.b.c]\nx = 1\n").unwrap();
    let Element::File(_) = &file else { panic!("expected a file") };
    assert_eq!(file.source(), "[a.b.c]\nx = 1\n");
}

#[test]
fn date_wins_over_integer_dot_integer() {
    // `1979-05-27` must lex as one Date token, not `Integer '-' Integer`
    // repeated across three hyphen-separated runs.
    let file = parse("d = 1979-05-27\n").unwrap();
    assert_eq!(file.source(), "d = 1979-05-27\n");
}

#[test]
fn float_wins_over_integer_dot_integer() {
    let file = parse("f = 3.14\n").unwrap();
    assert_eq!(file.source(), "f = 3.14\n");
}

#[test]
fn array_of_tables_headers_use_double_brackets() {
    let file = parse("[[fruit]]\nname = \"a\"\n").unwrap();
    assert_eq!(file.source(), "[[fruit]]\nname = \"a\"\n");
}

#[test]
fn unterminated_inline_table_is_a_parse_error() {
    assert!(matches!(parse("k = { a = 1\n"), Err(TomlError::Parsing { .. })));
}

#[test]
fn an_unknown_escape_in_a_string_body_still_parses() {
    // The lexer accepts any backslash escape shape; only value projection
    // (scenario S6) rejects one it can't interpret.
    assert!(parse("s = \"bad \\a escape\"\n").is_ok());
}

#[test]
fn comments_are_preserved_verbatim() {
    let source = "# header comment\nkey = 1 # trailing\n";
    let file = parse(source).unwrap();
    assert_eq!(file.source(), source);
}
