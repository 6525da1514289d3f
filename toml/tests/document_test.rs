//! Navigation, duplicate detection, array-of-tables cursors, and the
//! transactional-mutation guarantee, exercised through [`toml_weave::TOMLFile`].

use toml_weave::value::TomlDate;
use toml_weave::{PrimitiveValue, TOMLFile, TomlError};

#[test]
fn duplicate_plain_table_is_rejected_at_parse_time() {
    let err = TOMLFile::parse("[a]\nx = 1\n[a]\ny = 2\n").unwrap_err();
    assert!(matches!(err, TomlError::DuplicateTables { .. }));
}

#[test]
fn a_name_used_as_both_table_and_array_of_tables_is_rejected() {
    let err = TOMLFile::parse("[a]\nx = 1\n[[a]]\ny = 2\n").unwrap_err();
    assert!(matches!(err, TomlError::DuplicateTables { .. }));
}

#[test]
fn a_scalar_key_colliding_with_a_subtable_is_rejected() {
    let err = TOMLFile::parse("[a]\nb = 1\n[a.b]\nx = 1\n").unwrap_err();
    assert!(matches!(err, TomlError::DuplicateKeys { .. }));
}

#[test]
fn a_write_that_would_collide_with_an_existing_scalar_key_aborts_cleanly() {
    // "b" is already a scalar key directly inside [a]; writing through
    // ["a", "b", "c"] would need a `[a.b]` section, which collides with
    // that scalar. The whole write must abort, leaving the document
    // byte-identical to before the attempt.
    let source = "[a]\nb = 1\n";
    let mut file = TOMLFile::parse(source).unwrap();
    let before = file.dump();
    let err = file.set(&["a", "b", "c"], PrimitiveValue::Integer(2)).unwrap_err();
    assert!(matches!(err, TomlError::DuplicateKeys { .. }));
    assert_eq!(file.dump(), before);
    assert_eq!(file.get(&["a", "b"]).unwrap(), Some(PrimitiveValue::Integer(1)));
}

#[test]
fn reading_a_missing_path_never_creates_structure() {
    let mut file = TOMLFile::new();
    let before = file.dump();
    assert_eq!(file.get(&["fruit", "name"]).unwrap(), None);
    assert_eq!(file.dump(), before);
}

#[test]
fn array_of_tables_cursor_builds_entries_one_at_a_time() {
    let mut file = TOMLFile::new();
    {
        let mut fruit = file.array("fruit");
        assert_eq!(fruit.len(), 0);
        fruit.entry(0).unwrap().set("name", PrimitiveValue::String("apple".to_string())).unwrap();
    }
    {
        let mut fruit = file.array("fruit");
        assert_eq!(fruit.len(), 1);
        let mut apple = fruit.entry(0).unwrap();
        assert_eq!(apple.get("name").unwrap(), Some(PrimitiveValue::String("apple".to_string())));
        apple.set("color", PrimitiveValue::String("red".to_string())).unwrap();
    }
    assert_eq!(
        file.dump(),
        "[[fruit]]\nname = \"apple\"\ncolor = \"red\"\n\n"
    );
}

#[test]
fn navigating_an_array_of_tables_name_before_any_write_creates_nothing() {
    let mut file = TOMLFile::new();
    assert_eq!(file.array("fruit").len(), 0);
    assert_eq!(file.dump(), "");
}

#[test]
fn offset_datetime_round_trips_through_get_and_set() {
    let mut file = TOMLFile::parse("t = 1979-05-27T07:32:00Z\n").unwrap();
    let value = file.get(&["t"]).unwrap().unwrap();
    assert!(matches!(value, PrimitiveValue::Date(TomlDate::OffsetDateTime(_))));
    file.set(&["t"], value).unwrap();
    assert_eq!(file.dump(), "t = 1979-05-27T07:32:00Z\n");
}

#[test]
fn keys_reports_every_reachable_top_level_name() {
    let file = TOMLFile::parse("a = 1\n[b]\nc = 2\n[[d]]\ne = 3\n").unwrap();
    let mut keys = file.keys().unwrap();
    keys.sort();
    assert_eq!(keys, vec!["a".to_string(), "b".to_string(), "d".to_string()]);
}
