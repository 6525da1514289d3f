//! Byte-exact round-trip and mutation-preserves-formatting tests, exercised
//! through [`toml_weave::TOMLFile`].

use toml_weave::{PrimitiveValue, TOMLFile};

const REPRESENTATIVE: &str = "\
# a representative document
title = \"example\"

[owner]
name = \"tom\"
dob = 1979-05-27

[database]
enabled = true
ports = [8001, 8001, 8002]

[servers]

  [servers.alpha]
  ip = \"10.0.0.1\"

  [servers.beta]
  ip = \"10.0.0.2\"

[[fruit]]
name = \"apple\"

[[fruit]]
name = \"banana\"
";

#[test]
fn an_untouched_document_dumps_back_byte_for_byte() {
    let file = TOMLFile::parse(REPRESENTATIVE).unwrap();
    assert_eq!(file.dump(), REPRESENTATIVE);
}

#[test]
fn reading_every_key_never_changes_the_dump() {
    let file = TOMLFile::parse(REPRESENTATIVE).unwrap();
    let _ = file.get(&["owner", "name"]).unwrap();
    let _ = file.get(&["servers", "alpha", "ip"]).unwrap();
    let _ = file.get(&["fruit"]).unwrap();
    let _ = file.keys().unwrap();
    assert_eq!(file.dump(), REPRESENTATIVE);
}

#[test]
fn setting_an_existing_value_touches_only_that_value() {
    let mut file = TOMLFile::parse(REPRESENTATIVE).unwrap();
    file.set(&["owner", "name"], PrimitiveValue::String("jerry".to_string())).unwrap();
    assert_eq!(
        file.dump(),
        REPRESENTATIVE.replace("name = \"tom\"", "name = \"jerry\"")
    );
}

#[test]
fn deleting_a_key_leaves_unrelated_comments_and_blank_lines_alone() {
    let mut file = TOMLFile::parse(REPRESENTATIVE).unwrap();
    assert!(file.delete(&["database", "enabled"]).unwrap());
    assert_eq!(file.get(&["database", "enabled"]).unwrap(), None);
    assert_eq!(
        file.get(&["database", "ports"]).unwrap(),
        Some(PrimitiveValue::Array(vec![
            PrimitiveValue::Integer(8001),
            PrimitiveValue::Integer(8001),
            PrimitiveValue::Integer(8002),
        ]))
    );
    assert!(file.dump().starts_with("# a representative document\n"));
}

#[test]
fn primitive_snapshot_round_trips_through_from_primitive() {
    let file = TOMLFile::parse(REPRESENTATIVE).unwrap();
    let snapshot = file.primitive().unwrap();
    let PrimitiveValue::Table(map) = &snapshot else {
        panic!("expected a table")
    };
    let rebuilt = toml_weave::file::from_primitive(map).unwrap();
    assert_eq!(rebuilt.primitive().unwrap(), snapshot);
}
