//! Entry extraction: the first pass over a parsed file's element sequence,
//! turning `(header, body)` pairs into the three entry shapes `spec.md`
//! §4.5 names. This is a read-only view over element indices — entries
//! never own or clone element data, since the mutator needs to keep
//! splicing the same backing `Vec<Element>`.

use crate::element::Element;
use crate::error::TomlError;
use crate::token::TokenType;
use crate::value::token_to_key;

/// One top-level section of a file, in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// The body appearing before the first header, if non-empty.
    Anonymous { body_index: usize },
    /// A plain `[a.b.c]` section.
    Table { name: Vec<String>, body_index: usize },
    /// One body of a `[[a.b.c]]` array-of-tables; entries sharing a name
    /// accumulate rather than colliding.
    ArrayOfTables { name: Vec<String>, body_index: usize },
}

impl Entry {
    pub fn body_index(&self) -> usize {
        match self {
            Entry::Anonymous { body_index }
            | Entry::Table { body_index, .. }
            | Entry::ArrayOfTables { body_index, .. } => *body_index,
        }
    }

    pub fn name(&self) -> Option<&[String]> {
        match self {
            Entry::Anonymous { .. } => None,
            Entry::Table { name, .. } | Entry::ArrayOfTables { name, .. } => Some(name),
        }
    }
}

fn header_is_array(header: &Element) -> Result<bool, TomlError> {
    let children = header
        .children()
        .ok_or_else(|| TomlError::InvalidElement {
            path: "table header".to_string(),
            expected: "a container element",
        })?;
    match children.first() {
        Some(Element::Operator(run)) => Ok(run.tokens[0].ty == TokenType::LDoubleBracket),
        _ => Err(TomlError::InvalidElement {
            path: "table header".to_string(),
            expected: "an opening bracket operator",
        }),
    }
}

fn header_name(header: &Element) -> Result<Vec<String>, TomlError> {
    let children = header.children().ok_or_else(|| TomlError::InvalidElement {
        path: "table header".to_string(),
        expected: "a container element",
    })?;
    children
        .iter()
        .filter_map(Element::atomic_token)
        .map(token_to_key)
        .collect()
}

/// Walks the file's children once, producing entries in source order.
/// Assumes `file` has already been through [`crate::parser::sanitize`], so
/// every header is immediately followed by a body.
pub fn extract_entries(file: &Element) -> Result<Vec<Entry>, TomlError> {
    let children = file.children().ok_or_else(|| TomlError::InvalidElement {
        path: "file".to_string(),
        expected: "a container element",
    })?;

    let mut entries = Vec::new();
    let mut i = 0;

    if matches!(children.first(), Some(Element::TableBody(_))) {
        entries.push(Entry::Anonymous { body_index: 0 });
        i = 1;
    }

    while i < children.len() {
        let header = &children[i];
        if !matches!(header, Element::TableHeader(_)) {
            return Err(TomlError::InvalidTOMLFile {
                reason: format!("expected a table header at position {i}"),
            });
        }
        let name = header_name(header)?;
        let is_array = header_is_array(header)?;

        let body_index = i + 1;
        match children.get(body_index) {
            Some(Element::TableBody(_)) => {}
            _ => {
                return Err(TomlError::InvalidTOMLFile {
                    reason: format!("header {name:?} is not followed by a table body"),
                })
            }
        }

        entries.push(if is_array {
            Entry::ArrayOfTables { name, body_index }
        } else {
            Entry::Table { name, body_index }
        });
        i = body_index + 1;
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn extracts_anonymous_then_table_entries() {
        let file = parse("k = 1\n[a.b]\nx = 1\n").unwrap();
        let entries = extract_entries(&file).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(matches!(entries[0], Entry::Anonymous { body_index: 0 }));
        match &entries[1] {
            Entry::Table { name, .. } => assert_eq!(name, &vec!["a".to_string(), "b".to_string()]),
            other => panic!("expected a table entry, got {other:?}"),
        }
    }

    #[test]
    fn array_of_tables_entries_accumulate_under_one_name() {
        let file = parse("[[fruit]]\nname = \"a\"\n[[fruit]]\nname = \"b\"\n").unwrap();
        let entries = extract_entries(&file).unwrap();
        let names: Vec<_> = entries
            .iter()
            .filter(|e| matches!(e, Entry::ArrayOfTables { .. }))
            .collect();
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn no_leading_body_skips_the_anonymous_entry() {
        let file = parse("[a]\nx = 1\n").unwrap();
        let entries = extract_entries(&file).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(matches!(entries[0], Entry::Table { .. }));
    }
}
