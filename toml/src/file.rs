//! The public facade over a parsed document, per `spec.md` §6: `TOMLFile`
//! bundles the element tree with its derived navigable structure and keeps
//! the two in sync across every mutation.

use indexmap::IndexMap;

use crate::element::Element;
use crate::error::TomlError;
use crate::mutator;
use crate::navigable::{self, Lookup, NavNode};
use crate::parser;
use crate::prettify::PrettifyRule;
use crate::value::{self, PrimitiveValue};

/// A parsed or freshly created TOML document. Owns the element tree and a
/// navigable index built over it; every mutating method rebuilds the index
/// before committing, so a failed mutation (e.g. one that would create a
/// duplicate table) leaves the document unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct TOMLFile {
    root: Element,
    nav: NavNode,
}

fn to_path(path: &[&str]) -> Vec<String> {
    path.iter().map(|s| s.to_string()).collect()
}

impl TOMLFile {
    pub fn parse(source: &str) -> Result<Self, TomlError> {
        let root = parser::parse(source)?;
        let nav = navigable::build_navigable(&root)?;
        Ok(Self { root, nav })
    }

    pub fn new() -> Self {
        let root = Element::file(Vec::new());
        Self { root, nav: NavNode::default() }
    }

    pub fn dump(&self) -> String {
        self.root.source()
    }

    /// A recursive projection of the whole document to a plain mapping,
    /// dropping all whitespace, comment, and punctuation metadata.
    pub fn primitive(&self) -> Result<PrimitiveValue, TomlError> {
        Ok(PrimitiveValue::Table(self.nav.snapshot(self.bodies()?)))
    }

    /// The file's top-level children. `TOMLFile` only ever stores an
    /// `Element::File` (built by `parse`, `new`, or `commit`), but the
    /// invariant is enforced at those boundaries rather than asserted here.
    fn bodies(&self) -> Result<&[Element], TomlError> {
        self.root.children().ok_or_else(|| TomlError::InvalidElement {
            path: "file".to_string(),
            expected: "a container element",
        })
    }

    pub fn get(&self, path: &[&str]) -> Result<Option<PrimitiveValue>, TomlError> {
        self.get_path(&to_path(path))
    }

    fn get_path(&self, path: &[String]) -> Result<Option<PrimitiveValue>, TomlError> {
        let Some((init, last)) = path.split_last().map(|(l, i)| (i, l)) else {
            return Ok(Some(self.primitive()?));
        };
        let Some(node) = self.nav.resolve(init) else {
            return Ok(None);
        };
        match node.get(last, self.bodies()?)? {
            None => Ok(None),
            Some(Lookup::Scalar(v)) => Ok(Some(v)),
            Some(Lookup::Node(n)) => Ok(Some(PrimitiveValue::Table(n.snapshot(self.bodies()?)?))),
            Some(Lookup::Array(indices)) => {
                let bodies = self.bodies()?;
                let items = indices
                    .iter()
                    .map(|&i| Ok(PrimitiveValue::Table(value::table_body_to_primitive(&bodies[i])?)))
                    .collect::<Result<Vec<_>, TomlError>>()?;
                Ok(Some(PrimitiveValue::Array(items)))
            }
        }
    }

    pub fn contains(&self, path: &[&str]) -> Result<bool, TomlError> {
        Ok(self.get(path)?.is_some())
    }

    pub fn keys(&self) -> Result<Vec<String>, TomlError> {
        self.nav.keys(self.bodies()?)
    }

    pub fn items(&self) -> Result<Vec<(String, PrimitiveValue)>, TomlError> {
        match self.primitive()? {
            PrimitiveValue::Table(map) => Ok(map.into_iter().collect()),
            _ => unreachable!("TOMLFile::primitive always returns a Table"),
        }
    }

    /// Sets the value at `path`, creating any missing table sections along
    /// the way. `path`'s last segment is the key; everything before it is
    /// the table the key lives in (empty for a top-level key).
    pub fn set(&mut self, path: &[&str], value: PrimitiveValue) -> Result<(), TomlError> {
        let path = to_path(path);
        let (table_path, key) = path.split_at(path.len() - 1);
        let key = &key[0];

        let mut children = self.bodies()?.to_vec();
        let body_index = match table_path.is_empty() {
            true => ensure_root_body(&mut children),
            false => match self.nav.resolve_table(table_path) {
                Some(idx) => idx,
                None => mutator::splice_fresh_table(&mut children, table_path, false)?,
            },
        };
        write_pair(&mut children, body_index, key, &value)?;
        self.commit(children)
    }

    /// Removes `path`'s key from its table. Returns `false` if the table or
    /// the key doesn't exist.
    pub fn delete(&mut self, path: &[&str]) -> Result<bool, TomlError> {
        let path = to_path(path);
        let (table_path, key) = path.split_at(path.len() - 1);
        let key = &key[0];

        let Some(body_index) = (if table_path.is_empty() { self.nav.table } else { self.nav.resolve_table(table_path) })
        else {
            return Ok(false);
        };

        let mut children = self.bodies()?.to_vec();
        let body_children = children[body_index].children_mut().ok_or_else(|| TomlError::InvalidElement {
            path: "table body".to_string(),
            expected: "a container element",
        })?;
        let removed = mutator::delete_table_pair(body_children, key)?;
        if removed {
            self.commit(children)?;
        }
        Ok(removed)
    }

    /// Ensures a `[path]` table section exists, splicing an empty one if
    /// it's missing. Used to materialize tables that have no keys of their
    /// own yet.
    pub fn ensure_table(&mut self, path: &[&str]) -> Result<(), TomlError> {
        let path = to_path(path);
        if path.is_empty() || self.nav.resolve_table(&path).is_some() {
            return Ok(());
        }
        let mut children = self.bodies()?.to_vec();
        mutator::splice_fresh_table(&mut children, &path, false)?;
        self.commit(children)
    }

    /// A cursor over the array-of-tables named `name`, for building or
    /// editing `[[name]]` entries one at a time.
    pub fn array<'f>(&'f mut self, name: &str) -> ArrayCursor<'f> {
        ArrayCursor { file: self, path: vec![name.to_string()] }
    }

    /// Applies a sequence of prettifier rules to the element tree in place,
    /// then rebuilds the navigable structure.
    pub fn prettify(&mut self, rules: &[&dyn PrettifyRule]) -> Result<(), TomlError> {
        let mut children = self.bodies()?.to_vec();
        for rule in rules {
            rule.apply(&mut children);
        }
        self.commit(children)
    }

    fn commit(&mut self, children: Vec<Element>) -> Result<(), TomlError> {
        let candidate = Element::file(children);
        let nav = navigable::build_navigable(&candidate)?;
        self.root = candidate;
        self.nav = nav;
        Ok(())
    }

    fn array_len(&self, path: &[String]) -> usize {
        self.nav.resolve(path).and_then(|n| n.arrays.as_ref()).map(Vec::len).unwrap_or(0)
    }

    fn ensure_array_entry(&mut self, path: &[String], index: usize) -> Result<(), TomlError> {
        let current_len = self.array_len(path);
        if index < current_len {
            return Ok(());
        }
        let mut children = self.bodies()?.to_vec();
        for _ in current_len..=index {
            mutator::splice_fresh_table(&mut children, path, true)?;
        }
        self.commit(children)
    }

    fn array_entry_body_index(&self, path: &[String], index: usize) -> Result<usize, TomlError> {
        self.nav
            .resolve(path)
            .and_then(|n| n.arrays.as_ref())
            .and_then(|v| v.get(index))
            .copied()
            .ok_or_else(|| TomlError::NoArrayFound { name: path.join(".") })
    }
}

impl Default for TOMLFile {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_root_body(children: &mut Vec<Element>) -> usize {
    if !matches!(children.first(), Some(Element::TableBody(_))) {
        children.insert(0, Element::table_body(Vec::new()));
    }
    0
}

fn write_pair(children: &mut [Element], body_index: usize, key: &str, value: &PrimitiveValue) -> Result<(), TomlError> {
    let body_children = children[body_index].children_mut().ok_or_else(|| TomlError::InvalidElement {
        path: "table body".to_string(),
        expected: "a container element",
    })?;
    let pairs = value::scan_pairs(body_children)?;
    if pairs.iter().any(|(k, _)| k == key) {
        mutator::set_existing(body_children, key, value)?;
    } else {
        mutator::insert_new_key(body_children, key, value)?;
    }
    Ok(())
}

/// A cursor over one array-of-tables name, handed out by [`TOMLFile::array`].
pub struct ArrayCursor<'f> {
    file: &'f mut TOMLFile,
    path: Vec<String>,
}

impl<'f> ArrayCursor<'f> {
    pub fn len(&self) -> usize {
        self.file.array_len(&self.path)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The table cursor for the entry at `index`, creating it (and any
    /// entries before it) if it doesn't exist yet.
    pub fn entry(&mut self, index: usize) -> Result<TableCursor<'_>, TomlError> {
        self.file.ensure_array_entry(&self.path, index)?;
        Ok(TableCursor { file: &mut *self.file, path: self.path.clone(), index })
    }
}

/// A cursor over one table body inside an array-of-tables, handed out by
/// [`ArrayCursor::entry`].
pub struct TableCursor<'f> {
    file: &'f mut TOMLFile,
    path: Vec<String>,
    index: usize,
}

impl<'f> TableCursor<'f> {
    fn body_index(&self) -> Result<usize, TomlError> {
        self.file.array_entry_body_index(&self.path, self.index)
    }

    pub fn set(&mut self, key: &str, value: PrimitiveValue) -> Result<(), TomlError> {
        let body_index = self.body_index()?;
        let mut children = self.file.bodies()?.to_vec();
        write_pair(&mut children, body_index, key, &value)?;
        self.file.commit(children)
    }

    pub fn get(&self, key: &str) -> Result<Option<PrimitiveValue>, TomlError> {
        let body_index = self.body_index()?;
        value::find_value_element(&self.file.bodies()?[body_index], key)?
            .map(value::element_to_primitive)
            .transpose()
    }
}

/// Assembles a fresh [`TOMLFile`] from a plain mapping, per the primitive
/// round-trip property: every table becomes a `[header]` section, every
/// array-of-values an inline array, every array-of-tables a `[[header]]`
/// sequence.
pub fn from_primitive(map: &IndexMap<String, PrimitiveValue>) -> Result<TOMLFile, TomlError> {
    let mut file = TOMLFile::new();
    for (key, value) in map {
        assign_top_level(&mut file, key, value)?;
    }
    Ok(file)
}

fn assign_top_level(file: &mut TOMLFile, key: &str, value: &PrimitiveValue) -> Result<(), TomlError> {
    match value {
        PrimitiveValue::Table(inner) => {
            file.ensure_table(&[key])?;
            for (k, v) in inner {
                file.set(&[key, k.as_str()], v.clone())?;
            }
            Ok(())
        }
        PrimitiveValue::Array(items) if items.iter().all(|i| matches!(i, PrimitiveValue::Table(_))) && !items.is_empty() => {
            let mut cursor = file.array(key);
            for (i, item) in items.iter().enumerate() {
                let PrimitiveValue::Table(inner) = item else { unreachable!() };
                let mut entry = cursor.entry(i)?;
                for (k, v) in inner {
                    entry.set(k, v.clone())?;
                }
            }
            Ok(())
        }
        scalar => file.set(&[key], scalar.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::TomlDate;

    #[test]
    fn scenario_s1_appends_after_existing_pairs() {
        let mut file = TOMLFile::parse("[apple]\ncolor = \"green\"\nname = \"yonagold\"\n").unwrap();
        file.set(&["apple", "other_name"], PrimitiveValue::String("nevermind".to_string())).unwrap();
        assert_eq!(
            file.dump(),
            "[apple]\ncolor = \"green\"\nname = \"yonagold\"\nother_name = \"nevermind\"\n"
        );
    }

    #[test]
    fn scenario_s2_creates_fresh_table_from_empty_file() {
        let mut file = TOMLFile::new();
        file.set(&["details", "id"], PrimitiveValue::Integer(12)).unwrap();
        assert_eq!(file.dump(), "[details]\nid = 12\n\n");
    }

    #[test]
    fn scenario_s3_builds_array_of_tables_entry_by_entry() {
        let mut file = TOMLFile::new();
        {
            let mut fruit = file.array("fruit");
            fruit.entry(0).unwrap().set("name", PrimitiveValue::String("banana".to_string())).unwrap();
        }
        {
            let mut fruit = file.array("fruit");
            fruit.entry(1).unwrap().set("name", PrimitiveValue::String("grapes".to_string())).unwrap();
        }
        assert_eq!(
            file.dump(),
            "[[fruit]]\nname = \"banana\"\n\n[[fruit]]\nname = \"grapes\"\n\n"
        );
    }

    #[test]
    fn scenario_s4_preserves_nested_indentation() {
        let mut file = TOMLFile::parse("[handlers]\n  [handlers.env]\n    K = \"v\"\n").unwrap();
        file.set(&["handlers", "env", "K2"], PrimitiveValue::String("w".to_string())).unwrap();
        assert_eq!(
            file.dump(),
            "[handlers]\n  [handlers.env]\n    K = \"v\"\n    K2 = \"w\"\n"
        );
    }

    #[test]
    fn scenario_s6_rejects_bad_escape_on_read_not_on_parse() {
        let file = TOMLFile::parse("invalid-escape = \"bad \\a escape\"\n").unwrap();
        assert!(file.get(&["invalid-escape"]).is_err());
    }

    #[test]
    fn no_op_set_preserves_exact_bytes() {
        let source = "[apple]\ncolor = \"green\"\n";
        let mut file = TOMLFile::parse(source).unwrap();
        let current = file.get(&["apple", "color"]).unwrap().unwrap();
        file.set(&["apple", "color"], current).unwrap();
        assert_eq!(file.dump(), source);
    }

    #[test]
    fn delete_removes_key_and_reports_absence() {
        let mut file = TOMLFile::parse("a = 1\nb = 2\n").unwrap();
        assert!(file.delete(&["a"]).unwrap());
        assert_eq!(file.dump(), "b = 2\n");
        assert!(!file.delete(&["a"]).unwrap());
    }

    #[test]
    fn date_value_round_trips_through_set() {
        let mut file = TOMLFile::parse("d = 1979-05-27\n").unwrap();
        let value = file.get(&["d"]).unwrap().unwrap();
        assert!(matches!(value, PrimitiveValue::Date(TomlDate::Date(_))));
        file.set(&["d"], value).unwrap();
        assert_eq!(file.dump(), "d = 1979-05-27\n");
    }
}
