//! The navigable structure: a nested, order-preserving mapping built once
//! over a file's entries, per `spec.md` §4.5. This is the read side — keys
//! route to either a scalar value, a deeper node, or an array-of-tables
//! sequence; [`crate::mutator`] is the write side over the same element
//! sequence.

use indexmap::IndexMap;

use crate::element::Element;
use crate::entries::{extract_entries, Entry};
use crate::error::TomlError;
use crate::value::{element_to_primitive, table_body_to_primitive, table_keys, PrimitiveValue};

/// One node of the navigable tree. A node can simultaneously be a concrete
/// table (`table` set), an array-of-tables (`arrays` set), and a branch
/// point for deeper paths (`children` non-empty) — real TOML documents mix
/// these, e.g. `[a]` followed later by `[a.b]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavNode {
    pub table: Option<usize>,
    pub arrays: Option<Vec<usize>>,
    pub children: IndexMap<String, NavNode>,
}

/// What a single-key lookup inside a node resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<'n> {
    Scalar(PrimitiveValue),
    Node(&'n NavNode),
    Array(&'n [usize]),
}

impl NavNode {
    fn ensure_child(&mut self, seg: &str) -> &mut NavNode {
        self.children.entry(seg.to_string()).or_default()
    }

    /// Resolves `key` against this node: a scalar key in this node's own
    /// table body, then a nested branch, then an array-of-tables name.
    pub fn get<'n>(&'n self, key: &str, bodies: &[Element]) -> Result<Option<Lookup<'n>>, TomlError> {
        if let Some(idx) = self.table {
            if let Some(value) = crate::value::find_value_element(&bodies[idx], key)? {
                return Ok(Some(Lookup::Scalar(element_to_primitive(value)?)));
            }
        }
        if let Some(child) = self.children.get(key) {
            if let Some(indices) = &child.arrays {
                return Ok(Some(Lookup::Array(indices)));
            }
            return Ok(Some(Lookup::Node(child)));
        }
        Ok(None)
    }

    pub fn contains(&self, key: &str, bodies: &[Element]) -> Result<bool, TomlError> {
        Ok(self.get(key, bodies)?.is_some())
    }

    /// Walks a dotted path of branch names, ignoring scalar keys and array
    /// sequences along the way. Used by the mutator to find where an
    /// existing table path already lives before deciding whether a write
    /// needs to splice a fresh section.
    pub fn resolve(&self, path: &[String]) -> Option<&NavNode> {
        let mut node = self;
        for seg in path {
            node = node.children.get(seg)?;
        }
        Some(node)
    }

    pub fn resolve_table(&self, path: &[String]) -> Option<usize> {
        self.resolve(path)?.table
    }

    /// Every key reachable one level below this node: scalar keys from this
    /// node's own table body, plus branch/array names.
    pub fn keys(&self, bodies: &[Element]) -> Result<Vec<String>, TomlError> {
        let mut keys = Vec::new();
        if let Some(idx) = self.table {
            keys.extend(table_keys(&bodies[idx])?);
        }
        keys.extend(self.children.keys().cloned());
        Ok(keys)
    }

    /// A full recursive snapshot of this node as a primitive table, folding
    /// scalar keys, sub-nodes, and array-of-tables sequences together.
    pub fn snapshot(&self, bodies: &[Element]) -> Result<IndexMap<String, PrimitiveValue>, TomlError> {
        let mut map = IndexMap::new();
        if let Some(idx) = self.table {
            map.extend(table_body_to_primitive(&bodies[idx])?);
        }
        for (name, child) in &self.children {
            let value = if let Some(indices) = &child.arrays {
                let items = indices
                    .iter()
                    .map(|&i| Ok(PrimitiveValue::Table(table_body_to_primitive(&bodies[i])?)))
                    .collect::<Result<Vec<_>, TomlError>>()?;
                PrimitiveValue::Array(items)
            } else {
                PrimitiveValue::Table(child.snapshot(bodies)?)
            };
            map.insert(name.clone(), value);
        }
        Ok(map)
    }
}

fn check_scalar_collision(existing_table: Option<usize>, seg: &str, bodies: &[Element]) -> Result<(), TomlError> {
    if let Some(idx) = existing_table {
        if table_keys(&bodies[idx])?.iter().any(|k| k == seg) {
            return Err(TomlError::DuplicateKeys { key: seg.to_string() });
        }
    }
    Ok(())
}

fn check_children_collision(body_index: usize, children: &IndexMap<String, NavNode>, bodies: &[Element]) -> Result<(), TomlError> {
    for key in table_keys(&bodies[body_index])? {
        if children.contains_key(&key) {
            return Err(TomlError::DuplicateKeys { key });
        }
    }
    Ok(())
}

fn descend<'n>(root: &'n mut NavNode, path: &[String], bodies: &[Element]) -> Result<&'n mut NavNode, TomlError> {
    let mut node = root;
    for seg in path {
        check_scalar_collision(node.table, seg, bodies)?;
        node = node.ensure_child(seg);
    }
    Ok(node)
}

fn insert_table(root: &mut NavNode, name: &[String], body_index: usize, bodies: &[Element]) -> Result<(), TomlError> {
    let (init, last) = name.split_at(name.len() - 1);
    let node = descend(root, init, bodies)?;
    check_scalar_collision(node.table, &last[0], bodies)?;
    let target = node.ensure_child(&last[0]);
    if target.table.is_some() {
        return Err(TomlError::DuplicateTables { name: name.join(".") });
    }
    if target.arrays.is_some() {
        return Err(TomlError::DuplicateTables { name: name.join(".") });
    }
    check_children_collision(body_index, &target.children, bodies)?;
    target.table = Some(body_index);
    Ok(())
}

fn insert_array(root: &mut NavNode, name: &[String], body_index: usize, bodies: &[Element]) -> Result<(), TomlError> {
    let (init, last) = name.split_at(name.len() - 1);
    let node = descend(root, init, bodies)?;
    check_scalar_collision(node.table, &last[0], bodies)?;
    let target = node.ensure_child(&last[0]);
    if target.table.is_some() {
        return Err(TomlError::DuplicateTables { name: name.join(".") });
    }
    target.arrays.get_or_insert_with(Vec::new).push(body_index);
    Ok(())
}

/// Builds the full navigable tree for a parsed file. `file` must already be
/// sanitized (every header immediately followed by a body).
pub fn build_navigable(file: &Element) -> Result<NavNode, TomlError> {
    let bodies = file.children().ok_or_else(|| TomlError::InvalidElement {
        path: "file".to_string(),
        expected: "a container element",
    })?;
    let entries = extract_entries(file)?;

    let mut root = NavNode::default();
    for entry in &entries {
        match entry {
            Entry::Anonymous { body_index } => root.table = Some(*body_index),
            Entry::Table { name, body_index } => insert_table(&mut root, name, *body_index, bodies)?,
            Entry::ArrayOfTables { name, body_index } => insert_array(&mut root, name, *body_index, bodies)?,
        }
    }
    Ok(root)
}
