//! The write side of the element tree: in-place value replacement, new-key
//! insertion with copied indentation, deletion with comma/line folding, and
//! splicing fresh table/array-of-tables sections onto a file. Per
//! `spec.md` §4.6, nothing here eagerly materializes a header or body —
//! every function here is only ever called once a write has actually
//! happened.

use crate::element::Element;
use crate::error::TomlError;
use crate::factory;
use crate::token::TokenType;
use crate::value::{self, PrimitiveValue};

fn indent_before(children: &[Element], index: usize) -> Option<String> {
    if index == 0 {
        return None;
    }
    match &children[index - 1] {
        Element::Whitespace(r) => Some(r.tokens.iter().map(|t| t.text.as_str()).collect()),
        _ => None,
    }
}

fn line_end_after(children: &[Element], mut k: usize) -> usize {
    while matches!(children.get(k), Some(Element::Whitespace(_))) {
        k += 1;
    }
    match children.get(k) {
        Some(Element::Comment(_)) => k + 1,
        Some(Element::Newline(_)) => k + 1,
        _ => k,
    }
}

/// Replaces the value element of an existing key in place. Leaves every
/// other element, including the key's own token and all surrounding
/// trivia, untouched.
pub fn set_existing(body_children: &mut [Element], key: &str, value: &PrimitiveValue) -> Result<bool, TomlError> {
    let Some((_, loc)) = value::scan_pairs(body_children)?.into_iter().find(|(k, _)| k == key) else {
        return Ok(false);
    };
    body_children[loc.value_index] = factory::value_element(value)?;
    Ok(true)
}

/// Inserts a brand-new key immediately after the last existing pair,
/// copying that pair's leading indentation. With no existing pairs, the new
/// pair is appended to the (empty) body with no indentation.
pub fn insert_new_key(body_children: &mut Vec<Element>, key: &str, value: &PrimitiveValue) -> Result<(), TomlError> {
    let pairs = value::scan_pairs(body_children)?;
    let (insert_at, indent) = match pairs.last() {
        Some((_, loc)) => (
            line_end_after(body_children, loc.value_index + 1),
            indent_before(body_children, loc.key_index),
        ),
        None => (body_children.len(), None),
    };

    let mut new_elems = Vec::new();
    if let Some(indent) = indent.filter(|s| !s.is_empty()) {
        new_elems.push(factory::whitespace(&indent)?);
    }
    new_elems.extend(factory::kv_pair_elements(key, value)?);
    body_children.splice(insert_at..insert_at, new_elems);
    Ok(())
}

/// Removes a `key = value` pair from a newline-separated table body,
/// including its trailing newline, but leaves a comment on its own
/// preceding or following line untouched.
pub fn delete_table_pair(body_children: &mut Vec<Element>, key: &str) -> Result<bool, TomlError> {
    let Some((_, loc)) = value::scan_pairs(body_children)?.into_iter().find(|(k, _)| k == key) else {
        return Ok(false);
    };
    let end = line_end_after(body_children, loc.value_index + 1);
    let mut start = loc.key_index;
    if matches!(body_children.get(start.wrapping_sub(1)), Some(Element::Whitespace(_))) {
        start -= 1;
    }
    body_children.drain(start..end);
    Ok(true)
}

/// Removes a `key = value` pair from a comma-separated inline table,
/// folding the adjoining comma so `{ a = 1, b = 2 }` deleting `a` becomes
/// `{ b = 2 }`, and deleting the last remaining pair leaves `{ }`.
///
/// Folds toward whichever comma sits adjacent to the deleted pair, and only
/// that one: a pair with a comma *after* it folds forward (eating the
/// comma and the whitespace before the next key, leaving the container's
/// own opening padding alone); the last pair, with its comma *before* it,
/// folds backward (eating the comma and any whitespace around it, leaving
/// the closing padding before `}` alone).
pub fn delete_inline_pair(children: &mut Vec<Element>, key: &str) -> Result<bool, TomlError> {
    let Some((_, loc)) = value::scan_pairs(children)?.into_iter().find(|(k, _)| k == key) else {
        return Ok(false);
    };

    let mut end = loc.value_index + 1;
    while matches!(children.get(end), Some(Element::Whitespace(_))) {
        end += 1;
    }

    if matches!(children.get(end), Some(Element::Operator(r)) if r.tokens[0].ty == TokenType::Comma) {
        end += 1;
        while matches!(children.get(end), Some(Element::Whitespace(_))) {
            end += 1;
        }
        children.drain(loc.key_index..end);
    } else {
        let mut start = loc.key_index;
        if matches!(children.get(start.wrapping_sub(1)), Some(Element::Whitespace(_))) {
            start -= 1;
        }
        if matches!(children.get(start.wrapping_sub(1)), Some(Element::Operator(r)) if r.tokens[0].ty == TokenType::Comma)
        {
            start -= 1;
            if matches!(children.get(start.wrapping_sub(1)), Some(Element::Whitespace(_))) {
                start -= 1;
            }
        }
        children.drain(start..loc.value_index + 1);
    }
    Ok(true)
}

/// Splices a brand-new `[path]` or `[[path]]` section onto the end of a
/// file's children, with a trailing blank line separating it from whatever
/// follows. Returns the index of the freshly created (empty) body.
pub fn splice_fresh_table(file_children: &mut Vec<Element>, path: &[String], is_array: bool) -> Result<usize, TomlError> {
    let mut elems = factory::table_header_elements(path, is_array)?;
    let body_index = file_children.len() + elems.len();
    elems.push(Element::table_body(Vec::new()));
    elems.push(factory::punctuation(TokenType::Newline)?);
    file_children.extend(elems);
    Ok(body_index)
}

fn composite_items(children: &[Element]) -> Vec<usize> {
    children
        .iter()
        .enumerate()
        .filter(|(_, c)| matches!(c, Element::Atomic(_) | Element::Array(_) | Element::InlineTable(_)))
        .map(|(i, _)| i)
        .collect()
}

pub fn array_len(arr: &Element) -> Result<usize, TomlError> {
    let children = arr.children().ok_or_else(|| TomlError::InvalidElement {
        path: "array".to_string(),
        expected: "a container element",
    })?;
    Ok(composite_items(children).len())
}

pub fn array_get(arr: &Element, index: usize) -> Result<Option<&Element>, TomlError> {
    let children = arr.children().ok_or_else(|| TomlError::InvalidElement {
        path: "array".to_string(),
        expected: "a container element",
    })?;
    Ok(composite_items(children).get(index).map(|&i| &children[i]))
}

/// Appends a value to the end of an array, inserting a `, ` separator when
/// the array already holds at least one item.
pub fn array_append(arr: &mut Element, value: &PrimitiveValue) -> Result<(), TomlError> {
    let children = arr.children_mut().ok_or_else(|| TomlError::InvalidElement {
        path: "array".to_string(),
        expected: "a container element",
    })?;
    let close = children.len() - 1; // the trailing `]`
    let needs_comma = !composite_items(children).is_empty();
    let mut new_elems = Vec::new();
    if needs_comma {
        new_elems.push(factory::punctuation(TokenType::Comma)?);
        new_elems.push(factory::whitespace(" ")?);
    }
    new_elems.push(factory::value_element(value)?);
    children.splice(close..close, new_elems);
    Ok(())
}

pub fn array_set(arr: &mut Element, index: usize, value: &PrimitiveValue) -> Result<bool, TomlError> {
    let children = arr.children_mut().ok_or_else(|| TomlError::InvalidElement {
        path: "array".to_string(),
        expected: "a container element",
    })?;
    let Some(&at) = composite_items(children).get(index) else {
        return Ok(false);
    };
    children[at] = factory::value_element(value)?;
    Ok(true)
}

/// Removes the array item at `index`, folding the adjoining comma the same
/// asymmetric way [`delete_inline_pair`] does for table pairs.
pub fn array_delete(arr: &mut Element, index: usize) -> Result<bool, TomlError> {
    let children = arr.children_mut().ok_or_else(|| TomlError::InvalidElement {
        path: "array".to_string(),
        expected: "a container element",
    })?;
    let items = composite_items(children);
    let Some(&at) = items.get(index) else {
        return Ok(false);
    };

    let mut end = at + 1;
    while matches!(children.get(end), Some(Element::Whitespace(_))) {
        end += 1;
    }

    if matches!(children.get(end), Some(Element::Operator(r)) if r.tokens[0].ty == TokenType::Comma) {
        end += 1;
        while matches!(children.get(end), Some(Element::Whitespace(_))) {
            end += 1;
        }
        children.drain(at..end);
    } else {
        let mut start = at;
        if matches!(children.get(start.wrapping_sub(1)), Some(Element::Whitespace(_))) {
            start -= 1;
        }
        if matches!(children.get(start.wrapping_sub(1)), Some(Element::Operator(r)) if r.tokens[0].ty == TokenType::Comma)
        {
            start -= 1;
            if matches!(children.get(start.wrapping_sub(1)), Some(Element::Whitespace(_))) {
                start -= 1;
            }
        }
        children.drain(start..at + 1);
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn body_children(file: &Element) -> Vec<Element> {
        file.children().unwrap()[0].children().unwrap().to_vec()
    }

    #[test]
    fn set_existing_replaces_only_the_value() {
        let file = parse("name = \"yonagold\"\n").unwrap();
        let mut children = body_children(&file);
        set_existing(&mut children, "name", &PrimitiveValue::String("banana".to_string())).unwrap();
        let body = Element::table_body(children);
        assert_eq!(body.source(), "name = \"banana\"\n");
    }

    #[test]
    fn insert_new_key_copies_indentation_of_last_pair() {
        let file = parse("  a = 1\n").unwrap();
        let mut children = body_children(&file);
        insert_new_key(&mut children, "b", &PrimitiveValue::Integer(2)).unwrap();
        let body = Element::table_body(children);
        assert_eq!(body.source(), "  a = 1\n  b = 2\n");
    }

    #[test]
    fn delete_table_pair_removes_whole_line() {
        let file = parse("a = 1\nb = 2\n").unwrap();
        let mut children = body_children(&file);
        delete_table_pair(&mut children, "a").unwrap();
        let body = Element::table_body(children);
        assert_eq!(body.source(), "b = 2\n");
    }

    #[test]
    fn delete_inline_pair_folds_comma_both_directions() {
        let file = parse("x = { a = 1, b = 2 }\n").unwrap();
        let value_children = {
            let body = file.children().unwrap()[0].children().unwrap();
            let (_, loc) = value::scan_pairs(body).unwrap().into_iter().find(|(k, _)| k == "x").unwrap();
            body[loc.value_index].children().unwrap().to_vec()
        };

        let mut c1 = value_children.clone();
        delete_inline_pair(&mut c1, "a").unwrap();
        assert_eq!(Element::inline_table(c1).source(), "{ b = 2 }");

        let mut c2 = value_children;
        delete_inline_pair(&mut c2, "b").unwrap();
        assert_eq!(Element::inline_table(c2).source(), "{ a = 1 }");
    }

    #[test]
    fn array_append_adds_comma_separator() {
        let mut arr = Element::array(vec![
            factory::punctuation(TokenType::LBracket).unwrap(),
            factory::punctuation(TokenType::RBracket).unwrap(),
        ]);
        array_append(&mut arr, &PrimitiveValue::Integer(1)).unwrap();
        array_append(&mut arr, &PrimitiveValue::Integer(2)).unwrap();
        assert_eq!(arr.source(), "[1, 2]");
    }
}
