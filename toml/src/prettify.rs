//! The prettifier collaborator contract, per `spec.md` §6. Concrete rules
//! (uniform indentation, assignment spacing, anonymous-table de-indentation,
//! entry sorting, line-length limiting) are out of scope here — this module
//! only defines the seam a collaborator plugs into: a function over the
//! mutable element sequence of a file.

use crate::element::Element;

/// One prettifying pass over a file's top-level element sequence. A rule
/// mutates `children` in place; [`crate::file::TOMLFile::prettify`] applies
/// a list of them in order, then rebuilds the navigable structure once.
pub trait PrettifyRule {
    fn apply(&self, children: &mut Vec<Element>);
}

impl<F> PrettifyRule for F
where
    F: Fn(&mut Vec<Element>),
{
    fn apply(&self, children: &mut Vec<Element>) {
        self(children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    struct NoOp;
    impl PrettifyRule for NoOp {
        fn apply(&self, _children: &mut Vec<Element>) {}
    }

    #[test]
    fn a_no_op_rule_leaves_source_unchanged() {
        let file = parse("a = 1\n").unwrap();
        let mut children = file.children().unwrap().to_vec();
        NoOp.apply(&mut children);
        assert_eq!(Element::file(children).source(), "a = 1\n");
    }

    #[test]
    fn a_closure_rule_can_be_used_directly() {
        let rule: &dyn PrettifyRule = &(|children: &mut Vec<Element>| {
            children.clear();
        });
        let file = parse("a = 1\n").unwrap();
        let mut children = file.children().unwrap().to_vec();
        rule.apply(&mut children);
        assert!(children.is_empty());
    }
}
