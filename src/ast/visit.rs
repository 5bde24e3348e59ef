//! Traversal protocols over expression trees.
//!
//! [`Visitor`] inspects a tree without producing a new one. [`Mutator`]
//! produces a rewritten tree. Both dispatch on the node kind to per-variant
//! hooks; the composite hooks default to recursing into children through the
//! free `walk_*` / `rebuild_*` functions, which overriding hooks can call to
//! get the default behavior.

use std::sync::Arc;

use super::node::{BinaryOp, Node, NodeRef, UnaryOp};

/// Read-only traversal.
///
/// Leaf hooks do nothing by default. Composite hooks visit children
/// left-to-right, the condition before the branches.
pub trait Visitor {
    /// Dispatch to the hook matching the node kind.
    fn visit(&mut self, node: &NodeRef) {
        match &**node {
            Node::Constant(value) => self.visit_constant(node, *value),
            Node::Identifier(name) => self.visit_identifier(node, name),
            Node::Error(message) => self.visit_error(node, message),
            Node::Unary { op, operand } => self.visit_unary(node, *op, operand),
            Node::Binary { op, left, right } => self.visit_binary(node, *op, left, right),
            Node::Ternary {
                condition,
                when_true,
                when_false,
            } => self.visit_ternary(node, condition, when_true, when_false.as_ref()),
        }
    }

    fn visit_constant(&mut self, _node: &NodeRef, _value: f64) {}

    fn visit_identifier(&mut self, _node: &NodeRef, _name: &str) {}

    fn visit_error(&mut self, _node: &NodeRef, _message: &str) {}

    fn visit_unary(&mut self, _node: &NodeRef, _op: UnaryOp, operand: &NodeRef) {
        walk_unary(self, operand);
    }

    fn visit_binary(&mut self, _node: &NodeRef, _op: BinaryOp, left: &NodeRef, right: &NodeRef) {
        walk_binary(self, left, right);
    }

    fn visit_ternary(
        &mut self,
        _node: &NodeRef,
        condition: &NodeRef,
        when_true: &NodeRef,
        when_false: Option<&NodeRef>,
    ) {
        walk_ternary(self, condition, when_true, when_false);
    }
}

pub fn walk_unary<V: Visitor + ?Sized>(visitor: &mut V, operand: &NodeRef) {
    visitor.visit(operand);
}

pub fn walk_binary<V: Visitor + ?Sized>(visitor: &mut V, left: &NodeRef, right: &NodeRef) {
    visitor.visit(left);
    visitor.visit(right);
}

pub fn walk_ternary<V: Visitor + ?Sized>(
    visitor: &mut V,
    condition: &NodeRef,
    when_true: &NodeRef,
    when_false: Option<&NodeRef>,
) {
    visitor.visit(condition);
    visitor.visit(when_true);
    if let Some(when_false) = when_false {
        visitor.visit(when_false);
    }
}

/// Structure-producing traversal.
///
/// Leaf hooks return the node unchanged. Composite hooks rewrite the
/// children and rebuild the node only when at least one child is a
/// different node, otherwise the original `Arc` is returned.
pub trait Mutator {
    /// Dispatch to the hook matching the node kind.
    fn mutate(&mut self, node: &NodeRef) -> NodeRef {
        match &**node {
            Node::Constant(value) => self.mutate_constant(node, *value),
            Node::Identifier(name) => self.mutate_identifier(node, name),
            Node::Error(message) => self.mutate_error(node, message),
            Node::Unary { op, operand } => self.mutate_unary(node, *op, operand),
            Node::Binary { op, left, right } => self.mutate_binary(node, *op, left, right),
            Node::Ternary {
                condition,
                when_true,
                when_false,
            } => self.mutate_ternary(node, condition, when_true, when_false.as_ref()),
        }
    }

    fn mutate_constant(&mut self, node: &NodeRef, _value: f64) -> NodeRef {
        Arc::clone(node)
    }

    fn mutate_identifier(&mut self, node: &NodeRef, _name: &str) -> NodeRef {
        Arc::clone(node)
    }

    fn mutate_error(&mut self, node: &NodeRef, _message: &str) -> NodeRef {
        Arc::clone(node)
    }

    fn mutate_unary(&mut self, node: &NodeRef, op: UnaryOp, operand: &NodeRef) -> NodeRef {
        rebuild_unary(self, node, op, operand)
    }

    fn mutate_binary(
        &mut self,
        node: &NodeRef,
        op: BinaryOp,
        left: &NodeRef,
        right: &NodeRef,
    ) -> NodeRef {
        rebuild_binary(self, node, op, left, right)
    }

    fn mutate_ternary(
        &mut self,
        node: &NodeRef,
        condition: &NodeRef,
        when_true: &NodeRef,
        when_false: Option<&NodeRef>,
    ) -> NodeRef {
        rebuild_ternary(self, node, condition, when_true, when_false)
    }
}

pub fn rebuild_unary<M: Mutator + ?Sized>(
    mutator: &mut M,
    node: &NodeRef,
    op: UnaryOp,
    operand: &NodeRef,
) -> NodeRef {
    let mutated = mutator.mutate(operand);
    if Arc::ptr_eq(&mutated, operand) {
        Arc::clone(node)
    } else {
        Arc::new(Node::Unary {
            op,
            operand: mutated,
        })
    }
}

pub fn rebuild_binary<M: Mutator + ?Sized>(
    mutator: &mut M,
    node: &NodeRef,
    op: BinaryOp,
    left: &NodeRef,
    right: &NodeRef,
) -> NodeRef {
    let left_mutated = mutator.mutate(left);
    let right_mutated = mutator.mutate(right);
    if Arc::ptr_eq(&left_mutated, left) && Arc::ptr_eq(&right_mutated, right) {
        Arc::clone(node)
    } else {
        Node::binary(op, left_mutated, right_mutated)
    }
}

pub fn rebuild_ternary<M: Mutator + ?Sized>(
    mutator: &mut M,
    node: &NodeRef,
    condition: &NodeRef,
    when_true: &NodeRef,
    when_false: Option<&NodeRef>,
) -> NodeRef {
    let condition_mutated = mutator.mutate(condition);
    let when_true_mutated = mutator.mutate(when_true);
    let when_false_mutated = when_false.map(|n| mutator.mutate(n));

    if Arc::ptr_eq(&condition_mutated, condition)
        && Arc::ptr_eq(&when_true_mutated, when_true)
        && same_optional(when_false_mutated.as_ref(), when_false)
    {
        Arc::clone(node)
    } else {
        Node::ternary(condition_mutated, when_true_mutated, when_false_mutated)
    }
}

/// Identity comparison of optional children.
pub(crate) fn same_optional(a: Option<&NodeRef>, b: Option<&NodeRef>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parse;
    use crate::compute::evaluate_constant;

    struct Identity;

    impl Mutator for Identity {}

    /// Turns every addition into a subtraction.
    struct PlusToMinus;

    impl Mutator for PlusToMinus {
        fn mutate_binary(
            &mut self,
            node: &NodeRef,
            op: BinaryOp,
            left: &NodeRef,
            right: &NodeRef,
        ) -> NodeRef {
            if op == BinaryOp::Add {
                Node::binary(BinaryOp::Subtract, self.mutate(left), self.mutate(right))
            } else {
                rebuild_binary(self, node, op, left, right)
            }
        }
    }

    #[derive(Default)]
    struct Collect(Vec<String>);

    impl Visitor for Collect {
        fn visit_constant(&mut self, _node: &NodeRef, value: f64) {
            self.0.push(value.to_string());
        }

        fn visit_identifier(&mut self, _node: &NodeRef, name: &str) {
            self.0.push(name.to_string());
        }
    }

    fn tree(source: &str) -> NodeRef {
        parse(source).unwrap().unwrap()
    }

    #[test]
    fn test_identity_mutator_preserves_every_node() {
        for source in ["3 * 5", "-(x + y) / 2", "x ? y : 3", "x ? -y"] {
            let node = tree(source);
            assert!(Arc::ptr_eq(&Identity.mutate(&node), &node), "{}", source);
        }
    }

    #[test]
    fn test_plus_to_minus_mutator() {
        let cases = [
            ("3*5", 3.0 * 5.0),
            ("3+5", 3.0 - 5.0),
            (" 3  *  (  2  +  2  )  ", 3.0 * (2.0 - 2.0)),
            ("3 + 5 * 125 / 7 - 6 + 10", 3.0 - 5.0 * 125.0 / 7.0 - 6.0 - 10.0),
            ("7 - 6 + 10", 7.0 - 6.0 - 10.0),
            ("7 - -2", 7.0 - -2.0),
            ("7 + -2", 7.0 - -2.0),
            ("7 * -(5+2*3)", 7.0 * -(5.0 - 2.0 * 3.0)),
            ("7 + 3 ? 12 : 14", 12.0),
        ];
        for (source, expected) in cases {
            let mutated = PlusToMinus.mutate(&tree(source));
            assert_eq!(evaluate_constant(&mutated), expected, "{}", source);
        }
    }

    #[test]
    fn test_unchanged_subtrees_are_shared() {
        let node = tree("(x * y) + (x / y)");
        let mutated = PlusToMinus.mutate(&node);
        let (Node::Binary { left: a, .. }, Node::Binary { left: b, .. }) = (&*node, &*mutated)
        else {
            panic!("expected binary roots");
        };
        assert!(Arc::ptr_eq(a, b));
    }

    #[test]
    fn test_visitor_order() {
        let mut collect = Collect::default();
        collect.visit(&tree("(1 ? x : 2) + -y * 3"));
        assert_eq!(collect.0, ["1", "x", "2", "y", "3"]);
    }
}
