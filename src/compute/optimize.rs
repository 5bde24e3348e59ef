//! Algebraic simplification with node counting.

use std::sync::Arc;

use crate::ast::{BinaryOp, Mutator, Node, NodeRef, UnaryOp, same_structure};

/// Message of the node produced when a guarded value is statically unsatisfied.
pub const UNSATISFIED_GUARD: &str = "unsatisfied guard";

/// An optimized tree together with its node count.
#[derive(Debug, Clone)]
pub struct Optimized {
    pub node: NodeRef,
    pub size: usize,
}

/// Bottom-up simplifier.
///
/// Folds constant subtrees (division by zero folds to ±∞/NaN constants),
/// rewrites `a - (-b)` to `a + b` and `a - c` to `a + (-c)`, collapses `a / a`
/// to `1` when both sides render identically, and collapses ternaries whose
/// condition is constant. The size of the last produced subtree is tracked
/// while rewriting.
///
/// The self-division rule is syntactic: `(0 / 0) / (0 / 0)` is folded to NaN
/// first, but any non-constant pair with the same rendering becomes `1`
/// even where the operands evaluate to NaN.
#[derive(Debug, Default)]
pub struct OptimizationMutator {
    count: usize,
}

impl OptimizationMutator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Optimize a tree and report the node count of the result.
    pub fn optimize(&mut self, node: &NodeRef) -> Optimized {
        let node = self.mutate(node);
        Optimized {
            node,
            size: self.count,
        }
    }
}

impl Mutator for OptimizationMutator {
    fn mutate_constant(&mut self, node: &NodeRef, _value: f64) -> NodeRef {
        self.count = 1;
        Arc::clone(node)
    }

    fn mutate_identifier(&mut self, node: &NodeRef, _name: &str) -> NodeRef {
        self.count = 1;
        Arc::clone(node)
    }

    fn mutate_error(&mut self, node: &NodeRef, _message: &str) -> NodeRef {
        self.count = 1;
        Arc::clone(node)
    }

    fn mutate_unary(&mut self, node: &NodeRef, op: UnaryOp, operand: &NodeRef) -> NodeRef {
        let mutated = self.mutate(operand);
        match op {
            UnaryOp::Negate => {
                if let Some(value) = mutated.as_constant() {
                    self.count = 1;
                    return Node::constant(-value);
                }
            }
        }

        self.count += 1;
        if Arc::ptr_eq(&mutated, operand) {
            Arc::clone(node)
        } else {
            Arc::new(Node::Unary {
                op,
                operand: mutated,
            })
        }
    }

    fn mutate_binary(
        &mut self,
        node: &NodeRef,
        op: BinaryOp,
        left: &NodeRef,
        right: &NodeRef,
    ) -> NodeRef {
        let left_mutated = self.mutate(left);
        let left_count = self.count;
        let right_mutated = self.mutate(right);
        let right_count = self.count;

        if let (Some(a), Some(b)) = (left_mutated.as_constant(), right_mutated.as_constant()) {
            self.count = 1;
            return Node::constant(op.apply(a, b));
        }

        self.count = left_count + right_count + 1;
        match (op, &*right_mutated) {
            (
                BinaryOp::Subtract,
                Node::Unary {
                    op: UnaryOp::Negate,
                    operand,
                },
            ) => {
                self.count -= 1;
                return Node::binary(BinaryOp::Add, left_mutated, Arc::clone(operand));
            }
            (BinaryOp::Subtract, Node::Constant(value)) => {
                return Node::binary(BinaryOp::Add, left_mutated, Node::constant(-value));
            }
            (BinaryOp::Divide, _)
                if Arc::ptr_eq(&left_mutated, &right_mutated)
                    || same_structure(&left_mutated, &right_mutated) =>
            {
                self.count = 1;
                return Node::constant(1.0);
            }
            _ => {}
        }

        if Arc::ptr_eq(&left_mutated, left) && Arc::ptr_eq(&right_mutated, right) {
            Arc::clone(node)
        } else {
            Node::binary(op, left_mutated, right_mutated)
        }
    }

    fn mutate_ternary(
        &mut self,
        node: &NodeRef,
        condition: &NodeRef,
        when_true: &NodeRef,
        when_false: Option<&NodeRef>,
    ) -> NodeRef {
        let condition_mutated = self.mutate(condition);
        let condition_count = self.count;
        let when_true_mutated = self.mutate(when_true);
        let when_true_count = self.count;
        let (when_false_mutated, when_false_count) = match when_false {
            Some(when_false) => {
                let mutated = self.mutate(when_false);
                (Some(mutated), self.count)
            }
            None => (None, 0),
        };

        if let Some(value) = condition_mutated.as_constant() {
            if value > 0.0 {
                self.count = when_true_count;
                return when_true_mutated;
            }
            return match when_false_mutated {
                Some(when_false_mutated) => {
                    self.count = when_false_count;
                    when_false_mutated
                }
                None => {
                    self.count = 1;
                    Node::error(UNSATISFIED_GUARD)
                }
            };
        }

        self.count = condition_count + when_true_count + when_false_count + 1;
        if Arc::ptr_eq(&condition_mutated, condition)
            && Arc::ptr_eq(&when_true_mutated, when_true)
            && crate::ast::same_optional(when_false_mutated.as_ref(), when_false)
        {
            Arc::clone(node)
        } else {
            Node::ternary(condition_mutated, when_true_mutated, when_false_mutated)
        }
    }
}

/// Optimize a tree with a fresh [`OptimizationMutator`].
pub fn optimize(node: &NodeRef) -> Optimized {
    OptimizationMutator::new().optimize(node)
}
