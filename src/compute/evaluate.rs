//! Numeric evaluation of expression trees.

use crate::ast::{BinaryOp, NodeRef, UnaryOp, Visitor};

/// Visitor computing the numeric value of a tree.
///
/// Identifiers are resolved through the `variables` lookup; unresolved names
/// and error nodes evaluate to NaN. Division follows IEEE-754, so
/// singularities surface as ±∞ or NaN rather than errors.
pub struct ComputeVisitor<F>
where
    F: Fn(&str) -> Option<f64>,
{
    variables: F,
    result: f64,
}

impl<F> ComputeVisitor<F>
where
    F: Fn(&str) -> Option<f64>,
{
    pub fn new(variables: F) -> Self {
        Self {
            variables,
            result: f64::NAN,
        }
    }

    /// Value computed by the last visit.
    #[inline]
    pub fn result(&self) -> f64 {
        self.result
    }

    /// Evaluate a node and return its value.
    #[inline]
    pub fn compute(&mut self, node: &NodeRef) -> f64 {
        self.visit(node);
        self.result
    }
}

impl<F> Visitor for ComputeVisitor<F>
where
    F: Fn(&str) -> Option<f64>,
{
    fn visit_constant(&mut self, _node: &NodeRef, value: f64) {
        self.result = value;
    }

    fn visit_identifier(&mut self, _node: &NodeRef, name: &str) {
        self.result = (self.variables)(name).unwrap_or(f64::NAN);
    }

    fn visit_error(&mut self, _node: &NodeRef, _message: &str) {
        self.result = f64::NAN;
    }

    fn visit_unary(&mut self, _node: &NodeRef, op: UnaryOp, operand: &NodeRef) {
        self.visit(operand);
        match op {
            UnaryOp::Negate => self.result = -self.result,
        }
    }

    fn visit_binary(&mut self, _node: &NodeRef, op: BinaryOp, left: &NodeRef, right: &NodeRef) {
        self.visit(left);
        let left = self.result;
        self.visit(right);
        self.result = op.apply(left, self.result);
    }

    fn visit_ternary(
        &mut self,
        _node: &NodeRef,
        condition: &NodeRef,
        when_true: &NodeRef,
        when_false: Option<&NodeRef>,
    ) {
        self.visit(condition);
        if self.result > 0.0 {
            self.visit(when_true);
        } else if let Some(when_false) = when_false {
            self.visit(when_false);
        } else {
            self.result = f64::NAN;
        }
    }
}

/// Evaluate a tree with the given variable lookup.
pub fn evaluate<F>(node: &NodeRef, variables: F) -> f64
where
    F: Fn(&str) -> Option<f64>,
{
    ComputeVisitor::new(variables).compute(node)
}

/// Evaluate a tree with no variables bound.
pub fn evaluate_constant(node: &NodeRef) -> f64 {
    evaluate(node, |_| None)
}
