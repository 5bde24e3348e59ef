//! Pre-order node lookup used by crossover.

use std::sync::Arc;

use crate::ast::{
    BinaryOp, Node, NodeRef, UnaryOp, Visitor, walk_binary, walk_ternary, walk_unary,
};

/// Subtree lookup errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    #[error("Node index {index} is out of range (tree has {count} nodes, indices start at 1)")]
    OutOfRange { index: usize, count: usize },
}

/// Finds the node at a 1-based pre-order position.
///
/// Once the target is found, composite nodes skip their remaining children.
#[derive(Debug)]
pub struct IndexVisitor {
    target: usize,
    current: usize,
    found: Option<NodeRef>,
}

impl IndexVisitor {
    pub fn new(target: usize) -> Self {
        Self {
            target,
            current: 0,
            found: None,
        }
    }

    /// Look up `target` in `root`.
    pub fn find(mut self, root: &NodeRef) -> Result<NodeRef, IndexError> {
        if self.target == 0 {
            return Err(IndexError::OutOfRange {
                index: 0,
                count: node_count(root),
            });
        }
        self.visit(root);
        let count = self.current;
        self.found.ok_or(IndexError::OutOfRange {
            index: self.target,
            count,
        })
    }

    /// Count the node and record it if it is the target.
    /// Returns `true` once the target has been found.
    fn challenge(&mut self, node: &NodeRef) -> bool {
        if self.found.is_some() {
            return true;
        }
        self.current += 1;
        if self.current == self.target {
            self.found = Some(Arc::clone(node));
        }
        self.found.is_some()
    }
}

impl Visitor for IndexVisitor {
    fn visit_constant(&mut self, node: &NodeRef, _value: f64) {
        self.challenge(node);
    }

    fn visit_identifier(&mut self, node: &NodeRef, _name: &str) {
        self.challenge(node);
    }

    fn visit_error(&mut self, node: &NodeRef, _message: &str) {
        self.challenge(node);
    }

    fn visit_unary(&mut self, node: &NodeRef, _op: UnaryOp, operand: &NodeRef) {
        if !self.challenge(node) {
            walk_unary(self, operand);
        }
    }

    fn visit_binary(&mut self, node: &NodeRef, _op: BinaryOp, left: &NodeRef, right: &NodeRef) {
        if !self.challenge(node) {
            walk_binary(self, left, right);
        }
    }

    fn visit_ternary(
        &mut self,
        node: &NodeRef,
        condition: &NodeRef,
        when_true: &NodeRef,
        when_false: Option<&NodeRef>,
    ) {
        if !self.challenge(node) {
            walk_ternary(self, condition, when_true, when_false);
        }
    }
}

/// Node at the 1-based pre-order `index` of `root`.
pub fn node_at(root: &NodeRef, index: usize) -> Result<NodeRef, IndexError> {
    IndexVisitor::new(index).find(root)
}

#[derive(Default)]
struct Counter(usize);

impl Visitor for Counter {
    fn visit(&mut self, node: &NodeRef) {
        self.0 += 1;
        match &**node {
            Node::Unary { operand, .. } => walk_unary(self, operand),
            Node::Binary { left, right, .. } => walk_binary(self, left, right),
            Node::Ternary {
                condition,
                when_true,
                when_false,
            } => walk_ternary(self, condition, when_true, when_false.as_ref()),
            _ => {}
        }
    }
}

/// Number of nodes in the tree.
pub fn node_count(root: &NodeRef) -> usize {
    let mut counter = Counter::default();
    counter.visit(root);
    counter.0
}
