//! Expression tree node types.

use std::sync::Arc;

/// Shared handle to an immutable node.
///
/// Trees are never modified in place. Rewrites produce new nodes and reuse
/// unchanged subtrees, so identity (`Arc::ptr_eq`) tells whether a rewrite
/// actually changed anything.
pub type NodeRef = Arc<Node>;

/// Operators accepted by unary nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Arithmetic negation (`-a`).
    Negate,
}

/// Operators accepted by binary nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// Operator families used by the genetic operator swaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorFamily {
    /// `+` and `-`.
    Additive,
    /// `*` and `/`.
    Multiplicative,
}

impl BinaryOp {
    /// All binary operators, in a fixed order.
    pub const ALL: [BinaryOp; 4] = [
        BinaryOp::Add,
        BinaryOp::Subtract,
        BinaryOp::Multiply,
        BinaryOp::Divide,
    ];

    /// The family this operator belongs to.
    pub fn family(self) -> OperatorFamily {
        match self {
            BinaryOp::Add | BinaryOp::Subtract => OperatorFamily::Additive,
            BinaryOp::Multiply | BinaryOp::Divide => OperatorFamily::Multiplicative,
        }
    }

    /// The other operator of the same family (`+`↔`-`, `*`↔`/`).
    pub fn sibling(self) -> BinaryOp {
        match self {
            BinaryOp::Add => BinaryOp::Subtract,
            BinaryOp::Subtract => BinaryOp::Add,
            BinaryOp::Multiply => BinaryOp::Divide,
            BinaryOp::Divide => BinaryOp::Multiply,
        }
    }

    /// Apply the operator to two values using IEEE-754 semantics.
    #[inline]
    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            BinaryOp::Add => left + right,
            BinaryOp::Subtract => left - right,
            BinaryOp::Multiply => left * right,
            BinaryOp::Divide => left / right,
        }
    }

    /// Source symbol of the operator.
    pub fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Subtract => '-',
            BinaryOp::Multiply => '*',
            BinaryOp::Divide => '/',
        }
    }
}

impl OperatorFamily {
    /// Operators of this family.
    pub fn operators(self) -> [BinaryOp; 2] {
        match self {
            OperatorFamily::Additive => [BinaryOp::Add, BinaryOp::Subtract],
            OperatorFamily::Multiplicative => [BinaryOp::Multiply, BinaryOp::Divide],
        }
    }

    /// The other family.
    pub fn opposite(self) -> OperatorFamily {
        match self {
            OperatorFamily::Additive => OperatorFamily::Multiplicative,
            OperatorFamily::Multiplicative => OperatorFamily::Additive,
        }
    }
}

/// A node of an expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Numeric literal.
    Constant(f64),
    /// Free variable reference (`x`, `y`).
    Identifier(String),
    /// Diagnostic leaf. Evaluates to NaN.
    Error(String),
    /// Unary operation.
    Unary { op: UnaryOp, operand: NodeRef },
    /// Binary operation. Operand order matters for `-` and `/`.
    Binary {
        op: BinaryOp,
        left: NodeRef,
        right: NodeRef,
    },
    /// Conditional `condition ? when_true : when_false`.
    ///
    /// Without `when_false` the node is a guarded value which yields NaN when
    /// the condition does not hold.
    Ternary {
        condition: NodeRef,
        when_true: NodeRef,
        when_false: Option<NodeRef>,
    },
}

impl Node {
    pub fn constant(value: f64) -> NodeRef {
        Arc::new(Node::Constant(value))
    }

    pub fn identifier(name: impl Into<String>) -> NodeRef {
        Arc::new(Node::Identifier(name.into()))
    }

    pub fn error(message: impl Into<String>) -> NodeRef {
        Arc::new(Node::Error(message.into()))
    }

    pub fn negate(operand: NodeRef) -> NodeRef {
        Arc::new(Node::Unary {
            op: UnaryOp::Negate,
            operand,
        })
    }

    pub fn binary(op: BinaryOp, left: NodeRef, right: NodeRef) -> NodeRef {
        Arc::new(Node::Binary { op, left, right })
    }

    pub fn ternary(condition: NodeRef, when_true: NodeRef, when_false: Option<NodeRef>) -> NodeRef {
        Arc::new(Node::Ternary {
            condition,
            when_true,
            when_false,
        })
    }

    /// Returns the constant value if this node is a constant.
    #[inline]
    pub fn as_constant(&self) -> Option<f64> {
        match self {
            Node::Constant(value) => Some(*value),
            _ => None,
        }
    }

    /// Whether the node has no children.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            Node::Constant(_) | Node::Identifier(_) | Node::Error(_)
        )
    }

    /// Canonical string form used for structural comparison.
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

/// Structural equality through the canonical string form. Exact for
/// optimized trees.
pub fn same_structure(a: &Node, b: &Node) -> bool {
    a.canonical() == b.canonical()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_families() {
        assert_eq!(BinaryOp::Add.family(), OperatorFamily::Additive);
        assert_eq!(BinaryOp::Divide.family(), OperatorFamily::Multiplicative);
        for op in BinaryOp::ALL {
            assert_eq!(op.sibling().family(), op.family());
            assert_eq!(op.sibling().sibling(), op);
            assert!(op.family().operators().contains(&op));
            assert!(!op.family().opposite().operators().contains(&op));
        }
    }

    #[test]
    fn test_apply_division_by_zero() {
        assert_eq!(BinaryOp::Divide.apply(1.0, 0.0), f64::INFINITY);
        assert_eq!(BinaryOp::Divide.apply(-1.0, 0.0), f64::NEG_INFINITY);
        assert!(BinaryOp::Divide.apply(0.0, 0.0).is_nan());
    }

    #[test]
    fn test_same_structure_ignores_identity() {
        let a = Node::binary(BinaryOp::Add, Node::identifier("x"), Node::constant(2.0));
        let b = Node::binary(BinaryOp::Add, Node::identifier("x"), Node::constant(2.0));
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(same_structure(&a, &b));
        assert!(!same_structure(&a, &Node::identifier("x")));
    }
}
