use std::fmt;

use super::node::{Node, UnaryOp};

/// Fully parenthesized rendering.
///
/// This is also the canonical string form used to compare trees
/// structurally. Negation is written without parentheses, so a negated
/// constant and the negative constant both render as `-4`. Optimized trees
/// have no negated constants and compare exactly.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Constant(value) => write!(f, "{}", value),
            Node::Identifier(name) => f.write_str(name),
            Node::Error(message) => f.write_str(message),
            Node::Unary {
                op: UnaryOp::Negate,
                operand,
            } => write!(f, "-{}", operand),
            Node::Binary { op, left, right } => {
                write!(f, "( {} {} {} )", left, op.symbol(), right)
            }
            Node::Ternary {
                condition,
                when_true,
                when_false: Some(when_false),
            } => write!(f, "( {} ? {} : {} )", condition, when_true, when_false),
            Node::Ternary {
                condition,
                when_true,
                when_false: None,
            } => write!(f, "( {} ? {} )", condition, when_true),
        }
    }
}
