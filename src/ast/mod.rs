//! Expression tree model.
//!
//! - `node`: the immutable node variants and operator tags
//! - `visit`: the [`Visitor`] / [`Mutator`] traversal protocols
//! - parsing from source text with [`parse`] and rendering through `Display`

mod lexer;
mod node;
mod parser;
mod render;
mod visit;

pub use node::*;
pub use visit::*;

/// Source text parsing errors.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Unexpected character at byte {0}")]
    UnexpectedChar(usize),
    #[error("Invalid number literal at byte {0}")]
    InvalidNumber(usize),
    #[error("Unterminated block comment starting at byte {0}")]
    UnterminatedComment(usize),
    #[error("Expected {expected}, found {found}")]
    Expected {
        expected: &'static str,
        found: String,
    },
    #[error("Unexpected trailing input: {0}")]
    TrailingInput(String),
}

/// Parse an expression.
///
/// Returns `Ok(None)` when the input holds no tokens.
pub fn parse(source: &str) -> Result<Option<NodeRef>, ParseError> {
    parser::Parser::new(source)?.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(source: &str) -> String {
        parse(source).unwrap().unwrap().to_string()
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse("").unwrap().is_none());
        assert!(parse("  /* nothing */ ").unwrap().is_none());
    }

    #[test]
    fn test_precedence_and_associativity() {
        assert_eq!(render("1 + 2 * 3"), "( 1 + ( 2 * 3 ) )");
        assert_eq!(render("7 - 6 + 10"), "( ( 7 - 6 ) + 10 )");
        assert_eq!(render("8 / 4 / 2"), "( ( 8 / 4 ) / 2 )");
        assert_eq!(render("7 * -(5+2*3)"), "( 7 * -( 5 + ( 2 * 3 ) ) )");
        assert_eq!(render("--x"), "--x");
    }

    #[test]
    fn test_ternary_forms() {
        assert_eq!(render("7 + 3 ? 12 : 14"), "( ( 7 + 3 ) ? 12 : 14 )");
        assert_eq!(render("x ? y ? y : x : y"), "( x ? ( y ? y : x ) : y )");
        assert_eq!(render("x ? y"), "( x ? y )");
        assert_eq!(render("7 + (3 ? x : y)"), "( 7 + ( 3 ? x : y ) )");
    }

    #[test]
    fn test_parse_builds_expected_tree() {
        let node = parse("x + 2").unwrap().unwrap();
        match &*node {
            Node::Binary {
                op: BinaryOp::Add,
                left,
                right,
            } => {
                assert_eq!(**left, Node::Identifier("x".into()));
                assert_eq!(right.as_constant(), Some(2.0));
            }
            other => panic!("unexpected tree {:?}", other),
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse("(1 + 2"), Err(ParseError::Expected { .. })));
        assert!(matches!(parse("1 +"), Err(ParseError::Expected { .. })));
        assert!(matches!(parse("1 2"), Err(ParseError::TrailingInput(_))));
        assert!(matches!(parse("1 $ 2"), Err(ParseError::UnexpectedChar(2))));
    }
}
