use super::lexer::{Lexer, Token};
use super::node::{BinaryOp, Node, NodeRef};
use super::ParseError;

/// Recursive-descent parser producing an expression tree.
///
/// ```text
/// ternary  := additive ('?' ternary (':' ternary)?)?
/// additive := term (('+' | '-') term)*
/// term     := factor (('*' | '/') factor)*
/// factor   := '-' factor | primary
/// primary  := number | identifier | '(' ternary ')'
/// ```
pub(crate) struct Parser<'a> {
    lex: Lexer<'a>,
    look: Token,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(s: &'a str) -> Result<Self, ParseError> {
        let mut lex = Lexer::new(s);
        let look = lex.next_token()?;
        Ok(Self { lex, look })
    }

    fn bump(&mut self) -> Result<Token, ParseError> {
        let next = self.lex.next_token()?;
        Ok(std::mem::replace(&mut self.look, next))
    }

    fn expect(&mut self, t: &Token, what: &'static str) -> Result<(), ParseError> {
        if std::mem::discriminant(&self.look) == std::mem::discriminant(t) {
            self.bump()?;
            Ok(())
        } else {
            Err(ParseError::Expected {
                expected: what,
                found: format!("{:?}", self.look),
            })
        }
    }

    /// Parse the whole input. Empty input yields `None`.
    pub(crate) fn parse(mut self) -> Result<Option<NodeRef>, ParseError> {
        if self.look == Token::Eof {
            return Ok(None);
        }
        let expr = self.ternary()?;
        if self.look != Token::Eof {
            return Err(ParseError::TrailingInput(format!("{:?}", self.look)));
        }
        Ok(Some(expr))
    }

    fn ternary(&mut self) -> Result<NodeRef, ParseError> {
        let condition = self.additive()?;
        if self.look != Token::Question {
            return Ok(condition);
        }
        self.bump()?;
        let when_true = self.ternary()?;
        let when_false = if self.look == Token::Colon {
            self.bump()?;
            Some(self.ternary()?)
        } else {
            None
        };
        Ok(Node::ternary(condition, when_true, when_false))
    }

    fn additive(&mut self) -> Result<NodeRef, ParseError> {
        let mut node = self.term()?;
        loop {
            let op = match self.look {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Subtract,
                _ => break,
            };
            self.bump()?;
            let rhs = self.term()?;
            node = Node::binary(op, node, rhs);
        }
        Ok(node)
    }

    fn term(&mut self) -> Result<NodeRef, ParseError> {
        let mut node = self.factor()?;
        loop {
            let op = match self.look {
                Token::Star => BinaryOp::Multiply,
                Token::Slash => BinaryOp::Divide,
                _ => break,
            };
            self.bump()?;
            let rhs = self.factor()?;
            node = Node::binary(op, node, rhs);
        }
        Ok(node)
    }

    fn factor(&mut self) -> Result<NodeRef, ParseError> {
        if self.look == Token::Minus {
            self.bump()?;
            return Ok(Node::negate(self.factor()?));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<NodeRef, ParseError> {
        match self.bump()? {
            Token::Num(value) => Ok(Node::constant(value)),
            Token::Ident(name) => Ok(Node::identifier(name)),
            Token::LParen => {
                let inner = self.ternary()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(inner)
            }
            other => Err(ParseError::Expected {
                expected: "number, identifier or '('",
                found: format!("{:?}", other),
            }),
        }
    }
}
