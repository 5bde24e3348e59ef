use super::ParseError;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Token {
    Ident(String),
    Num(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Question,
    Colon,
    Eof,
}

pub(crate) struct Lexer<'a> {
    src: &'a [u8],
    i: usize,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(s: &'a str) -> Self {
        Self {
            src: s.as_bytes(),
            i: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.i).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.i + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let ch = self.peek();
        if ch.is_some() {
            self.i += 1;
        }
        ch
    }

    /// Skip whitespace, `// line` and `/* block */` comments.
    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(c), _) if c.is_ascii_whitespace() => {
                    self.i += 1;
                }
                (Some(b'/'), Some(b'/')) => {
                    while let Some(c) = self.bump() {
                        if c == b'\n' {
                            break;
                        }
                    }
                }
                (Some(b'/'), Some(b'*')) => {
                    let start = self.i;
                    self.i += 2;
                    loop {
                        match (self.peek(), self.peek_at(1)) {
                            (Some(b'*'), Some(b'/')) => {
                                self.i += 2;
                                break;
                            }
                            (Some(_), _) => self.i += 1,
                            (None, _) => return Err(ParseError::UnterminatedComment(start)),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    pub(crate) fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_trivia()?;
        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };
        let simple = match c {
            b'+' => Some(Token::Plus),
            b'-' => Some(Token::Minus),
            b'*' => Some(Token::Star),
            b'/' => Some(Token::Slash),
            b'(' => Some(Token::LParen),
            b')' => Some(Token::RParen),
            b'?' => Some(Token::Question),
            b':' => Some(Token::Colon),
            _ => None,
        };
        if let Some(token) = simple {
            self.bump();
            return Ok(token);
        }

        if c.is_ascii_digit() || (c == b'.' && self.peek_at(1).is_some_and(|d| d.is_ascii_digit())) {
            return self.number();
        }
        if c == b'_' || c.is_ascii_alphabetic() {
            let start = self.i;
            while let Some(c) = self.peek() {
                if c == b'_' || c.is_ascii_alphanumeric() {
                    self.i += 1;
                } else {
                    break;
                }
            }
            let ident = std::str::from_utf8(&self.src[start..self.i])
                .map_err(|_| ParseError::UnexpectedChar(start))?;
            return Ok(Token::Ident(ident.to_string()));
        }
        Err(ParseError::UnexpectedChar(self.i))
    }

    fn number(&mut self) -> Result<Token, ParseError> {
        let start = self.i;
        self.digits();
        if self.peek() == Some(b'.') {
            self.i += 1;
            self.digits();
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let mark = self.i;
            self.i += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.i += 1;
            }
            if !self.peek().is_some_and(|d| d.is_ascii_digit()) {
                // Not an exponent; leave the `e` for the next token.
                self.i = mark;
            } else {
                self.digits();
            }
        }
        std::str::from_utf8(&self.src[start..self.i])
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .map(Token::Num)
            .ok_or(ParseError::InvalidNumber(start))
    }

    fn digits(&mut self) {
        while self.peek().is_some_and(|d| d.is_ascii_digit()) {
            self.i += 1;
        }
    }
}
