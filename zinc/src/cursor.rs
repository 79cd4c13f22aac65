use std::mem;

use vjass::LineComment;
use vjass::lexer::Token;
use vjass::text::Position;

use crate::error::ZincError;

/// A position in the token stream.
///
/// Comment tokens never reach the grammar: they are gathered as they are
/// passed and dropped again as soon as any other token is consumed, so only
/// the comments directly in front of the next token survive.
pub(crate) struct Cursor {
    tokens: Vec<Token>,
    pos: usize,
    comments: Vec<LineComment>,
    last_end: Position,
}

impl Cursor {
    pub fn new(tokens: Vec<Token>) -> Self {
        Cursor {
            tokens,
            pos: 0,
            comments: Vec::new(),
            last_end: Position::default(),
        }
    }

    fn trivia(&mut self) {
        while let Some(token) = self.tokens.get(self.pos).filter(|t| t.is_comment()) {
            self.comments.push(LineComment {
                text: token.text.clone(),
                range: token.range(),
            });
            self.pos += 1;
        }
    }

    pub fn peek(&mut self) -> Option<&Token> {
        self.trivia();
        self.tokens.get(self.pos)
    }

    /// The `n`th non-comment token ahead, `0` being the next one.
    pub fn peek_nth(&mut self, n: usize) -> Option<&Token> {
        self.trivia();
        self.tokens[self.pos..]
            .iter()
            .filter(|t| !t.is_comment())
            .nth(n)
    }

    pub fn advance(&mut self) -> Option<Token> {
        self.trivia();
        let token = self.tokens.get(self.pos).cloned()?;
        self.pos += 1;
        self.comments.clear();
        self.last_end = token.end();
        Some(token)
    }

    pub fn at_end(&mut self) -> bool {
        self.peek().is_none()
    }

    /// Comments seen since the last consumed token.
    pub fn take_comments(&mut self) -> Vec<LineComment> {
        self.trivia();
        mem::take(&mut self.comments)
    }

    /// End of the most recently consumed token.
    pub fn last_end(&self) -> Position {
        self.last_end
    }

    pub fn peek_is_op(&mut self, op: &str) -> bool {
        self.peek().is_some_and(|t| t.is_op(op))
    }

    pub fn peek_is_keyword(&mut self, keyword: &str) -> bool {
        self.peek().is_some_and(|t| t.is_keyword(keyword))
    }

    /// Consume the next token if it is the keyword.
    pub fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_is_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn eat_op(&mut self, op: &str) -> bool {
        if self.peek_is_op(op) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn expect_op(&mut self, op: &str) -> Result<Token, ZincError> {
        let expected = format!("`{op}`");
        match self.advance() {
            Some(token) if token.is_op(op) => Ok(token),
            Some(token) => Err(ZincError::unexpected(&token, expected)),
            None => Err(ZincError::eof(expected)),
        }
    }

    pub fn expect_ident(&mut self, expected: &str) -> Result<Token, ZincError> {
        match self.advance() {
            Some(token) if token.is_ident() => Ok(token),
            Some(token) => Err(ZincError::unexpected(&token, expected)),
            None => Err(ZincError::eof(expected)),
        }
    }
}
