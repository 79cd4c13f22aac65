//! Line lexer.
//!
//! Turns the text of one line into a flat token list. Token kinds are coarse:
//! keywords are ordinary identifiers and are recognized by comparing the token
//! text, which keeps the lexer usable for both the main language and the zinc
//! dialect.

use std::fmt;
use std::ops::Range;

use crate::text::{Position, TextRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Operator,
    String,
    Number,
    Comment,
    Eof,
}

/// A token stamped with the line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    /// Byte columns within the line.
    pub columns: Range<usize>,
}

impl Token {
    pub fn eof(line: usize, column: usize) -> Self {
        Token {
            kind: TokenKind::Eof,
            text: String::new(),
            line,
            columns: column..column,
        }
    }

    pub fn is_ident(&self) -> bool {
        self.kind == TokenKind::Identifier
    }

    /// Identifier with exactly this text.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Identifier && self.text == keyword
    }

    pub fn is_op(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.text == op
    }

    pub fn is_string(&self) -> bool {
        self.kind == TokenKind::String
    }

    pub fn is_comment(&self) -> bool {
        self.kind == TokenKind::Comment
    }

    pub fn start(&self) -> Position {
        Position::new(self.line, self.columns.start)
    }

    pub fn end(&self) -> Position {
        Position::new(self.line, self.columns.end)
    }

    pub fn range(&self) -> TextRange {
        TextRange::on_line(self.line, self.columns.clone())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Identifier => write!(f, "identifier '{}'", self.text),
            TokenKind::Operator => write!(f, "'{}'", self.text),
            TokenKind::String => write!(f, "string literal {}", self.text),
            TokenKind::Number => write!(f, "number {}", self.text),
            TokenKind::Comment => write!(f, "comment"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

const TWO_CHAR_OPS: &[&str] = &["==", "!=", "<=", ">=", "->", "&&", "||", "++", "--"];

/// Tokenize one line of text. Whitespace (including the line terminator) is
/// skipped; an unterminated string runs to the end of the line.
pub fn tokenize(text: &str, line: usize) -> Vec<Token> {
    Lexer::new(text, line).run()
}

struct Lexer<'a> {
    text: &'a str,
    line: usize,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str, line: usize) -> Self {
        Lexer {
            text,
            line,
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<Token> {
        while let Some(ch) = self.peek() {
            let start = self.pos;
            match ch {
                c if c.is_whitespace() => {
                    self.bump();
                }
                '/' if self.rest().starts_with("//") => {
                    self.pos = self.line_end();
                    self.push(TokenKind::Comment, start);
                }
                '"' => {
                    self.string();
                    self.push(TokenKind::String, start);
                }
                '\'' => {
                    self.raw_code();
                    self.push(TokenKind::Number, start);
                }
                '$' => {
                    // `$FF` is a hex literal, `$name$` an unexpanded macro parameter.
                    self.bump();
                    self.eat_while(|c| c.is_alphanumeric() || c == '_');
                    let body = &self.text[start + 1..self.pos];
                    let is_hex = !body.is_empty() && body.chars().all(|c| c.is_ascii_hexdigit());
                    if is_hex && self.peek() != Some('$') {
                        self.push(TokenKind::Number, start);
                    } else {
                        self.eat_while(|c| c.is_alphanumeric() || c == '_' || c == '$');
                        self.push(TokenKind::Identifier, start);
                    }
                }
                c if c.is_ascii_digit() || (c == '.' && self.next_is_digit()) => {
                    self.number();
                    self.push(TokenKind::Number, start);
                }
                c if c.is_alphabetic() || c == '_' => {
                    self.eat_while(|c| c.is_alphanumeric() || c == '_' || c == '$');
                    self.push(TokenKind::Identifier, start);
                }
                _ => {
                    if TWO_CHAR_OPS.iter().any(|op| self.rest().starts_with(op)) {
                        self.pos += 2;
                    } else {
                        self.bump();
                    }
                    self.push(TokenKind::Operator, start);
                }
            }
        }
        self.tokens
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
    }

    fn next_is_digit(&self) -> bool {
        self.rest()
            .chars()
            .nth(1)
            .is_some_and(|c| c.is_ascii_digit())
    }

    fn line_end(&self) -> usize {
        let rest = self.rest();
        let len = rest.find(['\r', '\n']).unwrap_or(rest.len());
        self.pos + len
    }

    fn string(&mut self) {
        self.bump();
        while let Some(ch) = self.peek() {
            match ch {
                '"' => {
                    self.bump();
                    return;
                }
                '\\' => {
                    self.bump();
                    if matches!(self.peek(), Some(c) if c != '\n') {
                        self.bump();
                    }
                }
                '\r' | '\n' => return,
                _ => {
                    self.bump();
                }
            }
        }
    }

    fn raw_code(&mut self) {
        self.bump();
        while let Some(ch) = self.peek() {
            match ch {
                '\'' => {
                    self.bump();
                    return;
                }
                '\r' | '\n' => return,
                _ => {
                    self.bump();
                }
            }
        }
    }

    fn number(&mut self) {
        if self.rest().starts_with("0x") || self.rest().starts_with("0X") {
            self.pos += 2;
            self.eat_while(|c| c.is_ascii_hexdigit());
            return;
        }
        self.eat_while(|c| c.is_ascii_digit());
        if self.peek() == Some('.') {
            self.bump();
            self.eat_while(|c| c.is_ascii_digit());
        }
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token {
            kind,
            text: self.text[start..self.pos].to_string(),
            line: self.line,
            columns: start..self.pos,
        });
    }
}
